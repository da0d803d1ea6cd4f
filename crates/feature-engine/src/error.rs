//! Statistics Error Types

use spectrum::SignalError;
use thiserror::Error;

/// Errors raised while computing statistics
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatisticsError {
    /// Empty input or a zero denominator
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// A statistic came out NaN or infinite
    #[error("Degenerate statistic: {0}")]
    DegenerateStatistic(&'static str),
}

pub type Result<T> = std::result::Result<T, StatisticsError>;

/// Reject NaN/∞ for a named statistic
pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StatisticsError::DegenerateStatistic(name))
    }
}
