//! Diagnostic Error Types

use spectrum::SignalError;
use thiserror::Error;

/// Errors during diagnostic analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagnosticError {
    /// Bad spectrum or shaft speed
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// Physically meaningless machine parameter
    #[error("Invalid machine parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, DiagnosticError>;

/// Require a strictly positive, finite parameter
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(DiagnosticError::InvalidParameter { name, value })
    }
}
