//! Signal Error Types

use thiserror::Error;

/// Errors raised by the numeric core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    /// Empty arrays, non power-of-two FFT lengths, bad window sizes, bad rates
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Paired arrays of differing length
    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// A denominator evaluated to zero
    #[error("Division by zero while computing {0}")]
    DivisionByZero(&'static str),

    /// A reduction was asked for over no data
    #[error("Empty input for {0}")]
    EmptyInput(&'static str),
}

impl SignalError {
    /// Shorthand for [`SignalError::InvalidInput`]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result alias used throughout the spectrum crate
pub type Result<T> = std::result::Result<T, SignalError>;
