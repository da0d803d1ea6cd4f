//! Transform Error Types

use spectrum::SignalError;
use thiserror::Error;

/// Errors raised by the derived transforms
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// Too few samples for a meaningful result
    #[error("Insufficient samples: need at least {needed}, got {got}")]
    InsufficientSamples { needed: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, TransformError>;
