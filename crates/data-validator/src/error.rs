//! Validation Error Types

use thiserror::Error;

/// Errors during signal validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite sample
    #[error("Non-finite sample {value} at index {index}")]
    NonFiniteSample { index: usize, value: f64 },

    /// Sample count outside the configured bounds
    #[error("Sample count {actual} outside [{min}, {max}]")]
    SampleCount {
        actual: usize,
        min: usize,
        max: usize,
    },

    /// Paired arrays of differing length
    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Timestamps going backwards
    #[error("Timestamp at index {0} is earlier than its predecessor")]
    NonMonotonicTimestamps(usize),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
