//! Signal Validation and Resampling
//!
//! Range checks for capture parameters, sample sanity checks, and linear
//! resampling of irregularly timestamped accelerometer captures.

mod error;
mod resample;
mod validator;

pub use error::ValidationError;
pub use resample::{estimate_sample_rate, resample_uniform};
pub use validator::{SignalValidator, ValidationConfig, ValidationResult};
