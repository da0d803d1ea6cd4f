//! Range and sanity checks for capture inputs

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Sample rate valid range (Hz)
    pub sample_rate_range: (f64, f64),
    /// Shaft speed valid range (RPM)
    pub rpm_range: (f64, f64),
    /// Fewest samples accepted
    pub min_samples: usize,
    /// Most samples accepted
    pub max_samples: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            sample_rate_range: (1.0, 1_000_000.0),
            rpm_range: (1.0, 60_000.0),
            min_samples: 2,
            max_samples: 1 << 22,
        }
    }
}

impl ValidationConfig {
    /// Tighter bounds for fixed industrial sensors
    pub fn strict() -> Self {
        Self {
            sample_rate_range: (100.0, 100_000.0),
            rpm_range: (60.0, 30_000.0),
            min_samples: 256,
            max_samples: 1 << 20,
        }
    }
}

/// Result of validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of checks performed
    pub fields_checked: usize,
}

impl ValidationResult {
    fn from_checks(checks: Vec<Result<(), ValidationError>>) -> Self {
        let fields_checked = checks.len();
        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
        Self {
            valid: errors.is_empty(),
            errors,
            fields_checked,
        }
    }

    /// First error, if any
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Validator for vibration captures
pub struct SignalValidator {
    config: ValidationConfig,
}

impl SignalValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against an inclusive range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value.is_nan() || value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    pub fn validate_rpm(&self, rpm: f64) -> Result<(), ValidationError> {
        self.validate_range("rpm", rpm, self.config.rpm_range)
    }

    pub fn validate_sample_rate(&self, sample_rate: f64) -> Result<(), ValidationError> {
        self.validate_range("sample_rate", sample_rate, self.config.sample_rate_range)
    }

    /// Sample count within bounds and every sample finite
    pub fn validate_samples(&self, samples: &[f64]) -> Result<(), ValidationError> {
        let (min, max) = (self.config.min_samples, self.config.max_samples);
        if samples.len() < min || samples.len() > max {
            return Err(ValidationError::SampleCount {
                actual: samples.len(),
                min,
                max,
            });
        }
        match samples.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(ValidationError::NonFiniteSample {
                index,
                value: samples[index],
            }),
            None => Ok(()),
        }
    }

    /// Two channels of one capture (coherence, orbit)
    pub fn validate_pair(&self, a: &[f64], b: &[f64]) -> Result<(), ValidationError> {
        if a.len() != b.len() {
            return Err(ValidationError::LengthMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        self.validate_samples(a)?;
        self.validate_samples(b)
    }

    /// Run every check for one capture and collect all failures
    pub fn validate_capture(
        &self,
        samples: &[f64],
        sample_rate: f64,
        rpm: Option<f64>,
    ) -> ValidationResult {
        let mut checks = vec![
            self.validate_samples(samples),
            self.validate_sample_rate(sample_rate),
        ];
        if let Some(rpm) = rpm {
            checks.push(self.validate_rpm(rpm));
        }
        ValidationResult::from_checks(checks)
    }
}

impl Default for SignalValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
