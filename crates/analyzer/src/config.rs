//! Layered analysis configuration
//!
//! Sources are applied in order: built-in defaults, an optional TOML file,
//! then `VIBRA_` environment variables with `__` separating nested keys
//! (`VIBRA_SERVER__BIND_ADDR`, `VIBRA_DIAGNOSTICS__UNBALANCE_RATIO`).

use ::config::{Config, Environment, File, FileFormat};
use alerting::AlertConfig;
use data_validator::ValidationConfig;
use diagnostics::DiagnosticConfig;
use feature_engine::StatisticsConfig;
use serde::{Deserialize, Serialize};
use spectrum::SpectrumConfig;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "VIBRA";

/// Errors while loading or checking configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP surface settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Per-request deadline
    pub request_timeout_ms: u64,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            request_timeout_ms: 30_000,
            json_logs: false,
        }
    }
}

/// Settings for every pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub spectrum: SpectrumConfig,
    pub diagnostics: DiagnosticConfig,
    pub statistics: StatisticsConfig,
    pub validation: ValidationConfig,
    pub alerts: AlertConfig,
    pub server: ServerConfig,
}

impl AnalysisConfig {
    /// Load defaults, then `path` (TOML) if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Parse a TOML document layered over the defaults, ignoring the environment
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no stage can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let overlap = self.spectrum.overlap_percent;
        if !(0.0..100.0).contains(&overlap) {
            return Err(invalid(format!(
                "spectrum.overlap_percent must be in [0, 100), got {overlap}"
            )));
        }
        if self.spectrum.segment_size < 2 {
            return Err(invalid(format!(
                "spectrum.segment_size must be at least 2, got {}",
                self.spectrum.segment_size
            )));
        }
        if !(0.0..=1.0).contains(&self.statistics.rolloff_fraction) {
            return Err(invalid(format!(
                "statistics.rolloff_fraction must be in [0, 1], got {}",
                self.statistics.rolloff_fraction
            )));
        }
        if self.diagnostics.max_harmonic_order == 0 {
            return Err(invalid("diagnostics.max_harmonic_order must be positive".to_string()));
        }

        let validation = &self.validation;
        for (name, (min, max)) in [
            ("sample_rate_range", validation.sample_rate_range),
            ("rpm_range", validation.rpm_range),
        ] {
            if !(min < max) {
                return Err(invalid(format!("validation.{name} is empty: [{min}, {max}]")));
            }
        }
        if validation.min_samples > validation.max_samples {
            return Err(invalid(format!(
                "validation.min_samples ({}) exceeds max_samples ({})",
                validation.min_samples, validation.max_samples
            )));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(invalid("server.request_timeout_ms must be positive".to_string()));
        }
        self.server
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| invalid(format!("server.bind_addr '{}': {e}", self.server.bind_addr)))?;
        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectrum::WindowKind;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spectrum.overlap_min_len, 512);
        assert_eq!(config.alerts.cooldown_seconds, 1800);
        assert_eq!(config.server.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = AnalysisConfig::from_toml(
            r#"
            [spectrum]
            window = "blackman"
            overlap_percent = 25.0

            [diagnostics]
            unbalance_ratio = 0.4

            [alerts.thresholds]
            vibration_level = 7.5
            "#,
        )
        .unwrap();

        assert_eq!(config.spectrum.window, WindowKind::Blackman);
        assert_eq!(config.spectrum.overlap_percent, 25.0);
        assert_eq!(config.spectrum.segment_size, 512);
        assert_eq!(config.diagnostics.unbalance_ratio, 0.4);
        assert_eq!(config.diagnostics.misalignment_2x, 0.6);
        assert_eq!(config.alerts.thresholds.vibration_level, 7.5);
        assert_eq!(config.alerts.thresholds.unbalance_level, 3.0);
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        let result = AnalysisConfig::from_toml("[spectrum]\noverlap_percent = 100.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_bind_addr_rejected() {
        let mut config = AnalysisConfig::default();
        config.server.bind_addr = "not an address".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_range_rejected() {
        let mut config = AnalysisConfig::default();
        config.validation.rpm_range = (100.0, 10.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_reads_file_and_environment() {
        let path = std::env::temp_dir().join(format!("vibra-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[statistics]\nrolloff_fraction = 0.9\n").unwrap();
        std::env::set_var("VIBRA_SERVER__REQUEST_TIMEOUT_MS", "1500");

        let config = AnalysisConfig::load(Some(&path)).unwrap();
        std::env::remove_var("VIBRA_SERVER__REQUEST_TIMEOUT_MS");
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.statistics.rolloff_fraction, 0.9);
        assert_eq!(config.server.request_timeout_ms, 1500);
    }
}
