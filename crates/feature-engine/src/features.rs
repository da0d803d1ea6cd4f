//! Statistics Bundle Assembly

use serde::{Deserialize, Serialize};
use spectrum::{SignalError, Spectrum};
use tracing::{debug, info};

use crate::error::{finite, Result};
use crate::normality::{normality_test, NormalityTest};
use crate::spectral::SpectralStatistics;
use crate::temporal::TemporalStatistics;

/// Statistics thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Energy fraction for spectral rolloff
    pub rolloff_fraction: f64,
    /// Leading samples fed to the normality test
    pub normality_max_samples: usize,
    /// W above which the signal is reported as normal
    pub normality_threshold: f64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            rolloff_fraction: 0.85,
            normality_max_samples: 100,
            normality_threshold: 0.9,
        }
    }
}

/// Condition indicators derived from amplitude ratios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticIndicators {
    /// peak / mean(|x|)
    pub impulse_indicator: f64,
    /// peak / sqrt(mean(x²))
    pub margin_factor: f64,
    /// rms / mean(|x|)
    pub shape_indicator: f64,
    pub normality: NormalityTest,
}

impl DiagnosticIndicators {
    fn compute(
        samples: &[f64],
        temporal: &TemporalStatistics,
        config: &StatisticsConfig,
    ) -> Result<Self> {
        let mean_abs = samples.iter().map(|v| v.abs()).sum::<f64>() / samples.len() as f64;
        if mean_abs == 0.0 {
            return Err(SignalError::DivisionByZero("impulse indicator (zero mean amplitude)").into());
        }
        Ok(Self {
            impulse_indicator: finite("impulse indicator", temporal.peak / mean_abs)?,
            margin_factor: finite("margin factor", temporal.peak / temporal.rms)?,
            shape_indicator: finite("shape indicator", temporal.rms / mean_abs)?,
            normality: normality_test(
                samples,
                config.normality_max_samples,
                config.normality_threshold,
            )?,
        })
    }
}

/// Temporal, spectral and diagnostic statistics for one signal snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsBundle {
    pub temporal: TemporalStatistics,
    pub spectral: SpectralStatistics,
    pub diagnostic: DiagnosticIndicators,
}

/// Statistics engine holding its thresholds
pub struct StatisticsEngine {
    config: StatisticsConfig,
}

impl StatisticsEngine {
    /// Create a new statistics engine
    pub fn new(config: StatisticsConfig) -> Self {
        info!("Creating statistics engine with config: {:?}", config);
        Self { config }
    }

    pub fn config(&self) -> &StatisticsConfig {
        &self.config
    }

    /// Compute the full bundle; any failing statistic fails the bundle
    pub fn compute(&self, samples: &[f64], spectrum: &Spectrum) -> Result<StatisticsBundle> {
        compute_statistics(samples, spectrum, &self.config)
    }
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::new(StatisticsConfig::default())
    }
}

/// Compute temporal statistics of `samples` and spectral statistics of `spectrum`
pub fn compute_statistics(
    samples: &[f64],
    spectrum: &Spectrum,
    config: &StatisticsConfig,
) -> Result<StatisticsBundle> {
    debug!(
        "Computing statistics: {} samples, {} bins",
        samples.len(),
        spectrum.len()
    );

    let temporal = TemporalStatistics::compute(samples)?;
    let spectral = SpectralStatistics::compute(spectrum, config.rolloff_fraction)?;
    let diagnostic = DiagnosticIndicators::compute(samples, &temporal, config)?;

    Ok(StatisticsBundle {
        temporal,
        spectral,
        diagnostic,
    })
}
