//! Analysis pipeline

use alerting::{check_alerts, Alert};
use data_validator::{resample_uniform, SignalValidator};
use diagnostics::{DiagnosticBundle, DiagnosticEngine};
use feature_engine::{StatisticsBundle, StatisticsEngine};
use rayon::prelude::*;
use scoring::{NeutralScorer, PatternTable, Scorer, ScoringEngine, ScoringReport};
use serde::{Deserialize, Serialize};
use spectrum::{compute_spectrum_with, find_dominant_peaks, find_peak, Peak, Radix2, Spectrum};
use std::borrow::Cow;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::Result;

/// Strongest local maxima reported alongside the spectrum
const DOMINANT_PEAKS: usize = 5;

/// One capture from one measurement point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Caller-chosen label, echoed in the report
    #[serde(default)]
    pub equipment_id: Option<String>,
    pub samples: Vec<f64>,
    /// Hz; also the target rate when `timestamps` are given
    pub sample_rate: f64,
    pub rpm: f64,
    /// Capture times in seconds for irregularly sampled data
    #[serde(default)]
    pub timestamps: Option<Vec<f64>>,
}

/// Full result for one capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub equipment_id: Option<String>,
    /// Samples analysed after any resampling
    pub sample_count: usize,
    pub sample_rate: f64,
    pub spectrum: Spectrum,
    pub peak: Peak,
    pub dominant_peaks: Vec<Peak>,
    pub diagnostics: DiagnosticBundle,
    pub statistics: StatisticsBundle,
    pub scoring: ScoringReport,
    /// Candidate alerts before de-duplication
    pub alerts: Vec<Alert>,
}

/// Pipeline with the engines for every stage
pub struct Analyzer {
    config: AnalysisConfig,
    validator: SignalValidator,
    diagnostics: DiagnosticEngine,
    statistics: StatisticsEngine,
    scoring: ScoringEngine,
}

impl Analyzer {
    /// Create a new analyzer with the neutral scorer
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_scorer(config, Box::new(NeutralScorer))
    }

    pub fn with_scorer(config: AnalysisConfig, scorer: Box<dyn Scorer>) -> Self {
        info!("Creating analyzer with config: {:?}", config);
        Self {
            validator: SignalValidator::new(config.validation.clone()),
            diagnostics: DiagnosticEngine::new(config.diagnostics.clone()),
            statistics: StatisticsEngine::new(config.statistics.clone()),
            scoring: ScoringEngine::new(PatternTable::default(), scorer),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn validator(&self) -> &SignalValidator {
        &self.validator
    }

    /// Analyse one capture.
    ///
    /// Either every stage succeeds and a complete report is returned, or the
    /// first failure is returned and nothing else.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let samples: Cow<'_, [f64]> = match &request.timestamps {
            Some(timestamps) => Cow::Owned(resample_uniform(
                &request.samples,
                timestamps,
                request.sample_rate,
                self.config.validation.max_samples,
            )?),
            None => Cow::Borrowed(&request.samples),
        };

        self.validator
            .validate_capture(&samples, request.sample_rate, Some(request.rpm))
            .into_result()?;

        debug!(
            equipment = request.equipment_id.as_deref().unwrap_or("-"),
            samples = samples.len(),
            sample_rate = request.sample_rate,
            rpm = request.rpm,
            "Analyzing capture"
        );

        let spectrum =
            compute_spectrum_with(&Radix2, &samples, request.sample_rate, &self.config.spectrum)?;
        let peak = find_peak(&spectrum)?;
        let diagnostics = self.diagnostics.diagnose(&spectrum, request.rpm, peak)?;
        let statistics = self.statistics.compute(&samples, &spectrum)?;
        let scoring = self.scoring.evaluate(
            &spectrum,
            diagnostics.rotation_frequency,
            &diagnostics.bearing_frequencies,
        )?;
        let alerts = check_alerts(
            statistics.temporal.rms,
            &diagnostics,
            &self.config.alerts.thresholds,
        );

        debug!(
            severity = %diagnostics.severity,
            risk = %scoring.risk,
            alerts = alerts.len(),
            "Analysis complete"
        );

        Ok(AnalysisReport {
            equipment_id: request.equipment_id.clone(),
            sample_count: samples.len(),
            sample_rate: request.sample_rate,
            dominant_peaks: find_dominant_peaks(&spectrum, DOMINANT_PEAKS),
            peak,
            spectrum,
            diagnostics,
            statistics,
            scoring,
            alerts,
        })
    }

    /// Analyse independent captures in parallel; results keep request order
    pub fn analyze_batch(&self, requests: &[AnalysisRequest]) -> Vec<Result<AnalysisReport>> {
        info!("Analyzing batch of {} captures", requests.len());
        requests.par_iter().map(|r| self.analyze(r)).collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
