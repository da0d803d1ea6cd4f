//! Spectrum, diagnostics, statistics and full-pipeline routes

use alerting::Alert;
use analyzer::{AnalysisReport, AnalysisRequest};
use axum::{extract::State, Json};
use diagnostics::{diagnose as run_diagnose, DiagnosticBundle};
use feature_engine::{compute_statistics, StatisticsBundle};
use serde::{Deserialize, Serialize};
use ::spectrum::{
    compute_spectrum_with, find_dominant_peaks, find_peak, Peak, Radix2, Spectrum, SpectrumConfig,
    WindowKind,
};
use tracing::info;

use super::{run_blocking, DOMINANT_PEAKS};
use crate::error::{ApiError, JsonBody};
use crate::{telemetry, SharedState};

#[derive(Debug, Deserialize)]
pub struct SpectrumRequest {
    pub samples: Vec<f64>,
    pub sample_rate: f64,
    /// Configured window when absent
    pub window: Option<WindowKind>,
    /// Configured overlap when absent
    pub overlap_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SpectrumResponse {
    pub magnitudes: Vec<f64>,
    pub frequencies: Vec<f64>,
    pub fft_size: usize,
    pub segments: usize,
    pub peak: Peak,
    pub dominant_peaks: Vec<Peak>,
}

pub async fn spectrum(
    State(state): State<SharedState>,
    JsonBody(request): JsonBody<SpectrumRequest>,
) -> Result<Json<SpectrumResponse>, ApiError> {
    run_blocking(&state, "spectrum", move |analyzer| {
        analyzer.validator().validate_samples(&request.samples)?;
        analyzer.validator().validate_sample_rate(request.sample_rate)?;

        let defaults = &analyzer.config().spectrum;
        let config = SpectrumConfig {
            window: request.window.unwrap_or(defaults.window),
            overlap_percent: request.overlap_percent.unwrap_or(defaults.overlap_percent),
            ..defaults.clone()
        };
        let spectrum =
            compute_spectrum_with(&Radix2, &request.samples, request.sample_rate, &config)?;
        let peak = find_peak(&spectrum)?;
        let dominant_peaks = find_dominant_peaks(&spectrum, DOMINANT_PEAKS);

        Ok(SpectrumResponse {
            magnitudes: spectrum.magnitudes,
            frequencies: spectrum.frequencies,
            fft_size: spectrum.fft_size,
            segments: spectrum.segments,
            peak,
            dominant_peaks,
        })
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    pub magnitudes: Vec<f64>,
    pub frequencies: Vec<f64>,
    pub rpm: f64,
    /// Located with `find_peak` when absent
    pub peak: Option<Peak>,
}

pub async fn diagnose(
    State(state): State<SharedState>,
    JsonBody(request): JsonBody<DiagnoseRequest>,
) -> Result<Json<DiagnosticBundle>, ApiError> {
    run_blocking(&state, "diagnose", move |analyzer| {
        analyzer.validator().validate_rpm(request.rpm)?;
        let spectrum = Spectrum::new(request.magnitudes, request.frequencies)?;
        let peak = match request.peak {
            Some(peak) => peak,
            None => find_peak(&spectrum)?,
        };
        Ok(run_diagnose(
            &spectrum,
            request.rpm,
            peak,
            &analyzer.config().diagnostics,
        )?)
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct StatisticsRequest {
    pub samples: Vec<f64>,
    pub magnitudes: Vec<f64>,
    pub frequencies: Vec<f64>,
}

pub async fn statistics(
    State(state): State<SharedState>,
    JsonBody(request): JsonBody<StatisticsRequest>,
) -> Result<Json<StatisticsBundle>, ApiError> {
    run_blocking(&state, "statistics", move |analyzer| {
        analyzer.validator().validate_samples(&request.samples)?;
        let spectrum = Spectrum::new(request.magnitudes, request.frequencies)?;
        Ok(compute_statistics(
            &request.samples,
            &spectrum,
            &analyzer.config().statistics,
        )?)
    })
    .await
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    /// Alerts that passed cooldown and throttling
    pub fired_alerts: Vec<Alert>,
}

pub async fn analyze(
    State(state): State<SharedState>,
    JsonBody(request): JsonBody<AnalysisRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(report) = run_blocking(&state, "analyze", move |analyzer| {
        analyzer.analyze(&request)
    })
    .await?;

    let fired_alerts = state.alerts.lock().await.process(report.alerts.clone());
    if !fired_alerts.is_empty() {
        info!(
            "{} alert(s) fired for {}",
            fired_alerts.len(),
            report.equipment_id.as_deref().unwrap_or("unnamed equipment")
        );
        telemetry::record_alerts(fired_alerts.len());
    }

    Ok(Json(AnalyzeResponse {
        report,
        fired_alerts,
    }))
}
