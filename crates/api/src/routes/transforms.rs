//! Cepstrum, envelope, coherence and orbit routes

use axum::{extract::State, Json};
use serde::Deserialize;
use transforms::{
    analyze_orbit, compute_cepstrum, compute_coherence, compute_coherence_averaged,
    compute_envelope, CepstrumResult, CoherenceResult, EnvelopeResult, HilbertMethod, OrbitResult,
};

use super::run_blocking;
use crate::error::{ApiError, JsonBody};
use crate::SharedState;

const DEFAULT_COHERENCE_OVERLAP: f64 = 50.0;

#[derive(Debug, Deserialize)]
pub struct CepstrumRequest {
    pub samples: Vec<f64>,
    pub sample_rate: f64,
}

pub async fn cepstrum(
    State(state): State<SharedState>,
    JsonBody(request): JsonBody<CepstrumRequest>,
) -> Result<Json<CepstrumResult>, ApiError> {
    run_blocking(&state, "cepstrum", move |analyzer| {
        analyzer.validator().validate_samples(&request.samples)?;
        analyzer.validator().validate_sample_rate(request.sample_rate)?;
        Ok(compute_cepstrum(&request.samples, request.sample_rate)?)
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct EnvelopeRequest {
    pub samples: Vec<f64>,
    /// Modulation peaks are reported in Hz when given
    pub sample_rate: Option<f64>,
    #[serde(default)]
    pub method: HilbertMethod,
}

pub async fn envelope(
    State(state): State<SharedState>,
    JsonBody(request): JsonBody<EnvelopeRequest>,
) -> Result<Json<EnvelopeResult>, ApiError> {
    run_blocking(&state, "envelope", move |analyzer| {
        analyzer.validator().validate_samples(&request.samples)?;
        if let Some(rate) = request.sample_rate {
            analyzer.validator().validate_sample_rate(rate)?;
        }
        Ok(compute_envelope(
            &request.samples,
            request.sample_rate,
            request.method,
        )?)
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct CoherenceRequest {
    pub signal_a: Vec<f64>,
    pub signal_b: Vec<f64>,
    /// Segment-averaged estimate when given
    pub segment_size: Option<usize>,
    pub overlap_percent: Option<f64>,
}

pub async fn coherence(
    State(state): State<SharedState>,
    JsonBody(request): JsonBody<CoherenceRequest>,
) -> Result<Json<CoherenceResult>, ApiError> {
    run_blocking(&state, "coherence", move |analyzer| {
        analyzer
            .validator()
            .validate_pair(&request.signal_a, &request.signal_b)?;
        let result = match request.segment_size {
            Some(segment_size) => compute_coherence_averaged(
                &request.signal_a,
                &request.signal_b,
                segment_size,
                request.overlap_percent.unwrap_or(DEFAULT_COHERENCE_OVERLAP),
            )?,
            None => compute_coherence(&request.signal_a, &request.signal_b)?,
        };
        Ok(result)
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct OrbitRequest {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

pub async fn orbit(
    State(state): State<SharedState>,
    JsonBody(request): JsonBody<OrbitRequest>,
) -> Result<Json<OrbitResult>, ApiError> {
    run_blocking(&state, "orbit", move |analyzer| {
        analyzer.validator().validate_pair(&request.x, &request.y)?;
        Ok(analyze_orbit(&request.x, &request.y)?)
    })
    .await
}
