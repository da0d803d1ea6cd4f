//! Route handlers

pub mod alerts;
pub mod analysis;
pub mod transforms;

use analyzer::Analyzer;
use axum::Json;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ApiError;
use crate::{telemetry, AppState};

/// Strongest local maxima returned by the spectrum endpoint
pub(crate) const DOMINANT_PEAKS: usize = 5;

/// Run numeric work on the blocking pool and record its outcome
pub(crate) async fn run_blocking<T, F>(
    state: &AppState,
    endpoint: &'static str,
    job: F,
) -> Result<Json<T>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Analyzer) -> analyzer::Result<T> + Send + 'static,
{
    let analyzer = Arc::clone(&state.analyzer);
    let started = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || job(analyzer.as_ref()))
        .await
        .map_err(ApiError::from)
        .and_then(|result| result.map(Json).map_err(ApiError::from));
    telemetry::record_request(endpoint, started.elapsed(), outcome.is_ok());
    outcome
}
