//! Vibration Analysis API Server
//!
//! JSON endpoints over the analysis pipeline and the individual transforms.

use alerting::{AlertManager, AlertSummary};
use analyzer::{AnalysisConfig, Analyzer};
use axum::{
    error_handling::HandleErrorLayer,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod routes;
pub mod telemetry;

pub use error::ApiError;
pub use telemetry::init_logging;

/// Application state shared across handlers
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    /// De-duplicates alerts across requests
    pub alerts: Mutex<AlertManager>,
    pub metrics: PrometheusHandle,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AnalysisConfig) -> Self {
        let alerts = AlertManager::new(config.alerts.clone());
        Self {
            analyzer: Arc::new(Analyzer::new(config)),
            alerts: Mutex::new(alerts),
            metrics: telemetry::prometheus(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub alerts: AlertSummary,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    let timeout = Duration::from_millis(state.analyzer.config().server.request_timeout_ms);

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/spectrum", post(routes::analysis::spectrum))
        .route("/api/v1/diagnose", post(routes::analysis::diagnose))
        .route("/api/v1/statistics", post(routes::analysis::statistics))
        .route("/api/v1/analyze", post(routes::analysis::analyze))
        .route("/api/v1/cepstrum", post(routes::transforms::cepstrum))
        .route("/api/v1/envelope", post(routes::transforms::envelope))
        .route("/api/v1/coherence", post(routes::transforms::coherence))
        .route("/api/v1/orbit", post(routes::transforms::orbit))
        .route("/api/v1/alerts", get(routes::alerts::get_alerts))
        .route("/api/v1/alerts/acknowledge", post(routes::alerts::acknowledge))
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(HandleErrorLayer::new(error::handle_middleware_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let alerts = state.alerts.lock().await.summary();

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        alerts,
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<SharedState>) -> String {
    state.metrics.render()
}

/// Run the server until it fails
pub async fn run_server(config: AnalysisConfig) -> std::io::Result<()> {
    let addr = config.server.bind_addr.clone();
    let state = Arc::new(AppState::new(config));
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}
