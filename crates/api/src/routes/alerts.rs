//! Alert Routes

use alerting::{Alert, AlertKind, AlertSeverity, AlertSummary};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::JsonBody;
use crate::SharedState;

/// Query parameters for alerts endpoint
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Filter by severity
    pub severity: Option<AlertSeverity>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for alerts endpoint
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    /// Newest first
    pub data: Vec<Alert>,
    pub count: usize,
    pub unacknowledged: Vec<AlertKind>,
    pub summary: AlertSummary,
}

/// Get alert history
pub async fn get_alerts(
    State(state): State<SharedState>,
    Query(params): Query<AlertQuery>,
) -> Json<AlertResponse> {
    let manager = state.alerts.lock().await;
    let limit = params.limit.min(500);

    let data: Vec<Alert> = manager
        .history()
        .rev()
        .filter(|a| params.severity.map_or(true, |s| a.severity == s))
        .take(limit)
        .cloned()
        .collect();
    let unacknowledged = manager.pending().into_iter().map(|(kind, _)| kind).collect();

    Json(AlertResponse {
        count: data.len(),
        data,
        unacknowledged,
        summary: manager.summary(),
    })
}

#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub kind: AlertKind,
}

#[derive(Debug, Serialize)]
pub struct AcknowledgeResponse {
    pub kind: AlertKind,
    pub acknowledged: bool,
}

pub async fn acknowledge(
    State(state): State<SharedState>,
    JsonBody(request): JsonBody<AcknowledgeRequest>,
) -> Json<AcknowledgeResponse> {
    let acknowledged = state.alerts.lock().await.acknowledge(request.kind);
    Json(AcknowledgeResponse {
        kind: request.kind,
        acknowledged,
    })
}
