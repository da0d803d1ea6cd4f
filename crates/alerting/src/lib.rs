//! Alerting System
//!
//! Turns diagnostic results into threshold alerts, then deduplicates,
//! throttles and records them.

mod manager;
mod rules;

pub use manager::{AlertConfig, AlertManager, AlertState, AlertSummary};
pub use rules::{check_alerts, Alert, AlertKind, AlertSeverity, AlertThresholds};
