//! Threshold rules

use diagnostics::DiagnosticBundle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Alert thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Overall RMS level (m/s²) above which a critical alert fires
    pub vibration_level: f64,
    /// 1X magnitude above which an unbalance warning fires
    pub unbalance_level: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            vibration_level: 5.0,
            unbalance_level: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "INFO",
            AlertSeverity::Warning => "WARNING",
            AlertSeverity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What triggered an alert; deduplication is per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ExcessiveVibration,
    Unbalance,
    BearingDefect,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::ExcessiveVibration => "excessive_vibration",
            AlertKind::Unbalance => "unbalance",
            AlertKind::BearingDefect => "bearing_defect",
        }
    }

    /// Get recommended action
    pub fn recommended_action(&self) -> &'static str {
        match self {
            AlertKind::ExcessiveVibration => "Stop the equipment immediately",
            AlertKind::Unbalance => "Schedule rotor balancing",
            AlertKind::BearingDefect => "Urgent bearing inspection required",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub action: String,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl Alert {
    fn new(kind: AlertKind, severity: AlertSeverity, message: String) -> Self {
        Self {
            kind,
            severity,
            message,
            action: kind.recommended_action().to_string(),
            timestamp_ms: now_ms(),
        }
    }
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Evaluate the alert rules for one analysis.
///
/// `overall_level` is the RMS of the analysed signal.
pub fn check_alerts(
    overall_level: f64,
    diagnostics: &DiagnosticBundle,
    thresholds: &AlertThresholds,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if overall_level > thresholds.vibration_level {
        alerts.push(Alert::new(
            AlertKind::ExcessiveVibration,
            AlertSeverity::Critical,
            format!("Excessive vibration: {overall_level:.2} m/s²"),
        ));
    }

    if let Some(fundamental) = diagnostics.harmonic(1) {
        if fundamental.magnitude > thresholds.unbalance_level {
            alerts.push(Alert::new(
                AlertKind::Unbalance,
                AlertSeverity::Warning,
                format!("Unbalance detected: 1X at {:.2}", fundamental.magnitude),
            ));
        }
    }

    if let Some(defect) = diagnostics.faults.bearing_defects.first() {
        alerts.push(Alert::new(
            AlertKind::BearingDefect,
            AlertSeverity::Critical,
            format!(
                "Bearing defect detected: {} at {:.1} Hz",
                defect.kind, defect.frequency
            ),
        ));
    }

    alerts
}
