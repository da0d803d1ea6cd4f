//! Alert Manager Implementation

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::rules::{now_ms, Alert, AlertKind, AlertSeverity, AlertThresholds};

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub thresholds: AlertThresholds,
    /// Cooldown period between duplicate alerts (seconds)
    pub cooldown_seconds: u64,
    /// Maximum alerts per hour before throttling
    pub max_alerts_per_hour: usize,
    /// Entries kept in the history
    pub history_limit: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            thresholds: AlertThresholds::default(),
            cooldown_seconds: 1800, // 30 minutes
            max_alerts_per_hour: 10,
            history_limit: 100,
        }
    }
}

/// State of an alert kind
#[derive(Debug, Clone)]
pub struct AlertState {
    /// Last time this alert was fired
    pub last_fired: Instant,
    /// Number of times fired
    pub fire_count: usize,
    /// Whether alert is acknowledged
    pub acknowledged: bool,
}

/// Counts over the last 24 hours of history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub last: Option<Alert>,
}

/// Alert manager for deduplication, throttling and history
pub struct AlertManager {
    config: AlertConfig,
    /// Alert states by kind
    states: HashMap<AlertKind, AlertState>,
    /// Alerts fired in current hour
    hourly_count: usize,
    hour_start: Instant,
    history: VecDeque<Alert>,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self {
            config,
            states: HashMap::new(),
            hourly_count: 0,
            hour_start: Instant::now(),
            history: VecDeque::new(),
        }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.config.thresholds
    }

    /// Check cooldown and hourly throttle for an alert kind
    pub fn should_fire(&mut self, kind: AlertKind) -> bool {
        // Reset hourly counter if needed
        if self.hour_start.elapsed() > Duration::from_secs(3600) {
            self.hourly_count = 0;
            self.hour_start = Instant::now();
        }

        if self.hourly_count >= self.config.max_alerts_per_hour {
            warn!("Alert throttled: max alerts per hour reached");
            return false;
        }

        if let Some(state) = self.states.get(&kind) {
            let cooldown = Duration::from_secs(self.config.cooldown_seconds);
            if state.last_fired.elapsed() < cooldown {
                debug!("Alert suppressed: {} in cooldown period", kind.as_str());
                return false;
            }
        }

        true
    }

    /// Record that an alert was fired
    pub fn record_fire(&mut self, alert: Alert) {
        self.hourly_count += 1;

        let state = self.states.entry(alert.kind).or_insert(AlertState {
            last_fired: Instant::now(),
            fire_count: 0,
            acknowledged: false,
        });
        state.last_fired = Instant::now();
        state.fire_count += 1;
        state.acknowledged = false;

        info!(
            "Alert recorded: {} {} (count: {})",
            alert.severity,
            alert.kind.as_str(),
            state.fire_count
        );

        self.history.push_back(alert);
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }
    }

    /// Pass candidate alerts through deduplication; returns those that fired
    pub fn process(&mut self, alerts: Vec<Alert>) -> Vec<Alert> {
        let mut fired = Vec::new();
        for alert in alerts {
            if self.should_fire(alert.kind) {
                self.record_fire(alert.clone());
                fired.push(alert);
            }
        }
        fired
    }

    /// Acknowledge an alert kind
    pub fn acknowledge(&mut self, kind: AlertKind) -> bool {
        if let Some(state) = self.states.get_mut(&kind) {
            state.acknowledged = true;
            info!("Alert acknowledged: {}", kind.as_str());
            true
        } else {
            false
        }
    }

    /// Get pending (unacknowledged) alert kinds
    pub fn pending(&self) -> Vec<(AlertKind, &AlertState)> {
        self.states
            .iter()
            .filter(|(_, state)| !state.acknowledged)
            .map(|(k, v)| (*k, v))
            .collect()
    }

    pub fn history(&self) -> impl DoubleEndedIterator<Item = &Alert> {
        self.history.iter()
    }

    pub fn summary(&self) -> AlertSummary {
        let cutoff = now_ms().saturating_sub(DAY_MS);
        let recent: Vec<&Alert> = self
            .history
            .iter()
            .filter(|a| a.timestamp_ms >= cutoff)
            .collect();
        let count = |severity| recent.iter().filter(|a| a.severity == severity).count();

        AlertSummary {
            total: recent.len(),
            critical: count(AlertSeverity::Critical),
            warning: count(AlertSeverity::Warning),
            info: count(AlertSeverity::Info),
            last: recent.last().map(|a| (*a).clone()),
        }
    }

    /// Get hourly alert count
    pub fn hourly_count(&self) -> usize {
        self.hourly_count
    }

    /// Clear all alert states and history
    pub fn clear(&mut self) {
        self.states.clear();
        self.history.clear();
        self.hourly_count = 0;
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
