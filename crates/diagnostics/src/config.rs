//! Diagnostic thresholds

use serde::{Deserialize, Serialize};

use crate::bearing::BearingGeometry;

/// Ratios and limits used by the rule engine.
///
/// Fault thresholds are fractions of the largest spectrum magnitude; the
/// misalignment and looseness ratios apply on top of `unbalance_ratio`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// Highest harmonic order searched
    pub max_harmonic_order: u32,
    /// Harmonic acceptance window as a fraction of rotation frequency
    pub harmonic_tolerance: f64,
    /// Bins below this fraction of the maximum are not reported as harmonics
    pub harmonic_floor_ratio: f64,
    pub unbalance_ratio: f64,
    pub misalignment_2x: f64,
    pub misalignment_3x: f64,
    pub looseness_ratio: f64,
    /// Minimum detected harmonics before looseness is considered
    pub looseness_min_harmonics: usize,
    pub bearing_ratio: f64,
    /// Harmonic orders examined for sidebands
    pub sideband_orders: u32,
    /// Harmonic orders reported with phase
    pub phase_orders: u32,
    /// Bearing geometry; default multipliers are used when absent
    pub bearing: Option<BearingGeometry>,
    /// Driving gear tooth count, enables the gear mesh check
    pub gear_teeth: Option<u32>,
    /// Belt pass frequency in Hz, enables the belt check
    pub belt_pass_frequency: Option<f64>,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            max_harmonic_order: 10,
            harmonic_tolerance: 0.1,
            harmonic_floor_ratio: 0.02,
            unbalance_ratio: 0.3,
            misalignment_2x: 0.6,
            misalignment_3x: 0.4,
            looseness_ratio: 0.2,
            looseness_min_harmonics: 5,
            bearing_ratio: 0.15,
            sideband_orders: 5,
            phase_orders: 3,
            bearing: None,
            gear_teeth: None,
            belt_pass_frequency: None,
        }
    }
}

impl DiagnosticConfig {
    /// Lower thresholds for critical machinery
    pub fn strict() -> Self {
        Self {
            unbalance_ratio: 0.2,
            bearing_ratio: 0.1,
            ..Self::default()
        }
    }

    /// Higher thresholds for noisy environments
    pub fn lenient() -> Self {
        Self {
            unbalance_ratio: 0.4,
            bearing_ratio: 0.25,
            harmonic_floor_ratio: 0.05,
            ..Self::default()
        }
    }

    pub fn with_bearing(mut self, geometry: BearingGeometry) -> Self {
        self.bearing = Some(geometry);
        self
    }
}
