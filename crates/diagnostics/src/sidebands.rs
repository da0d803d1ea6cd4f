//! Modulation sidebands around running-speed harmonics

use serde::{Deserialize, Serialize};
use spectrum::Spectrum;

/// Minimum modulation depth reported
const DEPTH_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModulationSeverity {
    /// depth in (0.1, 0.3]
    Low,
    /// depth in (0.3, 0.5]
    Moderate,
    /// depth above 0.5
    High,
}

impl ModulationSeverity {
    fn from_depth(depth: f64) -> Self {
        if depth > 0.5 {
            ModulationSeverity::High
        } else if depth > 0.3 {
            ModulationSeverity::Moderate
        } else {
            ModulationSeverity::Low
        }
    }
}

/// Sideband pair at `harmonic ± rotation_freq`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SidebandRecord {
    pub order: u32,
    pub center_frequency: f64,
    pub center_magnitude: f64,
    pub lower_magnitude: f64,
    pub upper_magnitude: f64,
    /// (lower + upper) / center
    pub modulation_depth: f64,
    pub severity: ModulationSeverity,
}

/// Report harmonics `1..=orders` whose sidebands exceed 10% of the carrier.
///
/// Carriers with zero magnitude are skipped rather than divided by.
pub fn analyze_sidebands(spectrum: &Spectrum, rotation_freq: f64, orders: u32) -> Vec<SidebandRecord> {
    let magnitude_at = |freq: f64| spectrum.closest_bin(freq).map(|i| spectrum.magnitudes[i]);

    (1..=orders)
        .filter_map(|order| {
            let center_frequency = rotation_freq * order as f64;
            let center_magnitude = magnitude_at(center_frequency)?;
            if center_magnitude <= 0.0 {
                return None;
            }
            let lower_magnitude = magnitude_at(center_frequency - rotation_freq)?;
            let upper_magnitude = magnitude_at(center_frequency + rotation_freq)?;
            let modulation_depth = (lower_magnitude + upper_magnitude) / center_magnitude;
            (modulation_depth > DEPTH_THRESHOLD).then_some(SidebandRecord {
                order,
                center_frequency,
                center_magnitude,
                lower_magnitude,
                upper_magnitude,
                modulation_depth,
                severity: ModulationSeverity::from_depth(modulation_depth),
            })
        })
        .collect()
}
