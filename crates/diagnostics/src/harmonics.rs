//! Running-speed harmonic detection

use serde::{Deserialize, Serialize};
use spectrum::Spectrum;

/// A harmonic of the rotation frequency found in the spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonicRecord {
    /// Harmonic order, 1 = running speed
    pub order: u32,
    pub theoretical_frequency: f64,
    pub detected_frequency: f64,
    pub magnitude: f64,
    /// Spectrum bin the harmonic was matched to
    pub bin: usize,
}

/// Look for orders `1..=max_order` of `rotation_freq`.
///
/// For each order the closest bin is taken (first one on ties) and accepted
/// when it lies within `rotation_freq · tolerance` of the theoretical
/// frequency and its magnitude exceeds `floor`.
pub fn detect_harmonics(
    spectrum: &Spectrum,
    rotation_freq: f64,
    max_order: u32,
    tolerance: f64,
    floor: f64,
) -> Vec<HarmonicRecord> {
    let window = rotation_freq * tolerance;
    (1..=max_order)
        .filter_map(|order| {
            let target = rotation_freq * order as f64;
            let bin = spectrum.closest_bin(target)?;
            let detected = spectrum.frequencies[bin];
            let magnitude = spectrum.magnitudes[bin];
            ((detected - target).abs() <= window && magnitude > floor).then_some(HarmonicRecord {
                order,
                theoretical_frequency: target,
                detected_frequency: detected,
                magnitude,
                bin,
            })
        })
        .collect()
}
