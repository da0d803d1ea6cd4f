//! Harmonic phase from complex FFT bins

use serde::{Deserialize, Serialize};
use spectrum::Spectrum;

use crate::harmonics::HarmonicRecord;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub order: u32,
    pub frequency: f64,
    /// `atan2(im, re)` in degrees, (-180, 180]
    pub phase_deg: f64,
}

/// Phase of detected harmonics up to `max_order`.
///
/// Empty when the spectrum carries no complex bins (averaged spectra).
pub fn analyze_phase(spectrum: &Spectrum, harmonics: &[HarmonicRecord], max_order: u32) -> Vec<PhaseRecord> {
    let Some(bins) = spectrum.bins.as_ref() else {
        return Vec::new();
    };
    harmonics
        .iter()
        .filter(|h| h.order <= max_order)
        .filter_map(|h| {
            let bin = bins.get(h.bin)?;
            Some(PhaseRecord {
                order: h.order,
                frequency: h.detected_frequency,
                phase_deg: bin.im.atan2(bin.re).to_degrees(),
            })
        })
        .collect()
}
