//! Envelope demodulation

use serde::{Deserialize, Serialize};
use spectrum::{dc_blocker, fft, pad_to_power_of_two};
use tracing::debug;

use crate::error::Result;
use crate::hilbert::{analytic_signal, HilbertMethod};

/// DC blocker cutoff applied before demodulation
const DC_CUTOFF_RATIO: f64 = 0.1;
/// Peaks must exceed this fraction of the largest non-DC envelope bin
const PEAK_FRACTION: f64 = 0.1;
const MAX_PEAKS: usize = 5;

/// A local maximum of the envelope spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulationPeak {
    pub bin: usize,
    /// Present when the sample rate was supplied
    pub frequency: Option<f64>,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeResult {
    /// |analytic signal| of the DC-blocked input, same length as the input
    pub envelope: Vec<f64>,
    /// First N/2 magnitudes of the envelope FFT, scaled by 2/N
    pub envelope_spectrum: Vec<f64>,
    /// Bin width of `envelope_spectrum` when the sample rate is known
    pub resolution: Option<f64>,
    /// Strongest modulation peaks, largest first
    pub modulation_peaks: Vec<ModulationPeak>,
}

/// Extract the amplitude envelope and its spectrum.
///
/// Bearing impacts show up as modulation peaks at the defect frequency
/// even when the carrier is a high-frequency resonance.
pub fn compute_envelope(
    samples: &[f64],
    sample_rate: Option<f64>,
    method: HilbertMethod,
) -> Result<EnvelopeResult> {
    let filtered = dc_blocker(samples, DC_CUTOFF_RATIO)?;
    let analytic = analytic_signal(&filtered, method)?;
    let envelope: Vec<f64> = analytic.iter().map(|z| z.norm()).collect();

    let padded = pad_to_power_of_two(&envelope);
    let n = padded.len();
    let bins = fft(&padded)?;
    let scale = if n > 1 { 2.0 / n as f64 } else { 1.0 };
    let envelope_spectrum: Vec<f64> = bins
        .iter()
        .take((n / 2).max(1))
        .map(|z| z.norm() * scale)
        .collect();

    let resolution = sample_rate.filter(|&sr| sr > 0.0).map(|sr| sr / n as f64);
    let modulation_peaks = modulation_peaks(&envelope_spectrum, resolution);

    debug!(
        "Envelope: {} samples, fft size {}, {} modulation peaks",
        samples.len(),
        n,
        modulation_peaks.len()
    );

    Ok(EnvelopeResult {
        envelope,
        envelope_spectrum,
        resolution,
        modulation_peaks,
    })
}

fn modulation_peaks(spectrum: &[f64], resolution: Option<f64>) -> Vec<ModulationPeak> {
    if spectrum.len() < 3 {
        return Vec::new();
    }
    let max = spectrum[1..].iter().cloned().fold(0.0_f64, f64::max);
    let threshold = max * PEAK_FRACTION;

    let mut peaks: Vec<ModulationPeak> = (1..spectrum.len() - 1)
        .filter(|&i| {
            let m = spectrum[i];
            m > spectrum[i - 1] && m > spectrum[i + 1] && m > threshold
        })
        .map(|i| ModulationPeak {
            bin: i,
            frequency: resolution.map(|r| i as f64 * r),
            magnitude: spectrum[i],
        })
        .collect();

    peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
    peaks.truncate(MAX_PEAKS);
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// 200 Hz carrier amplitude-modulated at 20 Hz, sampled at 2048 Hz
    fn modulated(n: usize) -> Vec<f64> {
        let sr = 2048.0;
        (0..n)
            .map(|i| {
                let t = i as f64 / sr;
                (1.0 + 0.5 * (2.0 * PI * 20.0 * t).cos()) * (2.0 * PI * 200.0 * t).cos()
            })
            .collect()
    }

    #[test]
    fn test_modulation_frequency_recovered() {
        let result = compute_envelope(&modulated(2048), Some(2048.0), HilbertMethod::Fft).unwrap();
        assert_eq!(result.envelope.len(), 2048);
        assert_eq!(result.envelope_spectrum.len(), 1024);
        assert_eq!(result.resolution, Some(1.0));

        let strongest = &result.modulation_peaks[0];
        assert_eq!(strongest.bin, 20);
        assert_eq!(strongest.frequency, Some(20.0));
        assert!(result.modulation_peaks.len() <= MAX_PEAKS);
    }

    #[test]
    fn test_without_sample_rate_reports_bins_only() {
        let result = compute_envelope(&modulated(1024), None, HilbertMethod::Fft).unwrap();
        assert!(result.resolution.is_none());
        assert!(result.modulation_peaks.iter().all(|p| p.frequency.is_none()));
    }

    #[test]
    fn test_direct_method_tracks_fft_method() {
        let signal = modulated(256);
        let direct = compute_envelope(&signal, Some(2048.0), HilbertMethod::Direct).unwrap();
        let spectral = compute_envelope(&signal, Some(2048.0), HilbertMethod::Fft).unwrap();
        assert_eq!(direct.envelope.len(), spectral.envelope.len());

        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        let a = mean(&direct.envelope[64..192]);
        let b = mean(&spectral.envelope[64..192]);
        assert!((a - b).abs() < 0.2 * b, "direct {a} vs fft {b}");
    }

    #[test]
    fn test_peaks_sorted_descending() {
        let peaks = modulation_peaks(&[9.0, 1.0, 3.0, 1.0, 5.0, 1.0, 2.0, 0.0], Some(0.5));
        let bins: Vec<usize> = peaks.iter().map(|p| p.bin).collect();
        assert_eq!(bins, vec![4, 2, 6]);
        assert_eq!(peaks[0].frequency, Some(2.0));
    }

    #[test]
    fn test_empty_signal_rejected() {
        assert!(compute_envelope(&[], None, HilbertMethod::Fft).is_err());
    }
}
