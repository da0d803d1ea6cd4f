//! Spectral feature vector fed to a scorer

use serde::{Deserialize, Serialize};
use spectrum::{SignalError, Spectrum};
use tracing::debug;

use crate::Result;

pub const FEATURE_COUNT: usize = 10;

/// Orders summed for the harmonic ratio
const HARMONIC_ORDERS: u32 = 5;
const ROLLOFF_FRACTION: f64 = 0.85;

/// Ten scalar descriptors of one magnitude spectrum
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// max / rms of the magnitudes
    pub peak_ratio: f64,
    /// Share of magnitude at 1X..5X
    pub harmonic_ratio: f64,
    /// Excess kurtosis of the magnitude distribution
    pub spectral_kurtosis: f64,
    pub spectral_skewness: f64,
    /// Share of energy in the lower half of the band
    pub energy_distribution: f64,
    /// (left + right neighbour) / peak around the largest bin
    pub modulation_depth: f64,
    /// median / max
    pub noise_floor: f64,
    /// max / mean
    pub peak_sharpness: f64,
    pub spectral_centroid: f64,
    pub spectral_rolloff: f64,
}

impl FeatureSet {
    /// Extract features; fails on a spectrum without any magnitude.
    ///
    /// A flat spectrum has zero magnitude variance and reports zero
    /// kurtosis and skewness.
    pub fn extract(spectrum: &Spectrum, rotation_frequency: f64) -> Result<Self> {
        let m = &spectrum.magnitudes;
        let f = &spectrum.frequencies;
        if m.is_empty() {
            return Err(SignalError::EmptyInput("feature extraction").into());
        }
        let n = m.len() as f64;
        let total: f64 = m.iter().sum();
        let max = spectrum.max_magnitude();
        if total == 0.0 || max == 0.0 {
            return Err(SignalError::DivisionByZero("feature extraction (silent spectrum)").into());
        }

        let mean = total / n;
        let rms = spectrum.rms();
        let (skewness, kurtosis) = shape_moments(m, mean);

        let harmonic_sum: f64 = (1..=HARMONIC_ORDERS)
            .filter_map(|order| spectrum.closest_bin(order as f64 * rotation_frequency))
            .map(|i| m[i])
            .sum();

        let energy: Vec<f64> = m.iter().map(|v| v * v).collect();
        let total_energy: f64 = energy.iter().sum();
        let lower_energy: f64 = energy[..m.len() / 2].iter().sum();

        let features = Self {
            peak_ratio: max / rms,
            harmonic_ratio: harmonic_sum / total,
            spectral_kurtosis: kurtosis,
            spectral_skewness: skewness,
            energy_distribution: lower_energy / total_energy,
            modulation_depth: modulation_depth(m),
            noise_floor: median(m) / max,
            peak_sharpness: max / mean,
            spectral_centroid: m.iter().zip(f).map(|(a, b)| a * b).sum::<f64>() / total,
            spectral_rolloff: rolloff(&energy, f, total_energy * ROLLOFF_FRACTION),
        };
        debug!("Extracted scoring features: {:?}", features);
        Ok(features)
    }

    /// Features in declaration order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.peak_ratio,
            self.harmonic_ratio,
            self.spectral_kurtosis,
            self.spectral_skewness,
            self.energy_distribution,
            self.modulation_depth,
            self.noise_floor,
            self.peak_sharpness,
            self.spectral_centroid,
            self.spectral_rolloff,
        ]
    }
}

fn shape_moments(values: &[f64], mean: f64) -> (f64, f64) {
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    if variance == 0.0 {
        return (0.0, 0.0);
    }
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
    let m4 = values.iter().map(|v| (v - mean).powi(4)).sum::<f64>() / n;
    (m3 / variance.powf(1.5), m4 / (variance * variance) - 3.0)
}

fn modulation_depth(m: &[f64]) -> f64 {
    let (index, &peak) = m
        .iter()
        .enumerate()
        .fold((0, &0.0), |best, (i, v)| if *v > *best.1 { (i, v) } else { best });
    let left = index.checked_sub(1).map_or(0.0, |i| m[i]);
    let right = m.get(index + 1).copied().unwrap_or(0.0);
    (left + right) / peak
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn rolloff(energy: &[f64], frequencies: &[f64], target: f64) -> f64 {
    let mut cumulative = 0.0;
    for (e, &freq) in energy.iter().zip(frequencies) {
        cumulative += e;
        if cumulative >= target {
            return freq;
        }
    }
    frequencies.last().copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tonal() -> Spectrum {
        let freqs: Vec<f64> = (0..64).map(|i| i as f64 * 5.0).collect();
        let mags = freqs
            .iter()
            .map(|&f| match f as u32 {
                30 => 1.0,
                60 => 0.5,
                90 => 0.25,
                _ => 0.01,
            })
            .collect();
        Spectrum::new(mags, freqs).unwrap()
    }

    #[test]
    fn test_feature_values() {
        let features = FeatureSet::extract(&tonal(), 30.0).unwrap();
        let total = 1.75 + 61.0 * 0.01;
        // 1X..3X hit the tones, 4X and 5X the floor
        assert!((features.harmonic_ratio - (1.75 + 0.02) / total).abs() < 1e-12);
        assert!((features.noise_floor - 0.01).abs() < 1e-12);
        assert!((features.peak_sharpness - 64.0 / total).abs() < 1e-9);
        assert!((features.modulation_depth - 0.02).abs() < 1e-12);
        assert!(features.energy_distribution > 0.99);
        assert!(features.spectral_kurtosis > 0.0);
        assert!(features.spectral_skewness > 0.0);
        // 85% of the energy is reached once the 2X tone is included
        assert_eq!(features.spectral_rolloff, 60.0);
    }

    #[test]
    fn test_flat_spectrum_has_no_shape() {
        let spectrum = Spectrum::new(vec![2.0; 8], (0..8).map(|i| i as f64).collect()).unwrap();
        let features = FeatureSet::extract(&spectrum, 1.0).unwrap();
        assert_eq!(features.spectral_kurtosis, 0.0);
        assert_eq!(features.spectral_skewness, 0.0);
        assert!((features.peak_ratio - 1.0).abs() < 1e-12);
        assert_eq!(features.to_array().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_silent_spectrum_rejected() {
        let spectrum = Spectrum::new(vec![0.0; 4], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        assert!(FeatureSet::extract(&spectrum, 1.0).is_err());
    }
}
