//! Frequency-domain Statistics

use serde::{Deserialize, Serialize};
use spectrum::{SignalError, Spectrum};

use crate::error::{finite, Result};

/// Floor added before taking logarithms of magnitudes/frequencies
const LOG_EPSILON: f64 = 1e-10;

/// Shape descriptors of a magnitude spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralStatistics {
    /// Magnitude-weighted mean frequency (Hz)
    pub centroid: f64,
    /// Magnitude-weighted standard deviation around the centroid (Hz)
    pub spread: f64,
    /// Slope of log-magnitude against log-frequency
    pub slope: f64,
    /// Frequency below which `rolloff_fraction` of the energy lies (Hz)
    pub rolloff: f64,
    /// Shannon entropy of the normalised power distribution (bits)
    pub entropy: f64,
    /// Geometric / arithmetic mean of magnitudes
    pub flatness: f64,
    /// spread / centroid, 0 when the centroid is 0
    pub bandwidth_efficiency: f64,
}

impl SpectralStatistics {
    /// Compute spectral statistics.
    ///
    /// Fails when the spectrum carries no magnitude.
    pub fn compute(spectrum: &Spectrum, rolloff_fraction: f64) -> Result<Self> {
        let m = &spectrum.magnitudes;
        let f = &spectrum.frequencies;
        if m.is_empty() {
            return Err(SignalError::EmptyInput("spectrum").into());
        }
        if m.len() != f.len() {
            return Err(SignalError::LengthMismatch {
                left: m.len(),
                right: f.len(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&rolloff_fraction) {
            return Err(SignalError::invalid(format!(
                "rolloff fraction must be in [0, 1], got {rolloff_fraction}"
            ))
            .into());
        }

        let total: f64 = m.iter().sum();
        if total == 0.0 {
            return Err(SignalError::DivisionByZero("spectral centroid (zero magnitude sum)").into());
        }

        let centroid = m.iter().zip(f).map(|(mag, freq)| mag * freq).sum::<f64>() / total;
        let spread = (m
            .iter()
            .zip(f)
            .map(|(mag, freq)| mag * (freq - centroid).powi(2))
            .sum::<f64>()
            / total)
            .sqrt();

        let bandwidth_efficiency = if centroid == 0.0 {
            0.0
        } else {
            spread / centroid
        };

        Ok(Self {
            centroid: finite("spectral centroid", centroid)?,
            spread: finite("spectral spread", spread)?,
            slope: finite("spectral slope", spectral_slope(m, f)?)?,
            rolloff: finite("spectral rolloff", spectral_rolloff(m, f, rolloff_fraction))?,
            entropy: finite("spectral entropy", spectral_entropy(m)?)?,
            flatness: finite("spectral flatness", spectral_flatness(m, total))?,
            bandwidth_efficiency: finite("bandwidth efficiency", bandwidth_efficiency)?,
        })
    }
}

/// Least-squares slope of `ln(m+ε)` against `ln(f+ε)`
fn spectral_slope(magnitudes: &[f64], frequencies: &[f64]) -> Result<f64> {
    let n = magnitudes.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    for (mag, freq) in magnitudes.iter().zip(frequencies) {
        let x = (freq + LOG_EPSILON).ln();
        let y = (mag + LOG_EPSILON).ln();
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }
    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return Err(SignalError::DivisionByZero("spectral slope (single frequency)").into());
    }
    Ok((n * sum_xy - sum_x * sum_y) / denominator)
}

/// Smallest frequency whose cumulative energy reaches `fraction` of the total
fn spectral_rolloff(magnitudes: &[f64], frequencies: &[f64], fraction: f64) -> f64 {
    let total_energy: f64 = magnitudes.iter().map(|m| m * m).sum();
    let target = total_energy * fraction;

    let mut cumulative = 0.0;
    for (mag, &freq) in magnitudes.iter().zip(frequencies) {
        cumulative += mag * mag;
        if cumulative >= target {
            return freq;
        }
    }
    frequencies.last().copied().unwrap_or(0.0)
}

fn spectral_entropy(magnitudes: &[f64]) -> Result<f64> {
    let total_energy: f64 = magnitudes.iter().map(|m| m * m).sum();
    if total_energy == 0.0 {
        return Err(SignalError::DivisionByZero("spectral entropy (zero energy)").into());
    }
    Ok(-magnitudes
        .iter()
        .map(|m| m * m / total_energy)
        .filter(|&p| p > 0.0)
        .map(|p| p * p.log2())
        .sum::<f64>())
}

fn spectral_flatness(magnitudes: &[f64], total: f64) -> f64 {
    let n = magnitudes.len() as f64;
    let arithmetic = total / n;
    let geometric = (magnitudes.iter().map(|m| (m + LOG_EPSILON).ln()).sum::<f64>() / n).exp();
    geometric / arithmetic
}

/// Sum of squared magnitudes for bins in `[low, high)` Hz
pub fn band_power(spectrum: &Spectrum, low: f64, high: f64) -> f64 {
    spectrum
        .frequencies
        .iter()
        .zip(&spectrum.magnitudes)
        .filter(|(&f, _)| f >= low && f < high)
        .map(|(_, &m)| m * m)
        .sum()
}
