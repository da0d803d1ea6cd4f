//! Signal Conditioning
//!
//! Zero padding and first-order RC filters applied ahead of the FFT.

use std::f64::consts::PI;

use crate::error::{Result, SignalError};

/// Right-pad with zeros to the next power of two.
///
/// Lengths that are already powers of two are returned unchanged; an empty
/// input yields an empty output.
pub fn pad_to_power_of_two(data: &[f64]) -> Vec<f64> {
    if data.is_empty() {
        return Vec::new();
    }
    let target = data.len().next_power_of_two();
    let mut padded = Vec::with_capacity(target);
    padded.extend_from_slice(data);
    padded.resize(target, 0.0);
    padded
}

fn check_filter_args(signal: &[f64], cutoff: f64, sample_rate: f64) -> Result<()> {
    if signal.is_empty() {
        return Err(SignalError::invalid("cannot filter an empty signal"));
    }
    if !(cutoff > 0.0) || !cutoff.is_finite() {
        return Err(SignalError::invalid(format!("invalid cutoff frequency {cutoff}")));
    }
    if !(sample_rate > 0.0) || !sample_rate.is_finite() {
        return Err(SignalError::invalid(format!("invalid sample rate {sample_rate}")));
    }
    Ok(())
}

/// First-order RC low-pass: `y[i] = α·x[i] + (1-α)·y[i-1]`
pub fn low_pass(signal: &[f64], cutoff: f64, sample_rate: f64) -> Result<Vec<f64>> {
    check_filter_args(signal, cutoff, sample_rate)?;
    let rc = 1.0 / (2.0 * PI * cutoff);
    let dt = 1.0 / sample_rate;
    let alpha = dt / (rc + dt);

    let mut filtered = Vec::with_capacity(signal.len());
    filtered.push(signal[0]);
    for i in 1..signal.len() {
        let prev = filtered[i - 1];
        filtered.push(alpha * signal[i] + (1.0 - alpha) * prev);
    }
    Ok(filtered)
}

/// First-order RC high-pass: `y[i] = α·(y[i-1] + x[i] - x[i-1])`
pub fn high_pass(signal: &[f64], cutoff: f64, sample_rate: f64) -> Result<Vec<f64>> {
    check_filter_args(signal, cutoff, sample_rate)?;
    let rc = 1.0 / (2.0 * PI * cutoff);
    let dt = 1.0 / sample_rate;
    Ok(recursive_high_pass(signal, rc / (rc + dt)))
}

/// High-pass at `low` followed by low-pass at `high`
pub fn band_pass(signal: &[f64], low: f64, high: f64, sample_rate: f64) -> Result<Vec<f64>> {
    if low >= high {
        return Err(SignalError::invalid(format!(
            "band edges must satisfy low < high, got {low} >= {high}"
        )));
    }
    let high_passed = high_pass(signal, low, sample_rate)?;
    low_pass(&high_passed, high, sample_rate)
}

/// DC blocker with a normalised cutoff: `α = 1 - cutoff_ratio`
pub fn dc_blocker(signal: &[f64], cutoff_ratio: f64) -> Result<Vec<f64>> {
    if signal.is_empty() {
        return Err(SignalError::invalid("cannot filter an empty signal"));
    }
    if !(0.0..1.0).contains(&cutoff_ratio) {
        return Err(SignalError::invalid(format!(
            "cutoff ratio must be in [0, 1), got {cutoff_ratio}"
        )));
    }
    Ok(recursive_high_pass(signal, 1.0 - cutoff_ratio))
}

fn recursive_high_pass(signal: &[f64], alpha: f64) -> Vec<f64> {
    let mut filtered = Vec::with_capacity(signal.len());
    filtered.push(signal[0]);
    for i in 1..signal.len() {
        let prev = filtered[i - 1];
        filtered.push(alpha * (prev + signal[i] - signal[i - 1]));
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_preserves_prefix() {
        assert_eq!(pad_to_power_of_two(&[1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0, 0.0]);
        let padded = pad_to_power_of_two(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(padded.len(), 8);
        assert_eq!(&padded[..5], &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(padded[5..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_pad_noop_on_power_of_two() {
        assert_eq!(pad_to_power_of_two(&[1.0, 2.0]), vec![1.0, 2.0]);
        assert_eq!(pad_to_power_of_two(&[7.0]), vec![7.0]);
        assert!(pad_to_power_of_two(&[]).is_empty());
    }

    #[test]
    fn test_low_pass_smooths_step() {
        let step: Vec<f64> = (0..200).map(|i| if i < 100 { 0.0 } else { 1.0 }).collect();
        let out = low_pass(&step, 5.0, 1000.0).unwrap();
        assert!(out[100] < 0.1);
        assert!(out[199] > 0.9);
    }

    #[test]
    fn test_high_pass_removes_dc() {
        let dc = vec![3.0; 2000];
        let out = high_pass(&dc, 10.0, 1000.0).unwrap();
        assert_eq!(out[0], 3.0);
        assert!(out[1999].abs() < 1e-6);
    }

    #[test]
    fn test_filter_argument_checks() {
        assert!(low_pass(&[], 10.0, 100.0).is_err());
        assert!(low_pass(&[1.0], 0.0, 100.0).is_err());
        assert!(high_pass(&[1.0], 10.0, -1.0).is_err());
        assert!(band_pass(&[1.0, 2.0], 50.0, 10.0, 100.0).is_err());
        assert!(dc_blocker(&[1.0], 1.5).is_err());
    }

    #[test]
    fn test_band_pass_attenuates_out_of_band() {
        let sr = 1000.0;
        let low_tone: Vec<f64> = (0..1000)
            .map(|i| (2.0 * PI * 1.0 * i as f64 / sr).sin())
            .collect();
        let out = band_pass(&low_tone, 50.0, 200.0, sr).unwrap();
        let peak_out = out[500..].iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert!(peak_out < 0.1, "1 Hz tone leaked: {peak_out}");
    }
}
