//! Approximate normality check.
//!
//! This is a Shapiro-Wilk-shaped statistic with heuristic weights
//! `sqrt(n)·(1 - 2i/n)` for the lower half of the ordered sample, not the
//! tabulated Shapiro-Wilk coefficients. The p-value is a coarse lookup on W.
//! Treat both as a screening indicator only.

use serde::{Deserialize, Serialize};
use spectrum::SignalError;

use crate::error::{finite, Result};

/// Result of [`normality_test`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityTest {
    /// Approximate W statistic
    pub statistic: f64,
    /// `statistic > threshold`
    pub is_normal: bool,
    /// Tiered p-value estimate (0.9 / 0.5 / 0.1 / 0.01)
    pub p_value: f64,
    /// Number of leading samples the statistic was computed over
    pub samples_used: usize,
    /// Always true: the weights are not the exact Shapiro-Wilk coefficients
    pub approximate: bool,
}

fn weight(i: usize, n: usize) -> f64 {
    if i >= n / 2 {
        return 0.0;
    }
    (n as f64).sqrt() * (1.0 - 2.0 * i as f64 / n as f64)
}

fn approximate_p_value(w: f64) -> f64 {
    if w > 0.95 {
        0.9
    } else if w > 0.90 {
        0.5
    } else if w > 0.85 {
        0.1
    } else {
        0.01
    }
}

/// Run the approximate test over the first `max_samples` samples (sorted)
pub fn normality_test(signal: &[f64], max_samples: usize, threshold: f64) -> Result<NormalityTest> {
    let n = signal.len().min(max_samples);
    if n == 0 {
        return Err(SignalError::EmptyInput("normality test").into());
    }

    let mut sorted = signal[..n].to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    if variance == 0.0 {
        return Err(SignalError::DivisionByZero("normality statistic (zero variance)").into());
    }

    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| weight(i, n) * v)
        .sum();
    let statistic = finite("normality statistic", weighted.powi(2) / (variance * n as f64))?;

    Ok(NormalityTest {
        statistic,
        is_normal: statistic > threshold,
        p_value: approximate_p_value(statistic),
        samples_used: n,
        approximate: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatisticsError;

    #[test]
    fn test_weights_cover_lower_half() {
        assert_eq!(weight(0, 4), 2.0);
        assert_eq!(weight(1, 4), 1.0);
        assert_eq!(weight(2, 4), 0.0);
        assert_eq!(weight(3, 4), 0.0);
    }

    #[test]
    fn test_p_value_tiers() {
        assert_eq!(approximate_p_value(0.99), 0.9);
        assert_eq!(approximate_p_value(0.92), 0.5);
        assert_eq!(approximate_p_value(0.86), 0.1);
        assert_eq!(approximate_p_value(0.2), 0.01);
    }

    #[test]
    fn test_only_leading_samples_used() {
        let mut signal: Vec<f64> = (0..100).map(|i| (i as f64 * 0.7).sin()).collect();
        signal.extend(std::iter::repeat(1e6).take(50));
        let limited = normality_test(&signal, 100, 0.9).unwrap();
        let prefix = normality_test(&signal[..100], 100, 0.9).unwrap();
        assert_eq!(limited.samples_used, 100);
        assert_eq!(limited, prefix);
        assert!(limited.approximate);
    }

    #[test]
    fn test_threshold_applies() {
        let signal = [-1.0, 1.0, -1.0, 1.0];
        // sorted [-1,-1,1,1], weights [2,1,0,0] -> (-3)^2 / (1*4) = 2.25
        let result = normality_test(&signal, 100, 0.9).unwrap();
        assert!((result.statistic - 2.25).abs() < 1e-12);
        assert!(result.is_normal);
        let strict = normality_test(&signal, 100, 3.0).unwrap();
        assert!(!strict.is_normal);
    }

    #[test]
    fn test_constant_signal_fails() {
        assert!(matches!(
            normality_test(&[3.0; 10], 100, 0.9),
            Err(StatisticsError::Signal(SignalError::DivisionByZero(_)))
        ));
        assert!(normality_test(&[], 100, 0.9).is_err());
    }
}
