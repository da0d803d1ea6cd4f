//! Time-domain Statistics

use serde::{Deserialize, Serialize};
use spectrum::SignalError;

use crate::error::{finite, Result};

/// Moment and amplitude statistics of a signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalStatistics {
    /// Mean value
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    /// Standard deviation
    pub std_dev: f64,
    /// Skewness (asymmetry)
    pub skewness: f64,
    /// Excess kurtosis (tailedness, 0 for a Gaussian)
    pub kurtosis: f64,
    /// Root mean square
    pub rms: f64,
    /// Largest absolute sample
    pub peak: f64,
    /// peak / rms
    pub crest_factor: f64,
    /// peak / std_dev
    pub crest_margin: f64,
    /// max - min
    pub range: f64,
    /// Sign changes around the mean
    pub zero_crossings: usize,
}

impl TemporalStatistics {
    /// Compute statistics from a slice of samples.
    ///
    /// Fails on an empty slice and on a constant signal (zero deviation).
    pub fn compute(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(SignalError::EmptyInput("signal").into());
        }

        let n = values.len() as f64;

        let mean = values.iter().sum::<f64>() / n;

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        // Central moments
        let mut m2 = 0.0;
        let mut m3 = 0.0;
        let mut m4 = 0.0;
        let mut sum_sq = 0.0;
        let mut peak = 0.0_f64;

        for &v in values {
            let d = v - mean;
            m2 += d * d;
            m3 += d * d * d;
            m4 += d * d * d * d;
            sum_sq += v * v;
            peak = peak.max(v.abs());
        }

        let variance = m2 / n;
        let std_dev = variance.sqrt();
        if std_dev == 0.0 {
            return Err(SignalError::DivisionByZero("skewness (zero standard deviation)").into());
        }

        // E[(X-μ)³] / σ³
        let skewness = (m3 / n) / (std_dev * std_dev * std_dev);
        // E[(X-μ)⁴] / σ⁴ - 3
        let kurtosis = (m4 / n) / (variance * variance) - 3.0;

        let rms = (sum_sq / n).sqrt();
        if rms == 0.0 {
            return Err(SignalError::DivisionByZero("crest factor (zero rms)").into());
        }

        let mut zero_crossings = 0;
        for i in 1..values.len() {
            let prev = values[i - 1] - mean;
            let curr = values[i] - mean;
            if prev.signum() != curr.signum() && prev != 0.0 && curr != 0.0 {
                zero_crossings += 1;
            }
        }

        Ok(Self {
            mean: finite("mean", mean)?,
            variance: finite("variance", variance)?,
            std_dev,
            skewness: finite("skewness", skewness)?,
            kurtosis: finite("kurtosis", kurtosis)?,
            rms: finite("rms", rms)?,
            peak: finite("peak", peak)?,
            crest_factor: finite("crest factor", peak / rms)?,
            crest_margin: finite("crest margin", peak / std_dev)?,
            range: finite("range", max - min)?,
            zero_crossings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatisticsError;

    #[test]
    fn test_mean_computation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = TemporalStatistics::compute(&values).unwrap();
        assert!((stats.mean - 3.0).abs() < 0.001);
        assert_eq!(stats.range, 4.0);
    }

    #[test]
    fn test_std_dev_computation() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = TemporalStatistics::compute(&values).unwrap();
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
        assert!((stats.variance - 4.0).abs() < 1e-12);
        assert!((stats.crest_margin - 9.0 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sine_crest_and_kurtosis() {
        let n = 4000;
        let values: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * 10.0 * i as f64 / n as f64).sin())
            .collect();
        let stats = TemporalStatistics::compute(&values).unwrap();
        assert!((stats.rms - 1.0 / 2f64.sqrt()).abs() < 1e-3);
        assert!((stats.crest_factor - 2f64.sqrt()).abs() < 1e-2);
        // Pure sine has excess kurtosis -1.5
        assert!((stats.kurtosis + 1.5).abs() < 1e-2);
        assert!(stats.skewness.abs() < 1e-6);
    }

    #[test]
    fn test_reference_sequence() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0];
        let stats = TemporalStatistics::compute(&values).unwrap();
        assert!(stats.rms > 0.0);
        assert!(stats.crest_factor > 0.0);
        assert_eq!(stats.peak, 5.0);
    }

    #[test]
    fn test_zero_crossings() {
        // Values oscillating around mean of 5
        let values = vec![3.0, 7.0, 4.0, 8.0, 2.0, 6.0];
        let stats = TemporalStatistics::compute(&values).unwrap();
        assert_eq!(stats.zero_crossings, 5);
    }

    #[test]
    fn test_degenerate_inputs_fail() {
        assert!(matches!(
            TemporalStatistics::compute(&[]),
            Err(StatisticsError::Signal(SignalError::EmptyInput(_)))
        ));
        assert!(matches!(
            TemporalStatistics::compute(&[2.0, 2.0, 2.0]),
            Err(StatisticsError::Signal(SignalError::DivisionByZero(_)))
        ));
        assert!(matches!(
            TemporalStatistics::compute(&[1.0, f64::NAN]),
            Err(StatisticsError::DegenerateStatistic(_))
        ));
    }
}
