//! Impact (shock pulse) detection in the time domain

use serde::{Deserialize, Serialize};
use spectrum::SignalError;
use tracing::debug;

use crate::error::Result;

/// A single impact: a local |x| maximum above the threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub index: usize,
    pub magnitude: f64,
    /// `index / len`, in `[0, 1)`
    pub normalized_time: f64,
}

/// Impacts found in a signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub impacts: Vec<Impact>,
    pub impact_count: usize,
    pub threshold: f64,
}

/// Find impacts above `threshold` (default `3·rms`).
///
/// End samples are never reported since they lack a neighbour on one side.
pub fn analyze_impacts(signal: &[f64], threshold: Option<f64>) -> Result<ImpactAnalysis> {
    if signal.is_empty() {
        return Err(SignalError::EmptyInput("impact analysis").into());
    }
    let threshold = match threshold {
        Some(t) if t.is_finite() && t >= 0.0 => t,
        Some(t) => {
            return Err(SignalError::invalid(format!("invalid impact threshold {t}")).into())
        }
        None => {
            let rms = (signal.iter().map(|v| v * v).sum::<f64>() / signal.len() as f64).sqrt();
            rms * 3.0
        }
    };

    let n = signal.len();
    let impacts: Vec<Impact> = (1..n.saturating_sub(1))
        .filter(|&i| {
            let here = signal[i].abs();
            here > threshold && here > signal[i - 1].abs() && here > signal[i + 1].abs()
        })
        .map(|i| Impact {
            index: i,
            magnitude: signal[i].abs(),
            normalized_time: i as f64 / n as f64,
        })
        .collect();

    debug!(count = impacts.len(), threshold, "Impact analysis complete");

    Ok(ImpactAnalysis {
        impact_count: impacts.len(),
        impacts,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_spikes_over_default_threshold() {
        let mut signal = vec![0.1; 200];
        for (k, v) in signal.iter_mut().enumerate() {
            if k % 2 == 0 {
                *v = -0.1;
            }
        }
        signal[50] = 5.0;
        signal[150] = -4.0;
        let result = analyze_impacts(&signal, None).unwrap();
        assert_eq!(result.impact_count, 2);
        assert_eq!(result.impacts[0].index, 50);
        assert_eq!(result.impacts[1].magnitude, 4.0);
        assert!((result.impacts[1].normalized_time - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_threshold_and_edges() {
        let signal = [9.0, 1.0, 2.0, 1.0, 9.0];
        let result = analyze_impacts(&signal, Some(1.5)).unwrap();
        assert_eq!(result.impact_count, 1);
        assert_eq!(result.impacts[0].index, 2);
        assert_eq!(result.threshold, 1.5);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(analyze_impacts(&[], None).is_err());
        assert!(analyze_impacts(&[1.0, 2.0], Some(f64::NAN)).is_err());
        assert_eq!(analyze_impacts(&[1.0], None).unwrap().impact_count, 0);
    }
}
