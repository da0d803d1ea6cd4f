//! Uniform resampling of irregular captures

use crate::error::ValidationError;
use tracing::debug;

fn check_timestamps(values: &[f64], timestamps: &[f64]) -> Result<(), ValidationError> {
    if values.len() != timestamps.len() {
        return Err(ValidationError::LengthMismatch {
            left: values.len(),
            right: timestamps.len(),
        });
    }
    if let Some(index) = timestamps.iter().position(|t| !t.is_finite()) {
        return Err(ValidationError::NonFiniteSample {
            index,
            value: timestamps[index],
        });
    }
    if let Some(index) = timestamps.windows(2).position(|w| w[1] < w[0]) {
        return Err(ValidationError::NonMonotonicTimestamps(index + 1));
    }
    Ok(())
}

/// Mean rate of a capture: sample count over elapsed time
pub fn estimate_sample_rate(timestamps_s: &[f64]) -> Result<f64, ValidationError> {
    check_timestamps(timestamps_s, timestamps_s)?;
    let duration = match (timestamps_s.first(), timestamps_s.last()) {
        (Some(first), Some(last)) => last - first,
        _ => 0.0,
    };
    if duration <= 0.0 {
        return Err(ValidationError::InvalidFormat(
            "capture must span a positive duration".to_string(),
        ));
    }
    Ok(timestamps_s.len() as f64 / duration)
}

/// Linearly interpolate `values` onto a uniform grid.
///
/// The grid starts at the first timestamp and holds
/// `floor(duration · target_rate)` points. Fewer than two samples are
/// returned unchanged. A grid larger than `max_samples` is rejected before
/// anything is allocated.
pub fn resample_uniform(
    values: &[f64],
    timestamps_s: &[f64],
    target_rate: f64,
    max_samples: usize,
) -> Result<Vec<f64>, ValidationError> {
    check_timestamps(values, timestamps_s)?;
    if !(target_rate > 0.0) || !target_rate.is_finite() {
        return Err(ValidationError::OutOfRange {
            field: "target_rate",
            value: target_rate,
            min: 0.0,
            max: f64::MAX,
        });
    }
    let n = values.len();
    if n < 2 {
        return Ok(values.to_vec());
    }

    let start = timestamps_s[0];
    let duration = timestamps_s[n - 1] - start;
    let grid = (duration * target_rate).floor();
    if !grid.is_finite() || grid > max_samples as f64 {
        return Err(ValidationError::SampleCount {
            actual: grid as usize,
            min: 0,
            max: max_samples,
        });
    }
    let count = grid as usize;
    let interval = 1.0 / target_rate;

    let mut uniform = Vec::with_capacity(count);
    let mut lower = 0;
    for i in 0..count {
        let target = start + i as f64 * interval;
        while lower + 1 < n - 1 && timestamps_s[lower + 1] <= target {
            lower += 1;
        }
        let upper = lower + 1;
        let span = timestamps_s[upper] - timestamps_s[lower];
        if span == 0.0 {
            uniform.push(values[lower]);
        } else {
            let t = ((target - timestamps_s[lower]) / span).clamp(0.0, 1.0);
            uniform.push(values[lower] + t * (values[upper] - values[lower]));
        }
    }

    debug!(
        "Resampled {} irregular samples to {} at {:.1} Hz",
        n,
        uniform.len(),
        target_rate
    );
    Ok(uniform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_interpolation() {
        let values = [0.0, 10.0, 20.0];
        let times = [0.0, 1.0, 2.0];
        let uniform = resample_uniform(&values, &times, 4.0, 1024).unwrap();
        assert_eq!(uniform.len(), 8);
        for (i, v) in uniform.iter().enumerate() {
            assert!((v - i as f64 * 2.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_irregular_spacing() {
        let values = [0.0, 1.0, 0.0, -1.0];
        let times = [0.0, 0.1, 0.35, 0.4];
        let uniform = resample_uniform(&values, &times, 20.0, 1024).unwrap();
        assert_eq!(uniform.len(), 8);
        assert!((uniform[1] - 0.5).abs() < 1e-12);
        // 0.2 s is 40% of the way from 0.1 to 0.35
        assert!((uniform[4] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_offset_start_and_duplicates() {
        let values = [5.0, 7.0, 9.0];
        let times = [10.0, 10.0, 11.0];
        let uniform = resample_uniform(&values, &times, 2.0, 1024).unwrap();
        assert_eq!(uniform, vec![7.0, 8.0]);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(resample_uniform(&[1.0, 2.0], &[0.0], 10.0, 1024).is_err());
        assert_eq!(
            resample_uniform(&[1.0, 2.0, 3.0], &[0.0, 0.2, 0.1], 10.0, 1024),
            Err(ValidationError::NonMonotonicTimestamps(2))
        );
        assert!(resample_uniform(&[1.0, 2.0], &[0.0, 1.0], 0.0, 1024).is_err());
        assert_eq!(resample_uniform(&[3.0], &[0.0], 10.0, 1024).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_oversized_grid_rejected_before_allocation() {
        // Two samples spanning ~115 days at 1 MHz
        let result = resample_uniform(&[0.0, 1.0], &[0.0, 1e13], 1_000_000.0, 1 << 22);
        assert!(matches!(
            result,
            Err(ValidationError::SampleCount { max, .. }) if max == 1 << 22
        ));

        let result = resample_uniform(&[0.0, 1.0], &[0.0, 1.0], 1000.0, 999);
        assert_eq!(
            result,
            Err(ValidationError::SampleCount {
                actual: 1000,
                min: 0,
                max: 999
            })
        );
        assert_eq!(
            resample_uniform(&[0.0, 1.0], &[0.0, 1.0], 1000.0, 1000)
                .unwrap()
                .len(),
            1000
        );
    }

    #[test]
    fn test_estimate_sample_rate() {
        let times: Vec<f64> = (0..=100).map(|i| i as f64 * 0.01).collect();
        let rate = estimate_sample_rate(&times).unwrap();
        assert!((rate - 101.0).abs() < 1e-9);
        assert!(estimate_sample_rate(&[1.0]).is_err());
    }
}
