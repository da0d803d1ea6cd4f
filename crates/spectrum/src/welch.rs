//! Welch-style segment averaging.
//!
//! Segments are windowed, zero-padded and transformed independently on the
//! rayon pool, then averaged bin-wise in segment order.

use num_complex::Complex64;
use rayon::prelude::*;
use tracing::debug;

use crate::conditioning::pad_to_power_of_two;
use crate::error::{Result, SignalError};
use crate::fft::FftBackend;
use crate::window::{apply_window, WindowKind};

/// Averaged one-sided magnitude spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct WelchEstimate {
    /// `fft_size / 2` magnitudes, each normalised by `fft_size / 2`
    pub magnitudes: Vec<f64>,
    /// Padded length of every segment transform
    pub fft_size: usize,
    /// Number of segments averaged
    pub segments: usize,
}

/// Start offsets of each segment.
///
/// A signal shorter than `window_size` produces a single segment at 0 which is
/// later zero-padded.
fn segment_offsets(len: usize, window_size: usize, hop: usize) -> Vec<usize> {
    if len <= window_size {
        return vec![0];
    }
    (0..=len - window_size).step_by(hop).collect()
}

/// Average the magnitude spectra of overlapping segments.
///
/// `hop = window_size · (1 - overlap_percent / 100)`, floored and at least 1.
pub fn segmented_average(
    backend: &dyn FftBackend,
    data: &[f64],
    window_size: usize,
    overlap_percent: f64,
    window: WindowKind,
) -> Result<WelchEstimate> {
    if data.len() < 2 {
        return Err(SignalError::invalid(format!(
            "segment averaging needs at least 2 samples, got {}",
            data.len()
        )));
    }
    if window_size < 2 {
        return Err(SignalError::invalid(format!(
            "segment size must be at least 2, got {window_size}"
        )));
    }
    if !(0.0..100.0).contains(&overlap_percent) {
        return Err(SignalError::invalid(format!(
            "overlap must be in [0, 100), got {overlap_percent}"
        )));
    }

    let hop = ((window_size as f64 * (1.0 - overlap_percent / 100.0)) as usize).max(1);
    let offsets = segment_offsets(data.len(), window_size, hop);
    let fft_size = window_size.min(data.len()).next_power_of_two();
    let half = fft_size / 2;

    debug!(
        segments = offsets.len(),
        window_size,
        hop,
        fft_size,
        backend = backend.name(),
        "Averaging segment spectra"
    );

    let spectra = offsets
        .par_iter()
        .map(|&start| {
            let end = (start + window_size).min(data.len());
            let windowed = apply_window(&data[start..end], window)?;
            let mut padded = pad_to_power_of_two(&windowed);
            padded.resize(fft_size, 0.0);
            let mut buffer: Vec<Complex64> =
                padded.iter().map(|&x| Complex64::new(x, 0.0)).collect();
            backend.forward(&mut buffer)?;
            Ok(buffer[..half]
                .iter()
                .map(|c| c.norm() / half as f64)
                .collect::<Vec<f64>>())
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let mut magnitudes = vec![0.0; half];
    for segment in &spectra {
        for (acc, value) in magnitudes.iter_mut().zip(segment) {
            *acc += value;
        }
    }
    let count = spectra.len() as f64;
    for value in magnitudes.iter_mut() {
        *value /= count;
    }

    Ok(WelchEstimate {
        magnitudes,
        fft_size,
        segments: spectra.len(),
    })
}
