//! One-sided magnitude spectrum and peak picking

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conditioning::pad_to_power_of_two;
use crate::error::{Result, SignalError};
use crate::fft::{FftBackend, Radix2};
use crate::welch::segmented_average;
use crate::window::{apply_window, WindowKind};

/// Spectrum computation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Taper applied to the signal (or each segment)
    pub window: WindowKind,
    /// Segment overlap in percent, `[0, 100)`
    pub overlap_percent: f64,
    /// Samples per Welch segment
    pub segment_size: usize,
    /// Segment averaging is only used for signals longer than this
    pub overlap_min_len: usize,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            window: WindowKind::Hanning,
            overlap_percent: 50.0,
            segment_size: 512,
            overlap_min_len: 512,
        }
    }
}

impl SpectrumConfig {
    /// Single full-length FFT regardless of signal length
    pub fn single_shot(window: WindowKind) -> Self {
        Self {
            window,
            overlap_percent: 0.0,
            ..Self::default()
        }
    }

    /// Whether a signal of `len` samples takes the segment-averaging branch
    pub fn uses_segments(&self, len: usize) -> bool {
        len > self.overlap_min_len && self.overlap_percent > 0.0
    }
}

/// Magnitudes paired index-wise with ascending bin frequencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub magnitudes: Vec<f64>,
    pub frequencies: Vec<f64>,
    /// Raw complex bins of a single full-length FFT, kept for phase analysis.
    /// Absent for averaged spectra.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bins: Option<Vec<Complex64>>,
    /// Transform length the bins were computed from
    pub fft_size: usize,
    /// Number of averaged segments (1 for a single FFT)
    pub segments: usize,
}

impl Spectrum {
    /// Wrap externally supplied magnitude/frequency arrays.
    ///
    /// The arrays must be non-empty and of equal length.
    pub fn new(magnitudes: Vec<f64>, frequencies: Vec<f64>) -> Result<Self> {
        if magnitudes.len() != frequencies.len() {
            return Err(SignalError::LengthMismatch {
                left: magnitudes.len(),
                right: frequencies.len(),
            });
        }
        if magnitudes.is_empty() {
            return Err(SignalError::EmptyInput("spectrum"));
        }
        let fft_size = magnitudes.len() * 2;
        Ok(Self {
            magnitudes,
            frequencies,
            bins: None,
            fft_size,
            segments: 1,
        })
    }

    /// Attach complex bins (must match the magnitude count)
    pub fn with_bins(mut self, bins: Vec<Complex64>) -> Result<Self> {
        if bins.len() != self.magnitudes.len() {
            return Err(SignalError::LengthMismatch {
                left: self.magnitudes.len(),
                right: bins.len(),
            });
        }
        self.bins = Some(bins);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Frequency spacing between adjacent bins (0 for a single bin)
    pub fn bin_width(&self) -> f64 {
        match self.frequencies.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// Root-mean-square of the magnitudes
    pub fn rms(&self) -> f64 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.magnitudes.iter().map(|m| m * m).sum();
        (sum_sq / self.magnitudes.len() as f64).sqrt()
    }

    /// Largest magnitude including DC
    pub fn max_magnitude(&self) -> f64 {
        self.magnitudes.iter().copied().fold(0.0, f64::max)
    }

    /// Index of the bin whose frequency is closest to `target`.
    ///
    /// Linear scan; ties keep the first bin found.
    pub fn closest_bin(&self, target: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &f) in self.frequencies.iter().enumerate() {
            let distance = (f - target).abs();
            match best {
                Some((_, d)) if distance >= d => {}
                _ => best = Some((i, distance)),
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Spectral peak
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub frequency: f64,
    pub magnitude: f64,
}

/// Compute the spectrum with the radix-2 engine and default segmentation
pub fn compute_spectrum(
    samples: &[f64],
    sample_rate: f64,
    window: WindowKind,
    overlap_percent: f64,
) -> Result<Spectrum> {
    let config = SpectrumConfig {
        window,
        overlap_percent,
        ..SpectrumConfig::default()
    };
    compute_spectrum_with(&Radix2, samples, sample_rate, &config)
}

/// Compute the one-sided spectrum of `samples`.
///
/// Signals longer than `overlap_min_len` with a non-zero overlap are averaged
/// over segments of `segment_size`; everything else is windowed, padded to a
/// power of two and transformed once. Bin `i` sits at `i · sample_rate / N`.
pub fn compute_spectrum_with(
    backend: &dyn FftBackend,
    samples: &[f64],
    sample_rate: f64,
    config: &SpectrumConfig,
) -> Result<Spectrum> {
    if samples.is_empty() {
        return Err(SignalError::EmptyInput("signal"));
    }
    if !(sample_rate > 0.0) || !sample_rate.is_finite() {
        return Err(SignalError::invalid(format!("invalid sample rate {sample_rate}")));
    }

    if config.overlap_percent > 0.0 && !config.uses_segments(samples.len()) {
        warn!(
            len = samples.len(),
            min_len = config.overlap_min_len,
            "Signal too short for segment averaging, using a single FFT"
        );
    }

    let (magnitudes, bins, fft_size, segments) = if config.uses_segments(samples.len()) {
        let estimate = segmented_average(
            backend,
            samples,
            config.segment_size,
            config.overlap_percent,
            config.window,
        )?;
        (estimate.magnitudes, None, estimate.fft_size, estimate.segments)
    } else {
        let windowed = apply_window(samples, config.window)?;
        let padded = pad_to_power_of_two(&windowed);
        let fft_size = padded.len();
        let mut buffer: Vec<Complex64> = padded.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        backend.forward(&mut buffer)?;
        let half = fft_size / 2;
        buffer.truncate(half);
        let magnitudes = buffer.iter().map(|c| c.norm() / half as f64).collect();
        (magnitudes, Some(buffer), fft_size, 1)
    };

    let frequencies = (0..magnitudes.len())
        .map(|i| i as f64 * sample_rate / fft_size as f64)
        .collect();

    debug!(
        samples = samples.len(),
        fft_size,
        segments,
        window = %config.window,
        "Computed spectrum"
    );

    Ok(Spectrum {
        magnitudes,
        frequencies,
        bins,
        fft_size,
        segments,
    })
}

/// Maximum-magnitude bin ignoring DC (index 0); ties keep the lowest frequency
pub fn find_peak(spectrum: &Spectrum) -> Result<Peak> {
    let mut best: Option<usize> = None;
    for i in 1..spectrum.magnitudes.len() {
        match best {
            Some(b) if spectrum.magnitudes[i] <= spectrum.magnitudes[b] => {}
            _ => best = Some(i),
        }
    }
    let index = best.ok_or_else(|| SignalError::invalid("spectrum has no bins above DC"))?;
    Ok(Peak {
        frequency: spectrum.frequencies[index],
        magnitude: spectrum.magnitudes[index],
    })
}

/// Up to `count` local maxima (excluding DC), strongest first
pub fn find_dominant_peaks(spectrum: &Spectrum, count: usize) -> Vec<Peak> {
    let m = &spectrum.magnitudes;
    if m.len() < 3 {
        return Vec::new();
    }
    let mut peaks: Vec<Peak> = (1..m.len() - 1)
        .filter(|&i| m[i] > m[i - 1] && m[i] > m[i + 1])
        .map(|i| Peak {
            frequency: spectrum.frequencies[i],
            magnitude: m[i],
        })
        .collect();
    peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
    peaks.truncate(count);
    peaks
}
