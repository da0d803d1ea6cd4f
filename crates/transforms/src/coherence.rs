//! Two-channel coherence and transfer function

use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use spectrum::{apply_window, fft, pad_to_power_of_two, SignalError, WindowKind};
use tracing::debug;

use crate::error::Result;

/// Bins above this coherence count towards the quality ratio
const HIGH_COHERENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoherenceAssessment {
    Good,
    Moderate,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceQuality {
    pub mean: f64,
    /// Fraction of bins with coherence above 0.8
    pub quality_ratio: f64,
    pub assessment: CoherenceAssessment,
}

impl CoherenceQuality {
    fn from_coherence(coherence: &[f64]) -> Self {
        let n = coherence.len().max(1) as f64;
        let mean = coherence.iter().sum::<f64>() / n;
        let quality_ratio = coherence.iter().filter(|&&c| c > HIGH_COHERENCE).count() as f64 / n;
        let assessment = if quality_ratio > 0.5 {
            CoherenceAssessment::Good
        } else if quality_ratio > 0.2 {
            CoherenceAssessment::Moderate
        } else {
            CoherenceAssessment::Low
        };
        Self {
            mean,
            quality_ratio,
            assessment,
        }
    }
}

/// One-sided (N/2 bins) coherence, transfer function and cross-spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceResult {
    /// |Sxy|² / (Sxx·Syy) in [0, 1]; 0 where either auto-spectrum vanishes
    pub coherence: Vec<f64>,
    /// Sxy / Sxx; 0 where Sxx vanishes
    pub transfer_function: Vec<Complex64>,
    /// X·conj(Y)
    pub cross_spectrum: Vec<Complex64>,
    pub quality: CoherenceQuality,
    /// Segments averaged (1 for the single-shot estimate)
    pub segments: usize,
}

/// Averaged auto- and cross-spectra
struct SpectralDensities {
    sxx: Vec<f64>,
    syy: Vec<f64>,
    sxy: Vec<Complex64>,
}

impl SpectralDensities {
    fn from_pair(a: &[f64], b: &[f64]) -> Result<Self> {
        let x = fft(&pad_to_power_of_two(a))?;
        let y = fft(&pad_to_power_of_two(b))?;
        let bins = (x.len() / 2).max(1);
        Ok(Self {
            sxx: x[..bins].iter().map(|v| v.norm_sqr()).collect(),
            syy: y[..bins].iter().map(|v| v.norm_sqr()).collect(),
            sxy: x[..bins]
                .iter()
                .zip(&y[..bins])
                .map(|(xv, yv)| xv * yv.conj())
                .collect(),
        })
    }

    fn into_result(self, segments: usize) -> CoherenceResult {
        let coherence: Vec<f64> = self
            .sxy
            .iter()
            .zip(self.sxx.iter().zip(&self.syy))
            .map(|(cross, (&sxx, &syy))| {
                let denominator = sxx * syy;
                if denominator == 0.0 {
                    0.0
                } else {
                    (cross.norm_sqr() / denominator).clamp(0.0, 1.0)
                }
            })
            .collect();
        let transfer_function = self
            .sxy
            .iter()
            .zip(&self.sxx)
            .map(|(cross, &sxx)| {
                if sxx == 0.0 {
                    Complex64::new(0.0, 0.0)
                } else {
                    cross / sxx
                }
            })
            .collect();
        let quality = CoherenceQuality::from_coherence(&coherence);

        CoherenceResult {
            coherence,
            transfer_function,
            cross_spectrum: self.sxy,
            quality,
            segments,
        }
    }
}

fn check_pair(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(SignalError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        }
        .into());
    }
    if a.is_empty() {
        return Err(SignalError::EmptyInput("coherence").into());
    }
    Ok(())
}

/// Single-shot estimate over the whole record.
///
/// With one segment the coherence is 1 wherever both channels carry energy;
/// use [`compute_coherence_averaged`] for a meaningful linearity measure.
pub fn compute_coherence(a: &[f64], b: &[f64]) -> Result<CoherenceResult> {
    check_pair(a, b)?;
    let densities = SpectralDensities::from_pair(a, b)?;
    debug!("Coherence: {} samples, {} bins", a.len(), densities.sxx.len());
    Ok(densities.into_result(1))
}

/// Welch-style estimate: Hanning-windowed segments, spectra averaged before
/// the coherence ratio is taken.
pub fn compute_coherence_averaged(
    a: &[f64],
    b: &[f64],
    segment_size: usize,
    overlap_percent: f64,
) -> Result<CoherenceResult> {
    check_pair(a, b)?;
    if segment_size < 2 {
        return Err(SignalError::invalid(format!(
            "segment size must be at least 2, got {segment_size}"
        ))
        .into());
    }
    if !(0.0..100.0).contains(&overlap_percent) {
        return Err(SignalError::invalid(format!(
            "overlap must be in [0, 100), got {overlap_percent}"
        ))
        .into());
    }

    let size = segment_size.min(a.len());
    let hop = ((size as f64 * (1.0 - overlap_percent / 100.0)) as usize).max(1);
    let offsets: Vec<usize> = (0..=a.len() - size).step_by(hop).collect();

    let per_segment: Vec<SpectralDensities> = offsets
        .par_iter()
        .map(|&start| {
            let x = windowed(&a[start..start + size])?;
            let y = windowed(&b[start..start + size])?;
            SpectralDensities::from_pair(&x, &y)
        })
        .collect::<Result<_>>()?;

    let count = per_segment.len();
    let mut iter = per_segment.into_iter();
    let Some(mut total) = iter.next() else {
        return Err(SignalError::EmptyInput("coherence segments").into());
    };
    for segment in iter {
        for (acc, v) in total.sxx.iter_mut().zip(&segment.sxx) {
            *acc += v;
        }
        for (acc, v) in total.syy.iter_mut().zip(&segment.syy) {
            *acc += v;
        }
        for (acc, v) in total.sxy.iter_mut().zip(&segment.sxy) {
            *acc += v;
        }
    }
    let scale = 1.0 / count as f64;
    total.sxx.iter_mut().for_each(|v| *v *= scale);
    total.syy.iter_mut().for_each(|v| *v *= scale);
    total.sxy.iter_mut().for_each(|v| *v *= scale);

    debug!(
        segments = count,
        segment_size = size,
        hop,
        "Averaged coherence estimate"
    );
    Ok(total.into_result(count))
}

fn windowed(segment: &[f64]) -> Result<Vec<f64>> {
    Ok(apply_window(segment, WindowKind::Hanning)?)
}
