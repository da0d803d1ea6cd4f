//! Analytic signal construction.
//!
//! Two realisations of the Hilbert transform are provided:
//!
//! - [`HilbertMethod::Direct`] evaluates the discrete kernel
//!   `im[n] = -(1/π)·Σ_{m≠n} x[m]/(n-m)` in O(N²). Fine for a few hundred
//!   samples and needs no padding.
//! - [`HilbertMethod::Fft`] zeroes the negative-frequency bins and doubles the
//!   positive ones before the inverse transform, O(N log N). The signal is
//!   zero-padded to a power of two and the result truncated back.
//!
//! The envelope `|x + i·H(x)|` is the same under either sign convention.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use spectrum::{fft_complex, ifft, pad_to_power_of_two, SignalError};
use std::f64::consts::PI;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HilbertMethod {
    /// O(N²) direct kernel
    Direct,
    /// O(N log N) spectral method
    #[default]
    Fft,
}

/// Analytic signal `x + i·H(x)`, same length as `signal`
pub fn analytic_signal(signal: &[f64], method: HilbertMethod) -> Result<Vec<Complex64>> {
    if signal.is_empty() {
        return Err(SignalError::EmptyInput("hilbert transform").into());
    }
    match method {
        HilbertMethod::Direct => Ok(direct(signal)),
        HilbertMethod::Fft => spectral(signal),
    }
}

fn direct(signal: &[f64]) -> Vec<Complex64> {
    let n = signal.len();
    (0..n)
        .map(|i| {
            let sum: f64 = (0..n)
                .filter(|&m| m != i)
                .map(|m| signal[m] / (i as f64 - m as f64))
                .sum();
            Complex64::new(signal[i], -sum / PI)
        })
        .collect()
}

fn spectral(signal: &[f64]) -> Result<Vec<Complex64>> {
    let padded = pad_to_power_of_two(signal);
    let n = padded.len();
    let buffer: Vec<Complex64> = padded.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    let mut spectrum = fft_complex(&buffer)?;

    // h = [1, 2, .., 2, 1 (Nyquist), 0, .., 0]
    let half = n / 2;
    for (k, bin) in spectrum.iter_mut().enumerate() {
        let gain = if k == 0 || (n > 1 && k == half) {
            1.0
        } else if k < half {
            2.0
        } else {
            0.0
        };
        *bin *= gain;
    }

    let mut analytic = ifft(&spectrum)?;
    analytic.truncate(signal.len());
    // The real part is the input itself; restore it exactly.
    for (value, &x) in analytic.iter_mut().zip(signal) {
        value.re = x;
    }
    Ok(analytic)
}
