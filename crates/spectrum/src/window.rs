//! Window Functions
//!
//! Tapers applied before the FFT to reduce spectral leakage.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SignalError};

/// Shape parameter of the Kaiser window
pub const KAISER_BETA: f64 = 8.6;

/// Number of power-series terms used for the Bessel I0 approximation
const BESSEL_TERMS: usize = 10;

/// Window function kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Rectangular (no taper)
    None,
    /// Hamming: 0.54 - 0.46·cos(2πi/(n-1))
    Hamming,
    /// Hann: 0.5·(1 - cos(2πi/(n-1)))
    #[default]
    Hanning,
    /// Three-term Blackman
    Blackman,
    /// Kaiser with β = 8.6
    Kaiser,
}

impl WindowKind {
    /// Coefficient for sample `i` of a window of length `n` (`n >= 2`)
    fn coefficient(self, i: usize, n: usize) -> f64 {
        let denom = (n - 1) as f64;
        let x = i as f64;
        match self {
            WindowKind::None => 1.0,
            WindowKind::Hamming => 0.54 - 0.46 * (2.0 * PI * x / denom).cos(),
            WindowKind::Hanning => 0.5 * (1.0 - (2.0 * PI * x / denom).cos()),
            WindowKind::Blackman => {
                0.42 - 0.5 * (2.0 * PI * x / denom).cos() + 0.08 * (4.0 * PI * x / denom).cos()
            }
            WindowKind::Kaiser => {
                let alpha = denom / 2.0;
                let ratio = (x - alpha) / alpha;
                let arg = KAISER_BETA * (1.0 - ratio * ratio).max(0.0).sqrt();
                bessel_i0(arg) / bessel_i0(KAISER_BETA)
            }
        }
    }

    /// Lowercase name, as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::None => "none",
            WindowKind::Hamming => "hamming",
            WindowKind::Hanning => "hanning",
            WindowKind::Blackman => "blackman",
            WindowKind::Kaiser => "kaiser",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowKind {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "rectangular" => Ok(WindowKind::None),
            "hamming" => Ok(WindowKind::Hamming),
            "hanning" | "hann" => Ok(WindowKind::Hanning),
            "blackman" => Ok(WindowKind::Blackman),
            "kaiser" => Ok(WindowKind::Kaiser),
            other => Err(SignalError::invalid(format!("unknown window '{other}'"))),
        }
    }
}

/// Modified Bessel function of the first kind, order 0.
///
/// Truncated power series: `term_k = term_{k-1}·(x/(2k))²`, summed from 1.
pub fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    for k in 1..=BESSEL_TERMS {
        let factor = x / (2.0 * k as f64);
        term *= factor * factor;
        sum += term;
    }
    sum
}

/// Multiply each sample by the window coefficient.
///
/// Fails with [`SignalError::InvalidInput`] when fewer than two samples are
/// given, since every taper divides by `n - 1`.
pub fn apply_window(data: &[f64], kind: WindowKind) -> Result<Vec<f64>> {
    let n = data.len();
    if n < 2 {
        return Err(SignalError::invalid(format!(
            "window needs at least 2 samples, got {n}"
        )));
    }
    Ok(data
        .iter()
        .enumerate()
        .map(|(i, &x)| x * kind.coefficient(i, n))
        .collect())
}
