//! Radix-2 Cooley-Tukey FFT
//!
//! Iterative decimation-in-time transform over power-of-two lengths. The
//! engine does not pad: callers pass lengths that are already powers of two
//! (see [`crate::pad_to_power_of_two`]) and anything else is rejected with
//! [`SignalError::InvalidInput`]. Output length always equals input length.

use num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;
use std::sync::Mutex;
use tracing::trace;

use crate::error::{Result, SignalError};

/// Strategy for computing forward/inverse transforms in place.
///
/// `inverse` includes the `1/N` scale so `inverse(forward(x)) == x`.
pub trait FftBackend: Send + Sync {
    /// Forward transform (`e^{-2πi·kn/N}` kernel)
    fn forward(&self, buffer: &mut [Complex64]) -> Result<()>;

    /// Inverse transform, scaled by `1/N`
    fn inverse(&self, buffer: &mut [Complex64]) -> Result<()>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// The in-crate radix-2 engine
#[derive(Debug, Clone, Copy, Default)]
pub struct Radix2;

impl FftBackend for Radix2 {
    fn forward(&self, buffer: &mut [Complex64]) -> Result<()> {
        check_length(buffer.len())?;
        butterflies(buffer, -1.0);
        Ok(())
    }

    fn inverse(&self, buffer: &mut [Complex64]) -> Result<()> {
        check_length(buffer.len())?;
        butterflies(buffer, 1.0);
        let scale = 1.0 / buffer.len() as f64;
        for value in buffer.iter_mut() {
            *value *= scale;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "radix2"
    }
}

/// Planner-backed transform using `rustfft`.
///
/// Accepts any non-zero length; used as a reference implementation and for
/// callers that do not want power-of-two padding.
pub struct RustFftBackend {
    planner: Mutex<FftPlanner<f64>>,
}

impl RustFftBackend {
    /// Create a backend with an empty plan cache
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
        }
    }
}

impl Default for RustFftBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FftBackend for RustFftBackend {
    fn forward(&self, buffer: &mut [Complex64]) -> Result<()> {
        if buffer.is_empty() {
            return Err(SignalError::invalid("FFT length must be at least 1"));
        }
        let fft = {
            let mut planner = self.planner.lock().unwrap_or_else(|e| e.into_inner());
            planner.plan_fft_forward(buffer.len())
        };
        fft.process(buffer);
        Ok(())
    }

    fn inverse(&self, buffer: &mut [Complex64]) -> Result<()> {
        if buffer.is_empty() {
            return Err(SignalError::invalid("FFT length must be at least 1"));
        }
        let fft = {
            let mut planner = self.planner.lock().unwrap_or_else(|e| e.into_inner());
            planner.plan_fft_inverse(buffer.len())
        };
        fft.process(buffer);
        let scale = 1.0 / buffer.len() as f64;
        for value in buffer.iter_mut() {
            *value *= scale;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rustfft"
    }
}

/// Forward FFT of a real sequence whose length is a power of two.
///
/// A single sample returns itself with a zero imaginary part.
pub fn fft(samples: &[f64]) -> Result<Vec<Complex64>> {
    let mut buffer: Vec<Complex64> = samples.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    Radix2.forward(&mut buffer)?;
    Ok(buffer)
}

/// Forward FFT of a complex sequence whose length is a power of two
pub fn fft_complex(input: &[Complex64]) -> Result<Vec<Complex64>> {
    let mut buffer = input.to_vec();
    Radix2.forward(&mut buffer)?;
    Ok(buffer)
}

/// Inverse FFT (scaled by `1/N`) of a power-of-two length spectrum
pub fn ifft(spectrum: &[Complex64]) -> Result<Vec<Complex64>> {
    let mut buffer = spectrum.to_vec();
    Radix2.inverse(&mut buffer)?;
    Ok(buffer)
}

fn check_length(n: usize) -> Result<()> {
    if n == 0 {
        return Err(SignalError::invalid("FFT length must be at least 1"));
    }
    if !n.is_power_of_two() {
        return Err(SignalError::invalid(format!(
            "FFT length {n} is not a power of two; pad the signal first"
        )));
    }
    Ok(())
}

/// Reverse the lowest `bits` bits of `value`
fn reverse_bits(value: usize, bits: u32) -> usize {
    if bits == 0 {
        return 0;
    }
    value.reverse_bits() >> (usize::BITS - bits)
}

/// In-place DIT butterflies. `sign` is -1 for forward, +1 for inverse.
fn butterflies(buffer: &mut [Complex64], sign: f64) {
    let n = buffer.len();
    if n < 2 {
        return;
    }

    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = reverse_bits(i, bits);
        if j > i {
            buffer.swap(i, j);
        }
    }

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let step = sign * 2.0 * PI / size as f64;
        for start in (0..n).step_by(size) {
            for offset in 0..half {
                // Twiddle computed directly per index; accumulating the angle
                // drifts noticeably for N >= 4096.
                let twiddle = Complex64::from_polar(1.0, step * offset as f64);
                let j = start + offset;
                let k = j + half;
                let t = buffer[k] * twiddle;
                buffer[k] = buffer[j] - t;
                buffer[j] += t;
            }
        }
        size *= 2;
    }

    trace!(n, "radix-2 transform complete");
}
