//! Spectrum Engine
//!
//! Radix-2 FFT/IFFT, window functions, zero padding, first-order filters and
//! magnitude spectra (single-shot or Welch-averaged) for vibration signals.
//!
//! Every function here is pure: inputs are borrowed, outputs are freshly
//! allocated, and degenerate inputs come back as [`SignalError`] values
//! instead of NaN.

mod conditioning;
mod error;
mod fft;
mod spectrum;
mod welch;
mod window;

pub use conditioning::{band_pass, dc_blocker, high_pass, low_pass, pad_to_power_of_two};
pub use error::{Result, SignalError};
pub use fft::{fft, fft_complex, ifft, FftBackend, Radix2, RustFftBackend};
pub use num_complex::Complex64 as ComplexValue;
pub use spectrum::{
    compute_spectrum, compute_spectrum_with, find_dominant_peaks, find_peak, Peak, Spectrum,
    SpectrumConfig,
};
pub use welch::{segmented_average, WelchEstimate};
pub use window::{apply_window, bessel_i0, WindowKind, KAISER_BETA};
