//! Derived Spectral Transforms
//!
//! Cepstrum and periodicity detection, Hilbert envelope demodulation,
//! two-channel coherence / transfer function, and orbit shape analysis.

mod cepstrum;
mod coherence;
mod envelope;
mod error;
mod hilbert;
mod orbit;

pub use cepstrum::{
    compute_cepstrum, CepstrumResult, Periodicity, PeriodicityKind, Rahmonic, RahmonicBand,
};
pub use coherence::{
    compute_coherence, compute_coherence_averaged, CoherenceAssessment, CoherenceQuality,
    CoherenceResult,
};
pub use envelope::{compute_envelope, EnvelopeResult, ModulationPeak};
pub use error::{Result, TransformError};
pub use hilbert::{analytic_signal, HilbertMethod};
pub use orbit::{
    analyze_orbit, OrbitCondition, OrbitDiagnosis, OrbitDimensions, OrbitHarmonics, OrbitResult,
    RotationDirection, Stability, StabilityClass, MIN_ORBIT_SAMPLES,
};
