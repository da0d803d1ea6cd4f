//! Diagnostic Analysis Engine
//!
//! Turns a magnitude spectrum and shaft speed into a [`DiagnosticBundle`]:
//! harmonics of the running speed, bearing defect frequencies, fault flags,
//! an additive severity score, modulation sidebands and harmonic phase.
//! Also hosts the stand-alone machinery calculators (gear mesh, belt pass,
//! resonance, ISO 10816 severity).

mod bearing;
mod config;
mod engine;
mod error;
mod faults;
mod harmonics;
pub mod machinery;
mod phase;
mod sidebands;

pub use bearing::{
    detect_bearing_defects, BearingDefect, BearingDefectKind, BearingFrequencySet,
    BearingGeometry,
};
pub use config::DiagnosticConfig;
pub use engine::{diagnose, DiagnosticBundle, DiagnosticEngine};
pub use error::{DiagnosticError, Result};
pub use faults::{recommendations, FaultDetectionResult, SeverityLevel};
pub use harmonics::{detect_harmonics, HarmonicRecord};
pub use phase::{analyze_phase, PhaseRecord};
pub use sidebands::{analyze_sidebands, ModulationSeverity, SidebandRecord};
