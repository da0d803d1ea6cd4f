//! Diagnostic Engine Implementation

use serde::{Deserialize, Serialize};
use spectrum::{Peak, SignalError, Spectrum};
use tracing::{debug, info};

use crate::bearing::{detect_bearing_defects, BearingFrequencySet};
use crate::config::DiagnosticConfig;
use crate::error::Result;
use crate::faults::{recommendations, FaultDetectionResult, SeverityLevel};
use crate::harmonics::{detect_harmonics, HarmonicRecord};
use crate::phase::{analyze_phase, PhaseRecord};
use crate::sidebands::{analyze_sidebands, SidebandRecord};

/// Everything the rule engine concluded for one spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticBundle {
    pub rpm: f64,
    /// rpm / 60
    pub rotation_frequency: f64,
    pub peak: Peak,
    pub harmonics: Vec<HarmonicRecord>,
    pub bearing_frequencies: BearingFrequencySet,
    pub faults: FaultDetectionResult,
    pub severity_score: u32,
    pub severity: SeverityLevel,
    pub sidebands: Vec<SidebandRecord>,
    pub phases: Vec<PhaseRecord>,
    pub recommendations: Vec<String>,
}

impl DiagnosticBundle {
    /// Detected harmonic of the given order, if any
    pub fn harmonic(&self, order: u32) -> Option<&HarmonicRecord> {
        self.harmonics.iter().find(|h| h.order == order)
    }
}

/// Rule engine holding its thresholds
pub struct DiagnosticEngine {
    config: DiagnosticConfig,
}

impl DiagnosticEngine {
    /// Create a new diagnostic engine
    pub fn new(config: DiagnosticConfig) -> Self {
        info!("Creating diagnostic engine with config: {:?}", config);
        Self { config }
    }

    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }

    pub fn diagnose(&self, spectrum: &Spectrum, rpm: f64, peak: Peak) -> Result<DiagnosticBundle> {
        diagnose(spectrum, rpm, peak, &self.config)
    }
}

impl Default for DiagnosticEngine {
    fn default() -> Self {
        Self::new(DiagnosticConfig::default())
    }
}

fn validate(spectrum: &Spectrum, rpm: f64) -> Result<()> {
    if !(rpm > 0.0) || !rpm.is_finite() {
        return Err(SignalError::invalid(format!("rpm must be positive, got {rpm}")).into());
    }
    if spectrum.is_empty() {
        return Err(SignalError::EmptyInput("spectrum").into());
    }
    if spectrum.magnitudes.len() != spectrum.frequencies.len() {
        return Err(SignalError::LengthMismatch {
            left: spectrum.magnitudes.len(),
            right: spectrum.frequencies.len(),
        }
        .into());
    }
    if spectrum.magnitudes.iter().any(|m| !m.is_finite() || *m < 0.0) {
        return Err(SignalError::invalid("magnitudes must be finite and non-negative").into());
    }
    Ok(())
}

/// Magnitude of the bin closest to `target` if it lies within `window` Hz
fn magnitude_near(spectrum: &Spectrum, target: f64, window: f64) -> Option<f64> {
    let bin = spectrum.closest_bin(target)?;
    ((spectrum.frequencies[bin] - target).abs() <= window).then(|| spectrum.magnitudes[bin])
}

/// Run the full rule set against `spectrum` at shaft speed `rpm`.
///
/// Thresholds scale with the largest magnitude in the spectrum. Fails with
/// `InvalidInput` for a non-positive rpm instead of reporting harmonics at 0 Hz.
pub fn diagnose(
    spectrum: &Spectrum,
    rpm: f64,
    peak: Peak,
    config: &DiagnosticConfig,
) -> Result<DiagnosticBundle> {
    validate(spectrum, rpm)?;

    let rotation_frequency = rpm / 60.0;
    let max_magnitude = spectrum.max_magnitude();

    let harmonics = detect_harmonics(
        spectrum,
        rotation_frequency,
        config.max_harmonic_order,
        config.harmonic_tolerance,
        max_magnitude * config.harmonic_floor_ratio,
    );
    let magnitude_of = |order: u32| {
        harmonics
            .iter()
            .find(|h| h.order == order)
            .map(|h| h.magnitude)
    };

    let threshold = max_magnitude * config.unbalance_ratio;
    let unbalance = magnitude_of(1).is_some_and(|m| m > threshold);
    let misalignment = magnitude_of(2).is_some_and(|m| m > threshold * config.misalignment_2x)
        || magnitude_of(3).is_some_and(|m| m > threshold * config.misalignment_3x);
    let strong_high_orders = harmonics
        .iter()
        .filter(|h| h.order >= 3 && h.magnitude > threshold * config.looseness_ratio)
        .count();
    let looseness = harmonics.len() >= config.looseness_min_harmonics && strong_high_orders >= 3;

    let bearing_frequencies =
        BearingFrequencySet::compute(rotation_frequency, config.bearing.as_ref())?;
    let bearing_threshold = max_magnitude * config.bearing_ratio;
    let bearing_defects = detect_bearing_defects(spectrum, &bearing_frequencies, bearing_threshold);

    let window = (rotation_frequency * config.harmonic_tolerance).max(spectrum.bin_width());
    let gear_problems = config.gear_teeth.is_some_and(|teeth| {
        magnitude_near(spectrum, rotation_frequency * teeth as f64, window)
            .is_some_and(|m| m > bearing_threshold)
    });
    let belt_problems = config.belt_pass_frequency.is_some_and(|freq| {
        magnitude_near(spectrum, freq, window).is_some_and(|m| m > bearing_threshold)
    });

    let faults = FaultDetectionResult {
        unbalance,
        misalignment,
        looseness,
        bearing_defects,
        gear_problems,
        belt_problems,
    };
    let severity_score = faults.severity_score();
    let severity = SeverityLevel::from_score(severity_score);

    let sidebands = analyze_sidebands(spectrum, rotation_frequency, config.sideband_orders);
    let phases = analyze_phase(spectrum, &harmonics, config.phase_orders);

    debug!(
        rpm,
        harmonics = harmonics.len(),
        bearing_defects = faults.bearing_defects.len(),
        sidebands = sidebands.len(),
        severity_score,
        "Diagnosis complete"
    );

    Ok(DiagnosticBundle {
        rpm,
        rotation_frequency,
        peak,
        recommendations: recommendations(&faults),
        harmonics,
        bearing_frequencies,
        faults,
        severity_score,
        severity,
        sidebands,
        phases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bearing::{BearingDefectKind, BearingGeometry};
    use crate::error::DiagnosticError;
    use spectrum::{compute_spectrum, find_peak, WindowKind};

    /// 1 Hz bins up to 511 Hz, near-zero floor, given lines
    fn synthetic(lines: &[(usize, f64)]) -> Spectrum {
        let mut magnitudes = vec![0.001; 512];
        for &(i, m) in lines {
            magnitudes[i] = m;
        }
        Spectrum::new(magnitudes, (0..512).map(|i| i as f64).collect()).unwrap()
    }

    #[test]
    fn test_three_harmonics_and_unbalance() {
        let spectrum = synthetic(&[(30, 1.0), (60, 0.25), (90, 0.1)]);
        let peak = find_peak(&spectrum).unwrap();
        let bundle = diagnose(&spectrum, 1800.0, peak, &DiagnosticConfig::default()).unwrap();

        assert_eq!(bundle.rotation_frequency, 30.0);
        let orders: Vec<u32> = bundle.harmonics.iter().map(|h| h.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert!(bundle.faults.unbalance);
        // 2X 0.25 > 0.3·0.6 = 0.18
        assert!(bundle.faults.misalignment);
        assert!(!bundle.faults.looseness);
        assert!(bundle.faults.bearing_defects.is_empty());
        assert_eq!(bundle.severity_score, 5);
        assert_eq!(bundle.severity, SeverityLevel::Alert);
        assert_eq!(bundle.peak.frequency, 30.0);
    }

    #[test]
    fn test_unbalance_only() {
        let spectrum = synthetic(&[(30, 1.0)]);
        let peak = find_peak(&spectrum).unwrap();
        let bundle = diagnose(&spectrum, 1800.0, peak, &DiagnosticConfig::default()).unwrap();
        assert!(bundle.faults.unbalance);
        assert!(!bundle.faults.misalignment);
        assert_eq!(bundle.severity, SeverityLevel::Attention);
        assert_eq!(bundle.recommendations.len(), 1);
    }

    #[test]
    fn test_misalignment_from_3x_alone() {
        // threshold = 0.3, 3X 0.15 > 0.12, 2X absent
        let spectrum = synthetic(&[(200, 1.0), (30, 0.05), (90, 0.15)]);
        let peak = find_peak(&spectrum).unwrap();
        let bundle = diagnose(&spectrum, 1800.0, peak, &DiagnosticConfig::default()).unwrap();
        assert!(!bundle.faults.unbalance);
        assert!(bundle.faults.misalignment);
    }

    #[test]
    fn test_looseness_needs_many_harmonics() {
        let lines: Vec<(usize, f64)> = (1..=6).map(|k| (k * 20, 1.0 / k as f64)).collect();
        let spectrum = synthetic(&lines);
        let peak = find_peak(&spectrum).unwrap();
        let bundle = diagnose(&spectrum, 1200.0, peak, &DiagnosticConfig::default()).unwrap();
        assert!(bundle.harmonics.len() >= 5);
        assert!(bundle.faults.looseness);
        assert!(bundle.severity >= SeverityLevel::Alert);
    }

    #[test]
    fn test_harmonic_floor_decides_looseness() {
        // 3X to 5X clear the 0.06 looseness level but only four orders clear the floor
        let spectrum = synthetic(&[(30, 1.0), (90, 0.1), (120, 0.1), (150, 0.1)]);
        let peak = find_peak(&spectrum).unwrap();

        let filtered = diagnose(&spectrum, 1800.0, peak, &DiagnosticConfig::default()).unwrap();
        assert_eq!(filtered.harmonics.len(), 4);
        assert!(!filtered.faults.looseness);

        // Without a floor every non-zero bin on the order grid counts
        let config = DiagnosticConfig {
            harmonic_floor_ratio: 0.0,
            ..DiagnosticConfig::default()
        };
        let unfiltered = diagnose(&spectrum, 1800.0, peak, &config).unwrap();
        assert_eq!(unfiltered.harmonics.len(), 10);
        assert!(unfiltered.faults.looseness);
    }

    #[test]
    fn test_bearing_defect_with_geometry() {
        let geometry = BearingGeometry::default();
        let set = BearingFrequencySet::from_geometry(30.0, &geometry).unwrap();
        let bpfi_bin = set.bpfi.round() as usize;
        let spectrum = synthetic(&[(30, 1.0), (bpfi_bin, 0.5)]);
        let peak = find_peak(&spectrum).unwrap();
        let config = DiagnosticConfig::default().with_bearing(geometry);
        let bundle = diagnose(&spectrum, 1800.0, peak, &config).unwrap();
        assert_eq!(bundle.faults.bearing_defects.len(), 1);
        assert_eq!(bundle.faults.bearing_defects[0].kind, BearingDefectKind::InnerRace);
        assert_eq!(bundle.severity_score, 7);
        assert!(bundle.recommendations[0].contains("BPFI"));
    }

    #[test]
    fn test_gear_and_belt_flags() {
        let spectrum = synthetic(&[(30, 1.0), (300, 0.6), (47, 0.4)]);
        let peak = find_peak(&spectrum).unwrap();

        let plain = diagnose(&spectrum, 1800.0, peak, &DiagnosticConfig::default()).unwrap();
        assert!(!plain.faults.gear_problems && !plain.faults.belt_problems);

        let config = DiagnosticConfig {
            gear_teeth: Some(10),
            belt_pass_frequency: Some(47.0),
            ..DiagnosticConfig::default()
        };
        let bundle = diagnose(&spectrum, 1800.0, peak, &config).unwrap();
        assert!(bundle.faults.gear_problems);
        assert!(bundle.faults.belt_problems);
        assert_eq!(bundle.severity_score, plain.severity_score);
    }

    #[test]
    fn test_invalid_rpm() {
        let spectrum = synthetic(&[(30, 1.0)]);
        let peak = find_peak(&spectrum).unwrap();
        for rpm in [0.0, -1800.0, f64::NAN] {
            assert!(matches!(
                diagnose(&spectrum, rpm, peak, &DiagnosticConfig::default()),
                Err(DiagnosticError::Signal(SignalError::InvalidInput(_)))
            ));
        }
    }

    #[test]
    fn test_flat_spectrum_reference_case() {
        let mut magnitudes = vec![0.1; 100];
        magnitudes[3] = 0.8;
        let spectrum =
            Spectrum::new(magnitudes, (0..100).map(|i| i as f64 * 10.0).collect()).unwrap();
        let peak = find_peak(&spectrum).unwrap();
        let bundle = diagnose(&spectrum, 1800.0, peak, &DiagnosticConfig::default()).unwrap();
        assert!(bundle.faults.unbalance);
    }

    #[test]
    fn test_phase_from_computed_spectrum() {
        let sr = 1024.0;
        let signal: Vec<f64> = (0..1024)
            .map(|i| {
                let t = i as f64 / sr;
                (2.0 * std::f64::consts::PI * 32.0 * t).sin()
                    + 0.5 * (2.0 * std::f64::consts::PI * 64.0 * t).cos()
            })
            .collect();
        let spectrum = compute_spectrum(&signal, sr, WindowKind::None, 0.0).unwrap();
        let peak = find_peak(&spectrum).unwrap();
        let bundle = diagnose(&spectrum, 1920.0, peak, &DiagnosticConfig::default()).unwrap();
        assert_eq!(bundle.phases.len(), 2);
        assert!((bundle.phases[0].phase_deg + 90.0).abs() < 1e-6);
        assert!(bundle.phases[1].phase_deg.abs() < 1e-6);
    }

    #[test]
    fn test_bundle_serializes() {
        let spectrum = synthetic(&[(30, 1.0)]);
        let peak = find_peak(&spectrum).unwrap();
        let bundle = DiagnosticEngine::default().diagnose(&spectrum, 1800.0, peak).unwrap();
        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains("\"severity\":\"Attention\""));
        let back: DiagnosticBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bundle);
    }
}
