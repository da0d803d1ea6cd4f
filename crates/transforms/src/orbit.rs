//! Orbit analysis of two perpendicular vibration channels

use serde::{Deserialize, Serialize};
use spectrum::SignalError;
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;

use crate::error::{Result, TransformError};

/// Shortest capture accepted for orbit analysis
pub const MIN_ORBIT_SAMPLES: usize = 100;
/// Samples used for the rotation direction estimate
const DIRECTION_SAMPLES: usize = 100;
/// Samples fed to the orbit DFT
const HARMONIC_SAMPLES: usize = 256;
const STABILITY_WINDOWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitDimensions {
    pub max_x: f64,
    pub max_y: f64,
    pub rms_x: f64,
    pub rms_y: f64,
    /// max(max_x, max_y)
    pub major_axis: f64,
    /// min(max_x, max_y)
    pub minor_axis: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// DFT magnitudes (|X[k]| / N) at bins 1, 2 and 3 per axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitHarmonics {
    pub x: [f64; 3],
    pub y: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityClass {
    VeryStable,
    Stable,
    ModeratelyUnstable,
    Unstable,
}

impl StabilityClass {
    pub fn from_index(index: f64) -> Self {
        if index < 0.05 {
            StabilityClass::VeryStable
        } else if index < 0.1 {
            StabilityClass::Stable
        } else if index < 0.2 {
            StabilityClass::ModeratelyUnstable
        } else {
            StabilityClass::Unstable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityClass::VeryStable => "very stable",
            StabilityClass::Stable => "stable",
            StabilityClass::ModeratelyUnstable => "moderately unstable",
            StabilityClass::Unstable => "unstable",
        }
    }
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amplitude stability over equal windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stability {
    /// Coefficient of variation of the windowed RMS amplitude
    pub index: f64,
    pub stable: bool,
    pub class: StabilityClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitCondition {
    Unbalance,
    Misalignment,
    Instability,
    Rub,
}

impl OrbitCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitCondition::Unbalance => "unbalance",
            OrbitCondition::Misalignment => "misalignment",
            OrbitCondition::Instability => "instability",
            OrbitCondition::Rub => "possible rub",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitDiagnosis {
    pub condition: OrbitCondition,
    pub confidence: f64,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitResult {
    pub dimensions: OrbitDimensions,
    pub direction: RotationDirection,
    /// sqrt(1 - (minor/major)²), 0 for a degenerate orbit
    pub eccentricity: f64,
    pub harmonics: OrbitHarmonics,
    pub stability: Stability,
    /// Every rule that fired; conditions are not exclusive
    pub diagnosis: Vec<OrbitDiagnosis>,
    pub data_points: usize,
}

/// Analyse the trajectory traced by channels `x` and `y`
pub fn analyze_orbit(x: &[f64], y: &[f64]) -> Result<OrbitResult> {
    if x.len() != y.len() {
        return Err(SignalError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        }
        .into());
    }
    if x.len() < MIN_ORBIT_SAMPLES {
        return Err(TransformError::InsufficientSamples {
            needed: MIN_ORBIT_SAMPLES,
            got: x.len(),
        });
    }

    let dimensions = dimensions(x, y);
    let eccentricity = if dimensions.major_axis == 0.0 {
        0.0
    } else {
        (1.0 - (dimensions.minor_axis / dimensions.major_axis).powi(2)).sqrt()
    };
    let direction = rotation_direction(x, y);
    let harmonics = OrbitHarmonics {
        x: low_order_dft(&x[..x.len().min(HARMONIC_SAMPLES)]),
        y: low_order_dft(&y[..y.len().min(HARMONIC_SAMPLES)]),
    };
    let stability = stability(x, y)?;
    let diagnosis = diagnose(&dimensions, eccentricity, &stability);

    debug!(
        points = x.len(),
        eccentricity,
        stability_index = stability.index,
        findings = diagnosis.len(),
        "Orbit analysed"
    );

    Ok(OrbitResult {
        dimensions,
        direction,
        eccentricity,
        harmonics,
        stability,
        diagnosis,
        data_points: x.len(),
    })
}

fn dimensions(x: &[f64], y: &[f64]) -> OrbitDimensions {
    let max_abs = |v: &[f64]| v.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
    let rms = |v: &[f64]| (v.iter().map(|s| s * s).sum::<f64>() / v.len() as f64).sqrt();
    let max_x = max_abs(x);
    let max_y = max_abs(y);
    OrbitDimensions {
        max_x,
        max_y,
        rms_x: rms(x),
        rms_y: rms(y),
        major_axis: max_x.max(max_y),
        minor_axis: max_x.min(max_y),
    }
}

/// Signed area swept by consecutive points; positive maps to clockwise
fn rotation_direction(x: &[f64], y: &[f64]) -> RotationDirection {
    let end = x.len().min(DIRECTION_SAMPLES);
    let cross: f64 = (1..end)
        .map(|i| {
            let dx = x[i] - x[i - 1];
            let dy = y[i] - y[i - 1];
            x[i - 1] * dy - y[i - 1] * dx
        })
        .sum();
    if cross > 0.0 {
        RotationDirection::Clockwise
    } else {
        RotationDirection::CounterClockwise
    }
}

fn low_order_dft(data: &[f64]) -> [f64; 3] {
    let n = data.len() as f64;
    let mut magnitudes = [0.0; 3];
    for (slot, k) in magnitudes.iter_mut().zip(1..=3) {
        let (mut re, mut im) = (0.0, 0.0);
        for (i, &v) in data.iter().enumerate() {
            let angle = -2.0 * PI * k as f64 * i as f64 / n;
            re += v * angle.cos();
            im += v * angle.sin();
        }
        *slot = (re * re + im * im).sqrt() / n;
    }
    magnitudes
}

fn stability(x: &[f64], y: &[f64]) -> Result<Stability> {
    let window = x.len() / STABILITY_WINDOWS;
    let amplitudes: Vec<f64> = (0..STABILITY_WINDOWS)
        .map(|w| {
            let range = w * window..(w + 1) * window;
            let energy: f64 = x[range.clone()]
                .iter()
                .chain(&y[range])
                .map(|v| v * v)
                .sum();
            (energy / window as f64).sqrt()
        })
        .collect();

    let count = amplitudes.len() as f64;
    let mean = amplitudes.iter().sum::<f64>() / count;
    if mean == 0.0 {
        return Err(SignalError::DivisionByZero("orbit stability (zero amplitude)").into());
    }
    let std = (amplitudes.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / count).sqrt();
    let index = std / mean;

    Ok(Stability {
        index,
        stable: index < 0.1,
        class: StabilityClass::from_index(index),
    })
}

fn diagnose(
    dimensions: &OrbitDimensions,
    eccentricity: f64,
    stability: &Stability,
) -> Vec<OrbitDiagnosis> {
    let mut findings = Vec::new();

    if eccentricity < 0.3 && dimensions.major_axis > 0.5 {
        findings.push(OrbitDiagnosis {
            condition: OrbitCondition::Unbalance,
            confidence: 0.8,
            evidence: "Circular orbit with significant amplitude".to_string(),
        });
    }
    if eccentricity > 0.7 {
        findings.push(OrbitDiagnosis {
            condition: OrbitCondition::Misalignment,
            confidence: 0.7,
            evidence: format!("Strongly elliptical orbit (eccentricity {eccentricity:.3})"),
        });
    }
    if !stability.stable {
        findings.push(OrbitDiagnosis {
            condition: OrbitCondition::Instability,
            confidence: 0.6,
            evidence: format!("Amplitude variation: {}", stability.class),
        });
    }
    if dimensions.major_axis > 2.0 {
        findings.push(OrbitDiagnosis {
            condition: OrbitCondition::Rub,
            confidence: 0.5,
            evidence: "Excessive amplitude detected".to_string(),
        });
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ellipse(a: f64, b: f64, period: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
        (0..n)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / period;
                (a * t.cos(), b * t.sin())
            })
            .unzip()
    }

    fn conditions(result: &OrbitResult) -> Vec<OrbitCondition> {
        result.diagnosis.iter().map(|d| d.condition).collect()
    }

    #[test]
    fn test_circular_orbit() {
        let (x, y) = ellipse(1.0, 1.0, 50.0, 500);
        let result = analyze_orbit(&x, &y).unwrap();
        assert!(result.eccentricity < 0.1);
        assert_eq!(result.direction, RotationDirection::Clockwise);
        assert_eq!(result.stability.class, StabilityClass::VeryStable);
        assert_eq!(conditions(&result), vec![OrbitCondition::Unbalance]);
        assert!((result.dimensions.rms_x - 1.0 / 2f64.sqrt()).abs() < 1e-9);
        assert_eq!(result.data_points, 500);
    }

    #[test]
    fn test_elliptical_orbit() {
        let (x, y) = ellipse(1.0, 0.1, 50.0, 500);
        let result = analyze_orbit(&x, &y).unwrap();
        assert!(result.eccentricity > 0.99);
        assert_eq!(conditions(&result), vec![OrbitCondition::Misalignment]);
    }

    #[test]
    fn test_reverse_rotation() {
        let (x, y) = ellipse(1.0, -1.0, 50.0, 200);
        let result = analyze_orbit(&x, &y).unwrap();
        assert_eq!(result.direction, RotationDirection::CounterClockwise);
    }

    #[test]
    fn test_growing_orbit_is_unstable_and_rubs() {
        let (x, y): (Vec<f64>, Vec<f64>) = (0..1000)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / 50.0;
                let gain = 0.5 + 3.0 * i as f64 / 1000.0;
                (gain * t.cos(), gain * t.sin())
            })
            .unzip();
        let result = analyze_orbit(&x, &y).unwrap();
        assert!(!result.stability.stable);
        assert_eq!(result.stability.class, StabilityClass::Unstable);
        let found = conditions(&result);
        assert!(found.contains(&OrbitCondition::Instability));
        assert!(found.contains(&OrbitCondition::Rub));
    }

    #[test]
    fn test_orbit_harmonics() {
        // First 256 samples hold exactly one period
        let (x, y) = ellipse(1.0, 0.5, 256.0, 512);
        let result = analyze_orbit(&x, &y).unwrap();
        assert!((result.harmonics.x[0] - 0.5).abs() < 1e-9);
        assert!((result.harmonics.y[0] - 0.25).abs() < 1e-9);
        assert!(result.harmonics.x[1] < 1e-9 && result.harmonics.x[2] < 1e-9);
    }

    #[test]
    fn test_input_validation() {
        let (x, y) = ellipse(1.0, 1.0, 50.0, 200);
        assert!(matches!(
            analyze_orbit(&x, &y[..150]),
            Err(TransformError::Signal(SignalError::LengthMismatch { .. }))
        ));
        assert_eq!(
            analyze_orbit(&x[..50], &y[..50]),
            Err(TransformError::InsufficientSamples { needed: 100, got: 50 })
        );
        assert!(analyze_orbit(&[0.0; 200], &[0.0; 200]).is_err());
    }

    #[test]
    fn test_stability_classes() {
        assert_eq!(StabilityClass::from_index(0.01), StabilityClass::VeryStable);
        assert_eq!(StabilityClass::from_index(0.07), StabilityClass::Stable);
        assert_eq!(StabilityClass::from_index(0.15), StabilityClass::ModeratelyUnstable);
        assert_eq!(StabilityClass::from_index(0.5), StabilityClass::Unstable);
    }
}
