//! Fault pattern table

use diagnostics::{BearingDefectKind, BearingFrequencySet};
use serde::{Deserialize, Serialize};
use spectrum::Spectrum;
use std::fmt;

/// Log floor for the geometric mean in the broadband match
const LOG_EPSILON: f64 = 1e-10;

/// Fault classes known to the pattern table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultClass {
    Unbalance,
    Misalignment,
    Bearing,
    Looseness,
    Cavitation,
}

impl FaultClass {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultClass::Unbalance => "unbalance",
            FaultClass::Misalignment => "misalignment",
            FaultClass::Bearing => "bearing",
            FaultClass::Looseness => "looseness",
            FaultClass::Cavitation => "cavitation",
        }
    }

    /// Typical symptoms reported alongside a match
    pub fn symptoms(&self) -> &'static [&'static str] {
        match self {
            FaultClass::Unbalance => &["1X vibration", "Constant amplitude", "Stable phase"],
            FaultClass::Misalignment => &[
                "Dominant 2X vibration",
                "High axial vibration",
                "Elevated temperature",
            ],
            FaultClass::Bearing => &[
                "High-frequency noise",
                "Amplitude modulation",
                "Periodic impacts",
            ],
            FaultClass::Looseness => &["Multiple harmonics", "Unstable phase", "Non-linearity"],
            FaultClass::Cavitation => &["Broadband noise", "Erosion", "Performance drop"],
        }
    }
}

impl fmt::Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One spectral signature of a fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pattern {
    /// Magnitude at the given running-speed orders
    Harmonics {
        orders: Vec<u32>,
        threshold: f64,
        confidence: f64,
    },
    /// Magnitude at bearing defect frequencies
    BearingFrequencies {
        kinds: Vec<BearingDefectKind>,
        threshold: f64,
        confidence: f64,
    },
    /// Spectral flatness (geometric / arithmetic mean)
    Broadband { threshold: f64, confidence: f64 },
}

impl Pattern {
    /// Confidence in [0, 1]; zero unless the matched ratio exceeds the
    /// threshold, then `confidence · ratio / threshold` capped at 1.
    pub fn score(
        &self,
        spectrum: &Spectrum,
        rotation_frequency: f64,
        bearing: &BearingFrequencySet,
    ) -> f64 {
        let (ratio, threshold, confidence) = match self {
            Pattern::Harmonics {
                orders,
                threshold,
                confidence,
            } => (
                magnitude_share(
                    spectrum,
                    orders.iter().map(|&o| o as f64 * rotation_frequency),
                ),
                *threshold,
                *confidence,
            ),
            Pattern::BearingFrequencies {
                kinds,
                threshold,
                confidence,
            } => (
                magnitude_share(spectrum, kinds.iter().map(|&k| bearing.get(k))),
                *threshold,
                *confidence,
            ),
            Pattern::Broadband {
                threshold,
                confidence,
            } => (flatness(&spectrum.magnitudes), *threshold, *confidence),
        };

        if threshold > 0.0 && ratio > threshold {
            (confidence * ratio / threshold).min(1.0)
        } else {
            0.0
        }
    }
}

/// Σ magnitude at the bins closest to `targets` / Σ magnitude
fn magnitude_share(spectrum: &Spectrum, targets: impl Iterator<Item = f64>) -> f64 {
    let total: f64 = spectrum.magnitudes.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let matched: f64 = targets
        .filter_map(|t| spectrum.closest_bin(t))
        .map(|i| spectrum.magnitudes[i])
        .sum();
    matched / total
}

fn flatness(magnitudes: &[f64]) -> f64 {
    let n = magnitudes.len() as f64;
    let arithmetic = magnitudes.iter().sum::<f64>() / n;
    if !(arithmetic > 0.0) {
        return 0.0;
    }
    let geometric = (magnitudes.iter().map(|m| (m + LOG_EPSILON).ln()).sum::<f64>() / n).exp();
    geometric / arithmetic
}

/// Best pattern confidence for one fault class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub class: FaultClass,
    pub confidence: f64,
    /// Confidence above 0.5
    pub detected: bool,
}

/// Ordered table of fault classes and their patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternTable {
    pub entries: Vec<(FaultClass, Vec<Pattern>)>,
}

impl Default for PatternTable {
    fn default() -> Self {
        use BearingDefectKind::*;
        let harmonics = |orders: &[u32], threshold, confidence| Pattern::Harmonics {
            orders: orders.to_vec(),
            threshold,
            confidence,
        };
        let bearing = |kinds: &[BearingDefectKind], threshold, confidence| {
            Pattern::BearingFrequencies {
                kinds: kinds.to_vec(),
                threshold,
                confidence,
            }
        };

        Self {
            entries: vec![
                (
                    FaultClass::Unbalance,
                    vec![harmonics(&[1], 0.3, 0.85), harmonics(&[1, 2], 0.25, 0.75)],
                ),
                (
                    FaultClass::Misalignment,
                    vec![harmonics(&[2, 3], 0.4, 0.80), harmonics(&[1, 2, 3], 0.3, 0.70)],
                ),
                (
                    FaultClass::Bearing,
                    vec![
                        bearing(&[OuterRace, InnerRace], 0.2, 0.90),
                        bearing(&[BallSpin, Cage], 0.15, 0.85),
                    ],
                ),
                (
                    FaultClass::Looseness,
                    vec![harmonics(&[1, 2, 3, 4, 5, 6], 0.15, 0.75)],
                ),
                (
                    FaultClass::Cavitation,
                    vec![Pattern::Broadband {
                        threshold: 0.1,
                        confidence: 0.70,
                    }],
                ),
            ],
        }
    }
}

impl PatternTable {
    /// Best confidence per class, in table order
    pub fn match_all(
        &self,
        spectrum: &Spectrum,
        rotation_frequency: f64,
        bearing: &BearingFrequencySet,
    ) -> Vec<PatternMatch> {
        self.entries
            .iter()
            .map(|(class, patterns)| {
                let confidence = patterns
                    .iter()
                    .map(|p| p.score(spectrum, rotation_frequency, bearing))
                    .fold(0.0, f64::max);
                PatternMatch {
                    class: *class,
                    confidence,
                    detected: confidence > 0.5,
                }
            })
            .collect()
    }
}
