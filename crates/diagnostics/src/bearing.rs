//! Rolling-element bearing defect frequencies

use serde::{Deserialize, Serialize};
use spectrum::Spectrum;
use std::fmt;

use crate::error::{positive, Result};

/// Rolling-element bearing geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BearingGeometry {
    /// Number of rolling elements
    pub ball_count: u32,
    /// Pitch diameter (mm)
    pub pitch_diameter: f64,
    /// Rolling element diameter (mm)
    pub ball_diameter: f64,
    /// Contact angle (degrees)
    pub contact_angle_deg: f64,
}

impl Default for BearingGeometry {
    fn default() -> Self {
        Self {
            ball_count: 8,
            pitch_diameter: 50.0,
            ball_diameter: 8.0,
            contact_angle_deg: 0.0,
        }
    }
}

/// Characteristic defect frequencies (Hz)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingFrequencySet {
    /// Ball pass frequency, outer race
    pub bpfo: f64,
    /// Ball pass frequency, inner race
    pub bpfi: f64,
    /// Fundamental train (cage) frequency
    pub ftf: f64,
    /// Ball spin frequency
    pub bsf: f64,
}

impl BearingFrequencySet {
    /// Multipliers of running speed used when geometry is unknown
    pub fn from_defaults(rotation_freq: f64) -> Self {
        Self {
            bpfo: rotation_freq * 3.5,
            bpfi: rotation_freq * 5.4,
            ftf: rotation_freq * 0.4,
            bsf: rotation_freq * 2.3,
        }
    }

    /// Kinematic frequencies from bearing geometry
    pub fn from_geometry(rotation_freq: f64, geometry: &BearingGeometry) -> Result<Self> {
        let pitch = positive("pitch diameter", geometry.pitch_diameter)?;
        let ball = positive("ball diameter", geometry.ball_diameter)?;
        positive("ball count", geometry.ball_count as f64)?;

        let n = geometry.ball_count as f64;
        let ratio = ball / pitch * geometry.contact_angle_deg.to_radians().cos();

        Ok(Self {
            bpfo: n / 2.0 * rotation_freq * (1.0 - ratio),
            bpfi: n / 2.0 * rotation_freq * (1.0 + ratio),
            ftf: rotation_freq * (1.0 - ratio) / 2.0,
            bsf: pitch / ball * rotation_freq * (1.0 - ratio * ratio) / 2.0,
        })
    }

    /// Geometry-derived when given, default multipliers otherwise
    pub fn compute(rotation_freq: f64, geometry: Option<&BearingGeometry>) -> Result<Self> {
        match geometry {
            Some(g) => Self::from_geometry(rotation_freq, g),
            None => Ok(Self::from_defaults(rotation_freq)),
        }
    }

    /// `(kind, frequency)` pairs in reporting order
    pub fn entries(&self) -> [(BearingDefectKind, f64); 4] {
        [
            (BearingDefectKind::OuterRace, self.bpfo),
            (BearingDefectKind::InnerRace, self.bpfi),
            (BearingDefectKind::Cage, self.ftf),
            (BearingDefectKind::BallSpin, self.bsf),
        ]
    }

    pub fn get(&self, kind: BearingDefectKind) -> f64 {
        match kind {
            BearingDefectKind::OuterRace => self.bpfo,
            BearingDefectKind::InnerRace => self.bpfi,
            BearingDefectKind::Cage => self.ftf,
            BearingDefectKind::BallSpin => self.bsf,
        }
    }
}

/// Which characteristic frequency a defect was found at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BearingDefectKind {
    OuterRace,
    InnerRace,
    Cage,
    BallSpin,
}

impl BearingDefectKind {
    /// Short label (BPFO, BPFI, FTF, BSF)
    pub fn as_str(&self) -> &'static str {
        match self {
            BearingDefectKind::OuterRace => "BPFO",
            BearingDefectKind::InnerRace => "BPFI",
            BearingDefectKind::Cage => "FTF",
            BearingDefectKind::BallSpin => "BSF",
        }
    }
}

impl fmt::Display for BearingDefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Energy found at a characteristic frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingDefect {
    pub kind: BearingDefectKind,
    /// Frequency of the matched bin (Hz)
    pub frequency: f64,
    pub magnitude: f64,
}

/// Flag each characteristic frequency whose closest bin exceeds `threshold`
pub fn detect_bearing_defects(
    spectrum: &Spectrum,
    frequencies: &BearingFrequencySet,
    threshold: f64,
) -> Vec<BearingDefect> {
    frequencies
        .entries()
        .iter()
        .filter_map(|&(kind, target)| {
            let bin = spectrum.closest_bin(target)?;
            let magnitude = spectrum.magnitudes[bin];
            (magnitude > threshold).then_some(BearingDefect {
                kind,
                frequency: spectrum.frequencies[bin],
                magnitude,
            })
        })
        .collect()
}
