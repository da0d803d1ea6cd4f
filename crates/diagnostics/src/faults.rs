//! Fault flags, severity scoring and recommendations

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bearing::BearingDefect;

/// Overall machine condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    Normal,
    Attention,
    Alert,
    Critical,
}

impl SeverityLevel {
    /// Map an additive fault score to a level
    pub fn from_score(score: u32) -> Self {
        match score {
            0 => SeverityLevel::Normal,
            1..=3 => SeverityLevel::Attention,
            4..=7 => SeverityLevel::Alert,
            _ => SeverityLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Normal => "Normal",
            SeverityLevel::Attention => "Attention",
            SeverityLevel::Alert => "Alert",
            SeverityLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-class fault flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaultDetectionResult {
    pub unbalance: bool,
    pub misalignment: bool,
    pub looseness: bool,
    pub bearing_defects: Vec<BearingDefect>,
    pub gear_problems: bool,
    pub belt_problems: bool,
}

impl FaultDetectionResult {
    /// Additive score: unbalance 2, misalignment 3, looseness 4, bearing 5.
    ///
    /// Gear and belt flags are reported but not scored.
    pub fn severity_score(&self) -> u32 {
        let mut score = 0;
        if self.unbalance {
            score += 2;
        }
        if self.misalignment {
            score += 3;
        }
        if self.looseness {
            score += 4;
        }
        if !self.bearing_defects.is_empty() {
            score += 5;
        }
        score
    }

    pub fn severity(&self) -> SeverityLevel {
        SeverityLevel::from_score(self.severity_score())
    }

    pub fn any(&self) -> bool {
        self.unbalance
            || self.misalignment
            || self.looseness
            || !self.bearing_defects.is_empty()
            || self.gear_problems
            || self.belt_problems
    }
}

/// Corrective actions for the detected faults, most urgent first
pub fn recommendations(faults: &FaultDetectionResult) -> Vec<String> {
    let mut actions = Vec::new();

    if !faults.bearing_defects.is_empty() {
        let kinds: Vec<&str> = faults.bearing_defects.iter().map(|d| d.kind.as_str()).collect();
        actions.push(format!(
            "Bearing defect frequencies present ({}): inspect lubrication and schedule bearing replacement",
            kinds.join(", ")
        ));
    }
    if faults.looseness {
        actions.push(
            "Mechanical looseness: check base bolts, bearing housing fits and structural supports"
                .to_string(),
        );
    }
    if faults.misalignment {
        actions.push(
            "Misalignment: perform laser shaft alignment and check coupling condition".to_string(),
        );
    }
    if faults.unbalance {
        actions.push("Unbalance: perform dynamic balancing of the rotor".to_string());
    }
    if faults.gear_problems {
        actions.push("Gear mesh activity: inspect tooth wear and backlash".to_string());
    }
    if faults.belt_problems {
        actions.push("Belt pass activity: check belt tension, wear and pulley alignment".to_string());
    }
    if actions.is_empty() {
        actions.push("No faults detected: continue routine monitoring".to_string());
    }

    actions
}
