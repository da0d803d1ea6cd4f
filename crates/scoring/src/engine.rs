//! Scoring Engine Implementation

use diagnostics::BearingFrequencySet;
use serde::{Deserialize, Serialize};
use spectrum::{SignalError, Spectrum};
use std::fmt;
use tracing::{debug, info};

use crate::features::FeatureSet;
use crate::patterns::{FaultClass, PatternTable};
use crate::scorer::{NeutralScorer, ScoreOutput, Scorer};
use crate::Result;

/// Detected faults above this confidence get a recommendation
const RECOMMENDATION_CONFIDENCE: f64 = 0.6;
/// Detected faults above this confidence count as critical issues
const CRITICAL_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// From detected faults: confidence sum and count above 0.8
    pub fn assess(faults: &[FaultScore]) -> Self {
        let detected = faults.iter().filter(|f| f.detected);
        let (sum, critical) = detected.fold((0.0, 0), |(sum, critical), f| {
            (
                sum + f.confidence,
                critical + usize::from(f.confidence > CRITICAL_CONFIDENCE),
            )
        });

        if critical > 2 || sum > 2.5 {
            RiskLevel::Critical
        } else if critical > 1 || sum > 1.5 {
            RiskLevel::High
        } else if sum > 0.8 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Medium,
    High,
    Critical,
}

/// Maintenance action for a detected fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub class: FaultClass,
    pub priority: Priority,
    pub action: String,
    pub timeframe: String,
    pub impact: String,
}

impl Recommendation {
    fn for_class(class: FaultClass) -> Self {
        let (priority, action, timeframe, impact) = match class {
            FaultClass::Unbalance => (
                Priority::High,
                "Balance the rotor",
                "1-2 weeks",
                "60-80% vibration reduction",
            ),
            FaultClass::Misalignment => (
                Priority::High,
                "Align the shafts",
                "1 week",
                "Extends component service life",
            ),
            FaultClass::Bearing => (
                Priority::Critical,
                "Replace the bearings",
                "Immediate",
                "Prevents catastrophic failure",
            ),
            FaultClass::Looseness => (
                Priority::High,
                "Tighten mounting bolts and inspect the base",
                "1-2 weeks",
                "Removes non-linear response",
            ),
            FaultClass::Cavitation => (
                Priority::Medium,
                "Check suction pressure and NPSH margin",
                "2-4 weeks",
                "Stops impeller erosion",
            ),
        };
        Self {
            class,
            priority,
            action: action.to_string(),
            timeframe: timeframe.to_string(),
            impact: impact.to_string(),
        }
    }
}

/// Final confidence for one fault class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultScore {
    pub class: FaultClass,
    pub detected: bool,
    /// Pattern confidence, scaled by the scorer when detected
    pub confidence: f64,
    pub symptoms: Vec<String>,
    /// Scorer severity, present when detected
    pub severity: Option<f64>,
    /// Scorer urgency, present when detected
    pub urgency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringReport {
    pub features: FeatureSet,
    pub score: ScoreOutput,
    pub scorer: String,
    pub faults: Vec<FaultScore>,
    /// Highest fault confidence
    pub confidence: f64,
    pub risk: RiskLevel,
    pub recommendations: Vec<Recommendation>,
}

impl ScoringReport {
    pub fn fault(&self, class: FaultClass) -> Option<&FaultScore> {
        self.faults.iter().find(|f| f.class == class)
    }

    pub fn detected(&self) -> impl Iterator<Item = &FaultScore> {
        self.faults.iter().filter(|f| f.detected)
    }
}

/// Pattern table plus confidence scorer
pub struct ScoringEngine {
    table: PatternTable,
    scorer: Box<dyn Scorer>,
}

impl ScoringEngine {
    /// Create a new scoring engine
    pub fn new(table: PatternTable, scorer: Box<dyn Scorer>) -> Self {
        info!(
            "Creating scoring engine: {} fault classes, scorer {}",
            table.entries.len(),
            scorer.name()
        );
        Self { table, scorer }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Score a spectrum against the pattern table
    pub fn evaluate(
        &self,
        spectrum: &Spectrum,
        rotation_frequency: f64,
        bearing: &BearingFrequencySet,
    ) -> Result<ScoringReport> {
        if !(rotation_frequency > 0.0) {
            return Err(SignalError::invalid(format!(
                "rotation frequency must be positive, got {rotation_frequency}"
            ))
            .into());
        }

        let features = FeatureSet::extract(spectrum, rotation_frequency)?;
        let score = self.scorer.score(&features);
        let adjustment = 0.7 + 0.3 * score.probability;

        let faults: Vec<FaultScore> = self
            .table
            .match_all(spectrum, rotation_frequency, bearing)
            .into_iter()
            .map(|m| FaultScore {
                class: m.class,
                detected: m.detected,
                confidence: if m.detected {
                    m.confidence * adjustment
                } else {
                    m.confidence
                },
                symptoms: m.class.symptoms().iter().map(|s| s.to_string()).collect(),
                severity: m.detected.then_some(score.severity),
                urgency: m.detected.then_some(score.urgency),
            })
            .collect();

        let confidence = faults.iter().map(|f| f.confidence).fold(0.0, f64::max);
        let risk = RiskLevel::assess(&faults);
        let recommendations = faults
            .iter()
            .filter(|f| f.detected && f.confidence > RECOMMENDATION_CONFIDENCE)
            .map(|f| Recommendation::for_class(f.class))
            .collect();

        debug!(
            scorer = self.scorer.name(),
            detected = faults.iter().filter(|f| f.detected).count(),
            %risk,
            "Scoring complete"
        );

        Ok(ScoringReport {
            features,
            score,
            scorer: self.scorer.name().to_string(),
            faults,
            confidence,
            risk,
            recommendations,
        })
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(PatternTable::default(), Box::new(NeutralScorer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::FixedWeightScorer;

    fn spectrum_with(tones: &[(f64, f64)]) -> Spectrum {
        let freqs: Vec<f64> = (0..64).map(|i| i as f64 * 5.0).collect();
        let mags = freqs
            .iter()
            .map(|f| {
                tones
                    .iter()
                    .find(|(t, _)| (t - f).abs() < 1e-9)
                    .map_or(0.001, |(_, m)| *m)
            })
            .collect();
        Spectrum::new(mags, freqs).unwrap()
    }

    fn fault(class: FaultClass, confidence: f64) -> FaultScore {
        FaultScore {
            class,
            detected: confidence > 0.5,
            confidence,
            symptoms: Vec::new(),
            severity: None,
            urgency: None,
        }
    }

    #[test]
    fn test_risk_levels() {
        assert_eq!(RiskLevel::assess(&[]), RiskLevel::Low);
        assert_eq!(
            RiskLevel::assess(&[fault(FaultClass::Unbalance, 0.7)]),
            RiskLevel::Low
        );
        assert_eq!(
            RiskLevel::assess(&[fault(FaultClass::Unbalance, 0.85)]),
            RiskLevel::Medium
        );
        assert_eq!(
            RiskLevel::assess(&[
                fault(FaultClass::Unbalance, 0.85),
                fault(FaultClass::Bearing, 0.9)
            ]),
            RiskLevel::High
        );
        assert_eq!(
            RiskLevel::assess(&[
                fault(FaultClass::Unbalance, 0.85),
                fault(FaultClass::Bearing, 0.9),
                fault(FaultClass::Looseness, 0.95)
            ]),
            RiskLevel::Critical
        );
        // Undetected faults do not count
        assert_eq!(
            RiskLevel::assess(&[fault(FaultClass::Cavitation, 0.4)]),
            RiskLevel::Low
        );
    }

    #[test]
    fn test_neutral_scorer_keeps_confidences() {
        let engine = ScoringEngine::default();
        let bearing = BearingFrequencySet::from_defaults(30.0);
        let report = engine
            .evaluate(&spectrum_with(&[(30.0, 2.0)]), 30.0, &bearing)
            .unwrap();

        let unbalance = report.fault(FaultClass::Unbalance).unwrap();
        assert!(unbalance.detected);
        assert_eq!(unbalance.confidence, 1.0);
        assert_eq!(unbalance.severity, Some(0.0));
        assert_eq!(report.scorer, "neutral");
        assert_eq!(report.confidence, 1.0);
        // Unbalance, misalignment and looseness all saturate
        assert_eq!(report.risk, RiskLevel::Critical);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.class == FaultClass::Unbalance && r.priority == Priority::High));
        assert!(!report.fault(FaultClass::Bearing).unwrap().detected);
    }

    #[test]
    fn test_scorer_probability_scales_detected_faults() {
        // Zero weights: probability 0.5, factor 0.85
        let scorer = FixedWeightScorer::from_flat(&[0.0; FixedWeightScorer::PARAMETERS]).unwrap();
        let engine = ScoringEngine::new(PatternTable::default(), Box::new(scorer));
        let bearing = BearingFrequencySet::from_defaults(30.0);
        let report = engine
            .evaluate(&spectrum_with(&[(30.0, 2.0)]), 30.0, &bearing)
            .unwrap();

        let unbalance = report.fault(FaultClass::Unbalance).unwrap();
        assert!((unbalance.confidence - 0.85).abs() < 1e-12);
        assert_eq!(unbalance.urgency, Some(0.5));
        let bearing_fault = report.fault(FaultClass::Bearing).unwrap();
        assert!(bearing_fault.severity.is_none());
    }

    #[test]
    fn test_quiet_harmonics_give_low_risk() {
        let engine = ScoringEngine::default();
        let bearing = BearingFrequencySet::from_defaults(30.0);
        // Energy away from running-speed orders and bearing lines
        let report = engine
            .evaluate(&spectrum_with(&[(245.0, 1.0), (275.0, 1.0)]), 30.0, &bearing)
            .unwrap();
        assert_eq!(report.detected().count(), 0);
        assert_eq!(report.risk, RiskLevel::Low);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_invalid_rotation_frequency() {
        let engine = ScoringEngine::default();
        let bearing = BearingFrequencySet::from_defaults(30.0);
        assert!(engine
            .evaluate(&spectrum_with(&[]), 0.0, &bearing)
            .is_err());
    }
}
