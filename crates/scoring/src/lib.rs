//! Fault Scoring
//!
//! Matches a spectrum against a table of typed fault patterns and adjusts
//! the resulting confidences with a pluggable [`Scorer`].

mod engine;
mod features;
mod patterns;
mod scorer;

pub use engine::{FaultScore, Priority, Recommendation, RiskLevel, ScoringEngine, ScoringReport};
pub use features::{FeatureSet, FEATURE_COUNT};
pub use patterns::{FaultClass, Pattern, PatternMatch, PatternTable};
pub use scorer::{FixedWeightScorer, NeutralScorer, ScoreOutput, Scorer};

use spectrum::SignalError;
use thiserror::Error;

/// Errors during scoring
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Signal(#[from] SignalError),
    #[error("Invalid weight count: expected {expected}, got {actual}")]
    InvalidWeights { expected: usize, actual: usize },
    #[error("Non-finite weight at position {0}")]
    NonFiniteWeight(usize),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
