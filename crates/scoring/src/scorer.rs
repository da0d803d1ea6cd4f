//! Pluggable confidence scorers

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::features::{FeatureSet, FEATURE_COUNT};
use crate::{Result, ScoringError};

const HIDDEN: usize = 5;
const OUTPUTS: usize = 3;

/// Scorer output, each value in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutput {
    pub severity: f64,
    pub urgency: f64,
    /// Scales detected confidences by `0.7 + 0.3·probability`
    pub probability: f64,
}

/// Adjusts pattern confidences from a feature vector
pub trait Scorer: Send + Sync {
    fn score(&self, features: &FeatureSet) -> ScoreOutput;

    fn name(&self) -> &'static str;
}

/// Leaves pattern confidences untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralScorer;

impl Scorer for NeutralScorer {
    fn score(&self, _features: &FeatureSet) -> ScoreOutput {
        ScoreOutput {
            severity: 0.0,
            urgency: 0.0,
            probability: 1.0,
        }
    }

    fn name(&self) -> &'static str {
        "neutral"
    }
}

/// Two-layer sigmoid network (10 → 5 → 3) with caller-supplied weights
#[derive(Debug, Clone, PartialEq)]
pub struct FixedWeightScorer {
    hidden_weights: [[f64; FEATURE_COUNT]; HIDDEN],
    hidden_bias: [f64; HIDDEN],
    output_weights: [[f64; HIDDEN]; OUTPUTS],
    output_bias: [f64; OUTPUTS],
}

impl FixedWeightScorer {
    /// Total number of parameters expected by [`FixedWeightScorer::from_flat`]
    pub const PARAMETERS: usize = FEATURE_COUNT * HIDDEN + HIDDEN + HIDDEN * OUTPUTS + OUTPUTS;

    pub fn new(
        hidden_weights: [[f64; FEATURE_COUNT]; HIDDEN],
        hidden_bias: [f64; HIDDEN],
        output_weights: [[f64; HIDDEN]; OUTPUTS],
        output_bias: [f64; OUTPUTS],
    ) -> Self {
        info!("Creating fixed-weight scorer");
        Self {
            hidden_weights,
            hidden_bias,
            output_weights,
            output_bias,
        }
    }

    /// Build from a flat parameter list: hidden weights row by row, hidden
    /// biases, output weights row by row, output biases.
    pub fn from_flat(parameters: &[f64]) -> Result<Self> {
        if parameters.len() != Self::PARAMETERS {
            return Err(ScoringError::InvalidWeights {
                expected: Self::PARAMETERS,
                actual: parameters.len(),
            });
        }
        if let Some(position) = parameters.iter().position(|p| !p.is_finite()) {
            return Err(ScoringError::NonFiniteWeight(position));
        }

        let mut values = parameters.iter().copied();
        let mut next = || values.next().unwrap_or(0.0);

        let mut hidden_weights = [[0.0; FEATURE_COUNT]; HIDDEN];
        hidden_weights.iter_mut().flatten().for_each(|w| *w = next());
        let mut hidden_bias = [0.0; HIDDEN];
        hidden_bias.iter_mut().for_each(|b| *b = next());
        let mut output_weights = [[0.0; HIDDEN]; OUTPUTS];
        output_weights.iter_mut().flatten().for_each(|w| *w = next());
        let mut output_bias = [0.0; OUTPUTS];
        output_bias.iter_mut().for_each(|b| *b = next());

        Ok(Self::new(hidden_weights, hidden_bias, output_weights, output_bias))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn layer<const IN: usize, const OUT: usize>(
    input: &[f64; IN],
    weights: &[[f64; IN]; OUT],
    bias: &[f64; OUT],
) -> [f64; OUT] {
    let mut output = [0.0; OUT];
    for ((out, row), b) in output.iter_mut().zip(weights).zip(bias) {
        let sum: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum();
        *out = sigmoid(sum + b);
    }
    output
}

impl Scorer for FixedWeightScorer {
    fn score(&self, features: &FeatureSet) -> ScoreOutput {
        let hidden = layer(&features.to_array(), &self.hidden_weights, &self.hidden_bias);
        let [severity, urgency, probability] =
            layer(&hidden, &self.output_weights, &self.output_bias);
        ScoreOutput {
            severity,
            urgency,
            probability,
        }
    }

    fn name(&self) -> &'static str {
        "fixed_weight"
    }
}
