//! Analyzer Error Types

use data_validator::ValidationError;
use diagnostics::DiagnosticError;
use feature_engine::StatisticsError;
use scoring::ScoringError;
use spectrum::SignalError;
use thiserror::Error;
use transforms::TransformError;

use crate::config::ConfigError;

/// Any failure along the analysis pipeline
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Invalid capture: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Statistics(#[from] StatisticsError),

    #[error(transparent)]
    Diagnostic(#[from] DiagnosticError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AnalyzerError {
    /// Whether the caller supplied bad input, as opposed to a configuration fault
    pub fn is_input_error(&self) -> bool {
        !matches!(self, AnalyzerError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
