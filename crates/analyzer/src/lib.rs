//! Vibration Analyzer
//!
//! Runs a capture through validation, spectrum estimation, diagnostics,
//! statistics, pattern scoring and alert rules, and loads the settings
//! for every stage from one layered configuration.

pub mod config;
mod error;
mod pipeline;

pub use crate::config::{AnalysisConfig, ConfigError, ServerConfig};
pub use error::{AnalyzerError, Result};
pub use pipeline::{AnalysisReport, AnalysisRequest, Analyzer};
