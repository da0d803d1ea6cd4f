//! Feature Engineering Engine
//!
//! Time-domain, spectral and diagnostic-indicator statistics computed from a
//! signal and its spectrum. Every statistic either comes back finite or the
//! whole bundle fails with a [`StatisticsError`].

mod error;
mod features;
mod impacts;
mod normality;
mod spectral;
mod temporal;

pub use error::{Result, StatisticsError};
pub use features::{
    compute_statistics, DiagnosticIndicators, StatisticsBundle, StatisticsConfig,
    StatisticsEngine,
};
pub use impacts::{analyze_impacts, Impact, ImpactAnalysis};
pub use normality::{normality_test, NormalityTest};
pub use spectral::{band_power, SpectralStatistics};
pub use temporal::TemporalStatistics;
