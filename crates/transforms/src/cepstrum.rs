//! Real cepstrum and rahmonic detection

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use spectrum::{fft, ifft, pad_to_power_of_two, SignalError};
use std::fmt;
use tracing::debug;

use crate::error::Result;

const LOG_EPSILON: f64 = 1e-10;
/// Rahmonics must exceed this fraction of the largest cepstral value
const RAHMONIC_FRACTION: f64 = 0.1;
/// Quefrencies below this (s) are dominated by the spectral envelope
const MIN_QUEFRENCY: f64 = 0.001;
const MAX_RAHMONICS: usize = 10;
const PERIODICITY_SEARCH_LIMIT: usize = 100;
const PERIODICITY_CONFIDENCE: f64 = 0.3;
/// Neighbourhood half-width and fixed divisor of the local mean
const LOCAL_HALF_WIDTH: usize = 5;
const LOCAL_DIVISOR: f64 = 11.0;

/// Likely origin of a rahmonic, by its fundamental frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RahmonicBand {
    /// below 5 Hz
    LowFrequencyModulation,
    /// 5 to 50 Hz
    GearMesh,
    /// 50 to 200 Hz
    BearingOrRotor,
    /// 200 to 1000 Hz
    BladeOrTooth,
    HighFrequency,
}

impl RahmonicBand {
    pub fn from_frequency(frequency: f64) -> Self {
        if frequency < 5.0 {
            RahmonicBand::LowFrequencyModulation
        } else if frequency < 50.0 {
            RahmonicBand::GearMesh
        } else if frequency < 200.0 {
            RahmonicBand::BearingOrRotor
        } else if frequency < 1000.0 {
            RahmonicBand::BladeOrTooth
        } else {
            RahmonicBand::HighFrequency
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RahmonicBand::LowFrequencyModulation => "Low-frequency modulation",
            RahmonicBand::GearMesh => "Possible gear frequency",
            RahmonicBand::BearingOrRotor => "Bearing or rotor frequency",
            RahmonicBand::BladeOrTooth => "Blade or tooth frequency",
            RahmonicBand::HighFrequency => "High frequency",
        }
    }
}

impl fmt::Display for RahmonicBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rahmonic {
    /// Seconds
    pub quefrency: f64,
    /// 1 / quefrency (Hz)
    pub frequency: f64,
    pub magnitude: f64,
    pub band: RahmonicBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodicityKind {
    /// below 10 Hz
    Modulation,
    /// 10 to 100 Hz
    LowOrderHarmonic,
    /// 100 to 500 Hz
    DefectFrequency,
    HighFrequency,
}

impl PeriodicityKind {
    pub fn from_frequency(frequency: f64) -> Self {
        if frequency < 10.0 {
            PeriodicityKind::Modulation
        } else if frequency < 100.0 {
            PeriodicityKind::LowOrderHarmonic
        } else if frequency < 500.0 {
            PeriodicityKind::DefectFrequency
        } else {
            PeriodicityKind::HighFrequency
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Periodicity {
    /// Seconds
    pub period: f64,
    pub frequency: f64,
    /// value / local mean, capped at 1
    pub confidence: f64,
    pub kind: PeriodicityKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CepstrumResult {
    /// |ifft(ln(|fft(x)| + ε))| over the padded length
    pub cepstrum: Vec<f64>,
    /// index / sample_rate (s)
    pub quefrencies: Vec<f64>,
    /// Strongest rahmonics, largest first
    pub rahmonics: Vec<Rahmonic>,
    /// Periodicity candidates, most confident first
    pub periodicities: Vec<Periodicity>,
}

/// Real cepstrum of `samples`; zero-padded to a power of two first
pub fn compute_cepstrum(samples: &[f64], sample_rate: f64) -> Result<CepstrumResult> {
    if samples.is_empty() {
        return Err(SignalError::EmptyInput("cepstrum").into());
    }
    if !(sample_rate > 0.0) || !sample_rate.is_finite() {
        return Err(SignalError::invalid(format!(
            "sample rate must be positive, got {sample_rate}"
        ))
        .into());
    }

    let padded = pad_to_power_of_two(samples);
    let log_spectrum: Vec<Complex64> = fft(&padded)?
        .iter()
        .map(|z| Complex64::new((z.norm() + LOG_EPSILON).ln(), 0.0))
        .collect();
    let cepstrum: Vec<f64> = ifft(&log_spectrum)?.iter().map(|z| z.norm()).collect();
    let quefrencies: Vec<f64> = (0..cepstrum.len())
        .map(|i| i as f64 / sample_rate)
        .collect();

    let rahmonics = detect_rahmonics(&cepstrum, &quefrencies);
    let periodicities = analyze_periodicity(&cepstrum, &quefrencies);

    debug!(
        "Cepstrum: {} bins, {} rahmonics, {} periodicities",
        cepstrum.len(),
        rahmonics.len(),
        periodicities.len()
    );

    Ok(CepstrumResult {
        cepstrum,
        quefrencies,
        rahmonics,
        periodicities,
    })
}

fn detect_rahmonics(cepstrum: &[f64], quefrencies: &[f64]) -> Vec<Rahmonic> {
    if cepstrum.len() < 3 {
        return Vec::new();
    }
    let threshold = cepstrum.iter().cloned().fold(0.0_f64, f64::max) * RAHMONIC_FRACTION;

    let mut rahmonics: Vec<Rahmonic> = (1..cepstrum.len() - 1)
        .filter(|&i| {
            let c = cepstrum[i];
            c > threshold
                && c > cepstrum[i - 1]
                && c > cepstrum[i + 1]
                && quefrencies[i] > MIN_QUEFRENCY
        })
        .map(|i| {
            let frequency = 1.0 / quefrencies[i];
            Rahmonic {
                quefrency: quefrencies[i],
                frequency,
                magnitude: cepstrum[i],
                band: RahmonicBand::from_frequency(frequency),
            }
        })
        .collect();

    rahmonics.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
    rahmonics.truncate(MAX_RAHMONICS);
    rahmonics
}

fn analyze_periodicity(cepstrum: &[f64], quefrencies: &[f64]) -> Vec<Periodicity> {
    let limit = (cepstrum.len() / 4).min(PERIODICITY_SEARCH_LIMIT);

    let mut periodicities: Vec<Periodicity> = (1..limit)
        .filter_map(|i| {
            let confidence = periodicity_confidence(cepstrum, i);
            (confidence > PERIODICITY_CONFIDENCE).then(|| {
                let frequency = 1.0 / quefrencies[i];
                Periodicity {
                    period: quefrencies[i],
                    frequency,
                    confidence,
                    kind: PeriodicityKind::from_frequency(frequency),
                }
            })
        })
        .collect();

    periodicities.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    periodicities
}

/// Value against the mean of its ±5 neighbourhood, truncated at the edges
fn periodicity_confidence(cepstrum: &[f64], index: usize) -> f64 {
    let start = index.saturating_sub(LOCAL_HALF_WIDTH);
    let end = (index + LOCAL_HALF_WIDTH + 1).min(cepstrum.len());
    let local_mean = cepstrum[start..end].iter().sum::<f64>() / LOCAL_DIVISOR;
    (cepstrum[index] / (local_mean + LOG_EPSILON)).min(1.0)
}
