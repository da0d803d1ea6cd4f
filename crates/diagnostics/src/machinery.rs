//! Machinery calculators and unit conversions

use serde::{Deserialize, Serialize};
use spectrum::SignalError;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{positive, DiagnosticError, Result};

/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.81;

pub fn rpm_to_hz(rpm: f64) -> f64 {
    rpm / 60.0
}

pub fn hz_to_rpm(hz: f64) -> f64 {
    hz * 60.0
}

pub fn g_to_mps2(g: f64) -> f64 {
    g * GRAVITY
}

pub fn mps2_to_g(mps2: f64) -> f64 {
    mps2 / GRAVITY
}

pub fn mms_to_mps(mms: f64) -> f64 {
    mms / 1000.0
}

pub fn mps_to_mms(mps: f64) -> f64 {
    mps * 1000.0
}

/// Single-stage gear pair frequencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearMesh {
    pub input_frequency: f64,
    pub output_frequency: f64,
    pub mesh_frequency: f64,
    /// |input - output| shaft frequency
    pub modulation_frequency: f64,
    /// mesh ± input, mesh ± output
    pub sidebands: [f64; 4],
}

pub fn gear_mesh(input_rpm: f64, gear_ratio: f64, input_teeth: u32) -> Result<GearMesh> {
    let input_rpm = positive("input rpm", input_rpm)?;
    let gear_ratio = positive("gear ratio", gear_ratio)?;
    positive("input teeth", input_teeth as f64)?;

    let input_frequency = rpm_to_hz(input_rpm);
    let output_frequency = rpm_to_hz(input_rpm / gear_ratio);
    let mesh_frequency = input_frequency * input_teeth as f64;

    Ok(GearMesh {
        input_frequency,
        output_frequency,
        mesh_frequency,
        modulation_frequency: (input_frequency - output_frequency).abs(),
        sidebands: [
            mesh_frequency - input_frequency,
            mesh_frequency + input_frequency,
            mesh_frequency - output_frequency,
            mesh_frequency + output_frequency,
        ],
    })
}

/// Belt drive frequencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeltPass {
    /// Linear belt speed (m/s)
    pub belt_speed: f64,
    pub pass_frequency: f64,
    /// First five multiples of the pass frequency
    pub harmonics: [f64; 5],
}

pub fn belt_pass(pulley_diameter_mm: f64, rpm: f64, belt_length_m: f64) -> Result<BeltPass> {
    let diameter = positive("pulley diameter", pulley_diameter_mm)?;
    let rpm = positive("rpm", rpm)?;
    let length = positive("belt length", belt_length_m)?;

    let belt_speed = PI * diameter * rpm / 60_000.0;
    let pass_frequency = belt_speed / length;
    let mut harmonics = [0.0; 5];
    for (i, h) in harmonics.iter_mut().enumerate() {
        *h = (i + 1) as f64 * pass_frequency;
    }

    Ok(BeltPass {
        belt_speed,
        pass_frequency,
        harmonics,
    })
}

/// Single degree-of-freedom resonance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resonance {
    pub natural_frequency: f64,
    /// `None` when the system is critically or over-damped
    pub damped_frequency: Option<f64>,
    pub damping_ratio: f64,
    /// `None` for an undamped system
    pub quality_factor: Option<f64>,
}

pub fn resonance(mass: f64, stiffness: f64, damping: f64) -> Result<Resonance> {
    let mass = positive("mass", mass)?;
    let stiffness = positive("stiffness", stiffness)?;
    if !(damping >= 0.0) || !damping.is_finite() {
        return Err(DiagnosticError::InvalidParameter {
            name: "damping",
            value: damping,
        });
    }

    let natural_frequency = (stiffness / mass).sqrt() / (2.0 * PI);
    let damping_ratio = damping / (2.0 * (mass * stiffness).sqrt());
    let damped_frequency =
        (damping_ratio < 1.0).then(|| natural_frequency * (1.0 - damping_ratio.powi(2)).sqrt());
    let quality_factor = (damping_ratio > 0.0).then(|| 1.0 / (2.0 * damping_ratio));

    Ok(Resonance {
        natural_frequency,
        damped_frequency,
        damping_ratio,
        quality_factor,
    })
}

/// ISO 10816 machine group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineClass {
    #[default]
    General,
    LargeMachine,
    Pump,
}

impl MachineClass {
    /// Zone boundaries (mm/s RMS): good, satisfactory, unsatisfactory
    pub fn limits(&self) -> [f64; 3] {
        match self {
            MachineClass::General | MachineClass::Pump => [2.3, 4.5, 7.1],
            MachineClass::LargeMachine => [3.5, 7.1, 11.0],
        }
    }
}

impl FromStr for MachineClass {
    type Err = DiagnosticError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "general" => Ok(MachineClass::General),
            "large_machine" | "large" => Ok(MachineClass::LargeMachine),
            "pump" => Ok(MachineClass::Pump),
            other => Err(SignalError::invalid(format!("unknown machine class '{other}'")).into()),
        }
    }
}

/// ISO 10816 evaluation zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IsoZone {
    Good,
    Satisfactory,
    Unsatisfactory,
    Unacceptable,
}

impl fmt::Display for IsoZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IsoZone::Good => "Good",
            IsoZone::Satisfactory => "Satisfactory",
            IsoZone::Unsatisfactory => "Unsatisfactory",
            IsoZone::Unacceptable => "Unacceptable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoSeverity {
    pub zone: IsoZone,
    pub rms_velocity: f64,
    pub limits: [f64; 3],
}

/// Classify an RMS velocity (mm/s); boundaries belong to the lower zone
pub fn iso_severity(rms_velocity: f64, class: MachineClass) -> Result<IsoSeverity> {
    if !(rms_velocity >= 0.0) || !rms_velocity.is_finite() {
        return Err(DiagnosticError::InvalidParameter {
            name: "rms velocity",
            value: rms_velocity,
        });
    }
    let limits = class.limits();
    let zone = if rms_velocity > limits[2] {
        IsoZone::Unacceptable
    } else if rms_velocity > limits[1] {
        IsoZone::Unsatisfactory
    } else if rms_velocity > limits[0] {
        IsoZone::Satisfactory
    } else {
        IsoZone::Good
    };
    Ok(IsoSeverity {
        zone,
        rms_velocity,
        limits,
    })
}
