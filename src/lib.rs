//! Bühlmann ZH-L16C decompression planner.
//!
//! Takes a planned depth/time/gas profile and fills in the missing ascent:
//! decompression stops, gas switches, safety stop and air breaks, while
//! tracking the inert gas loading of the 16 tissue compartments.
//!
//! The crate is `no_std` (it only needs `alloc`), all float math goes
//! through `libm`.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

use defmt::Format;
use thiserror::Error;

pub mod air_break;
pub mod algorithm;
pub mod ceiling;
pub mod context;
pub mod gas;
pub mod m_value;
pub mod ndl;
pub mod options;
pub mod pressure;
pub mod profile;
pub mod search;
pub mod segments;
pub mod simulate;
pub mod tissue;
pub mod zh16c;

pub use algorithm::BuhlmannAlgorithm;
pub use gas::{Gas, GasId, Gases};
pub use ndl::NoDecoLimit;
pub use options::{AirBreakOptions, Options, SafetyStop};
pub use pressure::{DepthConverter, Salinity};
pub use profile::{AlgorithmParams, CalculatedProfile, CalculatedProfileStatistics, Ceiling, ValidationEvent};
pub use segments::{Segment, Segments};
pub use tissue::{Tissue, Tissues};

/// Water vapour pressure in the lungs at 37 deg celsius, in bar (47 mmHg).
pub const WATER_VAPOUR_PRESSURE: f64 = 0.0627;

/// Oxygen fraction of air.
pub const FO2_AIR: f64 = 0.209;

/// Nitrogen fraction of air.
pub const FN2_AIR: f64 = 1.0 - FO2_AIR;

/// Lowest breathable oxygen partial pressure in bar.
pub const MIN_PPO2: f64 = 0.18;

pub const ONE_MINUTE: u32 = 60;
pub const ONE_DAY: u32 = 24 * 60 * ONE_MINUTE;

/// Tolerance used when comparing depths in meters.
pub(crate) const DEPTH_TOLERANCE: f64 = 1e-6;

/// Converts minutes from the options to whole seconds.
pub fn minutes_to_seconds(minutes: f64) -> u32 {
    libm::round(minutes * ONE_MINUTE as f64) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Error, Format)]
pub enum DecoError {
    #[error("tissue state needs exactly {expected} compartments, found {found}")]
    InvalidTissueCount { expected: usize, found: usize },
    #[error("compartment {index} has a negative partial pressure")]
    NegativeTissuePressure { index: usize },
    #[error("altitude can't be negative, got {0} m")]
    NegativeAltitude(f64),
    #[error("surface interval can't be negative, got {0} s")]
    NegativeSurfaceInterval(f64),
    #[error("invalid gas fractions O2 {fo2}, He {fhe}")]
    InvalidGasFractions { fo2: f64, fhe: f64 },
    #[error("gas {0:?} is not part of the gas list")]
    UnknownGas(GasId),
    #[error("gradient factors {low}/{high} have to be in range (0, 1]")]
    InvalidGradientFactors { low: f64, high: f64 },
    #[error("speed and distance options have to be positive, got {0}")]
    InvalidDistance(f64),
    #[error("options can't be parsed, line {line} column {column}")]
    InvalidOptions { line: usize, column: usize },
    #[error("dive plan is not valid: {0}")]
    InvalidPlan(ValidationEvent),
    #[error("search starts at {initial}, which is past its limit {max}")]
    InvalidSearchInterval { initial: u32, max: u32 },
    #[error("search didn't resolve within {limit} s")]
    UnresolvedSearch { limit: u32 },
    #[error("stop at {depth} m doesn't clear within {limit} s")]
    UnresolvedStop { depth: f64, limit: u32 },
}

#[test]
fn test_air_fractions() {
    assert!((FO2_AIR + FN2_AIR - 1.0).abs() < 1e-12);
}

#[test]
fn test_minutes_to_seconds() {
    assert_eq!(minutes_to_seconds(1.5), 90);
    assert_eq!(minutes_to_seconds(20.0), 1200);
}
