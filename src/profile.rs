use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use defmt::Format;
use thiserror::Error;

use crate::gas::Gases;
use crate::options::Options;
use crate::segments::{Segment, Segments};
use crate::tissue::Tissue;
use crate::zh16c::COMPARTMENTS;

/// Reasons a dive plan is refused before any simulation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValidationEvent {
    #[error("profile has no segments")]
    NoSegments,
    #[error("segment {segment} uses a gas missing in the gas list")]
    UnregisteredGas { segment: usize },
    #[error("gas list has no bottom gas")]
    NoBottomGas,
}

/// Input of one planner run.
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmParams<'a> {
    pub segments: &'a Segments,
    pub gases: &'a Gases,
    pub options: &'a Options,
    /// Tissues left over from a previous dive, surface saturation when missing.
    pub tissues: Option<&'a [Tissue]>,
    /// Seconds at the surface applied to `tissues` before the dive starts.
    pub surface_interval: Option<f64>,
}

impl<'a> AlgorithmParams<'a> {
    pub fn new(segments: &'a Segments, gases: &'a Gases, options: &'a Options) -> Self {
        AlgorithmParams {
            segments,
            gases,
            options,
            tissues: None,
            surface_interval: None,
        }
    }

    pub fn with_tissues(mut self, tissues: &'a [Tissue]) -> Self {
        self.tissues = Some(tissues);
        self
    }

    pub fn with_surface_interval(mut self, seconds: f64) -> Self {
        self.surface_interval = Some(seconds);
        self
    }
}

/// Planned dive: the user segments followed by the generated ascent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalculatedProfile {
    pub segments: Vec<Segment>,
    /// Tissues at the end of the dive, missing when the plan was refused.
    pub tissues: Option<[Tissue; COMPARTMENTS]>,
    pub errors: Vec<ValidationEvent>,
}

impl CalculatedProfile {
    /// Refused plan, carries the original segments unchanged.
    pub fn from_errors(original: &Segments, errors: Vec<ValidationEvent>) -> Self {
        CalculatedProfile {
            segments: original.items().to_vec(),
            tissues: None,
            errors,
        }
    }

    pub fn from_profile(segments: Vec<Segment>, tissues: [Tissue; COMPARTMENTS]) -> Self {
        CalculatedProfile {
            segments,
            tissues: Some(tissues),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total runtime in seconds.
    pub fn duration(&self) -> u32 {
        self.segments.iter().map(|s| s.duration).sum()
    }
}

/// Ceiling depth sampled during the dive.
#[derive(Debug, Clone, Copy, PartialEq, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ceiling {
    /// Seconds since the start of the dive.
    pub time: u32,
    /// Meters, 0 when a direct ascent is allowed.
    pub depth: f64,
}

/// Planned dive with one sample per simulated second.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalculatedProfileStatistics {
    pub profile: CalculatedProfile,
    pub ceilings: Vec<Ceiling>,
    /// Saturation ratio of all compartments.
    pub tissue_over_pressures: Vec<[f64; COMPARTMENTS]>,
    pub tissues_history: Vec<[Tissue; COMPARTMENTS]>,
}

impl CalculatedProfileStatistics {
    pub fn from_errors(original: &Segments, errors: Vec<ValidationEvent>) -> Self {
        CalculatedProfileStatistics {
            profile: CalculatedProfile::from_errors(original, errors),
            ceilings: Vec::new(),
            tissue_over_pressures: Vec::new(),
            tissues_history: Vec::new(),
        }
    }
}
