use alloc::vec::Vec;

use libm::{ceil, fabs, floor};

use crate::ceiling::GradientFactors;
use crate::gas::{BestGasOptions, Gas, GasId, Gases};
use crate::options::{Options, SafetyStop};
use crate::pressure::DepthConverter;
use crate::profile::{Ceiling, ValidationEvent};
use crate::segments::{Segment, Segments};
use crate::tissue::{Tissue, Tissues};
use crate::zh16c::COMPARTMENTS;
use crate::{minutes_to_seconds, DecoError, DEPTH_TOLERANCE, ONE_MINUTE};

/// Depth where the last ascent band starts.
const LAST_SPEED_BAND_DEPTH: f64 = 6.0;
pub const SAFETY_STOP_DURATION: u32 = 3 * ONE_MINUTE;

/// Ascent speed chosen by depth, in meters per minute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscentSpeeds {
    fast_band_depth: f64,
    fast: f64,
    medium: f64,
    slow: f64,
}

impl AscentSpeeds {
    pub fn new(options: &Options, segments: &Segments) -> Self {
        AscentSpeeds {
            fast_band_depth: Segments::average_depth(segments.deepest_part()) / 2.0,
            fast: options.ascent_speed_50perc,
            medium: options.ascent_speed_50perc_to_6m,
            slow: options.ascent_speed_6m,
        }
    }

    pub fn ascent(&self, current_depth: f64) -> f64 {
        if current_depth > self.fast_band_depth {
            self.fast
        } else if current_depth > LAST_SPEED_BAND_DEPTH {
            self.medium
        } else {
            self.slow
        }
    }
}

/// Per second samples, only collected for statistics runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub ceilings: Vec<Ceiling>,
    pub tissue_over_pressures: Vec<[f64; COMPARTMENTS]>,
    pub tissues_history: Vec<[Tissue; COMPARTMENTS]>,
}

impl Statistics {
    fn len(&self) -> usize {
        self.ceilings.len()
    }

    fn truncate(&mut self, len: usize) {
        self.ceilings.truncate(len);
        self.tissue_over_pressures.truncate(len);
        self.tissues_history.truncate(len);
    }
}

/// Snapshot of the mutable part of [`AlgorithmContext`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMemento {
    tissues: Tissues,
    segments_len: usize,
    run_time: u32,
    current_gas: GasId,
    statistics_len: usize,
}

/// Working state of one planner run.
pub struct AlgorithmContext<'a> {
    pub gases: &'a Gases,
    pub options: &'a Options,
    pub converter: DepthConverter,
    pub tissues: Tissues,
    pub segments: Segments,
    pub current_gas: GasId,
    /// Seconds since the start of the dive.
    pub run_time: u32,
    pub speeds: AscentSpeeds,
    gradients: GradientFactors,
    max_depth: f64,
    statistics: Option<Statistics>,
}

impl<'a> AlgorithmContext<'a> {
    /// Starts with an empty profile, `plan` is only used to derive the ascent speed bands.
    pub fn new(
        tissues: Tissues,
        plan: &Segments,
        gases: &'a Gases,
        options: &'a Options,
        statistics: bool,
    ) -> Result<Self, DecoError> {
        let first = plan
            .items()
            .first()
            .ok_or(DecoError::InvalidPlan(ValidationEvent::NoSegments))?;
        let converter = DepthConverter::new(options.salinity, options.altitude);

        Ok(AlgorithmContext {
            gases,
            options,
            converter,
            tissues,
            segments: Segments::new(),
            current_gas: first.gas,
            run_time: 0,
            speeds: AscentSpeeds::new(options, plan),
            gradients: GradientFactors::new(options.gf_low, options.gf_high, converter.surface_pressure()),
            max_depth: plan.max_depth(),
            statistics: statistics.then(Statistics::default),
        })
    }

    pub fn current_depth(&self) -> f64 {
        self.segments.current_depth()
    }

    pub fn is_at_surface(&self) -> bool {
        self.current_depth() <= DEPTH_TOLERANCE
    }

    pub fn is_at_last_stop_depth(&self) -> bool {
        fabs(self.current_depth() - self.options.last_stop_depth) < DEPTH_TOLERANCE
    }

    pub fn gas(&self, id: GasId) -> Result<Gas, DecoError> {
        self.gases.get(id).ok_or(DecoError::UnknownGas(id))
    }

    pub fn current_gas(&self) -> Result<Gas, DecoError> {
        self.gas(self.current_gas)
    }

    pub fn collects_statistics(&self) -> bool {
        self.statistics.is_some()
    }

    pub fn gradients(&self) -> &GradientFactors {
        &self.gradients
    }

    /// Deepest point of the planned profile.
    pub fn max_depth(&self) -> f64 {
        self.max_depth
    }

    /// Fixes the gfLow anchor of the gradient factors from the current tissues,
    /// called once the user profile is replayed.
    pub fn start_ascent(&mut self) {
        self.gradients.fix_first_stop(&self.tissues);
    }

    /// Unrounded ceiling in meters.
    pub fn raw_ceiling(&self) -> f64 {
        let pressure = self.gradients.ceiling(&self.tissues);
        self.converter.from_bar(pressure)
    }

    /// Ceiling rounded to the deeper stop, never shallower than the last stop.
    /// Zero when the diver can surface.
    pub fn ceiling(&self) -> f64 {
        let raw = self.raw_ceiling();
        if raw <= 0.0 {
            return 0.0;
        }
        let distance = self.options.deco_stop_distance;
        let rounded = ceil(raw / distance) * distance;
        rounded.max(self.options.last_stop_depth)
    }

    /// Next stop shallower than `depth`, aligned to the stop distance.
    pub fn next_stop(&self, depth: f64) -> f64 {
        let last_stop = self.options.last_stop_depth;
        if depth <= last_stop + DEPTH_TOLERANCE {
            return 0.0;
        }

        let distance = self.options.deco_stop_distance;
        let mut rounded = floor(depth / distance) * distance;
        if fabs(rounded - depth) < DEPTH_TOLERANCE {
            rounded = depth - distance;
        }
        rounded.max(last_stop)
    }

    pub fn best_deco_gas(&self) -> GasId {
        let options = BestGasOptions {
            current_depth: self.current_depth(),
            max_ppo2: self.options.max_ppo2,
            max_deco_ppo2: self.options.max_deco_ppo2,
            max_end: self.options.max_end,
            oxygen_narcotic: self.options.oxygen_narcotic,
            current_gas: self.current_gas,
        };
        self.gases.best_gas(&options, &self.converter)
    }

    /// Only a different gas with more oxygen is worth the switch.
    pub fn should_switch_to(&self, candidate: GasId) -> Result<bool, DecoError> {
        if candidate == self.current_gas {
            return Ok(false);
        }
        Ok(self.gas(candidate)?.fo2() > self.current_gas()?.fo2())
    }

    pub fn add_safety_stop(&self) -> bool {
        if !self.is_at_last_stop_depth() {
            return false;
        }
        match self.options.safety_stop {
            SafetyStop::Never => false,
            SafetyStop::Always => true,
            SafetyStop::Auto => self.max_depth > self.options.minimum_auto_stop_depth,
        }
    }

    pub fn add_stop_segment(&mut self, duration: u32) -> Segment {
        let depth = self.current_depth();
        self.segments.add_flat(depth, self.current_gas, duration)
    }

    /// Leg to `next_stop` at the speed of the current depth band.
    pub fn add_ascent_segment(&mut self, next_stop: f64) -> Segment {
        let current_depth = self.current_depth();
        let speed = self.speeds.ascent(current_depth);
        let seconds = (current_depth - next_stop) * ONE_MINUTE as f64 / speed;
        let duration = ceil(seconds - 1e-9).max(0.0) as u32;
        self.segments.add_change_to(next_stop, self.current_gas, duration)
    }

    /// Flat leg spent switching, none when the switch takes no time.
    pub fn add_gas_switch_segment(&mut self) -> Option<Segment> {
        let duration = minutes_to_seconds(self.options.gas_switch_duration);
        if duration == 0 {
            return None;
        }
        Some(self.add_stop_segment(duration))
    }

    /// Stores one simulated second spent at `depth`.
    pub(crate) fn record_statistics(&mut self, depth: f64) {
        if self.statistics.is_none() {
            return;
        }

        let ceiling = self.raw_ceiling();
        let Some(statistics) = self.statistics.as_mut() else {
            return;
        };
        statistics.ceilings.push(Ceiling { time: self.run_time, depth: ceiling });
        statistics
            .tissue_over_pressures
            .push(self.tissues.saturation_ratio(self.converter.to_bar(depth)));
        statistics.tissues_history.push(self.tissues.to_loaded());
    }

    pub fn create_memento(&self) -> ContextMemento {
        ContextMemento {
            tissues: self.tissues,
            segments_len: self.segments.len(),
            run_time: self.run_time,
            current_gas: self.current_gas,
            statistics_len: self.statistics.as_ref().map_or(0, Statistics::len),
        }
    }

    /// Drops everything simulated after the memento was taken.
    pub fn restore(&mut self, memento: &ContextMemento) {
        self.tissues = memento.tissues;
        self.segments.truncate(memento.segments_len);
        self.run_time = memento.run_time;
        self.current_gas = memento.current_gas;
        if let Some(statistics) = self.statistics.as_mut() {
            statistics.truncate(memento.statistics_len);
        }
    }

    pub fn into_parts(self) -> (Segments, Tissues, Option<Statistics>) {
        (self.segments, self.tissues, self.statistics)
    }
}
