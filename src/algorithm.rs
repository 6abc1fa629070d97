//! Decompression planner driving the ascent.
//!
//! After the user profile is replayed, the ascent is planned in steps of the stop
//! distance. At each step a better gas is tried first, then the minimal stop at the
//! current depth is searched, the safety stop is added and finally the diver ascends
//! to the next stop. Stop durations are found by [`BinaryIntervalSearch`] probing
//! from a [`ContextMemento`](crate::context::ContextMemento), so each attempt starts
//! from the same state.

use alloc::vec::Vec;

use tracing::{debug, instrument, trace, warn};

use crate::air_break::{oxygen_at_stop, stay_with_air_breaks};
use crate::context::{AlgorithmContext, SAFETY_STOP_DURATION};
use crate::gas::{Gas, Gases};
use crate::ndl::{self, NoDecoLimit};
use crate::pressure::altitude_pressure;
use crate::profile::{AlgorithmParams, CalculatedProfile, CalculatedProfileStatistics, ValidationEvent};
use crate::search::{BinaryIntervalSearch, SearchContext};
use crate::segments::Segments;
use crate::simulate::{replay, swim};
use crate::tissue::{LoadSegment, Tissue, Tissues};
use crate::zh16c::COMPARTMENTS;
use crate::{minutes_to_seconds, DecoError, ONE_DAY, ONE_MINUTE};

/// First step of the stop search, doubled until the stop clears.
const ESTIMATION_STEP: u32 = 20 * ONE_MINUTE;

#[derive(Debug, Default, Clone, Copy)]
pub struct BuhlmannAlgorithm;

impl BuhlmannAlgorithm {
    pub fn new() -> Self {
        BuhlmannAlgorithm
    }

    /// Plans the ascent of the profile. A refused plan is not an error, it comes back
    /// with its validation events and the original segments.
    #[instrument(level = "debug", skip_all)]
    pub fn decompression(&self, params: &AlgorithmParams) -> Result<CalculatedProfile, DecoError> {
        let errors = Self::validate(params.segments, params.gases);
        if !errors.is_empty() {
            warn!(?errors, "dive plan refused");
            return Ok(CalculatedProfile::from_errors(params.segments, errors));
        }

        let context = self.plan(params, false)?;
        let (segments, tissues, _) = context.into_parts();
        Ok(CalculatedProfile::from_profile(
            segments.merge_flat(params.segments.len()),
            tissues.to_loaded(),
        ))
    }

    /// Same plan as [`BuhlmannAlgorithm::decompression`] with per second samples.
    #[instrument(level = "debug", skip_all)]
    pub fn decompression_statistics(&self, params: &AlgorithmParams) -> Result<CalculatedProfileStatistics, DecoError> {
        let errors = Self::validate(params.segments, params.gases);
        if !errors.is_empty() {
            warn!(?errors, "dive plan refused");
            return Ok(CalculatedProfileStatistics::from_errors(params.segments, errors));
        }

        let context = self.plan(params, true)?;
        let (segments, tissues, statistics) = context.into_parts();
        let statistics = statistics.unwrap_or_default();
        Ok(CalculatedProfileStatistics {
            profile: CalculatedProfile::from_profile(segments.merge_flat(params.segments.len()), tissues.to_loaded()),
            ceilings: statistics.ceilings,
            tissue_over_pressures: statistics.tissue_over_pressures,
            tissues_history: statistics.tissues_history,
        })
    }

    /// Bottom time available at the last depth of the profile with its last gas.
    #[instrument(level = "debug", skip_all)]
    pub fn no_deco_limit(&self, params: &AlgorithmParams) -> Result<NoDecoLimit, DecoError> {
        if let Some(event) = Self::validate(params.segments, params.gases).first() {
            warn!(%event, "dive plan refused");
            return Err(DecoError::InvalidPlan(*event));
        }

        params.options.validate()?;
        let tissues = self.initial_tissues(params)?;
        let mut context = AlgorithmContext::new(tissues, params.segments, params.gases, params.options, false)?;
        ndl::no_deco_limit(&mut context, params.segments)
    }

    /// Tissues after breathing air at the surface for `surface_interval` seconds.
    /// An infinite interval gives fully desaturated tissues.
    pub fn apply_surface_interval(
        &self,
        tissues: &[Tissue],
        altitude: f64,
        surface_interval: f64,
    ) -> Result<[Tissue; COMPARTMENTS], DecoError> {
        Tissues::validate(tissues)?;
        if !(altitude >= 0.0) {
            return Err(DecoError::NegativeAltitude(altitude));
        }
        if !(surface_interval >= 0.0) {
            return Err(DecoError::NegativeSurfaceInterval(surface_interval));
        }

        let surface_pressure = altitude_pressure(altitude);
        if surface_interval == f64::INFINITY {
            return Ok(Tissues::create(surface_pressure).to_loaded());
        }

        let mut loaded = Tissues::from_loaded(tissues)?;
        loaded.load(&LoadSegment::flat(surface_pressure, surface_interval), &Gas::air());
        Ok(loaded.to_loaded())
    }

    /// Events preventing the plan, empty for a valid one.
    pub fn validate(segments: &Segments, gases: &Gases) -> Vec<ValidationEvent> {
        let mut events = Vec::new();
        if segments.is_empty() {
            events.push(ValidationEvent::NoSegments);
        }

        for (index, segment) in segments.iter().enumerate() {
            if !gases.contains(segment.gas) {
                events.push(ValidationEvent::UnregisteredGas { segment: index });
            }
        }

        if !gases.has_bottom_gas() {
            events.push(ValidationEvent::NoBottomGas);
        }
        events
    }

    fn initial_tissues(&self, params: &AlgorithmParams) -> Result<Tissues, DecoError> {
        let altitude = params.options.altitude;
        match (params.tissues, params.surface_interval) {
            (Some(tissues), Some(interval)) => {
                Tissues::from_loaded(&self.apply_surface_interval(tissues, altitude, interval)?)
            }
            (Some(tissues), None) => Tissues::from_loaded(tissues),
            (None, _) => Ok(Tissues::create(altitude_pressure(altitude))),
        }
    }

    fn plan<'a>(&self, params: &AlgorithmParams<'a>, statistics: bool) -> Result<AlgorithmContext<'a>, DecoError> {
        params.options.validate()?;
        let tissues = self.initial_tissues(params)?;
        let mut context = AlgorithmContext::new(tissues, params.segments, params.gases, params.options, statistics)?;
        replay(&mut context, params.segments.items())?;
        context.start_ascent();

        let mut next_stop = context.next_stop(context.current_depth());
        while !context.is_at_surface() {
            self.try_gas_switch(&mut context)?;
            self.stay_at_deco_stop(&mut context, next_stop)?;
            self.stay_at_safety_stop(&mut context)?;
            self.ascent_to_next_stop(&mut context, next_stop)?;
            next_stop = context.next_stop(next_stop);
        }

        Ok(context)
    }

    fn try_gas_switch(&self, context: &mut AlgorithmContext) -> Result<(), DecoError> {
        let candidate = context.best_deco_gas();
        if !context.should_switch_to(candidate)? {
            return Ok(());
        }

        debug!(depth = context.current_depth(), gas = candidate.0, "gas switch");
        context.current_gas = candidate;
        if let Some(segment) = context.add_gas_switch_segment() {
            swim(context, &segment)?;
        }
        Ok(())
    }

    fn stay_at_deco_stop(&self, context: &mut AlgorithmContext, next_stop: f64) -> Result<(), DecoError> {
        if !self.needs_deco_stop(context, next_stop)? {
            return Ok(());
        }

        let depth = context.current_depth();
        let memento = context.create_memento();
        let search = SearchContext::new(ESTIMATION_STEP, 0, ONE_DAY);
        let found = BinaryIntervalSearch::search(&search, |duration| {
            context.restore(&memento);
            let segment = context.add_stop_segment(duration);
            swim(context, &segment)?;
            let needs_stop = self.needs_deco_stop(context, next_stop)?;
            trace!(depth, duration, needs_stop, "stop attempt");
            Ok(needs_stop)
        })
        .map_err(|error| match error {
            DecoError::UnresolvedSearch { limit } => DecoError::UnresolvedStop { depth, limit },
            other => other,
        })?;
        context.restore(&memento);

        let duration = self.round_stop_duration(context, found);
        debug!(depth, duration, "deco stop");

        let air_breaks = context.options.air_breaks;
        if air_breaks.enabled
            && context.current_gas()?.is_oxygen()
            && duration + oxygen_at_stop(context) > minutes_to_seconds(air_breaks.oxygen_duration)
        {
            return stay_with_air_breaks(context, duration);
        }

        let segment = context.add_stop_segment(duration);
        swim(context, &segment)?;
        Ok(())
    }

    /// One second over the last failing duration, rounded up to the stop granularity.
    /// With runtime rounding the stop is extended to end on a whole minute.
    fn round_stop_duration(&self, context: &AlgorithmContext, found: u32) -> u32 {
        let options = context.options;
        let granularity = if options.round_stops_to_minutes { ONE_MINUTE } else { 1 };
        let mut rounded = (found + 1).div_ceil(granularity) * granularity;

        let run_time = context.run_time;
        if options.round_runtimes_to_minutes && (run_time + rounded - 1) % ONE_MINUTE != 1 {
            rounded += (ONE_MINUTE - (run_time + rounded) % ONE_MINUTE) % ONE_MINUTE;
        }
        rounded
    }

    /// A stop is needed when the next stop is above the ceiling, also after
    /// off-gassing during the ascent to it.
    fn needs_deco_stop(&self, context: &mut AlgorithmContext, next_stop: f64) -> Result<bool, DecoError> {
        if next_stop >= context.ceiling() {
            return Ok(false);
        }

        let memento = context.create_memento();
        let segment = context.add_ascent_segment(next_stop);
        swim(context, &segment)?;
        let ceiling = context.ceiling();
        context.restore(&memento);
        Ok(next_stop < ceiling)
    }

    fn stay_at_safety_stop(&self, context: &mut AlgorithmContext) -> Result<(), DecoError> {
        if !context.add_safety_stop() {
            return Ok(());
        }

        let segment = context.add_stop_segment(SAFETY_STOP_DURATION);
        swim(context, &segment)?;
        Ok(())
    }

    fn ascent_to_next_stop(&self, context: &mut AlgorithmContext, next_stop: f64) -> Result<(), DecoError> {
        let segment = context.add_ascent_segment(next_stop);
        swim(context, &segment)?;
        Ok(())
    }
}
