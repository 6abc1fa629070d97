#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use defmt::Format;
use tracing::debug;

use crate::context::AlgorithmContext;
use crate::segments::Segments;
use crate::simulate::{replay, swim};
use crate::{DecoError, DEPTH_TOLERANCE, ONE_MINUTE};

/// Dives never deeper than this have no limit. ZH-L16C with a high gfHigh would
/// still find one after hours of saturation of the slowest compartments.
pub const SHALLOW_DIVE_DEPTH: f64 = 10.0;

/// Bottom time left at the current depth before a stop becomes mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoDecoLimit {
    Minutes(u32),
    /// Tissues saturate before any ceiling appears.
    Unlimited,
}

impl NoDecoLimit {
    pub fn as_minutes(&self) -> f64 {
        match self {
            NoDecoLimit::Minutes(minutes) => *minutes as f64,
            NoDecoLimit::Unlimited => f64::INFINITY,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, NoDecoLimit::Unlimited)
    }
}

/// Replays the profile and hovers at its last depth with its last gas minute by minute.
/// The limit counts whole minutes of the whole dive, including the replayed part.
/// A dive staying within [`SHALLOW_DIVE_DEPTH`] without a ceiling is unlimited.
pub fn no_deco_limit(context: &mut AlgorithmContext, plan: &Segments) -> Result<NoDecoLimit, DecoError> {
    replay(context, plan.items())?;

    if context.current_depth() <= 0.0 {
        return Ok(NoDecoLimit::Unlimited);
    }

    if context.raw_ceiling() > 0.0 {
        let limit = NoDecoLimit::Minutes(context.run_time / ONE_MINUTE);
        debug!(run_time = context.run_time, "no deco limit already exceeded");
        return Ok(limit);
    }

    if context.max_depth() <= SHALLOW_DIVE_DEPTH + DEPTH_TOLERANCE {
        debug!(max_depth = context.max_depth(), "shallow dive, no deco limit");
        return Ok(NoDecoLimit::Unlimited);
    }

    loop {
        let segment = context.add_stop_segment(ONE_MINUTE);
        let change = swim(context, &segment)?;

        if context.raw_ceiling() > 0.0 {
            let minutes = (context.run_time / ONE_MINUTE).saturating_sub(1);
            debug!(minutes, "no deco limit found");
            return Ok(NoDecoLimit::Minutes(minutes));
        }

        if change <= 0.0 {
            debug!(run_time = context.run_time, "tissues saturated, no deco limit");
            return Ok(NoDecoLimit::Unlimited);
        }
    }
}
