use tracing::trace;

use crate::DecoError;

/// Limits of one search, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchContext {
    /// Step of the exponential probing, doubled after each miss.
    pub estimation_step: u32,
    pub initial_value: u32,
    pub max_value: u32,
}

impl SearchContext {
    pub fn new(estimation_step: u32, initial_value: u32, max_value: u32) -> Self {
        SearchContext { estimation_step, initial_value, max_value }
    }
}

/// Finds the border of a monotone predicate over durations: the predicate holds
/// for short durations and stops holding from some value on.
pub struct BinaryIntervalSearch;

impl BinaryIntervalSearch {
    /// Returns the last value for which `still_holds` was true, `initial_value`
    /// when it is already false there.
    pub fn search<F>(context: &SearchContext, mut still_holds: F) -> Result<u32, DecoError>
    where
        F: FnMut(u32) -> Result<bool, DecoError>,
    {
        if context.initial_value > context.max_value || context.estimation_step == 0 {
            return Err(DecoError::InvalidSearchInterval {
                initial: context.initial_value,
                max: context.max_value,
            });
        }

        if !still_holds(context.initial_value)? {
            return Ok(context.initial_value);
        }

        let mut low = context.initial_value;
        let mut step = context.estimation_step;
        let high = loop {
            let candidate = low.saturating_add(step).min(context.max_value);
            trace!(candidate, "estimating search interval");
            if !still_holds(candidate)? {
                break candidate;
            }
            if candidate == context.max_value {
                return Err(DecoError::UnresolvedSearch { limit: context.max_value });
            }
            low = candidate;
            step = step.saturating_mul(2);
        };

        // invariant: holds at low, doesn't hold at high
        let mut high = high;
        while high - low > 1 {
            let middle = low + (high - low) / 2;
            if still_holds(middle)? {
                low = middle;
            } else {
                high = middle;
            }
        }

        Ok(low)
    }
}
