use tracing::debug;

use crate::context::AlgorithmContext;
use crate::gas::GasId;
use crate::simulate::swim;
use crate::{minutes_to_seconds, DecoError};

/// Splits one oxygen stop into oxygen legs interrupted by back gas breaks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirBreakContext {
    /// Seconds of the stop not yet planned.
    remaining: u32,
    oxygen_duration: u32,
    bottom_gas_duration: u32,
    /// Oxygen already breathed at the stop depth, counted into the first leg.
    breathed: u32,
    oxygen: GasId,
    back_gas: GasId,
    current: GasId,
}

impl AirBreakContext {
    /// The context has to breathe oxygen at the stop depth.
    pub fn new(context: &AlgorithmContext, stop_duration: u32) -> Self {
        let air_breaks = &context.options.air_breaks;
        let oxygen = context.current_gas;
        AirBreakContext {
            remaining: stop_duration,
            oxygen_duration: minutes_to_seconds(air_breaks.oxygen_duration),
            bottom_gas_duration: minutes_to_seconds(air_breaks.bottom_gas_duration),
            breathed: oxygen_at_stop(context),
            oxygen,
            back_gas: Self::back_gas(context, oxygen),
            current: oxygen,
        }
    }

    /// First bottom gas, or the leanest breathable one when it is hypoxic at the stop.
    fn back_gas(context: &AlgorithmContext, oxygen: GasId) -> GasId {
        let depth = context.current_depth();
        let bottom = context.gases.first_bottom_gas().and_then(|id| {
            context
                .gases
                .get(id)
                .filter(|gas| gas.is_breathable_at(depth, &context.converter))
                .map(|_| id)
        });
        bottom.unwrap_or_else(|| context.gases.air_break_gas(depth, oxygen, &context.converter))
    }

    pub fn needs_stop(&self) -> bool {
        self.remaining > 0
    }

    pub fn current_gas(&self) -> GasId {
        self.current
    }

    pub fn back_gas_id(&self) -> GasId {
        self.back_gas
    }

    /// Duration of the next leg, the last one is cut to the rest of the stop.
    pub fn sub_stop_duration(&self) -> u32 {
        let planned = if self.current == self.oxygen {
            self.oxygen_duration.saturating_sub(self.breathed)
        } else {
            self.bottom_gas_duration
        };
        planned.min(self.remaining)
    }

    pub fn next_stop(&mut self, duration: u32) {
        self.remaining -= duration.min(self.remaining);
        self.breathed = 0;
        self.current = if self.current == self.oxygen {
            self.back_gas
        } else {
            self.oxygen
        };
    }
}

/// Seconds of the current gas already breathed at the current depth, the gas
/// switch leg right before the stop.
pub fn oxygen_at_stop(context: &AlgorithmContext) -> u32 {
    match context.segments.last() {
        Some(last) if last.is_flat() && last.gas == context.current_gas => last.duration,
        _ => 0,
    }
}

/// Plans the whole stop with air breaks, oxygen is breathed again at its end.
pub fn stay_with_air_breaks(context: &mut AlgorithmContext, stop_duration: u32) -> Result<(), DecoError> {
    let mut air_breaks = AirBreakContext::new(context, stop_duration);
    let oxygen = context.current_gas;
    debug!(
        depth = context.current_depth(),
        duration = stop_duration,
        "stop split into air breaks"
    );

    while air_breaks.needs_stop() {
        let duration = air_breaks.sub_stop_duration();
        if duration > 0 {
            context.current_gas = air_breaks.current_gas();
            let segment = context.add_stop_segment(duration);
            swim(context, &segment)?;
        }
        air_breaks.next_stop(duration);
    }

    context.current_gas = oxygen;
    Ok(())
}
