#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use defmt::Format;

use crate::pressure::Salinity;
use crate::DecoError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SafetyStop {
    Never,
    /// Only for dives deeper than [`Options::minimum_auto_stop_depth`].
    #[default]
    Auto,
    Always,
}

/// Oxygen stops interrupted by back gas. Durations in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AirBreakOptions {
    pub enabled: bool,
    pub oxygen_duration: f64,
    pub bottom_gas_duration: f64,
}

impl Default for AirBreakOptions {
    fn default() -> Self {
        AirBreakOptions {
            enabled: false,
            oxygen_duration: 20.0,
            bottom_gas_duration: 5.0,
        }
    }
}

/// Planner configuration, not changed during a run.
///
/// Depths are in meters, speeds in meters per minute and durations in minutes.
/// Gradient factors are fractions, so 0.4 stands for 40 %.
#[derive(Debug, Clone, Copy, PartialEq, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    pub gf_low: f64,
    pub gf_high: f64,
    pub max_ppo2: f64,
    pub max_deco_ppo2: f64,
    pub salinity: Salinity,
    /// Meters above sea level.
    pub altitude: f64,
    pub round_stops_to_minutes: bool,
    pub round_runtimes_to_minutes: bool,
    pub last_stop_depth: f64,
    pub deco_stop_distance: f64,
    pub minimum_auto_stop_depth: f64,
    pub safety_stop: SafetyStop,
    /// Maximum equivalent narcotic depth of a deco gas.
    pub max_end: f64,
    pub oxygen_narcotic: bool,
    /// Used deeper than half of the average depth of the deepest part.
    pub ascent_speed_50perc: f64,
    pub ascent_speed_50perc_to_6m: f64,
    pub ascent_speed_6m: f64,
    pub descent_speed: f64,
    pub gas_switch_duration: f64,
    pub problem_solving_duration: f64,
    pub air_breaks: AirBreakOptions,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            gf_low: 0.4,
            gf_high: 0.85,
            max_ppo2: 1.4,
            max_deco_ppo2: 1.6,
            salinity: Salinity::Salt,
            altitude: 0.0,
            round_stops_to_minutes: false,
            round_runtimes_to_minutes: false,
            last_stop_depth: 3.0,
            deco_stop_distance: 3.0,
            minimum_auto_stop_depth: 10.0,
            safety_stop: SafetyStop::Auto,
            max_end: 30.0,
            oxygen_narcotic: true,
            ascent_speed_50perc: 9.0,
            ascent_speed_50perc_to_6m: 6.0,
            ascent_speed_6m: 3.0,
            descent_speed: 18.0,
            gas_switch_duration: 1.0,
            problem_solving_duration: 1.0,
            air_breaks: AirBreakOptions::default(),
        }
    }
}

impl Options {
    pub fn new(gf_low: f64, gf_high: f64, max_ppo2: f64, max_deco_ppo2: f64, salinity: Salinity) -> Self {
        Options {
            gf_low,
            gf_high,
            max_ppo2,
            max_deco_ppo2,
            salinity,
            ..Options::default()
        }
    }

    pub fn with_gradient_factors(mut self, gf_low: f64, gf_high: f64) -> Self {
        self.gf_low = gf_low;
        self.gf_high = gf_high;
        self
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn with_salinity(mut self, salinity: Salinity) -> Self {
        self.salinity = salinity;
        self
    }

    pub fn with_safety_stop(mut self, safety_stop: SafetyStop) -> Self {
        self.safety_stop = safety_stop;
        self
    }

    pub fn with_last_stop_depth(mut self, last_stop_depth: f64) -> Self {
        self.last_stop_depth = last_stop_depth;
        self
    }

    pub fn with_deco_stop_distance(mut self, deco_stop_distance: f64) -> Self {
        self.deco_stop_distance = deco_stop_distance;
        self
    }

    /// Same speed for all three ascent bands.
    pub fn with_ascent_speed(mut self, speed: f64) -> Self {
        self.ascent_speed_50perc = speed;
        self.ascent_speed_50perc_to_6m = speed;
        self.ascent_speed_6m = speed;
        self
    }

    pub fn with_descent_speed(mut self, speed: f64) -> Self {
        self.descent_speed = speed;
        self
    }

    pub fn with_rounding(mut self, stops_to_minutes: bool, runtimes_to_minutes: bool) -> Self {
        self.round_stops_to_minutes = stops_to_minutes;
        self.round_runtimes_to_minutes = runtimes_to_minutes;
        self
    }

    pub fn with_gas_switch_duration(mut self, minutes: f64) -> Self {
        self.gas_switch_duration = minutes;
        self
    }

    pub fn with_air_breaks(mut self, air_breaks: AirBreakOptions) -> Self {
        self.air_breaks = air_breaks;
        self
    }

    pub fn with_max_end(mut self, max_end: f64, oxygen_narcotic: bool) -> Self {
        self.max_end = max_end;
        self.oxygen_narcotic = oxygen_narcotic;
        self
    }

    pub fn validate(&self) -> Result<(), DecoError> {
        let in_range = |gf: f64| gf > 0.0 && gf <= 1.0;
        if !in_range(self.gf_low) || !in_range(self.gf_high) {
            return Err(DecoError::InvalidGradientFactors {
                low: self.gf_low,
                high: self.gf_high,
            });
        }

        if !(self.altitude >= 0.0) {
            return Err(DecoError::NegativeAltitude(self.altitude));
        }

        let positive = [
            self.deco_stop_distance,
            self.ascent_speed_50perc,
            self.ascent_speed_50perc_to_6m,
            self.ascent_speed_6m,
            self.descent_speed,
        ];
        if let Some(invalid) = positive.iter().find(|value| !(**value > 0.0)) {
            return Err(DecoError::InvalidDistance(*invalid));
        }

        let non_negative = [
            self.last_stop_depth,
            self.minimum_auto_stop_depth,
            self.gas_switch_duration,
            self.problem_solving_duration,
            self.air_breaks.oxygen_duration,
            self.air_breaks.bottom_gas_duration,
        ];
        if let Some(invalid) = non_negative.iter().find(|value| !(**value >= 0.0)) {
            return Err(DecoError::InvalidDistance(*invalid));
        }

        if self.air_breaks.enabled && !(self.air_breaks.oxygen_duration > 0.0) {
            return Err(DecoError::InvalidDistance(self.air_breaks.oxygen_duration));
        }

        Ok(())
    }

    /// Parses options from JSON, missing keys keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, DecoError> {
        let options: Options = serde_json::from_str(json).map_err(|e| DecoError::InvalidOptions {
            line: e.line(),
            column: e.column(),
        })?;
        options.validate()?;
        Ok(options)
    }
}

#[test]
fn test_default_options_are_valid() {
    assert_eq!(Options::default().validate(), Ok(()));
}

#[test]
fn test_gradient_factors_out_of_range() {
    let options = Options::default().with_gradient_factors(0.0, 0.85);
    assert_eq!(
        options.validate(),
        Err(DecoError::InvalidGradientFactors { low: 0.0, high: 0.85 })
    );
}
