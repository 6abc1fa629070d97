#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use defmt::Format;
use libm::pow;

/// Standard atmospheric pressure at sea level, in bar.
pub const STANDARD_PRESSURE: f64 = 1.01325;
pub const GRAVITY: f64 = 9.80665;
const PASCALS_PER_BAR: f64 = 100_000.0;

// International standard atmosphere
const SEA_LEVEL_TEMPERATURE: f64 = 288.15; // K
const LAPSE_RATE: f64 = -0.0065; // K/m
const MOLAR_MASS: f64 = 0.0289644; // kg/mol
const GAS_CONSTANT: f64 = 8.31432; // J/(mol K)

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Salinity {
    Fresh,
    /// EN13319
    Brackish,
    #[default]
    Salt,
}

impl Salinity {
    /// Water density in kg/m3.
    pub fn density(self) -> f64 {
        match self {
            Salinity::Fresh => 1000.0,
            Salinity::Brackish => 1020.0,
            Salinity::Salt => 1030.0,
        }
    }
}

/// Barometric pressure at altitude in meters above sea level, in bar.
pub fn altitude_pressure(altitude: f64) -> f64 {
    let base = SEA_LEVEL_TEMPERATURE / (SEA_LEVEL_TEMPERATURE + LAPSE_RATE * altitude);
    let exponent = (GRAVITY * MOLAR_MASS) / (GAS_CONSTANT * LAPSE_RATE);
    STANDARD_PRESSURE * pow(base, exponent)
}

/// Converts depth in meters to absolute pressure in bar and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthConverter {
    density: f64,
    surface_pressure: f64,
}

impl DepthConverter {
    pub fn new(salinity: Salinity, altitude: f64) -> Self {
        DepthConverter {
            density: salinity.density(),
            surface_pressure: altitude_pressure(altitude),
        }
    }

    pub fn for_salt_water() -> Self {
        DepthConverter::new(Salinity::Salt, 0.0)
    }

    pub fn for_fresh_water() -> Self {
        DepthConverter::new(Salinity::Fresh, 0.0)
    }

    pub fn surface_pressure(&self) -> f64 {
        self.surface_pressure
    }

    /// Pressure change for one meter of water column.
    pub fn bar_per_meter(&self) -> f64 {
        self.density * GRAVITY / PASCALS_PER_BAR
    }

    pub fn to_bar(&self, depth: f64) -> f64 {
        depth * self.bar_per_meter() + self.surface_pressure
    }

    /// Depth for given absolute pressure, anything lower than the surface pressure is surface.
    pub fn from_bar(&self, bars: f64) -> f64 {
        if bars <= self.surface_pressure {
            return 0.0;
        }
        (bars - self.surface_pressure) / self.bar_per_meter()
    }
}

#[test]
fn test_sea_level_pressure() {
    assert!((altitude_pressure(0.0) - STANDARD_PRESSURE).abs() < 1e-12);
}

#[test]
fn test_altitude_lowers_pressure() {
    let pressure = altitude_pressure(1000.0);
    assert!(pressure > 0.89 && pressure < 0.90, "{}", pressure);
}

#[test]
fn test_depth_round_trip() {
    let converter = DepthConverter::new(Salinity::Brackish, 500.0);
    let depth = converter.from_bar(converter.to_bar(42.0));
    assert!((depth - 42.0).abs() < 1e-9);
    assert_eq!(converter.from_bar(0.5), 0.0);
}
