use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use defmt::Format;
use libm::round;

use crate::pressure::DepthConverter;
use crate::{DecoError, DEPTH_TOLERANCE, FN2_AIR, FO2_AIR, MIN_PPO2};

/// Breathing mix, immutable once created.
/// Nitrogen is the remainder to the sum of oxygen and helium.
#[derive(Debug, Clone, Copy, PartialEq, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GasFractions", into = "GasFractions"))]
pub struct Gas {
    fo2: f64,
    fhe: f64,
}

/// Raw fractions, only used to check deserialized gases.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GasFractions {
    pub fo2: f64,
    pub fhe: f64,
}

impl TryFrom<GasFractions> for Gas {
    type Error = DecoError;

    fn try_from(fractions: GasFractions) -> Result<Self, Self::Error> {
        Gas::new(fractions.fo2, fractions.fhe)
    }
}

impl From<Gas> for GasFractions {
    fn from(gas: Gas) -> Self {
        GasFractions { fo2: gas.fo2, fhe: gas.fhe }
    }
}

fn is_fraction(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

impl Gas {
    pub fn new(fo2: f64, fhe: f64) -> Result<Self, DecoError> {
        if !is_fraction(fo2) || !is_fraction(fhe) || fo2 + fhe > 1.0 {
            return Err(DecoError::InvalidGasFractions { fo2, fhe });
        }
        Ok(Gas { fo2, fhe })
    }

    pub fn air() -> Self {
        Gas { fo2: FO2_AIR, fhe: 0.0 }
    }

    pub fn oxygen() -> Self {
        Gas { fo2: 1.0, fhe: 0.0 }
    }

    pub fn nitrox(fo2: f64) -> Result<Self, DecoError> {
        Gas::new(fo2, 0.0)
    }

    pub fn trimix(fo2: f64, fhe: f64) -> Result<Self, DecoError> {
        Gas::new(fo2, fhe)
    }

    /// Copy with new oxygen fraction, helium is reduced to keep the sum within 1.
    pub fn with_o2(self, fo2: f64) -> Result<Self, DecoError> {
        if !is_fraction(fo2) {
            return Err(DecoError::InvalidGasFractions { fo2, fhe: self.fhe });
        }
        Ok(Gas { fo2, fhe: self.fhe.min(1.0 - fo2) })
    }

    /// Copy with new helium fraction, oxygen is reduced to keep the sum within 1.
    pub fn with_he(self, fhe: f64) -> Result<Self, DecoError> {
        if !is_fraction(fhe) {
            return Err(DecoError::InvalidGasFractions { fo2: self.fo2, fhe });
        }
        Ok(Gas { fo2: self.fo2.min(1.0 - fhe), fhe })
    }

    pub fn fo2(&self) -> f64 {
        self.fo2
    }

    pub fn fhe(&self) -> f64 {
        self.fhe
    }

    pub fn fn2(&self) -> f64 {
        (1.0 - self.fo2 - self.fhe).max(0.0)
    }

    /// Identifies the composition in per mille, equal mixes share the code.
    pub fn content_code(&self) -> u32 {
        let o2 = round(self.fo2 * 1000.0) as u32;
        let he = round(self.fhe * 1000.0) as u32;
        o2 * 1000 + he
    }

    pub fn is_oxygen(&self) -> bool {
        self.content_code() == Gas::oxygen().content_code()
    }

    pub fn ppo2(&self, depth: f64, converter: &DepthConverter) -> f64 {
        converter.to_bar(depth) * self.fo2
    }

    pub fn is_breathable_at(&self, depth: f64, converter: &DepthConverter) -> bool {
        self.ppo2(depth, converter) >= MIN_PPO2
    }

    /// Maximum operating depth in meters for given ppO2.
    pub fn mod_depth(&self, ppo2: f64, converter: &DepthConverter) -> f64 {
        if self.fo2 <= 0.0 {
            return f64::INFINITY;
        }
        converter.from_bar(ppo2 / self.fo2)
    }

    /// Shallowest depth where the mix isn't hypoxic.
    pub fn ceiling_depth(&self, converter: &DepthConverter) -> f64 {
        if self.fo2 <= 0.0 {
            return f64::INFINITY;
        }
        converter.from_bar(MIN_PPO2 / self.fo2)
    }

    /// Equivalent narcotic depth in meters, helium isn't narcotic.
    pub fn end(&self, depth: f64, oxygen_narcotic: bool, converter: &DepthConverter) -> f64 {
        let (narcotic, air_narcotic) = if oxygen_narcotic {
            (self.fo2 + self.fn2(), 1.0)
        } else {
            (self.fn2(), FN2_AIR)
        };
        converter.from_bar(converter.to_bar(depth) * narcotic / air_narcotic)
    }

    /// Parses standard names: `Air`, `Oxygen`, `EAN32` or trimix `18/45`.
    pub fn from_name(name: &str) -> Option<Gas> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("air") {
            return Some(Gas::air());
        }
        if name.eq_ignore_ascii_case("oxygen") || name.eq_ignore_ascii_case("o2") {
            return Some(Gas::oxygen());
        }

        if let Some((o2, he)) = name.split_once('/') {
            let o2: u8 = o2.trim().parse().ok()?;
            let he: u8 = he.trim().parse().ok()?;
            return Gas::new(o2 as f64 / 100.0, he as f64 / 100.0).ok();
        }

        let prefix = name.get(..3)?;
        if !prefix.eq_ignore_ascii_case("ean") {
            return None;
        }
        let o2: u8 = name.get(3..)?.parse().ok()?;
        Gas::nitrox(o2 as f64 / 100.0).ok()
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o2 = round(self.fo2 * 100.0) as u32;
        let he = round(self.fhe * 100.0) as u32;
        if self.is_oxygen() {
            write!(f, "Oxygen")
        } else if self.content_code() == Gas::air().content_code() {
            write!(f, "Air")
        } else if he == 0 {
            write!(f, "EAN{}", o2)
        } else {
            write!(f, "{}/{}", o2, he)
        }
    }
}

/// Stable identity of a gas registered in [`Gases`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GasId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GasEntry {
    pub id: GasId,
    pub gas: Gas,
    pub bottom: bool,
}

/// Limits applied when looking for a better gas during ascent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestGasOptions {
    pub current_depth: f64,
    pub max_ppo2: f64,
    pub max_deco_ppo2: f64,
    pub max_end: f64,
    pub oxygen_narcotic: bool,
    pub current_gas: GasId,
}

/// Gas inventory of one dive.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gases {
    entries: Vec<GasEntry>,
}

impl Gases {
    pub fn new() -> Self {
        Gases { entries: Vec::new() }
    }

    /// Inventory with one bottom gas.
    pub fn with_bottom_gas(gas: Gas) -> (Self, GasId) {
        let mut gases = Gases::new();
        let id = gases.add_bottom_gas(gas);
        (gases, id)
    }

    pub fn add_bottom_gas(&mut self, gas: Gas) -> GasId {
        self.register(gas, true)
    }

    pub fn add_deco_gas(&mut self, gas: Gas) -> GasId {
        self.register(gas, false)
    }

    fn register(&mut self, gas: Gas, bottom: bool) -> GasId {
        let id = GasId(self.entries.len() as u16);
        self.entries.push(GasEntry { id, gas, bottom });
        id
    }

    pub fn get(&self, id: GasId) -> Option<Gas> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.gas)
    }

    pub fn contains(&self, id: GasId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn has_bottom_gas(&self) -> bool {
        self.entries.iter().any(|e| e.bottom)
    }

    pub fn is_bottom_gas(&self, id: GasId) -> bool {
        self.entries.iter().any(|e| e.id == id && e.bottom)
    }

    pub fn first_bottom_gas(&self) -> Option<GasId> {
        self.entries.iter().find(|e| e.bottom).map(|e| e.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GasEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Richest oxygen mix usable at the current depth. A candidate has to be within its
    /// MOD (rounded to whole meters, so oxygen counts at 6 m) and within `max_end`. Bottom
    /// gases are limited by `max_ppo2`, deco gases by `max_deco_ppo2`. The first one wins on equal oxygen, the current gas is kept if nothing fits.
    pub fn best_gas(&self, options: &BestGasOptions, converter: &DepthConverter) -> GasId {
        let mut found: Option<&GasEntry> = None;
        for entry in self.entries.iter() {
            let max_ppo2 = if entry.bottom { options.max_ppo2 } else { options.max_deco_ppo2 };
            let mod_depth = round(entry.gas.mod_depth(max_ppo2, converter));
            let end = entry.gas.end(options.current_depth, options.oxygen_narcotic, converter);
            if options.current_depth > mod_depth || end > options.max_end + DEPTH_TOLERANCE {
                continue;
            }

            if found.is_none_or(|best| entry.gas.fo2() > best.gas.fo2()) {
                found = Some(entry);
            }
        }

        found.map_or(options.current_gas, |entry| entry.id)
    }

    /// Leanest mix still breathable at the depth, used for air breaks when the
    /// back gas is hypoxic there. Falls back to `current_gas`.
    pub fn air_break_gas(&self, depth: f64, current_gas: GasId, converter: &DepthConverter) -> GasId {
        let mut found: Option<&GasEntry> = None;
        for entry in self.entries.iter() {
            if !entry.gas.is_breathable_at(depth, converter) {
                continue;
            }

            if found.is_none_or(|best| entry.gas.fo2() < best.gas.fo2()) {
                found = Some(entry);
            }
        }

        found.map_or(current_gas, |entry| entry.id)
    }
}
