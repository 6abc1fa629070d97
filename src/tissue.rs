#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::f64::consts::LN_2;
use defmt::{Format, Formatter};
use libm::exp;

use crate::gas::Gas;
use crate::m_value::{coefficients, m_value};
use crate::zh16c::{ZhL16cGf, COMPARTMENTS};
use crate::{DecoError, FN2_AIR, WATER_VAPOUR_PRESSURE};

/// Inert gas partial pressures loaded in one compartment, in bar.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tissue {
    #[cfg_attr(feature = "serde", serde(rename = "pN2"))]
    pub load_n2: f64,
    #[cfg_attr(feature = "serde", serde(rename = "pHe"))]
    pub load_he: f64,
}

impl Format for Tissue {
    fn format(&self, f: Formatter) {
        defmt::write!(f, "Tissue {{ load_n2: {:?}, load_he: {:?} }}", self.load_n2, self.load_he);
    }
}

impl Tissue {
    /// Tissue saturated by breathing air at the given surface pressure.
    pub fn at_surface(surface_pressure: f64) -> Self {
        Tissue {
            load_n2: (surface_pressure - WATER_VAPOUR_PRESSURE) * FN2_AIR,
            load_he: 0.0,
        }
    }

    pub fn total(&self) -> f64 {
        self.load_n2 + self.load_he
    }
}

/// Short exposure fed into the Schreiner equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadSegment {
    /// Ambient pressure at the start, in bar.
    pub start_pressure: f64,
    /// In seconds.
    pub duration: f64,
    /// Rate of ambient pressure change in bar/s, 0 for flat exposure.
    pub speed: f64,
}

impl LoadSegment {
    pub fn new(start_pressure: f64, duration: f64, speed: f64) -> Self {
        LoadSegment { start_pressure, duration, speed }
    }

    pub fn flat(pressure: f64, duration: f64) -> Self {
        LoadSegment::new(pressure, duration, 0.0)
    }
}

// pt(t) = palv0 + R(t - 1/k) - [palv0 - pt0 - R/k] * e^(-kt)
// pt(t) -> partial pressure of the gas in the tissue at time t
// pt0 -> initial partial pressure of the gas in the tissue at t=0
// palv0 -> initial alveolar partial pressure of the gas in the mix at t=0
// k -> tissue time constant ln(2) / half time
// R -> rate of change of the inert gas partial pressure in the alveoli (bar/s)
//      R = Q * Ramb, Q is the inert gas fraction and Ramb the ambient pressure change rate
// t -> time in seconds
fn load_gas(segment: &LoadSegment, f_gas: f64, p_begin: f64, half_time: f64) -> f64 {
    let k = LN_2 / (half_time * 60.0);
    let p_alveolar = ((segment.start_pressure - WATER_VAPOUR_PRESSURE) * f_gas).max(0.0);
    let rate = segment.speed * f_gas;
    let time = segment.duration;
    let loaded = p_alveolar + rate * (time - 1.0 / k) - (p_alveolar - p_begin - rate / k) * exp(-k * time);
    loaded.max(0.0)
}

pub fn calculate_tissue(mut tissue: Tissue, tissue_index: usize, segment: &LoadSegment, gas: &Gas) -> Tissue {
    tissue.load_n2 = load_gas(segment, gas.fn2(), tissue.load_n2, ZhL16cGf::N2_HALF_LIFE[tissue_index]);
    tissue.load_he = load_gas(segment, gas.fhe(), tissue.load_he, ZhL16cGf::HE_HALF_LIFE[tissue_index]);
    tissue
}

/// The 16 compartments of one diver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tissues {
    compartments: [Tissue; COMPARTMENTS],
}

impl Tissues {
    pub fn create(surface_pressure: f64) -> Self {
        Tissues {
            compartments: [Tissue::at_surface(surface_pressure); COMPARTMENTS],
        }
    }

    /// Rebuilds the model from a previously captured state.
    pub fn from_loaded(loaded: &[Tissue]) -> Result<Self, DecoError> {
        Self::validate(loaded)?;
        let mut compartments = [Tissue::default(); COMPARTMENTS];
        compartments.copy_from_slice(loaded);
        Ok(Tissues { compartments })
    }

    pub fn validate(loaded: &[Tissue]) -> Result<(), DecoError> {
        if loaded.len() != COMPARTMENTS {
            return Err(DecoError::InvalidTissueCount {
                expected: COMPARTMENTS,
                found: loaded.len(),
            });
        }

        match loaded.iter().position(|t| !(t.load_n2 >= 0.0 && t.load_he >= 0.0)) {
            Some(index) => Err(DecoError::NegativeTissuePressure { index }),
            None => Ok(()),
        }
    }

    pub fn to_loaded(&self) -> [Tissue; COMPARTMENTS] {
        self.compartments
    }

    pub fn compartments(&self) -> &[Tissue; COMPARTMENTS] {
        &self.compartments
    }

    /// Loads all compartments, returns the summed change of total inert gas pressure.
    /// Zero change means the tissues are in equilibrium with the breathed gas.
    pub fn load(&mut self, segment: &LoadSegment, gas: &Gas) -> f64 {
        let mut change = 0.0;
        for i in 0..COMPARTMENTS {
            let before = self.compartments[i].total();
            self.compartments[i] = calculate_tissue(self.compartments[i], i, segment, gas);
            change += self.compartments[i].total() - before;
        }
        change
    }

    /// Highest loading of all compartments as fraction of the M-value gradient.
    /// 0 up to equilibrium with ambient pressure, above 1 the M-value is exceeded.
    pub fn gradient_factor(&self, amb_pressure: f64) -> f64 {
        self.saturation_ratio(amb_pressure)
            .iter()
            .fold(0.0, |max, ratio| if *ratio > max { *ratio } else { max })
    }

    /// Signed position of each compartment relative to its M-value line.
    /// Negative while on-gassing, above 1 the M-value is exceeded.
    pub fn saturation_ratio(&self, amb_pressure: f64) -> [f64; COMPARTMENTS] {
        let mut ratios = [0.0; COMPARTMENTS];
        for (i, tissue) in self.compartments.iter().enumerate() {
            let gradient = m_value(tissue, i, amb_pressure) - amb_pressure;
            ratios[i] = (tissue.total() - amb_pressure) / gradient;
        }
        ratios
    }

    /// Weighted Bühlmann coefficients of a compartment.
    pub fn coefficients(&self, tissue_index: usize) -> (f64, f64) {
        coefficients(&self.compartments[tissue_index], tissue_index)
    }
}

#[test]
fn test_surface_tissues_are_not_loaded() {
    let tissues = Tissues::create(1.01325);
    assert_eq!(tissues.gradient_factor(1.01325), 0.0);
    assert!(tissues.saturation_ratio(1.01325).iter().all(|r| *r < 0.0));
}

#[test]
fn test_flat_load_matches_haldane() {
    // without pressure change Schreiner reduces to the Haldane equation
    let tissue = Tissue::at_surface(1.0);
    let segment = LoadSegment::flat(5.0, 4.0 * 60.0);
    let loaded = calculate_tissue(tissue, 0, &segment, &Gas::air());
    let inspired = (5.0 - WATER_VAPOUR_PRESSURE) * FN2_AIR;
    let expected = tissue.load_n2 + (inspired - tissue.load_n2) * 0.5;
    assert!((loaded.load_n2 - expected).abs() < 1e-9);
}
