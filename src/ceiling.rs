use crate::m_value::coefficients;
use crate::tissue::{Tissue, Tissues};

/// The first stop is kept at least this far below the surface, in bar.
pub const GF_LOW_POSITION_MIN: f64 = 1.0;

/// Lowest ambient pressure the compartment tolerates at a fixed gradient factor, in bar.
#[inline(never)]
pub fn tolerated_pressure(tissue: &Tissue, tissue_index: usize, gf: f64) -> f64 {
    let (a, b) = coefficients(tissue, tissue_index);
    (tissue.total() - a * gf) / (gf / b + 1.0 - gf)
}

/// Highest tolerated pressure of all compartments and the index of the leading one.
#[inline(never)]
pub fn max_ceiling(tissues: &Tissues, gf: f64) -> (f64, usize) {
    let mut max_ceiling = 0.0;
    let mut tissue_index = 0;
    for (i, tissue) in tissues.compartments().iter().enumerate() {
        let tentative_max_ceiling = tolerated_pressure(tissue, i, gf);
        if tentative_max_ceiling > max_ceiling {
            max_ceiling = tentative_max_ceiling;
            tissue_index = i;
        }
    }
    (max_ceiling, tissue_index)
}

/// Gradient factor scaling of the ceiling. gfLow applies at the first stop, gfHigh
/// at the surface and the scaled M-value is interpolated linearly in between.
///
/// The first stop is fixed once, from the gfLow ceiling when the ascent starts, but
/// not shallower than [`GF_LOW_POSITION_MIN`] below the surface. Until then the
/// current gfLow ceiling is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientFactors {
    gf_low: f64,
    gf_high: f64,
    surface_pressure: f64,
    first_stop_pressure: Option<f64>,
}

impl GradientFactors {
    pub fn new(gf_low: f64, gf_high: f64, surface_pressure: f64) -> Self {
        GradientFactors {
            gf_low,
            gf_high,
            surface_pressure,
            first_stop_pressure: None,
        }
    }

    pub fn first_stop_pressure(&self) -> Option<f64> {
        self.first_stop_pressure
    }

    /// Anchors gfLow at the current gfLow ceiling of `tissues`.
    pub fn fix_first_stop(&mut self, tissues: &Tissues) {
        self.first_stop_pressure = Some(self.lowest_first_stop(tissues));
    }

    /// Ceiling pressure in bar.
    pub fn ceiling(&self, tissues: &Tissues) -> f64 {
        let first_stop = match self.first_stop_pressure {
            Some(pressure) => pressure,
            None => self.lowest_first_stop(tissues),
        };
        self.ceiling_at(tissues, first_stop)
    }

    fn lowest_first_stop(&self, tissues: &Tissues) -> f64 {
        let (lowest_ceiling, _) = max_ceiling(tissues, self.gf_low);
        lowest_ceiling.max(self.surface_pressure + GF_LOW_POSITION_MIN)
    }

    fn ceiling_at(&self, tissues: &Tissues, first_stop: f64) -> f64 {
        let mut ceiling = 0.0;
        for (i, tissue) in tissues.compartments().iter().enumerate() {
            if let Some(tolerated) = self.tolerated(tissue, i, first_stop) {
                if tolerated > ceiling {
                    ceiling = tolerated;
                }
            }
        }
        ceiling
    }

    /// The M-value line scaled by gfHigh at the surface and by gfLow at the first stop
    /// is joined by a straight line, the tolerated pressure is where the compartment
    /// pressure crosses it. None when the joined line doesn't rise with depth.
    fn tolerated(&self, tissue: &Tissue, tissue_index: usize, first_stop: f64) -> Option<f64> {
        let (a, b) = coefficients(tissue, tissue_index);
        let surface = self.surface_pressure;
        let surface_m_value = (surface / b + a - surface) * self.gf_high + surface;
        let first_stop_m_value = (first_stop / b + a - first_stop) * self.gf_low + first_stop;
        if surface_m_value >= first_stop_m_value {
            return None;
        }

        let slope = (first_stop_m_value - surface_m_value) / (first_stop - surface);
        Some(surface + (tissue.total() - surface_m_value) / slope)
    }
}

#[test]
fn test_ceiling_with_zero_loads() {
    let tissue = Tissue { load_n2: 0.0, load_he: 0.0 };
    assert!(tolerated_pressure(&tissue, 0, 1.0) < 0.0);
}

#[test]
fn test_single_gradient_factor_uses_plain_formula() {
    let tissues = Tissues::from_loaded(&[Tissue { load_n2: 3.11, load_he: 0.0 }; 16]).unwrap();
    let gradients = GradientFactors::new(0.3, 0.3, 1.01325);
    let (expected, _) = max_ceiling(&tissues, 0.3);
    assert!((gradients.ceiling(&tissues) - expected).abs() < 1e-12);
}

#[test]
fn test_interpolated_between_low_and_high() {
    let tissues = Tissues::from_loaded(&[Tissue { load_n2: 3.11, load_he: 0.0 }; 16]).unwrap();
    let mut gradients = GradientFactors::new(0.3, 0.85, 1.01325);
    gradients.fix_first_stop(&tissues);
    let ceiling = gradients.ceiling(&tissues);
    let (low, _) = max_ceiling(&tissues, 0.3);
    let (high, _) = max_ceiling(&tissues, 0.85);
    assert_eq!(gradients.first_stop_pressure(), Some(low));
    // leading compartment defines the first stop
    assert!(ceiling <= low + 1e-9 && ceiling >= high);
}
