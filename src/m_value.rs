use crate::tissue::Tissue;
use crate::zh16c::ZhL16cGf;

/// Nitrogen M-value of a compartment at given ambient pressure, in bar.
pub fn calculate_m_values(amb_pressure: f64, tissue_index: usize) -> f64 {
    amb_pressure / ZhL16cGf::N2_B[tissue_index] + ZhL16cGf::N2_A[tissue_index]
}

/// Bühlmann a/b coefficients weighted by the N2 and He loading of the tissue.
/// Falls back to the nitrogen coefficients for an empty tissue.
pub fn coefficients(tissue: &Tissue, tissue_index: usize) -> (f64, f64) {
    let p_total = tissue.total();
    if p_total <= 0.0 {
        return (ZhL16cGf::N2_A[tissue_index], ZhL16cGf::N2_B[tissue_index]);
    }

    let a = (ZhL16cGf::N2_A[tissue_index] * tissue.load_n2 + ZhL16cGf::HE_A[tissue_index] * tissue.load_he) / p_total;
    let b = (ZhL16cGf::N2_B[tissue_index] * tissue.load_n2 + ZhL16cGf::HE_B[tissue_index] * tissue.load_he) / p_total;
    (a, b)
}

/// M-value for the mixed N2/He loading of the tissue.
pub fn m_value(tissue: &Tissue, tissue_index: usize, amb_pressure: f64) -> f64 {
    let (a, b) = coefficients(tissue, tissue_index);
    amb_pressure / b + a
}
