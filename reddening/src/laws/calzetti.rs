//! Calzetti et al. (1994) average starburst attenuation law

use ndarray::{Array1, ArrayView1};

use super::{inverse_micron, ExtinctionError, ExtinctionLaw};
use crate::algo::polyval;

/// Optical depth polynomial Q(x) in inverse microns, highest degree first
const CALZETTI_POLY: [f64; 4] = [0.011, -0.198, 1.509, -2.156];

/// Converts optical depth to magnitudes: `A = (2.5 / ln 10) τ`
const TAU_TO_MAG: f64 = 2.5 / std::f64::consts::LN_10;

/// Average extinction law derived in Calzetti et al. 1994
///
/// With `x = 1/λ` in µm⁻¹ the optical depth shape is
/// `Q(x) = -2.156 + 1.509x - 0.198x² + 0.011x³` and the magnitude shape is
/// `-(2.5/ln 10) Q(x)`, the same sign convention used for optical-depth laws
/// throughout this crate. The polynomial is applied at every wavelength
/// without a range check.
#[derive(Debug, Clone, PartialEq)]
pub struct CalzettiLaw {
    a0: f64,
}

impl CalzettiLaw {
    pub fn new(a0: f64) -> Self {
        Self { a0 }
    }
}

impl Default for CalzettiLaw {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ExtinctionLaw for CalzettiLaw {
    fn name(&self) -> &str {
        "Calzetti"
    }

    fn normalization(&self) -> f64 {
        self.a0
    }

    fn set_normalization(&mut self, normalization: f64) {
        self.a0 = normalization;
    }

    fn shape(&self, wavelengths: ArrayView1<f64>) -> Result<Array1<f64>, ExtinctionError> {
        Ok(inverse_micron(wavelengths).mapv_into(|x| -TAU_TO_MAG * polyval(&CALZETTI_POLY, x)))
    }
}
