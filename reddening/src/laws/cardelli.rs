//! Milky Way extinction law of Cardelli, Clayton & Mathis (1989)
//!
//! The law is defined in inverse microns `x = 1/λ` over `0.3 ≤ x ≤ 10` as
//!
//! ```text
//! A(λ) / A(V) = a(x) + b(x) / Rv
//! ```
//!
//! with `a` and `b` given piecewise over five regimes. Each regime is a closed
//! interval in the paper; where two regimes share a boundary the bluer regime
//! is used.

use ndarray::{Array1, ArrayView1};

use super::color_excess::check_rv;
use super::{inverse_micron, ColorExcessLaw, ExtinctionError, ExtinctionLaw};
use crate::algo::polyval;

/// Lower bound of the valid range in µm⁻¹
pub const CCM_MIN_X: f64 = 0.3;
/// Upper bound of the valid range in µm⁻¹
pub const CCM_MAX_X: f64 = 10.0;

const OPTICAL_A: [f64; 8] = [
    0.32999, -0.7753, 0.01979, 0.72085, -0.02427, -0.50447, 0.17699, 1.0,
];
const OPTICAL_B: [f64; 8] = [
    -2.09002, 5.3026, -0.62251, -5.38434, 1.07233, 2.28305, 1.41338, 0.0,
];
const FAR_UV_A: [f64; 4] = [-0.070, 0.137, -0.628, -1.073];
const FAR_UV_B: [f64; 4] = [0.374, -0.42, 4.257, 13.67];

/// Wavelength regimes of the CCM curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcmRegime {
    /// 0.3 ≤ x < 1.1, power law
    Infrared,
    /// 1.1 ≤ x < 3.3, 7th degree polynomials in `x - 1.82`
    Optical,
    /// 3.3 ≤ x < 5.9, rational form
    NearUv,
    /// 5.9 ≤ x < 8, rational form plus the far-UV curvature terms
    NearUvCurvature,
    /// 8 ≤ x ≤ 10, cubics in `x - 8`
    FarUv,
}

impl CcmRegime {
    /// Regime for an inverse-micron value already known to be in range
    pub fn of(x: f64) -> Self {
        if x < 1.1 {
            CcmRegime::Infrared
        } else if x < 3.3 {
            CcmRegime::Optical
        } else if x < 5.9 {
            CcmRegime::NearUv
        } else if x < 8.0 {
            CcmRegime::NearUvCurvature
        } else {
            CcmRegime::FarUv
        }
    }
}

/// The `(a, b)` coefficient curves at inverse-micron `x`
pub fn ccm_coefficients(x: f64) -> (f64, f64) {
    match CcmRegime::of(x) {
        CcmRegime::Infrared => {
            let p = x.powf(1.61);
            (0.574 * p, -0.527 * p)
        }
        CcmRegime::Optical => {
            let y = x - 1.82;
            (polyval(&OPTICAL_A, y), polyval(&OPTICAL_B, y))
        }
        CcmRegime::NearUv => near_uv(x),
        CcmRegime::NearUvCurvature => {
            let (a, b) = near_uv(x);
            let y = x - 5.9;
            let fa = -0.04473 * y * y - 0.009779 * y.powi(3);
            let fb = 0.2130 * y * y + 0.1207 * y.powi(3);
            (a + fa, b + fb)
        }
        CcmRegime::FarUv => {
            let y = x - 8.0;
            (polyval(&FAR_UV_A, y), polyval(&FAR_UV_B, y))
        }
    }
}

fn near_uv(x: f64) -> (f64, f64) {
    let a = 1.752 - 0.316 * x - 0.104 / ((x - 4.67).powi(2) + 0.341);
    let b = -3.09 + 1.825 * x + 1.206 / ((x - 4.62).powi(2) + 0.263);
    (a, b)
}

/// Milky Way extinction law from Cardelli et al. 1989
///
/// Wavelengths whose inverse-micron value falls outside `[0.3, 10]` are
/// rejected with [`ExtinctionError::Domain`] before any value is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct CardelliLaw {
    normalization: f64,
    rv: f64,
}

impl CardelliLaw {
    /// Create a law with the given color excess and Rv
    pub fn new(ebmv: f64, rv: f64) -> Result<Self, ExtinctionError> {
        let mut law = Self {
            normalization: 1.0,
            rv: check_rv(rv)?,
        };
        law.set_color_excess(ebmv)?;
        Ok(law)
    }

    /// Standard diffuse ISM law (`Rv = 3.1`)
    pub fn milky_way(ebmv: f64) -> Result<Self, ExtinctionError> {
        Self::new(ebmv, 3.1)
    }
}

impl ExtinctionLaw for CardelliLaw {
    fn name(&self) -> &str {
        "Cardelli"
    }

    fn normalization(&self) -> f64 {
        self.normalization
    }

    fn set_normalization(&mut self, normalization: f64) {
        self.normalization = normalization;
    }

    fn shape(&self, wavelengths: ArrayView1<f64>) -> Result<Array1<f64>, ExtinctionError> {
        let x = inverse_micron(wavelengths);

        if let Some((i, &bad)) = x
            .iter()
            .enumerate()
            .find(|(_, x)| !(CCM_MIN_X..=CCM_MAX_X).contains(*x))
        {
            return Err(ExtinctionError::Domain {
                law: self.name().to_string(),
                wavelength: wavelengths[i],
                inverse_micron: bad,
                min_x: CCM_MIN_X,
                max_x: CCM_MAX_X,
            });
        }

        let rv = self.rv;
        Ok(x.mapv_into(|x| {
            let (a, b) = ccm_coefficients(x);
            a + b / rv
        }))
    }
}

impl ColorExcessLaw for CardelliLaw {
    fn rv(&self) -> f64 {
        self.rv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    fn wavelength(x: f64) -> f64 {
        1e4 / x
    }

    #[test]
    fn test_v_band_is_near_unity() {
        let law = CardelliLaw::milky_way(1.0).unwrap();
        // A(V)/A(V) is 1 by construction of the published fit
        assert_abs_diff_eq!(law.shape_at(5510.0).unwrap(), 1.0, epsilon = 5e-3);
    }

    #[test]
    fn test_domain_boundaries_are_inclusive() {
        let law = CardelliLaw::milky_way(0.1).unwrap();
        assert!(law.evaluate_at(wavelength(CCM_MIN_X)).unwrap().is_finite());
        assert!(law.evaluate_at(wavelength(CCM_MAX_X)).unwrap().is_finite());
    }

    #[test]
    fn test_outside_domain_is_error() {
        let law = CardelliLaw::milky_way(0.1).unwrap();
        let err = law.evaluate_at(wavelength(11.0)).unwrap_err();
        assert!(matches!(
            err,
            ExtinctionError::Domain { inverse_micron, .. } if (inverse_micron - 11.0).abs() < 1e-9
        ));
        assert!(law.evaluate_at(wavelength(0.2)).is_err());
    }

    #[test]
    fn test_one_bad_wavelength_rejects_the_array() {
        let law = CardelliLaw::milky_way(0.1).unwrap();
        let wl = array![5000.0, 6000.0, 500.0];
        assert!(matches!(
            law.evaluate(wl.view()),
            Err(ExtinctionError::Domain { wavelength, .. }) if wavelength == 500.0
        ));
    }

    #[test]
    fn test_continuity_at_regime_boundaries() {
        let law = CardelliLaw::milky_way(1.0).unwrap();
        for &x in &[1.1, 3.3, 5.9, 8.0] {
            let below = law.shape_at(wavelength(x - 1e-9)).unwrap();
            let above = law.shape_at(wavelength(x + 1e-9)).unwrap();
            assert_abs_diff_eq!(below, above, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_regime_selection() {
        assert_eq!(CcmRegime::of(0.3), CcmRegime::Infrared);
        assert_eq!(CcmRegime::of(1.1), CcmRegime::Optical);
        assert_eq!(CcmRegime::of(3.3), CcmRegime::NearUv);
        assert_eq!(CcmRegime::of(5.9), CcmRegime::NearUvCurvature);
        assert_eq!(CcmRegime::of(8.0), CcmRegime::FarUv);
        assert_eq!(CcmRegime::of(10.0), CcmRegime::FarUv);
    }

    #[test]
    fn test_far_uv_constants() {
        let (a, b) = ccm_coefficients(8.0);
        assert_relative_eq!(a, -1.073);
        assert_relative_eq!(b, 13.67);
    }

    #[test]
    fn test_array_preserves_order_and_matches_scalar() {
        let law = CardelliLaw::new(0.3, 3.1).unwrap();
        let wl = array![20000.0, 6562.82, 4861.33, 2175.0, 1500.0, 1100.0];
        let values = law.evaluate(wl.view()).unwrap();
        assert_eq!(values.len(), wl.len());
        for (i, &w) in wl.iter().enumerate() {
            assert_relative_eq!(values[i], law.evaluate_at(w).unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rejects_bad_rv() {
        assert!(matches!(
            CardelliLaw::new(0.1, -3.1),
            Err(ExtinctionError::Contract(_))
        ));
    }
}
