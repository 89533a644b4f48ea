//! Laws normalized by the color excess E(B−V)
//!
//! For these laws the stored normalization is related to the color excess
//! through the total-to-selective extinction ratio `Rv = A_V / E(B−V)`:
//!
//! ```text
//! E(B−V) = normalization × shape(λ_V) / Rv
//! ```
//!
//! Only the normalization is stored; the color excess is always derived.

use super::{ExtinctionError, ExtinctionLaw};
use crate::photometry::bands::V_BAND_ANGSTROM;

/// Capability of laws whose normalization is expressed as a color excess
pub trait ColorExcessLaw: ExtinctionLaw {
    /// Ratio of total to selective extinction, fixed at construction
    fn rv(&self) -> f64;

    /// Color excess E(B−V) implied by the current normalization
    fn color_excess(&self) -> Result<f64, ExtinctionError> {
        Ok(self.normalization() * self.shape_at(V_BAND_ANGSTROM)? / self.rv())
    }

    /// Set the normalization so that [`ColorExcessLaw::color_excess`] returns `ebmv`
    fn set_color_excess(&mut self, ebmv: f64) -> Result<(), ExtinctionError> {
        let shape_v = self.shape_at(V_BAND_ANGSTROM)?;
        if shape_v == 0.0 || !shape_v.is_finite() {
            return Err(ExtinctionError::Contract(format!(
                "{} has no usable V band shape ({shape_v}) to derive a normalization from",
                self.name()
            )));
        }
        let av = self.rv() * ebmv;
        self.set_normalization(av / shape_v);
        Ok(())
    }

    /// V band extinction `A_V = Rv × E(B−V)`
    fn av(&self) -> Result<f64, ExtinctionError> {
        Ok(self.rv() * self.color_excess()?)
    }
}

/// Validate a total-to-selective extinction ratio
pub(crate) fn check_rv(rv: f64) -> Result<f64, ExtinctionError> {
    if rv.is_finite() && rv > 0.0 {
        Ok(rv)
    } else {
        Err(ExtinctionError::Contract(format!(
            "Rv must be positive and finite, got {rv}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laws::{CardelliLaw, FitzpatrickMassaLaw};
    use approx::assert_relative_eq;

    #[test]
    fn test_round_trip_cardelli() {
        let mut law = CardelliLaw::new(0.1, 3.1).unwrap();
        for &ebmv in &[0.0, 0.05, 0.3, 1.7, -0.2] {
            law.set_color_excess(ebmv).unwrap();
            assert_relative_eq!(law.color_excess().unwrap(), ebmv, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_round_trip_fitzpatrick() {
        let mut law = FitzpatrickMassaLaw::lmc();
        law.set_color_excess(0.42).unwrap();
        assert_relative_eq!(law.color_excess().unwrap(), 0.42, epsilon = 1e-12);
    }

    #[test]
    fn test_av_is_rv_times_ebmv() {
        let law = CardelliLaw::new(0.25, 3.1).unwrap();
        assert_relative_eq!(law.av().unwrap(), 3.1 * 0.25, epsilon = 1e-12);
        assert_relative_eq!(
            law.evaluate_at(V_BAND_ANGSTROM).unwrap(),
            law.av().unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_check_rv() {
        assert!(check_rv(3.1).is_ok());
        assert!(check_rv(0.0).is_err());
        assert!(check_rv(f64::NAN).is_err());
    }
}
