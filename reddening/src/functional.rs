//! Free-function corrections driven directly by E(B−V)
//!
//! These helpers build a law for a single call. Code that corrects many
//! quantities with the same law should construct it once and use the
//! [`PhotometricCorrection`](crate::photometry::PhotometricCorrection) methods.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::algo::{downhill_simplex_1d, SimplexOptions};
use crate::laws::fitzpatrick::{LMC_AVERAGE, SMC_BAR};
use crate::laws::{CardelliLaw, ExtinctionError, ExtinctionLaw, FitzpatrickMassaLaw};
use crate::photometry::bands::{BandLookup, BandSpec, StandardBands};
use crate::photometry::correction::flux_factor;
use crate::photometry::lines::{line_wavelength, LineRatio};

/// Milky Way total-to-selective extinction ratio
pub const DEFAULT_RV: f64 = 3.1;

/// Default tolerance on E(B−V) for [`ebmv_from_flux_ratio`]
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Iteration cap of the E(B−V) search
pub const MAX_FIT_ITERATIONS: usize = 500;

/// Which extinction curve a free-function correction uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LawFamily {
    /// Cardelli, Clayton & Mathis 1989
    #[default]
    MilkyWay,
    /// Fitzpatrick–Massa form with the LMC average constants
    Lmc,
    /// Fitzpatrick–Massa form with the SMC bar constants
    Smc,
}

impl LawFamily {
    /// Build the family's law for the given color excess and Rv
    pub fn build(self, ebmv: f64, rv: f64) -> Result<Box<dyn ExtinctionLaw>, ExtinctionError> {
        Ok(match self {
            LawFamily::MilkyWay => Box::new(CardelliLaw::new(ebmv, rv)?),
            LawFamily::Lmc => {
                Box::new(FitzpatrickMassaLaw::new(LMC_AVERAGE, ebmv, rv)?.with_name("LMC"))
            }
            LawFamily::Smc => {
                Box::new(FitzpatrickMassaLaw::new(SMC_BAR, ebmv, rv)?.with_name("SMC"))
            }
        })
    }
}

/// Wavelength of a band name, falling back to the Balmer line table
pub fn resolve_wavelength(spec: &BandSpec) -> Result<f64, ExtinctionError> {
    match spec {
        BandSpec::Wavelength(wl) => Ok(*wl),
        BandSpec::Named(name) => StandardBands
            .wavelength(name)
            .or_else(|band_err| line_wavelength(name).map_err(|_| band_err))
            .map_err(ExtinctionError::from),
    }
}

/// Correct a line flux for extinction with color excess `ebmv`
///
/// `wavelength` is a band name, a Balmer line name or a value in angstroms.
/// Without a flux the extinction `A(λ)` in magnitudes is returned instead.
pub fn correct_line_flux(
    flux: Option<f64>,
    wavelength: impl Into<BandSpec>,
    ebmv: f64,
    rv: f64,
    family: LawFamily,
) -> Result<f64, ExtinctionError> {
    let wavelength = resolve_wavelength(&wavelength.into())?;
    let a = family.build(ebmv, rv)?.evaluate_at(wavelength)?;
    Ok(match flux {
        Some(flux) => flux * flux_factor(a),
        None => a,
    })
}

/// E(B−V) implied by each observed flux ratio under the Milky Way law
///
/// For every observed ratio `F1/F2` this searches for the color excess at which
/// `A(λ2) − A(λ1) = −2.5 log10(R0 / R_obs)`, starting from zero. The search
/// stops once E(B−V) is known to `tolerance`.
///
/// # Errors
///
/// * [`ExtinctionError::Contract`] for non-positive or non-finite ratios
/// * [`ExtinctionError::NoConvergence`] when the search exhausts its iterations
/// * [`ExtinctionError::Domain`] when a line lies outside the law's range
pub fn ebmv_from_flux_ratio(
    observed: &[f64],
    expected: &LineRatio,
    rv: f64,
    tolerance: f64,
) -> Result<Array1<f64>, ExtinctionError> {
    if let Some(bad) = observed
        .iter()
        .chain(std::iter::once(&expected.ratio))
        .find(|r| !(r.is_finite() && **r > 0.0))
    {
        return Err(ExtinctionError::Contract(format!(
            "Flux ratios must be positive and finite, got {bad}"
        )));
    }

    // A(λ2) − A(λ1) for a unit color excess; A is linear in E(B−V)
    let unit = CardelliLaw::new(1.0, rv)?;
    let slope = unit.evaluate_at(expected.lambda2)? - unit.evaluate_at(expected.lambda1)?;

    let options = SimplexOptions {
        xtol: tolerance,
        ftol: tolerance,
        max_iterations: MAX_FIT_ITERATIONS,
    };

    observed
        .iter()
        .map(|&ratio| -> Result<f64, ExtinctionError> {
            let target = -2.5 * (expected.ratio / ratio).log10();
            let fit = downhill_simplex_1d(|ebmv| (target - ebmv * slope).abs(), 0.0, options)?;
            Ok(fit.x)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Array1::from)
}

/// Extinction at `band` implied by each observed flux ratio
///
/// Same search as [`ebmv_from_flux_ratio`], reported as `A(band)` in magnitudes.
pub fn a_lambda_from_flux_ratio(
    observed: &[f64],
    expected: &LineRatio,
    band: impl Into<BandSpec>,
    rv: f64,
    tolerance: f64,
) -> Result<Array1<f64>, ExtinctionError> {
    let wavelength = resolve_wavelength(&band.into())?;
    let ebmv = ebmv_from_flux_ratio(observed, expected, rv, tolerance)?;
    let per_unit = CardelliLaw::new(1.0, rv)?.evaluate_at(wavelength)?;
    Ok(ebmv.mapv_into(|e| e * per_unit))
}
