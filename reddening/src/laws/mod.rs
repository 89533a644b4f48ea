//! Interstellar extinction laws
//!
//! An extinction law is a dimensionless shape curve `shape(λ)` scaled by a
//! normalization constant, so that the extinction in magnitudes at wavelength
//! `λ` (angstroms) is `A(λ) = normalization × shape(λ)`.
//!
//! Laws that derive their normalization from a color excess E(B−V) also
//! implement [`ColorExcessLaw`].

pub mod calzetti;
pub mod cardelli;
pub mod color_excess;
pub mod fitzpatrick;
pub mod function;

pub use calzetti::CalzettiLaw;
pub use cardelli::CardelliLaw;
pub use color_excess::ColorExcessLaw;
pub use fitzpatrick::{FitzpatrickMassaLaw, FmCoefficients};
pub use function::FunctionLaw;

use ndarray::{aview1, Array1, ArrayView1};
use thiserror::Error;

use crate::algo::MinimizeError;
use crate::photometry::bands::LookupError;
use crate::photometry::spectrum::SpectrumError;

/// Number of angstroms per micron, used to form inverse-micron `x = 1e4 / λ`
pub const ANGSTROM_PER_MICRON: f64 = 1e4;

/// Errors raised by extinction laws and the operations built on them
#[derive(Debug, Error)]
pub enum ExtinctionError {
    #[error("Wavelength {wavelength} Å (x = {inverse_micron:.4} µm⁻¹) is outside the {law} range [{min_x}, {max_x}] µm⁻¹")]
    Domain {
        law: String,
        wavelength: f64,
        inverse_micron: f64,
        min_x: f64,
        max_x: f64,
    },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("{0} does not define an extinction curve")]
    NotImplemented(String),

    #[error("Invalid arguments: {0}")]
    Contract(String),

    #[error("Extinction fit failed: {0}")]
    NoConvergence(#[from] MinimizeError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}

/// Convert wavelengths in angstroms to inverse microns
pub fn inverse_micron(wavelengths: ArrayView1<f64>) -> Array1<f64> {
    wavelengths.mapv(|wl| ANGSTROM_PER_MICRON / wl)
}

/// Trait implemented by every extinction law
///
/// Implementors provide a normalization and override [`ExtinctionLaw::shape`].
/// All wavelengths are in angstroms and all outputs are in magnitudes (for
/// `evaluate`) or dimensionless (for `shape`).
pub trait ExtinctionLaw {
    /// Short human readable identifier of the law
    fn name(&self) -> &str;

    /// Multiplicative normalization applied to the shape curve
    fn normalization(&self) -> f64;

    fn set_normalization(&mut self, normalization: f64);

    /// Dimensionless shape of the law at each wavelength
    ///
    /// The default implementation has no curve and fails with
    /// [`ExtinctionError::NotImplemented`].
    fn shape(&self, wavelengths: ArrayView1<f64>) -> Result<Array1<f64>, ExtinctionError> {
        let _ = wavelengths;
        Err(ExtinctionError::NotImplemented(self.name().to_string()))
    }

    /// Shape at a single wavelength
    fn shape_at(&self, wavelength: f64) -> Result<f64, ExtinctionError> {
        let values = self.shape(aview1(&[wavelength]))?;
        Ok(values[0])
    }

    /// Extinction in magnitudes at each wavelength
    fn evaluate(&self, wavelengths: ArrayView1<f64>) -> Result<Array1<f64>, ExtinctionError> {
        let normalization = self.normalization();
        Ok(self.shape(wavelengths)?.mapv_into(|s| normalization * s))
    }

    /// Extinction in magnitudes at a single wavelength
    fn evaluate_at(&self, wavelength: f64) -> Result<f64, ExtinctionError> {
        Ok(self.normalization() * self.shape_at(wavelength)?)
    }
}

impl<L: ExtinctionLaw + ?Sized> ExtinctionLaw for Box<L> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn normalization(&self) -> f64 {
        (**self).normalization()
    }

    fn set_normalization(&mut self, normalization: f64) {
        (**self).set_normalization(normalization)
    }

    fn shape(&self, wavelengths: ArrayView1<f64>) -> Result<Array1<f64>, ExtinctionError> {
        (**self).shape(wavelengths)
    }

    fn shape_at(&self, wavelength: f64) -> Result<f64, ExtinctionError> {
        (**self).shape_at(wavelength)
    }
}
