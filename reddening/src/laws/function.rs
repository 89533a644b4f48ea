//! Extinction law backed by a user supplied shape function

use std::fmt;

use ndarray::{Array1, ArrayView1};

use super::{ExtinctionError, ExtinctionLaw};

type ShapeFn = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// Law whose shape is an arbitrary function of wavelength in angstroms
///
/// The function must return magnitudes per unit normalization. An optical
/// depth law `τ(λ)` can be expressed as `-(2.5 / ln 10) τ(λ)`.
pub struct FunctionLaw {
    name: String,
    shape: ShapeFn,
    normalization: f64,
}

impl FunctionLaw {
    pub fn new<F>(name: impl Into<String>, shape: F, normalization: f64) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            shape: Box::new(shape),
            normalization,
        }
    }
}

impl fmt::Debug for FunctionLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionLaw")
            .field("name", &self.name)
            .field("normalization", &self.normalization)
            .finish_non_exhaustive()
    }
}

impl ExtinctionLaw for FunctionLaw {
    fn name(&self) -> &str {
        &self.name
    }

    fn normalization(&self) -> f64 {
        self.normalization
    }

    fn set_normalization(&mut self, normalization: f64) {
        self.normalization = normalization;
    }

    fn shape(&self, wavelengths: ArrayView1<f64>) -> Result<Array1<f64>, ExtinctionError> {
        Ok(wavelengths.mapv(|wl| (self.shape)(wl)))
    }
}
