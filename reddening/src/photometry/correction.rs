//! Extinction corrections for photometry, colors, line fluxes and spectra
//!
//! Every [`ExtinctionLaw`] gets these operations through the blanket
//! implementation of [`PhotometricCorrection`]. Named bands are resolved
//! through [`StandardBands`] unless a lookup is passed explicitly.

use std::str::FromStr;

use ndarray::{Array1, ArrayView1, Zip};

use super::bands::{BandLookup, BandSpec, StandardBands};
use super::lines::LineSpec;
use super::spectrum::SampledSpectrum;
use crate::laws::{ExtinctionError, ExtinctionLaw};

/// Multiplicative flux correction for an extinction of `a_mag` magnitudes
pub fn flux_factor(a_mag: f64) -> f64 {
    10f64.powf(a_mag / 2.5)
}

/// The two bands of a color index, `first - second`
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBands {
    pub first: BandSpec,
    pub second: BandSpec,
}

impl ColorBands {
    pub fn new(first: impl Into<BandSpec>, second: impl Into<BandSpec>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

impl FromStr for ColorBands {
    type Err = ExtinctionError;

    /// Parses `"E(B-V)"`, `"B-V"` or `"B,V"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = match trimmed.strip_prefix("E(") {
            Some(rest) => rest.strip_suffix(')').ok_or_else(|| {
                ExtinctionError::Contract(format!("Unbalanced parenthesis in color '{s}'"))
            })?,
            None => trimmed,
        };
        if inner.contains(|c: char| c == '(' || c == ')') {
            return Err(ExtinctionError::Contract(format!(
                "Unbalanced parenthesis in color '{s}'"
            )));
        }

        let separator = if inner.contains(',') { ',' } else { '-' };
        let parts: Vec<&str> = inner.split(separator).map(str::trim).collect();
        match parts.as_slice() {
            [first, second] if !first.is_empty() && !second.is_empty() => {
                Ok(Self::new(*first, *second))
            }
            _ => Err(ExtinctionError::Contract(format!(
                "Color must look like 'E(b1-b2)', 'b1-b2' or 'b1,b2', got '{s}'"
            ))),
        }
    }
}

impl<A: Into<BandSpec>, B: Into<BandSpec>> From<(A, B)> for ColorBands {
    fn from((first, second): (A, B)) -> Self {
        Self::new(first, second)
    }
}

/// Photometric and spectroscopic corrections derived from an extinction law
pub trait PhotometricCorrection: ExtinctionLaw {
    /// Extinction in magnitudes in a band, using the standard band table
    fn extinction_at(&self, band: impl Into<BandSpec>) -> Result<f64, ExtinctionError> {
        self.extinction_at_with(band, &StandardBands)
    }

    /// Extinction in magnitudes in a band, resolving names through `lookup`
    fn extinction_at_with(
        &self,
        band: impl Into<BandSpec>,
        lookup: &dyn BandLookup,
    ) -> Result<f64, ExtinctionError> {
        Ok(-self.correct_photometry_with(0.0, band, lookup)?)
    }

    /// Extinction in magnitudes for each band of a sequence
    fn extinction_at_many(&self, bands: &[BandSpec]) -> Result<Array1<f64>, ExtinctionError> {
        self.extinction_at_many_with(bands, &StandardBands)
    }

    fn extinction_at_many_with(
        &self,
        bands: &[BandSpec],
        lookup: &dyn BandLookup,
    ) -> Result<Array1<f64>, ExtinctionError> {
        bands
            .iter()
            .map(|band| self.extinction_at_with(band.clone(), lookup))
            .collect::<Result<Vec<_>, _>>()
            .map(Array1::from)
    }

    /// Extinction-corrected magnitude: `mag - A(band)`
    fn correct_photometry(
        &self,
        magnitude: f64,
        band: impl Into<BandSpec>,
    ) -> Result<f64, ExtinctionError> {
        self.correct_photometry_with(magnitude, band, &StandardBands)
    }

    fn correct_photometry_with(
        &self,
        magnitude: f64,
        band: impl Into<BandSpec>,
        lookup: &dyn BandLookup,
    ) -> Result<f64, ExtinctionError> {
        let wavelength = band.into().resolve(lookup)?;
        Ok(magnitude - self.evaluate_at(wavelength)?)
    }

    /// Correct an array of magnitudes measured in the same band
    fn correct_magnitudes(
        &self,
        magnitudes: ArrayView1<f64>,
        band: impl Into<BandSpec>,
    ) -> Result<Array1<f64>, ExtinctionError> {
        self.correct_magnitudes_with(magnitudes, band, &StandardBands)
    }

    fn correct_magnitudes_with(
        &self,
        magnitudes: ArrayView1<f64>,
        band: impl Into<BandSpec>,
        lookup: &dyn BandLookup,
    ) -> Result<Array1<f64>, ExtinctionError> {
        let wavelength = band.into().resolve(lookup)?;
        let a = self.evaluate_at(wavelength)?;
        Ok(magnitudes.mapv(|m| m - a))
    }

    /// Extinction-corrected color: `color - A(first) + A(second)`
    fn correct_color(&self, color: f64, bands: &ColorBands) -> Result<f64, ExtinctionError> {
        self.correct_color_with(color, bands, &StandardBands)
    }

    fn correct_color_with(
        &self,
        color: f64,
        bands: &ColorBands,
        lookup: &dyn BandLookup,
    ) -> Result<f64, ExtinctionError> {
        let wl1 = bands.first.resolve(lookup)?;
        let wl2 = bands.second.resolve(lookup)?;
        Ok(color - self.evaluate_at(wl1)? + self.evaluate_at(wl2)?)
    }

    /// Extinction-corrected flux of a line given by name or wavelength
    fn correct_flux(&self, flux: f64, line: impl Into<LineSpec>) -> Result<f64, ExtinctionError> {
        let wavelength = line.into().wavelength()?;
        Ok(flux * flux_factor(self.evaluate_at(wavelength)?))
    }

    /// Return a corrected copy of `spectrum`
    fn correct_spectrum(&self, spectrum: &SampledSpectrum) -> Result<SampledSpectrum, ExtinctionError> {
        let mut corrected = spectrum.clone();
        self.correct_spectrum_in_place(&mut corrected)?;
        Ok(corrected)
    }

    /// Correct flux and error of `spectrum` in place
    ///
    /// The correction factors are evaluated on the spectrum's wavelengths in
    /// angstroms before anything is written; the spectrum keeps its unit.
    fn correct_spectrum_in_place(&self, spectrum: &mut SampledSpectrum) -> Result<(), ExtinctionError> {
        let wavelengths = spectrum.wavelengths_angstrom()?;
        let factors = self.evaluate(wavelengths.view())?.mapv_into(flux_factor);

        let (mut flux, mut err) = spectrum.flux_err_mut();
        Zip::from(&mut flux)
            .and(&mut err)
            .and(&factors)
            .for_each(|f, e, &factor| {
                *f *= factor;
                *e *= factor;
            });
        Ok(())
    }
}

impl<L: ExtinctionLaw + ?Sized> PhotometricCorrection for L {}
