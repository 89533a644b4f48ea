//! Sampled spectrum model for extinction correction
//!
//! This module provides a tabulated spectrum (spectral axis, flux and flux
//! uncertainty) together with the unit tag that tells how the spectral axis
//! should be interpreted.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Constants in CGS units
pub struct CGS {}

impl CGS {
    /// Speed of light in vacuum
    /// Units: 2.99792458e10 cm/s (centimeters per second in CGS)
    pub const SPEED_OF_LIGHT: f64 = 2.99792458e10;

    /// Number of angstroms in one centimeter
    pub const ANGSTROM_PER_CM: f64 = 1e8;
}

/// Errors that can occur with spectrum operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpectrumError {
    #[error("Spectral axis, flux and error must have the same length (got {x}, {flux}, {err})")]
    LengthMismatch { x: usize, flux: usize, err: usize },

    #[error("Spectral axis value {0} must be positive to convert through frequency")]
    NonPositiveAxis(f64),

    #[error("Unknown spectral unit: {0}")]
    UnknownUnit(String),
}

/// Interpretation of a spectrum's spectral axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectralUnit {
    /// Wavelength in angstroms
    Angstrom,
    /// Wavelength in nanometers
    Nanometer,
    /// Wavelength in microns
    Micron,
    /// Frequency in Hz
    Hertz,
}

impl SpectralUnit {
    /// Convert a single axis value in this unit to a wavelength in angstroms
    pub fn to_angstrom(self, value: f64) -> Result<f64, SpectrumError> {
        match self {
            SpectralUnit::Angstrom => Ok(value),
            SpectralUnit::Nanometer => Ok(value * 10.0),
            SpectralUnit::Micron => Ok(value * 1e4),
            SpectralUnit::Hertz => {
                if value <= 0.0 {
                    return Err(SpectrumError::NonPositiveAxis(value));
                }
                Ok(CGS::SPEED_OF_LIGHT / value * CGS::ANGSTROM_PER_CM)
            }
        }
    }

    /// Convert a wavelength in angstroms to an axis value in this unit
    pub fn from_angstrom(self, angstrom: f64) -> Result<f64, SpectrumError> {
        match self {
            SpectralUnit::Angstrom => Ok(angstrom),
            SpectralUnit::Nanometer => Ok(angstrom / 10.0),
            SpectralUnit::Micron => Ok(angstrom / 1e4),
            SpectralUnit::Hertz => {
                if angstrom <= 0.0 {
                    return Err(SpectrumError::NonPositiveAxis(angstrom));
                }
                Ok(CGS::SPEED_OF_LIGHT * CGS::ANGSTROM_PER_CM / angstrom)
            }
        }
    }
}

impl fmt::Display for SpectralUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpectralUnit::Angstrom => "angstrom",
            SpectralUnit::Nanometer => "nanometer",
            SpectralUnit::Micron => "micron",
            SpectralUnit::Hertz => "hertz",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SpectralUnit {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "angstrom" | "a" | "wavelength-angstrom" => Ok(SpectralUnit::Angstrom),
            "nanometer" | "nm" | "wavelength-nm" => Ok(SpectralUnit::Nanometer),
            "micron" | "um" | "wavelength-micron" => Ok(SpectralUnit::Micron),
            "hertz" | "hz" | "frequency-hz" => Ok(SpectralUnit::Hertz),
            other => Err(SpectrumError::UnknownUnit(other.to_string())),
        }
    }
}

/// A tabulated spectrum with per-sample flux uncertainties
///
/// The spectral axis, flux and error arrays always have equal length. Axis
/// conversions rewrite the axis values in place and never reorder samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSpectrum {
    x: Array1<f64>,
    flux: Array1<f64>,
    err: Array1<f64>,
    unit: SpectralUnit,
}

impl SampledSpectrum {
    /// Create a new spectrum
    ///
    /// # Arguments
    ///
    /// * `x` - Spectral axis values, interpreted according to `unit`
    /// * `flux` - Flux for each sample
    /// * `err` - Flux uncertainty for each sample
    /// * `unit` - Unit of the spectral axis
    ///
    /// # Returns
    ///
    /// The spectrum, or `SpectrumError::LengthMismatch` if the arrays differ in length
    pub fn new(
        x: impl Into<Array1<f64>>,
        flux: impl Into<Array1<f64>>,
        err: impl Into<Array1<f64>>,
        unit: SpectralUnit,
    ) -> Result<Self, SpectrumError> {
        let (x, flux, err) = (x.into(), flux.into(), err.into());
        if x.len() != flux.len() || x.len() != err.len() {
            return Err(SpectrumError::LengthMismatch {
                x: x.len(),
                flux: flux.len(),
                err: err.len(),
            });
        }
        Ok(Self { x, flux, err, unit })
    }

    /// Create a spectrum with zero uncertainties
    pub fn without_errors(
        x: impl Into<Array1<f64>>,
        flux: impl Into<Array1<f64>>,
        unit: SpectralUnit,
    ) -> Result<Self, SpectrumError> {
        let flux = flux.into();
        let err = Array1::zeros(flux.len());
        Self::new(x, flux, err, unit)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn unit(&self) -> SpectralUnit {
        self.unit
    }

    pub fn x(&self) -> ArrayView1<'_, f64> {
        self.x.view()
    }

    pub fn flux(&self) -> ArrayView1<'_, f64> {
        self.flux.view()
    }

    pub fn err(&self) -> ArrayView1<'_, f64> {
        self.err.view()
    }

    /// Mutable access to flux and error at once
    pub fn flux_err_mut(&mut self) -> (ArrayViewMut1<'_, f64>, ArrayViewMut1<'_, f64>) {
        (self.flux.view_mut(), self.err.view_mut())
    }

    /// Spectral axis expressed as wavelengths in angstroms, without changing the spectrum
    pub fn wavelengths_angstrom(&self) -> Result<Array1<f64>, SpectrumError> {
        self.x
            .iter()
            .map(|&v| self.unit.to_angstrom(v))
            .collect::<Result<Vec<_>, _>>()
            .map(Array1::from)
    }

    /// Rewrite the spectral axis in a different unit
    ///
    /// The conversion is computed for every sample before anything is
    /// written, so a failed conversion leaves the spectrum untouched.
    pub fn convert_unit(&mut self, unit: SpectralUnit) -> Result<(), SpectrumError> {
        if unit == self.unit {
            return Ok(());
        }
        let converted = self
            .wavelengths_angstrom()?
            .iter()
            .map(|&angstrom| unit.from_angstrom(angstrom))
            .collect::<Result<Vec<_>, _>>()?;
        self.x = Array1::from(converted);
        self.unit = unit;
        Ok(())
    }
}
