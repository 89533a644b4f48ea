//! Photometric band lookup
//!
//! Maps band names to a representative wavelength in angstroms. The standard
//! table covers Johnson-Cousins UBVRI, SDSS ugriz and near-infrared JHK.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

/// Errors raised when a named band, line or transition is not known
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Unknown band: {0}")]
    UnknownBand(String),

    #[error("Unknown emission line: {0}")]
    UnknownLine(String),

    #[error("Unknown hydrogen transition: {0}")]
    UnknownTransition(String),
}

/// Representative wavelength of the Johnson V band in angstroms
pub const V_BAND_ANGSTROM: f64 = 5510.0;

static STANDARD_BANDS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("U", 3650.0),
        ("B", 4450.0),
        ("V", V_BAND_ANGSTROM),
        ("R", 6580.0),
        ("I", 8060.0),
        ("u", 3520.0),
        ("g", 4800.0),
        ("r", 6250.0),
        ("i", 7690.0),
        ("z", 9110.0),
        ("J", 12200.0),
        ("H", 16300.0),
        ("K", 21900.0),
    ])
});

/// Source of band wavelengths
pub trait BandLookup {
    /// Representative wavelength of `band` in angstroms
    fn wavelength(&self, band: &str) -> Result<f64, LookupError>;
}

/// The built-in, read-only band table
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardBands;

impl StandardBands {
    /// Names of every band in the table, sorted
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<_> = STANDARD_BANDS.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl BandLookup for StandardBands {
    fn wavelength(&self, band: &str) -> Result<f64, LookupError> {
        STANDARD_BANDS
            .get(band)
            .copied()
            .ok_or_else(|| LookupError::UnknownBand(band.to_string()))
    }
}

impl BandLookup for HashMap<String, f64> {
    fn wavelength(&self, band: &str) -> Result<f64, LookupError> {
        self.get(band)
            .copied()
            .ok_or_else(|| LookupError::UnknownBand(band.to_string()))
    }
}

/// A band given either by name or directly as a wavelength in angstroms
#[derive(Debug, Clone, PartialEq)]
pub enum BandSpec {
    Named(String),
    Wavelength(f64),
}

impl BandSpec {
    /// Resolve to a wavelength in angstroms using `lookup` for named bands
    pub fn resolve(&self, lookup: &dyn BandLookup) -> Result<f64, LookupError> {
        match self {
            BandSpec::Named(name) => lookup.wavelength(name),
            BandSpec::Wavelength(wl) => Ok(*wl),
        }
    }
}

impl From<&str> for BandSpec {
    fn from(name: &str) -> Self {
        BandSpec::Named(name.to_string())
    }
}

impl From<String> for BandSpec {
    fn from(name: String) -> Self {
        BandSpec::Named(name)
    }
}

impl From<f64> for BandSpec {
    fn from(wavelength: f64) -> Self {
        BandSpec::Wavelength(wavelength)
    }
}
