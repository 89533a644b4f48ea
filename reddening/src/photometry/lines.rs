//! Hydrogen Balmer emission lines and case B recombination ratios
//!
//! Line wavelengths are in air, in angstroms. Ratios are the theoretical
//! case B values (Osterbrock) used to calibrate extinction from observed
//! Balmer decrements.

use super::bands::LookupError;

/// Named Balmer lines as `(name, wavelength in angstroms)`
pub const BALMER_LINES: [(&str, f64); 5] = [
    ("Ha", 6562.82),
    ("Hb", 4861.33),
    ("Hg", 4340.46),
    ("Hd", 4101.74),
    ("He", 3970.07),
];

/// Expected flux ratio `F1/F2` between two emission lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRatio {
    /// Theoretical ratio F1/F2
    pub ratio: f64,
    /// Wavelength of the numerator line in angstroms
    pub lambda1: f64,
    /// Wavelength of the denominator line in angstroms
    pub lambda2: f64,
}

/// Case B recombination ratios, keyed by the two line initials (e.g. `Hab` is Hα/Hβ)
pub const CASE_B_RATIOS: [(&str, LineRatio); 10] = [
    ("Hab", LineRatio { ratio: 2.86, lambda1: 6562.82, lambda2: 4861.33 }),
    ("Hag", LineRatio { ratio: 6.16, lambda1: 6562.82, lambda2: 4340.46 }),
    ("Had", LineRatio { ratio: 11.21, lambda1: 6562.82, lambda2: 4101.74 }),
    ("Hae", LineRatio { ratio: 18.16, lambda1: 6562.82, lambda2: 3970.07 }),
    ("Hbg", LineRatio { ratio: 2.15, lambda1: 4861.33, lambda2: 4340.46 }),
    ("Hbd", LineRatio { ratio: 3.91, lambda1: 4861.33, lambda2: 4101.74 }),
    ("Hbe", LineRatio { ratio: 6.33, lambda1: 4861.33, lambda2: 3970.07 }),
    ("Hgd", LineRatio { ratio: 1.82, lambda1: 4340.46, lambda2: 4101.74 }),
    ("Hge", LineRatio { ratio: 2.95, lambda1: 4340.46, lambda2: 3970.07 }),
    ("Hde", LineRatio { ratio: 1.62, lambda1: 4101.74, lambda2: 3970.07 }),
];

/// Wavelength in angstroms of a named Balmer line
pub fn line_wavelength(name: &str) -> Result<f64, LookupError> {
    BALMER_LINES
        .iter()
        .find(|(line, _)| *line == name)
        .map(|(_, wl)| *wl)
        .ok_or_else(|| LookupError::UnknownLine(name.to_string()))
}

/// Case B ratio for a named transition
pub fn case_b_ratio(transition: &str) -> Result<LineRatio, LookupError> {
    CASE_B_RATIOS
        .iter()
        .find(|(name, _)| *name == transition)
        .map(|(_, ratio)| *ratio)
        .ok_or_else(|| LookupError::UnknownTransition(transition.to_string()))
}

/// An emission line given by name or directly as a wavelength in angstroms
#[derive(Debug, Clone, PartialEq)]
pub enum LineSpec {
    Named(String),
    Wavelength(f64),
}

impl LineSpec {
    pub fn wavelength(&self) -> Result<f64, LookupError> {
        match self {
            LineSpec::Named(name) => line_wavelength(name),
            LineSpec::Wavelength(wl) => Ok(*wl),
        }
    }
}

impl From<&str> for LineSpec {
    fn from(name: &str) -> Self {
        LineSpec::Named(name.to_string())
    }
}

impl From<f64> for LineSpec {
    fn from(wavelength: f64) -> Self {
        LineSpec::Wavelength(wavelength)
    }
}
