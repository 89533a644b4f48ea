//! Photometric quantities and extinction corrections

pub mod bands;
pub mod correction;
pub mod lines;
pub mod spectrum;

pub use bands::{BandLookup, BandSpec, LookupError, StandardBands, V_BAND_ANGSTROM};
pub use correction::{flux_factor, ColorBands, PhotometricCorrection};
pub use lines::{case_b_ratio, line_wavelength, LineRatio, LineSpec};
pub use spectrum::{SampledSpectrum, SpectralUnit, SpectrumError};
