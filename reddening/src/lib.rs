//! Interstellar dust extinction laws, corrections and calibration.
//!
//! An extinction law maps wavelength to attenuation in magnitudes as a fixed
//! shape curve scaled by a single normalization. This crate provides the
//! common laws, applies them to photometry and spectra, and inverts observed
//! emission line ratios to recover the normalization.
//!
//! # Modules
//!
//! - [`laws`] - the `ExtinctionLaw` trait and the Calzetti, Cardelli (CCM),
//!   Fitzpatrick-Massa (with LMC and SMC instances) and user-supplied laws
//! - [`photometry`] - band and line tables, sampled spectra and the
//!   `PhotometricCorrection` operations available on every law
//! - [`calibration`] - normalization fits from flux ratios
//! - [`functional`] - one-call corrections driven directly by E(B-V)
//! - [`pipeline`] - a feed/process/extract stage and a driver chaining stages
//! - [`config`] - JSON law and stage configuration
//! - [`algo`] - polynomial evaluation, statistics and a 1-D minimizer
//!
//! # Example
//!
//! ```rust
//! use reddening::laws::{CardelliLaw, ColorExcessLaw};
//! use reddening::photometry::PhotometricCorrection;
//!
//! let law = CardelliLaw::milky_way(0.1).unwrap();
//! let a_v = law.extinction_at("V").unwrap();
//! assert!((a_v - 0.31).abs() < 1e-9);
//! assert!((law.color_excess().unwrap() - 0.1).abs() < 1e-12);
//!
//! let corrected = law.correct_flux(1.0e-15, "Ha").unwrap();
//! assert!(corrected > 1.0e-15);
//! ```

pub mod algo;
pub mod calibration;
pub mod config;
pub mod functional;
pub mod laws;
pub mod photometry;
pub mod pipeline;
pub mod shared_args;
