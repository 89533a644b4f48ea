//! Numerical algorithms shared by the extinction laws and calibration
//!
//! This module provides polynomial evaluation, summary statistics and a
//! bounded one-dimensional minimizer.

pub mod minimize;
pub mod misc;

pub use minimize::{downhill_simplex_1d, MinimizeError, MinimizeResult, SimplexOptions};
pub use misc::{mean, polyval, population_std};
