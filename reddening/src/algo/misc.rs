//! Miscellaneous mathematical and utility algorithms.
//!
//! This module provides general-purpose numerical helpers used by the
//! extinction laws and the calibration code:
//!
//! - **Polynomial evaluation**: Horner-scheme evaluation with numpy-style
//!   coefficient ordering (highest degree first)
//! - **Summary statistics**: mean and population standard deviation over arrays

use ndarray::ArrayView1;
use num_traits::Float;

/// Evaluates a polynomial at `x` using Horner's scheme.
///
/// Coefficients are ordered from the highest degree term down to the constant
/// term, so `[a, b, c]` evaluates `a·x² + b·x + c`. An empty coefficient slice
/// evaluates to zero.
///
/// # Examples
///
/// ```rust
/// use reddening::algo::misc::polyval;
///
/// // 2x² - 3x + 1 at x = 2
/// assert_eq!(polyval(&[2.0, -3.0, 1.0], 2.0), 3.0);
/// ```
pub fn polyval<T: Float>(coefficients: &[T], x: T) -> T {
    coefficients
        .iter()
        .fold(T::zero(), |acc, &coefficient| acc * x + coefficient)
}

/// Arithmetic mean of the values, `None` when the view is empty.
pub fn mean(values: ArrayView1<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.sum() / values.len() as f64)
}

/// Population standard deviation (divides by `n`, not `n - 1`).
///
/// Returns `None` when the view is empty. A single value has zero dispersion.
pub fn population_std(values: ArrayView1<f64>) -> Option<f64> {
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_polyval_constant_and_empty() {
        assert_eq!(polyval::<f64>(&[], 3.0), 0.0);
        assert_eq!(polyval(&[7.5], 100.0), 7.5);
    }

    #[test]
    fn test_polyval_cubic() {
        // 0.011x³ - 0.198x² + 1.509x - 2.156 at x = 2
        let coefficients = [0.011, -0.198, 1.509, -2.156];
        let expected = 0.011 * 8.0 - 0.198 * 4.0 + 1.509 * 2.0 - 2.156;
        assert_relative_eq!(polyval(&coefficients, 2.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_polyval_f32() {
        assert_relative_eq!(polyval(&[1.0f32, 0.0, -1.0], 3.0f32), 8.0f32);
    }

    #[test]
    fn test_mean_and_std() {
        let values = array![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(values.view()).unwrap(), 5.0);
        assert_relative_eq!(population_std(values.view()).unwrap(), 2.0);
    }

    #[test]
    fn test_single_value_has_zero_dispersion() {
        let values = array![1.25];
        assert_eq!(population_std(values.view()), Some(0.0));
    }

    #[test]
    fn test_empty_statistics() {
        let values = ndarray::Array1::<f64>::zeros(0);
        assert!(mean(values.view()).is_none());
        assert!(population_std(values.view()).is_none());
    }
}
