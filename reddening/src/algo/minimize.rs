//! Bounded one-dimensional minimization.
//!
//! Implements the downhill simplex (Nelder–Mead) method for a single free
//! parameter. The simplex is a pair of points; each iteration reflects,
//! expands, contracts or shrinks it until both the simplex width and the
//! spread of objective values fall below the requested tolerances.
//!
//! The iteration count is capped. Running out of iterations is reported as an
//! error instead of returning a partially converged value.

use thiserror::Error;

/// Reflection coefficient
const RHO: f64 = 1.0;
/// Expansion coefficient
const CHI: f64 = 2.0;
/// Contraction coefficient
const PSI: f64 = 0.5;
/// Shrink coefficient
const SIGMA: f64 = 0.5;

/// Relative step used to build the initial simplex around a non-zero start
const NONZERO_STEP: f64 = 0.05;
/// Absolute step used to build the initial simplex when starting at zero
const ZERO_STEP: f64 = 0.00025;

/// Errors that can occur during minimization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MinimizeError {
    #[error("No convergence after {iterations} iterations (best x = {best_x}, f = {best_value})")]
    MaxIterations {
        iterations: usize,
        best_x: f64,
        best_value: f64,
    },

    #[error("Objective returned a non-finite value at x = {0}")]
    NonFinite(f64),

    #[error("Invalid argument: {0}")]
    ArgumentError(String),
}

/// Outcome of a converged minimization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeResult {
    /// Location of the minimum
    pub x: f64,
    /// Objective value at `x`
    pub value: f64,
    /// Number of iterations performed
    pub iterations: usize,
}

/// Termination settings for [`downhill_simplex_1d`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexOptions {
    /// Absolute tolerance on the simplex width
    pub xtol: f64,
    /// Absolute tolerance on the spread of objective values
    pub ftol: f64,
    /// Hard cap on the number of iterations
    pub max_iterations: usize,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            xtol: 1e-4,
            ftol: 1e-4,
            max_iterations: 500,
        }
    }
}

/// Minimize a scalar function of one variable starting from `x0`.
///
/// # Arguments
/// * `objective` - Function to minimize
/// * `x0` - Starting point
/// * `options` - Tolerances and iteration cap
///
/// # Returns
/// * `Ok(MinimizeResult)` - Location and value of the minimum
/// * `Err(MinimizeError)` - Non-finite objective, invalid options or iteration cap reached
///
/// # Examples
///
/// ```rust
/// use reddening::algo::minimize::{downhill_simplex_1d, SimplexOptions};
///
/// let result = downhill_simplex_1d(|x| (x - 3.0).powi(2), 0.0, SimplexOptions::default()).unwrap();
/// assert!((result.x - 3.0).abs() < 1e-3);
/// ```
pub fn downhill_simplex_1d<F>(
    objective: F,
    x0: f64,
    options: SimplexOptions,
) -> Result<MinimizeResult, MinimizeError>
where
    F: Fn(f64) -> f64,
{
    if !x0.is_finite() {
        return Err(MinimizeError::ArgumentError(format!(
            "Starting point must be finite, got {x0}"
        )));
    }
    if !(options.xtol > 0.0 && options.ftol > 0.0) {
        return Err(MinimizeError::ArgumentError(
            "Tolerances must be positive".to_string(),
        ));
    }

    let eval = |x: f64| -> Result<f64, MinimizeError> {
        let value = objective(x);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(MinimizeError::NonFinite(x))
        }
    };

    let second = if x0 != 0.0 {
        x0 * (1.0 + NONZERO_STEP)
    } else {
        ZERO_STEP
    };

    // (x, f(x)) pairs, kept ordered so that `best.1 <= worst.1`
    let mut best = (x0, eval(x0)?);
    let mut worst = (second, eval(second)?);

    for iteration in 0..options.max_iterations {
        if worst.1 < best.1 {
            std::mem::swap(&mut best, &mut worst);
        }

        if (worst.0 - best.0).abs() <= options.xtol && (worst.1 - best.1).abs() <= options.ftol {
            return Ok(MinimizeResult {
                x: best.0,
                value: best.1,
                iterations: iteration,
            });
        }

        // With a two-point simplex the centroid of all but the worst point is the best point.
        let centroid = best.0;
        let reflected_x = centroid + RHO * (centroid - worst.0);
        let reflected = (reflected_x, eval(reflected_x)?);

        if reflected.1 < best.1 {
            let expanded_x = centroid + CHI * (reflected_x - centroid);
            let expanded = (expanded_x, eval(expanded_x)?);
            worst = if expanded.1 < reflected.1 {
                expanded
            } else {
                reflected
            };
            continue;
        }

        let contracted = if reflected.1 < worst.1 {
            let outside_x = centroid + PSI * (reflected_x - centroid);
            let outside = (outside_x, eval(outside_x)?);
            (outside.1 <= reflected.1).then_some(outside)
        } else {
            let inside_x = centroid - PSI * (centroid - worst.0);
            let inside = (inside_x, eval(inside_x)?);
            (inside.1 < worst.1).then_some(inside)
        };

        worst = match contracted {
            Some(point) => point,
            None => {
                let shrunk_x = best.0 + SIGMA * (worst.0 - best.0);
                (shrunk_x, eval(shrunk_x)?)
            }
        };
    }

    if worst.1 < best.1 {
        std::mem::swap(&mut best, &mut worst);
    }
    Err(MinimizeError::MaxIterations {
        iterations: options.max_iterations,
        best_x: best.0,
        best_value: best.1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quadratic_from_zero() {
        let result =
            downhill_simplex_1d(|x| (x - 3.0).powi(2) + 1.0, 0.0, SimplexOptions::default())
                .unwrap();
        assert_abs_diff_eq!(result.x, 3.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.value, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_absolute_residual_negative_minimum() {
        let options = SimplexOptions {
            xtol: 1e-8,
            ftol: 1e-8,
            max_iterations: 500,
        };
        let result = downhill_simplex_1d(|x| (x + 0.75).abs(), 0.0, options).unwrap();
        assert_abs_diff_eq!(result.x, -0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_nonzero_start() {
        let result =
            downhill_simplex_1d(|x| (x - 10.0).powi(2), 2.0, SimplexOptions::default()).unwrap();
        assert_abs_diff_eq!(result.x, 10.0, epsilon = 1e-2);
    }

    #[test]
    fn test_iteration_cap_fails_closed() {
        let options = SimplexOptions {
            xtol: 1e-12,
            ftol: 1e-12,
            max_iterations: 3,
        };
        let result = downhill_simplex_1d(|x| (x - 1000.0).powi(2), 0.0, options);
        assert!(matches!(
            result,
            Err(MinimizeError::MaxIterations { iterations: 3, .. })
        ));
    }

    #[test]
    fn test_non_finite_objective() {
        let result = downhill_simplex_1d(|_| f64::NAN, 0.0, SimplexOptions::default());
        assert!(matches!(result, Err(MinimizeError::NonFinite(_))));
    }

    #[test]
    fn test_invalid_start() {
        let result = downhill_simplex_1d(|x| x * x, f64::INFINITY, SimplexOptions::default());
        assert!(matches!(result, Err(MinimizeError::ArgumentError(_))));
    }
}
