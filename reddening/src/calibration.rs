//! Extinction calibration from observed emission line flux ratios
//!
//! Given observed ratios `F1/F2` between two lines and the ratio expected in
//! the absence of dust, each measurement yields an estimate of the law's
//! normalization
//!
//! ```text
//! A0 = -2.5 log10(measured / expected) / (shape(λ1) - shape(λ2))
//! ```
//!
//! The estimates pass through a [`Reducer`] and the law's normalization is set
//! to their mean. Every argument is validated and every estimate computed
//! before the law is touched, so a failed calibration leaves it unchanged.

use std::fmt;

use log::debug;
use ndarray::{Array1, Zip};

use crate::algo::{mean, population_std};
use crate::laws::{ExtinctionError, ExtinctionLaw};
use crate::photometry::lines::case_b_ratio;

/// Reference ratio for one measurement
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedRatio {
    /// Named case B transition such as `"Hab"`, which also fixes both wavelengths
    Transition(String),
    /// Bare ratio value, the wavelengths must be supplied separately
    Value(f64),
}

impl From<&str> for ExpectedRatio {
    fn from(transition: &str) -> Self {
        ExpectedRatio::Transition(transition.to_string())
    }
}

impl From<String> for ExpectedRatio {
    fn from(transition: String) -> Self {
        ExpectedRatio::Transition(transition)
    }
}

impl From<f64> for ExpectedRatio {
    fn from(value: f64) -> Self {
        ExpectedRatio::Value(value)
    }
}

type ReduceFn = Box<dyn Fn(Array1<f64>) -> Array1<f64> + Send + Sync>;

/// Post-processing applied to the per-measurement normalization estimates
#[derive(Default)]
pub enum Reducer {
    /// Keep every estimate
    #[default]
    Identity,
    /// Drop NaN and infinite estimates
    FiniteOnly,
    /// Collapse to the mean
    Mean,
    /// Collapse to the median of the finite estimates
    Median,
    /// Arbitrary transformation of the estimate array
    Custom(ReduceFn),
}

impl Reducer {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Array1<f64>) -> Array1<f64> + Send + Sync + 'static,
    {
        Reducer::Custom(Box::new(f))
    }

    pub fn apply(&self, estimates: Array1<f64>) -> Array1<f64> {
        match self {
            Reducer::Identity => estimates,
            Reducer::FiniteOnly => estimates
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .collect(),
            Reducer::Mean => mean(estimates.view()).into_iter().collect(),
            Reducer::Median => {
                let mut finite: Vec<f64> = estimates
                    .iter()
                    .copied()
                    .filter(|v| v.is_finite())
                    .collect();
                if finite.is_empty() {
                    return Array1::zeros(0);
                }
                finite.sort_by(f64::total_cmp);
                let mid = finite.len() / 2;
                let median = if finite.len() % 2 == 0 {
                    0.5 * (finite[mid - 1] + finite[mid])
                } else {
                    finite[mid]
                };
                Array1::from_elem(1, median)
            }
            Reducer::Custom(f) => f(estimates),
        }
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reducer::Identity => write!(f, "Identity"),
            Reducer::FiniteOnly => write!(f, "FiniteOnly"),
            Reducer::Mean => write!(f, "Mean"),
            Reducer::Median => write!(f, "Median"),
            Reducer::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Outcome of [`calibrate_from_flux_ratio`]
#[derive(Debug, Clone, PartialEq)]
pub struct FluxRatioCalibration {
    /// New normalization of the law, the mean of the reduced estimates
    pub normalization: f64,
    /// Population standard deviation of the reduced estimates
    pub dispersion: f64,
    /// Reduced estimates
    pub estimates: Array1<f64>,
}

/// Per-measurement inputs after broadcasting
struct RatioInputs {
    measured: Array1<f64>,
    expected: Array1<f64>,
    lambda1: Array1<f64>,
    lambda2: Array1<f64>,
}

fn broadcast_len(lengths: &[(&str, usize)]) -> Result<usize, ExtinctionError> {
    let n = lengths.iter().map(|(_, len)| *len).max().unwrap_or(0);
    if n == 0 {
        return Err(ExtinctionError::Contract(
            "Calibration needs at least one measurement".to_string(),
        ));
    }
    for (name, len) in lengths {
        if *len != 1 && *len != n {
            return Err(ExtinctionError::Contract(format!(
                "{name} has {len} entries, expected 1 or {n}"
            )));
        }
    }
    Ok(n)
}

fn broadcast(values: &[f64], n: usize) -> Array1<f64> {
    if values.len() == 1 {
        Array1::from_elem(n, values[0])
    } else {
        Array1::from(values.to_vec())
    }
}

fn resolve_inputs(
    measured: &[f64],
    expected: &[ExpectedRatio],
    wavelengths: Option<(&[f64], &[f64])>,
) -> Result<RatioInputs, ExtinctionError> {
    if measured.is_empty() || expected.is_empty() {
        return Err(ExtinctionError::Contract(
            "Calibration needs at least one measured and one expected ratio".to_string(),
        ));
    }

    let named = expected
        .iter()
        .filter(|e| matches!(e, ExpectedRatio::Transition(_)))
        .count();
    if named != 0 && named != expected.len() {
        return Err(ExtinctionError::Contract(
            "Expected ratios mix named transitions and numeric values".to_string(),
        ));
    }

    if named > 0 {
        if wavelengths.is_some() {
            return Err(ExtinctionError::Contract(
                "Named transitions fix their own wavelengths, do not pass them explicitly"
                    .to_string(),
            ));
        }
        let n = broadcast_len(&[("measured", measured.len()), ("expected", expected.len())])?;

        let mut ratios = Vec::with_capacity(expected.len());
        let mut lambda1 = Vec::with_capacity(expected.len());
        let mut lambda2 = Vec::with_capacity(expected.len());
        for item in expected {
            if let ExpectedRatio::Transition(name) = item {
                let ratio = case_b_ratio(name)?;
                ratios.push(ratio.ratio);
                lambda1.push(ratio.lambda1);
                lambda2.push(ratio.lambda2);
            }
        }
        return Ok(RatioInputs {
            measured: broadcast(measured, n),
            expected: broadcast(&ratios, n),
            lambda1: broadcast(&lambda1, n),
            lambda2: broadcast(&lambda2, n),
        });
    }

    let Some((lambda1, lambda2)) = wavelengths else {
        return Err(ExtinctionError::Contract(
            "Numeric expected ratios need explicit wavelengths".to_string(),
        ));
    };
    let n = broadcast_len(&[
        ("measured", measured.len()),
        ("expected", expected.len()),
        ("lambda1", lambda1.len()),
        ("lambda2", lambda2.len()),
    ])?;
    let values: Vec<f64> = expected
        .iter()
        .filter_map(|e| match e {
            ExpectedRatio::Value(v) => Some(*v),
            ExpectedRatio::Transition(_) => None,
        })
        .collect();

    Ok(RatioInputs {
        measured: broadcast(measured, n),
        expected: broadcast(&values, n),
        lambda1: broadcast(lambda1, n),
        lambda2: broadcast(lambda2, n),
    })
}

/// Fit the normalization of `law` to observed line flux ratios
///
/// `measured` and `expected` are matched element by element; a single entry
/// in either (or in the explicit wavelength arrays) is broadcast against the
/// others. On success the law's normalization is replaced by
/// [`FluxRatioCalibration::normalization`].
///
/// # Errors
///
/// * [`ExtinctionError::Contract`] for empty, mismatched or mixed arguments,
///   for explicit wavelengths passed with named transitions, and when the
///   reducer leaves nothing or only non-finite values to average
/// * [`ExtinctionError::Lookup`] for unknown transitions
/// * Any error the law raises while evaluating its shape
pub fn calibrate_from_flux_ratio<L>(
    law: &mut L,
    measured: &[f64],
    expected: &[ExpectedRatio],
    wavelengths: Option<(&[f64], &[f64])>,
    reducer: &Reducer,
) -> Result<FluxRatioCalibration, ExtinctionError>
where
    L: ExtinctionLaw + ?Sized,
{
    let inputs = resolve_inputs(measured, expected, wavelengths)?;

    let shape1 = law.shape(inputs.lambda1.view())?;
    let shape2 = law.shape(inputs.lambda2.view())?;

    let mut estimates = Array1::zeros(inputs.measured.len());
    Zip::from(&mut estimates)
        .and(&inputs.measured)
        .and(&inputs.expected)
        .and(&shape1)
        .and(&shape2)
        .for_each(|a0, &m, &e, &s1, &s2| {
            *a0 = -2.5 * (m / e).log10() / (s1 - s2);
        });

    let reduced = reducer.apply(estimates);
    let (Some(normalization), Some(dispersion)) =
        (mean(reduced.view()), population_std(reduced.view()))
    else {
        return Err(ExtinctionError::Contract(
            "No normalization estimates left after reduction".to_string(),
        ));
    };
    if !normalization.is_finite() {
        return Err(ExtinctionError::Contract(format!(
            "Normalization estimates average to {normalization}"
        )));
    }

    debug!(
        "{}: calibrated normalization {} -> {normalization} from {} estimates (dispersion {dispersion})",
        law.name(),
        law.normalization(),
        reduced.len()
    );
    law.set_normalization(normalization);

    Ok(FluxRatioCalibration {
        normalization,
        dispersion,
        estimates: reduced,
    })
}

/// Method form of [`calibrate_from_flux_ratio`] for every extinction law
pub trait FluxRatioCalibrate: ExtinctionLaw {
    fn calibrate_from_flux_ratio(
        &mut self,
        measured: &[f64],
        expected: &[ExpectedRatio],
        wavelengths: Option<(&[f64], &[f64])>,
        reducer: &Reducer,
    ) -> Result<FluxRatioCalibration, ExtinctionError> {
        calibrate_from_flux_ratio(self, measured, expected, wavelengths, reducer)
    }
}

impl<L: ExtinctionLaw + ?Sized> FluxRatioCalibrate for L {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laws::{CalzettiLaw, CardelliLaw, ColorExcessLaw};
    use crate::photometry::lines::case_b_ratio;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn synthesize(law: &dyn ExtinctionLaw, ratio: f64, l1: f64, l2: f64, a0: f64) -> f64 {
        let s1 = law.shape_at(l1).unwrap();
        let s2 = law.shape_at(l2).unwrap();
        ratio * 10f64.powf(-0.4 * (s1 - s2) * a0)
    }

    #[test]
    fn test_recovers_known_normalization() {
        let mut law = CardelliLaw::milky_way(0.1).unwrap();
        let hab = case_b_ratio("Hab").unwrap();
        let measured = synthesize(&law, hab.ratio, hab.lambda1, hab.lambda2, 2.0);

        let result = law
            .calibrate_from_flux_ratio(&[measured], &["Hab".into()], None, &Reducer::default())
            .unwrap();
        assert_relative_eq!(result.normalization, 2.0, epsilon = 1e-6);
        assert_relative_eq!(law.normalization(), 2.0, epsilon = 1e-6);
        assert_eq!(result.dispersion, 0.0);
    }

    #[test]
    fn test_balmer_decrement_sets_color_excess() {
        let mut law = CardelliLaw::milky_way(0.0).unwrap();
        law.calibrate_from_flux_ratio(&[4.1], &["Hab".into()], None, &Reducer::Identity)
            .unwrap();
        let ebmv = law.color_excess().unwrap();
        assert!(ebmv > 0.0);
        assert_relative_eq!(law.av().unwrap(), 3.1 * ebmv, epsilon = 1e-12);

        // The fitted law reproduces the observed decrement
        let a_ha = law.evaluate_at(6562.82).unwrap();
        let a_hb = law.evaluate_at(4861.33).unwrap();
        assert_relative_eq!(a_hb - a_ha, 2.5 * (4.1f64 / 2.86).log10(), epsilon = 1e-12);
    }

    #[test]
    fn test_explicit_wavelengths_broadcast() {
        let mut law = CalzettiLaw::new(1.0);
        let truth = 0.7;
        let measured: Vec<f64> = [5.0, 5.0, 5.0]
            .iter()
            .zip([6563.0, 6000.0, 5000.0])
            .map(|(&r, l1)| synthesize(&law, r, l1, 4000.0, truth))
            .collect();

        let result = law
            .calibrate_from_flux_ratio(
                &measured,
                &[ExpectedRatio::Value(5.0)],
                Some((&[6563.0, 6000.0, 5000.0][..], &[4000.0][..])),
                &Reducer::Identity,
            )
            .unwrap();
        assert_eq!(result.estimates.len(), 3);
        assert_relative_eq!(result.normalization, truth, epsilon = 1e-9);
        assert!(result.dispersion < 1e-9);
    }

    #[test]
    fn test_mixed_expected_is_rejected_without_mutation() {
        let mut law = CardelliLaw::milky_way(0.2).unwrap();
        let before = law.normalization();
        let result = law.calibrate_from_flux_ratio(
            &[4.0, 3.0],
            &["Hab".into(), ExpectedRatio::Value(2.86)],
            Some((&[6562.82][..], &[4861.33][..])),
            &Reducer::Identity,
        );
        assert!(matches!(result, Err(ExtinctionError::Contract(_))));
        assert_eq!(law.normalization(), before);
    }

    #[test]
    fn test_argument_contracts() {
        let mut law = CardelliLaw::milky_way(0.2).unwrap();
        let before = law.normalization();

        // named transitions with explicit wavelengths
        assert!(matches!(
            law.calibrate_from_flux_ratio(
                &[4.0],
                &["Hab".into()],
                Some((&[6562.82][..], &[4861.33][..])),
                &Reducer::Identity
            ),
            Err(ExtinctionError::Contract(_))
        ));
        // numeric ratio without wavelengths
        assert!(matches!(
            law.calibrate_from_flux_ratio(&[4.0], &[ExpectedRatio::Value(2.86)], None, &Reducer::Identity),
            Err(ExtinctionError::Contract(_))
        ));
        // incompatible lengths
        assert!(matches!(
            law.calibrate_from_flux_ratio(
                &[4.0, 4.1, 4.2],
                &["Hab".into(), "Hab".into()],
                None,
                &Reducer::Identity
            ),
            Err(ExtinctionError::Contract(_))
        ));
        // empty input
        assert!(matches!(
            law.calibrate_from_flux_ratio(&[], &["Hab".into()], None, &Reducer::Identity),
            Err(ExtinctionError::Contract(_))
        ));
        assert_eq!(law.normalization(), before);
    }

    #[test]
    fn test_unknown_transition() {
        let mut law = CardelliLaw::milky_way(0.2).unwrap();
        assert!(matches!(
            law.calibrate_from_flux_ratio(&[4.0], &["Hxy".into()], None, &Reducer::Identity),
            Err(ExtinctionError::Lookup(_))
        ));
    }

    #[test]
    fn test_reducer_filters_invalid_measurements() {
        let mut law = CardelliLaw::milky_way(0.0).unwrap();
        let hab = case_b_ratio("Hab").unwrap();
        let good = synthesize(&law, hab.ratio, hab.lambda1, hab.lambda2, 1.5);

        // A negative ratio gives a NaN estimate
        let identity = law.calibrate_from_flux_ratio(
            &[good, -1.0],
            &["Hab".into()],
            None,
            &Reducer::Identity,
        );
        assert!(matches!(identity, Err(ExtinctionError::Contract(_))));

        let result = law
            .calibrate_from_flux_ratio(&[good, -1.0], &["Hab".into()], None, &Reducer::FiniteOnly)
            .unwrap();
        assert_eq!(result.estimates.len(), 1);
        assert_relative_eq!(result.normalization, 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_reducer_leaving_nothing_is_an_error() {
        let mut law = CardelliLaw::milky_way(0.2).unwrap();
        let reducer = Reducer::custom(|_| Array1::zeros(0));
        let result = law.calibrate_from_flux_ratio(&[4.0], &["Hab".into()], None, &reducer);
        assert!(matches!(result, Err(ExtinctionError::Contract(_))));
    }

    #[test]
    fn test_reducers() {
        let values = array![1.0, f64::NAN, 3.0, 10.0];
        assert_eq!(Reducer::FiniteOnly.apply(values.clone()), array![1.0, 3.0, 10.0]);
        assert_eq!(Reducer::Median.apply(values.clone()), array![3.0]);
        assert_eq!(Reducer::Median.apply(array![1.0, 2.0, 4.0, 9.0]), array![3.0]);
        assert_eq!(Reducer::Mean.apply(array![1.0, 2.0, 6.0]), array![3.0]);
        assert_eq!(Reducer::Identity.apply(values.clone()).len(), 4);
        assert_eq!(format!("{:?}", Reducer::custom(|a| a)), "Custom(..)");
    }

    #[test]
    fn test_collapsing_reducer_gives_zero_dispersion() {
        let mut law = CardelliLaw::milky_way(0.0).unwrap();
        let result = law
            .calibrate_from_flux_ratio(&[3.5, 4.0, 4.5], &["Hab".into()], None, &Reducer::Median)
            .unwrap();
        assert_eq!(result.estimates.len(), 1);
        assert_eq!(result.dispersion, 0.0);
        assert_eq!(law.normalization(), result.normalization);
    }
}
