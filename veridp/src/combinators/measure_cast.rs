//! Conversions between privacy measures. Each cast keeps the function,
//! domains and input metric and rewrites only the measure and privacy map.

use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Measurement, PrivacyMap};
use crate::domains::Domain;
use crate::error::{fallible, Fallible};
use crate::measures::{
    FixedSmoothedMaxDivergence, MaxDivergence, SMDCurve, SmoothedMaxDivergence,
    ZeroConcentratedDivergence,
};
use crate::metrics::Metric;
use crate::traits::{
    cast, inf_add, inf_div, inf_ln_1p, inf_mul, inf_square, inf_sub, neg_inf_div, neg_inf_ln,
    neg_inf_sub, Float,
};

/// ε-DP implies (ε, 0)-DP.
#[allow(non_snake_case)]
pub fn make_pureDP_to_fixed_approxDP<DI, DO, MI, Q>(
    capabilities: &Capabilities,
    measurement: &Measurement<DI, DO, MI, MaxDivergence<Q>>,
) -> Fallible<Measurement<DI, DO, MI, FixedSmoothedMaxDivergence<Q>>>
where
    DI: Domain,
    DO: Domain,
    MI: Metric,
    Q: Float,
{
    capabilities.require(&[Capability::Contrib])?;
    let privacy_map = measurement.privacy_map.clone();
    Ok(Measurement::new(
        measurement.input_domain.clone(),
        measurement.output_domain.clone(),
        measurement.function.clone(),
        measurement.input_metric.clone(),
        FixedSmoothedMaxDivergence::default(),
        PrivacyMap::new_fallible(move |d_in| Ok((privacy_map.eval(d_in)?, Q::zero()))),
    ))
}

/// ε-DP implies (ε²/2)-zCDP.
#[allow(non_snake_case)]
pub fn make_pureDP_to_zCDP<DI, DO, MI, Q>(
    capabilities: &Capabilities,
    measurement: &Measurement<DI, DO, MI, MaxDivergence<Q>>,
) -> Fallible<Measurement<DI, DO, MI, ZeroConcentratedDivergence<Q>>>
where
    DI: Domain,
    DO: Domain,
    MI: Metric,
    Q: Float,
{
    capabilities.require(&[Capability::Contrib])?;
    let privacy_map = measurement.privacy_map.clone();
    let two = Q::one() + Q::one();
    Ok(Measurement::new(
        measurement.input_domain.clone(),
        measurement.output_domain.clone(),
        measurement.function.clone(),
        measurement.input_metric.clone(),
        ZeroConcentratedDivergence::default(),
        PrivacyMap::new_fallible(move |d_in| {
            let epsilon = privacy_map.eval(d_in)?;
            Ok(inf_div(inf_square(epsilon), two))
        }),
    ))
}

/// ρ-zCDP implies (ε(δ), δ)-DP for every δ in (0, 1); the result carries
/// the whole curve.
#[allow(non_snake_case)]
pub fn make_zCDP_to_approxDP<DI, DO, MI, Q>(
    capabilities: &Capabilities,
    measurement: &Measurement<DI, DO, MI, ZeroConcentratedDivergence<Q>>,
) -> Fallible<Measurement<DI, DO, MI, SmoothedMaxDivergence<Q>>>
where
    DI: Domain,
    DO: Domain,
    MI: Metric,
    Q: Float,
{
    capabilities.require(&[Capability::Contrib])?;
    let privacy_map = measurement.privacy_map.clone();
    debug!("converted zCDP measurement to approximate DP");
    Ok(Measurement::new(
        measurement.input_domain.clone(),
        measurement.output_domain.clone(),
        measurement.function.clone(),
        measurement.input_metric.clone(),
        SmoothedMaxDivergence::default(),
        PrivacyMap::new_fallible(move |d_in| {
            let rho = privacy_map.eval(d_in)?;
            Ok(SMDCurve::new(move |delta: &Q| cdp_epsilon(rho, *delta)))
        }),
    ))
}

/// Smallest ε the bound of Canonne, Kamath and Steinke (2020, Prop. 12)
/// gives for `rho`-zCDP at `delta`:
///
/// ε(α) = αρ + ln(1 − 1/α) + (ln(1/δ) − ln α)/(α − 1), minimized over α > 1.
pub fn cdp_epsilon<Q: Float>(rho: Q, delta: Q) -> Fallible<Q> {
    if rho.is_nan() || rho < Q::zero() {
        return fallible!(UndefinedMapEvaluation, "rho ({:?}) must be non-negative", rho);
    }
    if delta.is_nan() || delta <= Q::zero() || delta >= Q::one() {
        return fallible!(UndefinedMapEvaluation, "delta ({:?}) must be in (0, 1)", delta);
    }
    if rho.is_zero() {
        return Ok(Q::zero());
    }
    if rho.is_infinite() {
        return Ok(rho);
    }

    let one = Q::one();
    let two: Q = cast(2.0)?;
    let ln_inv_delta = -delta.ln();

    // the derivative ρ − (ln(1/δ) − ln α)/(α − 1)² is negative near α = 1 and
    // positive from 2 + sqrt(ln(1/δ)/ρ) on
    let mut alpha_min = one;
    let mut alpha_max = two + (ln_inv_delta / rho).sqrt();
    loop {
        let alpha_mid = alpha_min + (alpha_max - alpha_min) / two;
        if alpha_mid == alpha_min || alpha_mid == alpha_max {
            break;
        }
        let alpha_m1 = alpha_mid - one;
        let derivative = rho - (ln_inv_delta - alpha_mid.ln()) / (alpha_m1 * alpha_m1);
        if derivative < Q::zero() {
            alpha_min = alpha_mid;
        } else {
            alpha_max = alpha_mid;
        }
    }

    let alpha = alpha_max;
    let linear = inf_mul(alpha, rho);
    let log_ratio = inf_ln_1p(-neg_inf_div(one, alpha));
    let numerator = inf_sub(-neg_inf_ln(delta), neg_inf_ln(alpha));
    let tail = if numerator >= Q::zero() {
        inf_div(numerator, neg_inf_sub(alpha, one))
    } else {
        inf_div(numerator, inf_sub(alpha, one))
    };
    let epsilon = inf_add(inf_add(linear, log_ratio), tail);
    Ok(epsilon.max(Q::zero()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Function;
    use crate::domains::AllDomain;
    use crate::error::Error;
    use crate::metrics::AbsoluteDistance;
    use approx::assert_relative_eq;

    fn pure(epsilon: f64) -> Measurement<AllDomain<i32>, AllDomain<i32>, AbsoluteDistance<i32>, MaxDivergence<f64>> {
        Measurement::new(
            AllDomain::new(),
            AllDomain::new(),
            Function::new(|x: &i32| *x),
            AbsoluteDistance::default(),
            MaxDivergence::default(),
            PrivacyMap::new(move |d: &i32| *d as f64 * epsilon),
        )
    }

    fn caps() -> Capabilities {
        Capabilities::none().with(Capability::Contrib)
    }

    #[test]
    fn pure_embeds_with_zero_delta() {
        let approx = make_pureDP_to_fixed_approxDP(&caps(), &pure(0.5)).unwrap();
        assert_eq!(approx.map(&2).unwrap(), (1.0, 0.0));
        assert_eq!(approx.invoke(&4).unwrap(), 4);
    }

    #[test]
    fn pure_to_zcdp_halves_the_square() {
        let zcdp = make_pureDP_to_zCDP(&caps(), &pure(1.0)).unwrap();
        assert_eq!(zcdp.map(&2).unwrap(), 2.0);
    }

    #[test]
    fn zcdp_curve_matches_reference_values() {
        assert_relative_eq!(cdp_epsilon(0.5, 1e-6).unwrap(), 5.2215344445, epsilon = 1e-6);
        assert_relative_eq!(cdp_epsilon(0.005, 1e-4).unwrap(), 0.3123172522, epsilon = 1e-6);
    }

    #[test]
    fn zcdp_curve_shrinks_as_delta_grows() {
        let tight = cdp_epsilon(1.0f64, 1e-9).unwrap();
        let loose = cdp_epsilon(1.0f64, 1e-3).unwrap();
        assert!(loose < tight);
    }

    #[test]
    fn zero_rho_costs_nothing() {
        assert_eq!(cdp_epsilon(0.0f64, 1e-6).unwrap(), 0.0);
    }

    #[test]
    fn delta_outside_unit_interval_is_undefined() {
        for delta in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                cdp_epsilon(0.5, delta),
                Err(Error::UndefinedMapEvaluation(_))
            ));
        }
    }

    #[test]
    fn cast_curve_is_evaluated_lazily() {
        let zcdp = make_pureDP_to_zCDP(&caps(), &pure(1.0)).unwrap();
        let approx = make_zCDP_to_approxDP(&caps(), &zcdp).unwrap();
        let curve = approx.map(&1).unwrap();
        assert_relative_eq!(curve.epsilon(&1e-6).unwrap(), 5.2215344445, epsilon = 1e-6);
        assert!(curve.epsilon(&2.0).is_err());
        assert!(approx.check(&1, &(6.0, 1e-6)).unwrap());
        assert!(!approx.check(&1, &(5.0, 1e-6)).unwrap());
    }

    #[test]
    fn works_for_single_precision() {
        let epsilon = cdp_epsilon(0.5f32, 1e-6).unwrap();
        assert!((epsilon - 5.2215).abs() < 1e-2);
    }
}
