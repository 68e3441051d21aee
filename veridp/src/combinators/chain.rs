use std::fmt::Debug;

use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, Measurement, Postprocessor, PrivacyMap, StabilityMap, Transformation};
use crate::domains::Domain;
use crate::error::{Error, Fallible};
use crate::measures::Measure;
use crate::metrics::Metric;

pub(crate) fn mismatch_message<T: Debug>(what: &str, expected: &T, found: &T) -> String {
    let (expected, found) = (format!("{expected:?}"), format!("{found:?}"));
    let mut message = format!("{what} mismatch\n    expected {expected}\n    found    {found}");
    if expected == found {
        message.push_str("\n    both print the same, so they differ in a parameter that is not shown");
    }
    message
}

/// The output of `inner` must be what `outer` accepts, both in domain and
/// in metric.
fn check_link<DA: Domain, MA: Metric>(
    inner_domain: &DA,
    outer_domain: &DA,
    inner_metric: &MA,
    outer_metric: &MA,
) -> Fallible<()> {
    if inner_domain != outer_domain {
        return Err(Error::DomainMismatch(mismatch_message(
            "intermediate domain",
            outer_domain,
            inner_domain,
        )));
    }
    if inner_metric != outer_metric {
        return Err(Error::MetricMismatch(mismatch_message(
            "intermediate metric",
            outer_metric,
            inner_metric,
        )));
    }
    Ok(())
}

/// Runs `inner` then releases with `outer`. The privacy map is
/// `outer.map(inner.map(d_in))`.
pub fn make_chain_mt<DI, DX, DO, MI, MX, MO>(
    capabilities: &Capabilities,
    outer: &Measurement<DX, DO, MX, MO>,
    inner: &Transformation<DI, DX, MI, MX>,
) -> Fallible<Measurement<DI, DO, MI, MO>>
where
    DI: Domain,
    DX: Domain,
    DO: Domain,
    MI: Metric,
    MX: Metric,
    MO: Measure,
{
    capabilities.require(&[Capability::Contrib])?;
    check_link(
        &inner.output_domain,
        &outer.input_domain,
        &inner.output_metric,
        &outer.input_metric,
    )?;
    debug!(
        input = %inner.input_domain.descriptor(),
        output = %outer.output_domain.descriptor(),
        "chained measurement after transformation"
    );
    Ok(Measurement::new(
        inner.input_domain.clone(),
        outer.output_domain.clone(),
        Function::make_chain(&outer.function, &inner.function),
        inner.input_metric.clone(),
        outer.output_measure.clone(),
        PrivacyMap::make_chain(&outer.privacy_map, &inner.stability_map),
    ))
}

/// `outer ∘ inner`, with stability map `outer.map(inner.map(d_in))`.
pub fn make_chain_tt<DI, DX, DO, MI, MX, MO>(
    capabilities: &Capabilities,
    outer: &Transformation<DX, DO, MX, MO>,
    inner: &Transformation<DI, DX, MI, MX>,
) -> Fallible<Transformation<DI, DO, MI, MO>>
where
    DI: Domain,
    DX: Domain,
    DO: Domain,
    MI: Metric,
    MX: Metric,
    MO: Metric,
{
    capabilities.require(&[Capability::Contrib])?;
    check_link(
        &inner.output_domain,
        &outer.input_domain,
        &inner.output_metric,
        &outer.input_metric,
    )?;
    debug!(
        input = %inner.input_domain.descriptor(),
        output = %outer.output_domain.descriptor(),
        "chained transformations"
    );
    Ok(Transformation::new(
        inner.input_domain.clone(),
        outer.output_domain.clone(),
        Function::make_chain(&outer.function, &inner.function),
        inner.input_metric.clone(),
        outer.output_metric.clone(),
        StabilityMap::make_chain(&outer.stability_map, &inner.stability_map),
    ))
}

/// Applies `outer` to whatever `inner` released. The transformation only
/// post-processes, so its metrics and stability map play no part and the
/// privacy map stays that of `inner`.
pub fn make_chain_tm<DI, DX, DO, MI, MX, MY, MO>(
    capabilities: &Capabilities,
    outer: &Transformation<DX, DO, MX, MY>,
    inner: &Measurement<DI, DX, MI, MO>,
) -> Fallible<Measurement<DI, DO, MI, MO>>
where
    DI: Domain,
    DX: Domain,
    DO: Domain,
    MI: Metric,
    MX: Metric,
    MY: Metric,
    MO: Measure,
{
    capabilities.require(&[Capability::Contrib])?;
    let postprocessor = Postprocessor::new(
        outer.input_domain.clone(),
        outer.output_domain.clone(),
        outer.function.clone(),
    );
    make_chain_pm(capabilities, &postprocessor, inner)
}

/// Post-processes the release of `inner`; the privacy map is unchanged.
pub fn make_chain_pm<DI, DX, DO, MI, MO>(
    capabilities: &Capabilities,
    outer: &Postprocessor<DX, DO>,
    inner: &Measurement<DI, DX, MI, MO>,
) -> Fallible<Measurement<DI, DO, MI, MO>>
where
    DI: Domain,
    DX: Domain,
    DO: Domain,
    MI: Metric,
    MO: Measure,
{
    capabilities.require(&[Capability::Contrib])?;
    if inner.output_domain != outer.input_domain {
        return Err(Error::DomainMismatch(mismatch_message(
            "intermediate domain",
            &outer.input_domain,
            &inner.output_domain,
        )));
    }
    debug!(
        output = %outer.output_domain.descriptor(),
        "chained postprocessor after measurement"
    );
    Ok(Measurement::new(
        inner.input_domain.clone(),
        outer.output_domain.clone(),
        Function::make_chain(&outer.function, &inner.function),
        inner.input_metric.clone(),
        inner.output_measure.clone(),
        inner.privacy_map.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::{AllDomain, BoundedDomain, VectorDomain};
    use crate::error::Error;
    use crate::measures::MaxDivergence;
    use crate::metrics::{AbsoluteDistance, SymmetricDistance};

    type Scalar = AllDomain<f64>;
    type Abs = AbsoluteDistance<f64>;

    fn caps() -> Capabilities {
        Capabilities::none().with(Capability::Contrib)
    }

    fn scale_by(c: f64) -> Transformation<Scalar, Scalar, Abs, Abs> {
        Transformation::new(
            AllDomain::new(),
            AllDomain::new(),
            Function::new(move |x: &f64| x * c),
            AbsoluteDistance::default(),
            AbsoluteDistance::default(),
            StabilityMap::new(move |d: &f64| d * c.abs()),
        )
    }

    fn identity_release(epsilon_per_unit: f64) -> Measurement<Scalar, Scalar, Abs, MaxDivergence<f64>> {
        Measurement::new(
            AllDomain::new(),
            AllDomain::new(),
            Function::new(|x: &f64| *x),
            AbsoluteDistance::default(),
            MaxDivergence::default(),
            PrivacyMap::new(move |d: &f64| d * epsilon_per_unit),
        )
    }

    #[test]
    fn chain_tt_composes_functions_and_maps() {
        let chained = make_chain_tt(&caps(), &scale_by(3.0), &scale_by(2.0)).unwrap();
        assert_eq!(chained.invoke(&1.5).unwrap(), 9.0);
        assert_eq!(chained.map(&1.0).unwrap(), 6.0);
    }

    #[test]
    fn chain_mt_feeds_stability_into_privacy() {
        let chained = make_chain_mt(&caps(), &identity_release(0.5), &scale_by(4.0)).unwrap();
        assert_eq!(chained.invoke(&2.0).unwrap(), 8.0);
        assert_eq!(chained.map(&1.0).unwrap(), 2.0);
    }

    #[test]
    fn chain_pm_keeps_the_privacy_map() {
        let post = Postprocessor::new(
            AllDomain::<f64>::new(),
            AllDomain::<bool>::new(),
            Function::new(|x: &f64| *x > 0.0),
        );
        let chained = make_chain_pm(&caps(), &post, &identity_release(0.25)).unwrap();
        assert!(chained.invoke(&1.0).unwrap());
        assert_eq!(chained.map(&2.0).unwrap(), 0.5);
    }

    #[test]
    fn chain_tm_ignores_transformation_stability() {
        let chained = make_chain_tm(&caps(), &scale_by(100.0), &identity_release(1.0)).unwrap();
        assert_eq!(chained.invoke(&0.5).unwrap(), 50.0);
        assert_eq!(chained.map(&1.0).unwrap(), 1.0);
    }

    #[test]
    fn mismatched_domains_are_rejected() {
        let clamp_like = Transformation::new(
            VectorDomain::<AllDomain<i32>>::new_all(),
            VectorDomain::new(BoundedDomain::new_closed((0, 5)).unwrap()),
            Function::new(|x: &Vec<i32>| x.iter().map(|v| (*v).clamp(0, 5)).collect()),
            SymmetricDistance,
            SymmetricDistance,
            StabilityMap::new(|d: &u32| *d),
        );
        let wider = Transformation::new(
            VectorDomain::new(BoundedDomain::new_closed((0, 9)).unwrap()),
            AllDomain::<i32>::new(),
            Function::new(|x: &Vec<i32>| x.iter().sum()),
            SymmetricDistance,
            AbsoluteDistance::<i32>::default(),
            StabilityMap::new(|d: &u32| *d as i32 * 9),
        );
        let err = make_chain_tt(&caps(), &wider, &clamp_like).err().unwrap();
        assert!(matches!(err, Error::DomainMismatch(_)));
        let message = err.to_string();
        assert!(message.contains("BoundedDomain([0, 5])"));
        assert!(message.contains("BoundedDomain([0, 9])"));
    }

    #[test]
    fn identical_renderings_are_called_out() {
        let message = mismatch_message("intermediate domain", &"x", &"x");
        assert!(message.contains("differ in a parameter that is not shown"));
        assert!(!mismatch_message("intermediate domain", &"x", &"y").contains("not shown"));
    }

    #[test]
    fn contrib_is_required() {
        let err = make_chain_tt(&Capabilities::none(), &scale_by(1.0), &scale_by(1.0))
            .err()
            .unwrap();
        assert!(matches!(err, Error::CapabilityDisabled(Capability::Contrib)));
    }
}
