use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, Measurement, PrivacyMap};
use crate::domains::{Domain, ProductDomain};
use crate::error::{fallible, Error, Fallible};
use crate::measures::{FixedSmoothedMaxDivergence, MaxDivergence, Measure, ZeroConcentratedDivergence};
use crate::metrics::Metric;
use crate::traits::{inf_add, Float};

use super::chain::mismatch_message;

/// Measures under which privacy losses of independent releases add up.
pub trait BasicCompositionMeasure: Measure {
    fn compose(&self, d_i: Vec<Self::Distance>) -> Fallible<Self::Distance>;
}

impl<Q: Float> BasicCompositionMeasure for MaxDivergence<Q> {
    fn compose(&self, d_i: Vec<Q>) -> Fallible<Q> {
        Ok(d_i.into_iter().fold(Q::zero(), inf_add))
    }
}

impl<Q: Float> BasicCompositionMeasure for ZeroConcentratedDivergence<Q> {
    fn compose(&self, d_i: Vec<Q>) -> Fallible<Q> {
        Ok(d_i.into_iter().fold(Q::zero(), inf_add))
    }
}

impl<Q: Float> BasicCompositionMeasure for FixedSmoothedMaxDivergence<Q> {
    fn compose(&self, d_i: Vec<(Q, Q)>) -> Fallible<(Q, Q)> {
        Ok(d_i
            .into_iter()
            .fold((Q::zero(), Q::zero()), |(eps, del), (e, d)| (inf_add(eps, e), inf_add(del, d))))
    }
}

/// Releases every measurement on the same input. The privacy loss is the sum
/// of the constituents' losses at the same `d_in`.
pub fn make_basic_composition<DI, DO, MI, MO>(
    capabilities: &Capabilities,
    measurements: Vec<&Measurement<DI, DO, MI, MO>>,
) -> Fallible<Measurement<DI, ProductDomain<DO>, MI, MO>>
where
    DI: Domain,
    DI::Carrier: Sync,
    DO: Domain,
    DO::Carrier: Send,
    MI: Metric,
    MO: BasicCompositionMeasure,
{
    capabilities.require(&[Capability::Contrib])?;
    let first = match measurements.first() {
        Some(first) => *first,
        None => return Err(Error::EmptyComposition),
    };
    for other in &measurements[1..] {
        if other.input_domain != first.input_domain {
            return fallible!(
                DomainMismatch,
                "{}",
                mismatch_message("input domain", &first.input_domain, &other.input_domain)
            );
        }
        if other.input_metric != first.input_metric {
            return fallible!(
                MetricMismatch,
                "{}",
                mismatch_message("input metric", &first.input_metric, &other.input_metric)
            );
        }
        if other.output_measure != first.output_measure {
            return fallible!(
                MeasureMismatch,
                "{}",
                mismatch_message("output measure", &first.output_measure, &other.output_measure)
            );
        }
    }

    let output_domain = ProductDomain::new(
        measurements
            .iter()
            .map(|m| m.output_domain.clone())
            .collect(),
    );
    let functions: Vec<_> = measurements.iter().map(|m| m.function.clone()).collect();
    let maps: Vec<_> = measurements.iter().map(|m| m.privacy_map.clone()).collect();
    let output_measure = first.output_measure.clone();
    let composition_measure = output_measure.clone();

    debug!(
        size = measurements.len(),
        measure = %output_measure.descriptor(),
        "built basic composition"
    );
    Ok(Measurement::new(
        first.input_domain.clone(),
        output_domain,
        Function::new_fallible(move |arg: &DI::Carrier| invoke_all(&functions, arg)),
        first.input_metric.clone(),
        output_measure,
        PrivacyMap::new_fallible(move |d_in: &MI::Distance| {
            let d_i = maps
                .iter()
                .map(|map| map.eval(d_in))
                .collect::<Fallible<Vec<_>>>()?;
            composition_measure.compose(d_i)
        }),
    ))
}

#[cfg(not(feature = "parallel"))]
fn invoke_all<TI, TO>(functions: &[Function<TI, TO>], arg: &TI) -> Fallible<Vec<TO>>
where
    TI: Sync + 'static,
    TO: Send + 'static,
{
    functions.iter().map(|f| f.eval(arg)).collect()
}

#[cfg(feature = "parallel")]
fn invoke_all<TI, TO>(functions: &[Function<TI, TO>], arg: &TI) -> Fallible<Vec<TO>>
where
    TI: Sync + 'static,
    TO: Send + 'static,
{
    use rayon::prelude::*;

    functions.par_iter().map(|f| f.eval(arg)).collect()
}
