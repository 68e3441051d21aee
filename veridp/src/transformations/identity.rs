use crate::capability::{Capabilities, Capability};
use crate::core::{Function, StabilityMap, Transformation};
use crate::domains::Domain;
use crate::error::Fallible;
use crate::metrics::Metric;

/// The 1-stable transformation that returns its input.
pub fn make_identity<D, M>(
    capabilities: &Capabilities,
    domain: D,
    metric: M,
) -> Fallible<Transformation<D, D, M, M>>
where
    D: Domain,
    D::Carrier: Clone,
    M: Metric,
{
    capabilities.require(&[Capability::Contrib])?;
    Ok(Transformation::new(
        domain.clone(),
        domain,
        Function::new(|arg: &D::Carrier| arg.clone()),
        metric.clone(),
        metric,
        StabilityMap::new(|d_in: &M::Distance| *d_in),
    ))
}
