use num_traits::{One, Zero};
use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Measurement, PrivacyMap};
use crate::domains::Domain;
use crate::error::{fallible, Fallible};
use crate::measures::{FixedSmoothedMaxDivergence, Measure, SmoothedMaxDivergence};
use crate::metrics::Metric;
use crate::traits::Float;

/// Measures whose distances can be pinned to a single δ.
pub trait FixDeltaMeasure: Measure {
    type Atom: Float;

    /// The `(ε, δ)` pair guaranteed at `delta`.
    fn fix_delta(&self, d: &Self::Distance, delta: &Self::Atom) -> Fallible<(Self::Atom, Self::Atom)>;
}

impl<Q: Float> FixDeltaMeasure for SmoothedMaxDivergence<Q> {
    type Atom = Q;

    fn fix_delta(&self, curve: &Self::Distance, delta: &Q) -> Fallible<(Q, Q)> {
        Ok((curve.epsilon(delta)?, *delta))
    }
}

/// Fixing an already fixed measure keeps its pair as long as the requested
/// δ is no tighter, so fixing twice at the same δ changes nothing.
impl<Q: Float> FixDeltaMeasure for FixedSmoothedMaxDivergence<Q> {
    type Atom = Q;

    fn fix_delta(&self, d: &(Q, Q), delta: &Q) -> Fallible<(Q, Q)> {
        let (epsilon, fixed) = *d;
        if *delta < fixed {
            return fallible!(
                UndefinedMapEvaluation,
                "cannot tighten a fixed delta of {:?} to {:?}",
                fixed,
                delta
            );
        }
        Ok((epsilon, fixed))
    }
}

pub fn make_fix_delta<DI, DO, MI, MO>(
    capabilities: &Capabilities,
    measurement: &Measurement<DI, DO, MI, MO>,
    delta: MO::Atom,
) -> Fallible<Measurement<DI, DO, MI, FixedSmoothedMaxDivergence<MO::Atom>>>
where
    DI: Domain,
    DO: Domain,
    MI: Metric,
    MO: FixDeltaMeasure,
{
    capabilities.require(&[Capability::Contrib])?;
    if num_traits::Float::is_nan(delta)
        || delta <= <MO::Atom as Zero>::zero()
        || delta >= <MO::Atom as One>::one()
    {
        return fallible!(InvalidParameter, "delta ({:?}) must be in (0, 1)", delta);
    }
    debug!(delta = ?delta, "fixed delta");

    let privacy_map = measurement.privacy_map.clone();
    let output_measure = measurement.output_measure.clone();
    Ok(Measurement::new(
        measurement.input_domain.clone(),
        measurement.output_domain.clone(),
        measurement.function.clone(),
        measurement.input_metric.clone(),
        FixedSmoothedMaxDivergence::default(),
        PrivacyMap::new_fallible(move |d_in| {
            output_measure.fix_delta(&privacy_map.eval(d_in)?, &delta)
        }),
    ))
}
