use std::collections::HashMap;

use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, Measurement, PrivacyMap};
use crate::domains::{AllDomain, MapDomain};
use crate::error::{fallible, Fallible};
use crate::measures::{SMDCurve, SmoothedMaxDivergence};
use crate::metrics::L1Distance;
use crate::samplers::{fresh_rng, sample_laplace};
use crate::traits::{
    check_positive, inf_div, inf_exp, inf_mul, neg_inf_div, neg_inf_sub, Float, Hashable,
};

type CountDomain<TK, TV> = MapDomain<AllDomain<TK>, AllDomain<TV>>;

/// Propose-test-release over a key → count map: every count gets
/// Laplace(`scale`) noise and only keys whose noisy count reaches
/// `threshold` are released.
///
/// Keys present in only one of two neighboring maps are assumed to carry a
/// count of at least one, as produced by `make_count_by`. Shared keys cost
/// ε = d_in/scale, and the chance of releasing a key that only one side has
/// is bounded by δ ≥ d_in · ½ · exp(−(threshold − d_in)/scale).
pub fn make_base_ptr<TK, TV>(
    capabilities: &Capabilities,
    scale: TV,
    threshold: TV,
) -> Fallible<Measurement<CountDomain<TK, TV>, CountDomain<TK, TV>, L1Distance<TV>, SmoothedMaxDivergence<TV>>>
where
    TK: Hashable,
    TV: Float,
{
    capabilities.require(&[Capability::Contrib, Capability::FloatingPoint])?;
    check_positive("scale", scale)?;
    if threshold.is_nan() || !threshold.is_finite() {
        return fallible!(InvalidParameter, "threshold ({:?}) must be finite", threshold);
    }
    debug!(scale = ?scale, threshold = ?threshold, "built propose-test-release mechanism");

    let half: TV = TV::one() / (TV::one() + TV::one());
    Ok(Measurement::new(
        MapDomain::new(AllDomain::new(), AllDomain::new()),
        MapDomain::new(AllDomain::new(), AllDomain::new()),
        Function::new_fallible(move |counts: &HashMap<TK, TV>| {
            let mut rng = fresh_rng()?;
            let mut released = HashMap::with_capacity(counts.len());
            for (key, count) in counts {
                let noisy = *count + sample_laplace(&mut rng, scale)?;
                if noisy >= threshold {
                    released.insert(key.clone(), noisy);
                }
            }
            Ok(released)
        }),
        L1Distance::default(),
        SmoothedMaxDivergence::default(),
        PrivacyMap::new(move |d_in: &TV| {
            let d_in = *d_in;
            let epsilon = inf_div(d_in, scale);
            SMDCurve::new(move |delta: &TV| {
                let delta = *delta;
                if delta.is_nan() || delta <= TV::zero() || delta >= TV::one() {
                    return fallible!(UndefinedMapEvaluation, "delta ({:?}) must be in (0, 1)", delta);
                }
                if threshold < d_in {
                    return fallible!(
                        UndefinedMapEvaluation,
                        "threshold ({:?}) must be at least d_in ({:?})",
                        threshold,
                        d_in
                    );
                }
                let decay = inf_exp(-neg_inf_div(neg_inf_sub(threshold, d_in), scale));
                let required = inf_mul(inf_mul(d_in, half), decay);
                if delta < required {
                    return fallible!(
                        UndefinedMapEvaluation,
                        "delta ({:?}) is below the {:?} this threshold supports",
                        delta,
                        required
                    );
                }
                Ok(epsilon)
            })
        }),
    ))
}
