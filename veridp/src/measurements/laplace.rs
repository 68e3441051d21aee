use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, Measurement, PrivacyMap};
use crate::error::Fallible;
use crate::measures::MaxDivergence;
use crate::samplers::{fresh_rng, sample_laplace};
use crate::traits::{check_positive, inf_div, Float};

use super::LaplaceDomain;

/// Adds Laplace(`scale`) noise to a float or to each float of a vector.
/// ε = d_in / scale.
pub fn make_base_laplace<D>(
    capabilities: &Capabilities,
    scale: D::Atom,
) -> Fallible<Measurement<D, D, D::InputMetric, MaxDivergence<D::Atom>>>
where
    D: LaplaceDomain,
    D::Atom: Float,
{
    capabilities.require(&[Capability::Contrib, Capability::FloatingPoint])?;
    check_positive("scale", scale)?;
    debug!(scale = ?scale, domain = %D::default().descriptor(), "built laplace mechanism");

    Ok(Measurement::new(
        D::default(),
        D::default(),
        Function::new_fallible(move |arg: &D::Carrier| {
            let mut rng = fresh_rng()?;
            D::map_atoms(arg, |v| Ok(v + sample_laplace(&mut rng, scale)?))
        }),
        D::InputMetric::default(),
        MaxDivergence::default(),
        PrivacyMap::new(move |d_in: &D::Atom| inf_div(*d_in, scale)),
    ))
}
