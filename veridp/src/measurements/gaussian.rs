use num_traits::One;
use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, Measurement, PrivacyMap};
use crate::error::Fallible;
use crate::measures::ZeroConcentratedDivergence;
use crate::samplers::{fresh_rng, sample_gaussian};
use crate::traits::{check_positive, inf_div, inf_square, Float};

use super::GaussianDomain;

/// Adds N(0, `scale`²) noise to a float or to each float of a vector.
/// ρ = (d_in / scale)² / 2.
pub fn make_base_gaussian<D>(
    capabilities: &Capabilities,
    scale: D::Atom,
) -> Fallible<Measurement<D, D, D::InputMetric, ZeroConcentratedDivergence<D::Atom>>>
where
    D: GaussianDomain,
    D::Atom: Float,
{
    capabilities.require(&[Capability::Contrib, Capability::FloatingPoint])?;
    check_positive("scale", scale)?;
    debug!(scale = ?scale, domain = %D::default().descriptor(), "built gaussian mechanism");

    let two = <D::Atom as One>::one() + <D::Atom as One>::one();
    Ok(Measurement::new(
        D::default(),
        D::default(),
        Function::new_fallible(move |arg: &D::Carrier| {
            let mut rng = fresh_rng()?;
            D::map_atoms(arg, |v| Ok(v + sample_gaussian(&mut rng, scale)?))
        }),
        D::InputMetric::default(),
        ZeroConcentratedDivergence::default(),
        PrivacyMap::new(move |d_in: &D::Atom| inf_div(inf_square(inf_div(*d_in, scale)), two)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{make_fix_delta, make_zCDP_to_approxDP};
    use crate::domains::{AllDomain, VectorDomain};
    use crate::error::Error;
    use crate::metrics::Metric;

    fn caps() -> Capabilities {
        Capabilities::none()
            .with(Capability::Contrib)
            .with(Capability::FloatingPoint)
    }

    #[test]
    fn rho_is_half_the_squared_ratio() {
        let m = make_base_gaussian::<AllDomain<f64>>(&caps(), 2.0).unwrap();
        assert_eq!(m.map(&1.0).unwrap(), 0.125);
        assert_eq!(m.map(&4.0).unwrap(), 2.0);
    }

    #[test]
    fn rho_rounds_up_when_inexact() {
        let m = make_base_gaussian::<AllDomain<f64>>(&caps(), 3.0).unwrap();
        assert!(m.map(&1.0).unwrap() >= 1.0 / 18.0);
        assert!(m.map(&1.0).unwrap() * 18.0 >= 1.0);
    }

    #[test]
    fn vector_gaussian_uses_l2() {
        let m = make_base_gaussian::<VectorDomain<AllDomain<f64>>>(&caps(), 1.0).unwrap();
        assert_eq!(
            m.input_metric().descriptor(),
            crate::descriptor::MetricDescriptor::L2Distance(crate::descriptor::Atom::F64)
        );
        assert_eq!(m.invoke(&vec![0.0; 5]).unwrap().len(), 5);
    }

    #[test]
    fn converts_to_a_fixed_approximate_guarantee() {
        let m = make_base_gaussian::<AllDomain<f64>>(&caps(), 1.0).unwrap();
        let curve = make_zCDP_to_approxDP(&caps(), &m).unwrap();
        let fixed = make_fix_delta(&caps(), &curve, 1e-6).unwrap();
        let (epsilon, delta) = fixed.map(&1.0).unwrap();
        assert_eq!(delta, 1e-6);
        assert!((epsilon - 5.2215344445).abs() < 1e-6);
    }

    #[test]
    fn capability_checked_before_scale() {
        let err = make_base_gaussian::<AllDomain<f64>>(&Capabilities::none(), -1.0)
            .err()
            .unwrap();
        assert!(matches!(err, Error::CapabilityDisabled(Capability::Contrib)));
    }
}
