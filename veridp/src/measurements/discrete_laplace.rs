use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, Measurement, PrivacyMap};
use crate::error::{fallible, Fallible};
use crate::measures::MaxDivergence;
use crate::samplers::{fresh_rng, sample_discrete_laplace};
use crate::traits::{cast, inf_div, Float, Integer};

use super::{saturating_add_noise, LaplaceDomain};

/// Adds discrete Laplace noise to an integer or to each integer of a vector.
/// ε = d_in / scale. A scale of zero releases the input unchanged and costs
/// ε = ∞ for any nonzero distance.
pub fn make_base_discrete_laplace<D, QO>(
    capabilities: &Capabilities,
    scale: QO,
) -> Fallible<Measurement<D, D, D::InputMetric, MaxDivergence<QO>>>
where
    D: LaplaceDomain,
    D::Atom: Integer,
    QO: Float,
{
    capabilities.require(&[Capability::Contrib])?;
    if scale.is_nan() || scale < QO::zero() || scale.is_infinite() {
        return fallible!(InvalidParameter, "scale ({:?}) must be finite and non-negative", scale);
    }
    let f64_scale: f64 = cast(scale)?;
    debug!(scale = f64_scale, domain = %D::default().descriptor(), "built discrete laplace mechanism");

    Ok(Measurement::new(
        D::default(),
        D::default(),
        Function::new_fallible(move |arg: &D::Carrier| {
            let mut rng = fresh_rng()?;
            D::map_atoms(arg, |v| {
                Ok(saturating_add_noise(v, sample_discrete_laplace(&mut rng, f64_scale)?))
            })
        }),
        D::InputMetric::default(),
        MaxDivergence::default(),
        PrivacyMap::new_fallible(move |d_in: &D::Atom| {
            let d_in: QO = cast(*d_in)?;
            if d_in.is_zero() {
                return Ok(QO::zero());
            }
            if scale.is_zero() {
                return Ok(QO::infinity());
            }
            Ok(inf_div(d_in, scale))
        }),
    ))
}

/// Former name of [`make_base_discrete_laplace`].
#[deprecated(since = "0.1.0", note = "use `make_base_discrete_laplace`")]
pub fn make_base_geometric<D, QO>(
    capabilities: &Capabilities,
    scale: QO,
) -> Fallible<Measurement<D, D, D::InputMetric, MaxDivergence<QO>>>
where
    D: LaplaceDomain,
    D::Atom: Integer,
    QO: Float,
{
    make_base_discrete_laplace(capabilities, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::{AllDomain, VectorDomain};
    use crate::error::Error;

    fn caps() -> Capabilities {
        Capabilities::none().with(Capability::Contrib)
    }

    #[test]
    fn unit_scale_costs_unit_epsilon() {
        let m = make_base_discrete_laplace::<AllDomain<i32>, f64>(&caps(), 1.0).unwrap();
        assert_eq!(m.map(&1).unwrap(), 1.0);
        assert_eq!(m.map(&3).unwrap(), 3.0);
    }

    #[test]
    fn epsilon_never_undershoots_the_ratio() {
        let m = make_base_discrete_laplace::<AllDomain<i64>, f64>(&caps(), 3.0).unwrap();
        assert!(m.map(&1).unwrap() > 1.0 / 3.0);
        assert!(!m.check(&1, &(1.0 / 3.0)).unwrap());
    }

    #[test]
    fn does_not_need_floating_point() {
        let m = make_base_discrete_laplace::<VectorDomain<AllDomain<i64>>, f32>(&caps(), 2.0).unwrap();
        assert_eq!(m.map(&1).unwrap(), 0.5);
        assert_eq!(m.invoke(&vec![0, 0, 0]).unwrap().len(), 3);
    }

    #[test]
    fn zero_scale_is_exact_and_infinitely_costly() {
        let m = make_base_discrete_laplace::<AllDomain<u8>, f64>(&caps(), 0.0).unwrap();
        assert_eq!(m.invoke(&7).unwrap(), 7);
        assert_eq!(m.map(&0).unwrap(), 0.0);
        assert!(m.map(&1).unwrap().is_infinite());
    }

    #[test]
    fn negative_scale_is_rejected() {
        assert!(matches!(
            make_base_discrete_laplace::<AllDomain<i32>, f64>(&caps(), -1.0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    #[allow(deprecated)]
    fn geometric_forwards_to_discrete_laplace() {
        let m = make_base_geometric::<AllDomain<i32>, f64>(&caps(), 4.0).unwrap();
        assert_eq!(m.map(&2).unwrap(), 0.5);
    }
}
