//! Trusted constructors that wrap caller-supplied closures.
//!
//! Nothing here checks that the supplied map bounds the supplied function.
//! The domains, metrics and measures that may be used are the closed set
//! implementing [`UserDomain`], [`UserMetric`] and [`UserMeasure`].

use tracing::warn;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, Measurement, Postprocessor, PrivacyMap, StabilityMap, Transformation};
use crate::domains::{AllDomain, Domain, VectorDomain};
use crate::error::Fallible;
use crate::measures::{FixedSmoothedMaxDivergence, MaxDivergence, Measure, ZeroConcentratedDivergence};
use crate::metrics::{
    AbsoluteDistance, ChangeOneDistance, DiscreteDistance, HammingDistance, InsertDeleteDistance,
    L1Distance, L2Distance, Metric, SymmetricDistance,
};
use crate::traits::{Float, Number, Primitive};

mod private {
    pub trait Sealed {}
}

pub trait UserDomain: Domain + Default + private::Sealed {}
pub trait UserMetric: Metric + private::Sealed {}
pub trait UserMeasure: Measure + private::Sealed {}

impl<T: Primitive> private::Sealed for AllDomain<T> {}
impl<T: Primitive> UserDomain for AllDomain<T> {}
impl<T: Primitive> private::Sealed for VectorDomain<AllDomain<T>> {}
impl<T: Primitive> UserDomain for VectorDomain<AllDomain<T>> {}

macro_rules! user_metric {
    ($($metric:ty),+) => {
        $(
            impl private::Sealed for $metric {}
            impl UserMetric for $metric {}
        )+
    };
}

user_metric!(
    SymmetricDistance,
    InsertDeleteDistance,
    ChangeOneDistance,
    HammingDistance,
    DiscreteDistance
);

impl<Q: Number> private::Sealed for AbsoluteDistance<Q> {}
impl<Q: Number> UserMetric for AbsoluteDistance<Q> {}
impl<Q: Number> private::Sealed for L1Distance<Q> {}
impl<Q: Number> UserMetric for L1Distance<Q> {}
impl<Q: Number> private::Sealed for L2Distance<Q> {}
impl<Q: Number> UserMetric for L2Distance<Q> {}

impl<Q: Float> private::Sealed for MaxDivergence<Q> {}
impl<Q: Float> UserMeasure for MaxDivergence<Q> {}
impl<Q: Float> private::Sealed for FixedSmoothedMaxDivergence<Q> {}
impl<Q: Float> UserMeasure for FixedSmoothedMaxDivergence<Q> {}
impl<Q: Float> private::Sealed for ZeroConcentratedDivergence<Q> {}
impl<Q: Float> UserMeasure for ZeroConcentratedDivergence<Q> {}

pub fn make_default_user_transformation<DI, DO, MI, MO>(
    capabilities: &Capabilities,
    function: impl Fn(&DI::Carrier) -> Fallible<DO::Carrier> + Send + Sync + 'static,
    stability_map: impl Fn(&MI::Distance) -> Fallible<MO::Distance> + Send + Sync + 'static,
) -> Fallible<Transformation<DI, DO, MI, MO>>
where
    DI: UserDomain,
    DO: UserDomain,
    MI: UserMetric,
    MO: UserMetric,
{
    capabilities.require(&[Capability::Contrib, Capability::HonestButCurious])?;
    warn!(
        input = %DI::default().descriptor(),
        output = %DO::default().descriptor(),
        "built transformation from a caller-supplied stability map"
    );
    Ok(Transformation::new(
        DI::default(),
        DO::default(),
        Function::new_fallible(function),
        MI::default(),
        MO::default(),
        StabilityMap::new_fallible(stability_map),
    ))
}

pub fn make_default_user_measurement<DI, DO, MI, MO>(
    capabilities: &Capabilities,
    function: impl Fn(&DI::Carrier) -> Fallible<DO::Carrier> + Send + Sync + 'static,
    privacy_map: impl Fn(&MI::Distance) -> Fallible<MO::Distance> + Send + Sync + 'static,
) -> Fallible<Measurement<DI, DO, MI, MO>>
where
    DI: UserDomain,
    DO: UserDomain,
    MI: UserMetric,
    MO: UserMeasure,
{
    capabilities.require(&[Capability::Contrib, Capability::HonestButCurious])?;
    warn!(
        input = %DI::default().descriptor(),
        measure = %MO::default().descriptor(),
        "built measurement from a caller-supplied privacy map"
    );
    Ok(Measurement::new(
        DI::default(),
        DO::default(),
        Function::new_fallible(function),
        MI::default(),
        MO::default(),
        PrivacyMap::new_fallible(privacy_map),
    ))
}

/// Postprocessing cannot weaken a guarantee, so only `contrib` is needed.
pub fn make_default_user_postprocessor<DI, DO>(
    capabilities: &Capabilities,
    function: impl Fn(&DI::Carrier) -> Fallible<DO::Carrier> + Send + Sync + 'static,
) -> Fallible<Postprocessor<DI, DO>>
where
    DI: UserDomain,
    DO: UserDomain,
{
    capabilities.require(&[Capability::Contrib])?;
    Ok(Postprocessor::new(
        DI::default(),
        DO::default(),
        Function::new_fallible(function),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn user_transformation_uses_the_supplied_closures() {
        let t = make_default_user_transformation::<
            VectorDomain<AllDomain<i64>>,
            AllDomain<i64>,
            SymmetricDistance,
            AbsoluteDistance<i64>,
        >(
            &Capabilities::all(),
            |x| Ok(x.iter().sum()),
            |d| Ok(*d as i64 * 10),
        )
        .unwrap();
        assert_eq!(t.invoke(&vec![1, 2, 3]).unwrap(), 6);
        assert_eq!(t.map(&2).unwrap(), 20);
    }

    #[test]
    fn user_measurement_needs_honest_but_curious() {
        let caps = Capabilities::none()
            .with(Capability::Contrib)
            .with(Capability::FloatingPoint);
        let err = make_default_user_measurement::<
            AllDomain<f64>,
            AllDomain<f64>,
            AbsoluteDistance<f64>,
            MaxDivergence<f64>,
        >(&caps, |x| Ok(*x), |d| Ok(*d))
        .err()
        .unwrap();
        assert!(matches!(
            err,
            Error::CapabilityDisabled(Capability::HonestButCurious)
        ));
    }

    #[test]
    fn user_postprocessor_needs_only_contrib() {
        let caps = Capabilities::none().with(Capability::Contrib);
        let post = make_default_user_postprocessor::<AllDomain<f64>, AllDomain<bool>>(&caps, |x| {
            Ok(*x >= 0.0)
        })
        .unwrap();
        assert!(post.invoke(&3.0).unwrap());
        assert!(matches!(
            post.invoke(&f64::NAN),
            Err(Error::DomainMismatch(_))
        ));
    }
}
