//! The three building blocks: [`Transformation`], [`Measurement`] and
//! [`Postprocessor`].
//!
//! Fields are only settable inside the crate. Outside code obtains these
//! objects from the constructors in `transformations`, `measurements` and
//! `combinators`, each of which proves its map before returning.

use std::sync::Arc;

use crate::descriptor::{MeasurementDescriptor, TransformationDescriptor};
use crate::domains::{AnyDomain, AnyObject, Domain};
use crate::error::{fallible, Fallible};
use crate::measures::{Measure, PrivacyBound};
use crate::metrics::Metric;
use crate::traits::{cast, check_distance};

/// A shareable function from `&TI` to `TO`.
pub struct Function<TI, TO> {
    function: Arc<dyn Fn(&TI) -> Fallible<TO> + Send + Sync>,
}

impl<TI, TO> Clone for Function<TI, TO> {
    fn clone(&self) -> Self {
        Self {
            function: self.function.clone(),
        }
    }
}

impl<TI: 'static, TO: 'static> Function<TI, TO> {
    pub fn new(function: impl Fn(&TI) -> TO + Send + Sync + 'static) -> Self {
        Self::new_fallible(move |arg| Ok(function(arg)))
    }

    pub fn new_fallible(function: impl Fn(&TI) -> Fallible<TO> + Send + Sync + 'static) -> Self {
        Self {
            function: Arc::new(function),
        }
    }

    pub fn eval(&self, arg: &TI) -> Fallible<TO> {
        (self.function)(arg)
    }

    /// `function1 ∘ function0`.
    pub fn make_chain<TX: 'static>(
        function1: &Function<TX, TO>,
        function0: &Function<TI, TX>,
    ) -> Self {
        let function0 = function0.function.clone();
        let function1 = function1.function.clone();
        Self::new_fallible(move |arg| function1(&function0(arg)?))
    }
}

/// Maps an input distance to an output distance.
pub struct StabilityMap<MI: Metric, MO: Metric>(
    Arc<dyn Fn(&MI::Distance) -> Fallible<MO::Distance> + Send + Sync>,
);

impl<MI: Metric, MO: Metric> Clone for StabilityMap<MI, MO> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<MI: Metric, MO: Metric> StabilityMap<MI, MO> {
    pub fn new(map: impl Fn(&MI::Distance) -> MO::Distance + Send + Sync + 'static) -> Self {
        Self(Arc::new(move |d_in: &MI::Distance| Ok(map(d_in))))
    }

    pub fn new_fallible(
        map: impl Fn(&MI::Distance) -> Fallible<MO::Distance> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(map))
    }

    /// `d_out = c * d_in`.
    pub fn new_from_constant(c: MO::Distance) -> Self {
        Self::new_fallible(move |d_in: &MI::Distance| Ok(cast::<_, MO::Distance>(*d_in)? * c))
    }

    pub fn eval(&self, d_in: &MI::Distance) -> Fallible<MO::Distance> {
        (self.0)(d_in)
    }

    pub fn make_chain<MX: Metric>(
        map1: &StabilityMap<MX, MO>,
        map0: &StabilityMap<MI, MX>,
    ) -> Self {
        let map0 = map0.0.clone();
        let map1 = map1.0.clone();
        Self(Arc::new(move |d_in: &MI::Distance| map1(&map0(d_in)?)))
    }
}

/// Maps an input distance to a privacy loss.
pub struct PrivacyMap<MI: Metric, MO: Measure>(
    Arc<dyn Fn(&MI::Distance) -> Fallible<MO::Distance> + Send + Sync>,
);

impl<MI: Metric, MO: Measure> Clone for PrivacyMap<MI, MO> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<MI: Metric, MO: Measure> PrivacyMap<MI, MO> {
    pub fn new(map: impl Fn(&MI::Distance) -> MO::Distance + Send + Sync + 'static) -> Self {
        Self(Arc::new(move |d_in: &MI::Distance| Ok(map(d_in))))
    }

    pub fn new_fallible(
        map: impl Fn(&MI::Distance) -> Fallible<MO::Distance> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(map))
    }

    pub fn eval(&self, d_in: &MI::Distance) -> Fallible<MO::Distance> {
        (self.0)(d_in)
    }

    pub fn make_chain<MX: Metric>(
        map1: &PrivacyMap<MX, MO>,
        map0: &StabilityMap<MI, MX>,
    ) -> Self {
        let map0 = map0.0.clone();
        let map1 = map1.0.clone();
        Self(Arc::new(move |d_in: &MI::Distance| map1(&map0(d_in)?)))
    }
}

/// A deterministic, stable step.
pub struct Transformation<DI: Domain, DO: Domain, MI: Metric, MO: Metric> {
    pub(crate) input_domain: DI,
    pub(crate) output_domain: DO,
    pub(crate) function: Function<DI::Carrier, DO::Carrier>,
    pub(crate) input_metric: MI,
    pub(crate) output_metric: MO,
    pub(crate) stability_map: StabilityMap<MI, MO>,
}

impl<DI: Domain, DO: Domain, MI: Metric, MO: Metric> Clone for Transformation<DI, DO, MI, MO> {
    fn clone(&self) -> Self {
        Self {
            input_domain: self.input_domain.clone(),
            output_domain: self.output_domain.clone(),
            function: self.function.clone(),
            input_metric: self.input_metric.clone(),
            output_metric: self.output_metric.clone(),
            stability_map: self.stability_map.clone(),
        }
    }
}

impl<DI: Domain, DO: Domain, MI: Metric, MO: Metric> Transformation<DI, DO, MI, MO> {
    pub(crate) fn new(
        input_domain: DI,
        output_domain: DO,
        function: Function<DI::Carrier, DO::Carrier>,
        input_metric: MI,
        output_metric: MO,
        stability_map: StabilityMap<MI, MO>,
    ) -> Self {
        Self {
            input_domain,
            output_domain,
            function,
            input_metric,
            output_metric,
            stability_map,
        }
    }

    pub fn input_domain(&self) -> &DI {
        &self.input_domain
    }

    pub fn output_domain(&self) -> &DO {
        &self.output_domain
    }

    pub fn input_metric(&self) -> &MI {
        &self.input_metric
    }

    pub fn output_metric(&self) -> &MO {
        &self.output_metric
    }

    pub fn invoke(&self, arg: &DI::Carrier) -> Fallible<DO::Carrier> {
        invoke_checked(&self.input_domain, &self.output_domain, &self.function, arg)
    }

    /// Output distance bound for inputs at most `d_in` apart.
    pub fn map(&self, d_in: &MI::Distance) -> Fallible<MO::Distance> {
        check_distance(d_in)?;
        self.stability_map.eval(d_in)
    }

    /// Whether inputs at most `d_in` apart are guaranteed to land at most
    /// `d_out` apart.
    pub fn check(&self, d_in: &MI::Distance, d_out: &MO::Distance) -> Fallible<bool> {
        Ok(self.map(d_in)? <= *d_out)
    }

    pub fn descriptor(&self) -> TransformationDescriptor {
        TransformationDescriptor {
            input_domain: self.input_domain.descriptor(),
            output_domain: self.output_domain.descriptor(),
            input_metric: self.input_metric.descriptor(),
            output_metric: self.output_metric.descriptor(),
        }
    }
}

/// A randomized step with a privacy guarantee.
pub struct Measurement<DI: Domain, DO: Domain, MI: Metric, MO: Measure> {
    pub(crate) input_domain: DI,
    pub(crate) output_domain: DO,
    pub(crate) function: Function<DI::Carrier, DO::Carrier>,
    pub(crate) input_metric: MI,
    pub(crate) output_measure: MO,
    pub(crate) privacy_map: PrivacyMap<MI, MO>,
}

impl<DI: Domain, DO: Domain, MI: Metric, MO: Measure> Clone for Measurement<DI, DO, MI, MO> {
    fn clone(&self) -> Self {
        Self {
            input_domain: self.input_domain.clone(),
            output_domain: self.output_domain.clone(),
            function: self.function.clone(),
            input_metric: self.input_metric.clone(),
            output_measure: self.output_measure.clone(),
            privacy_map: self.privacy_map.clone(),
        }
    }
}

impl<DI: Domain, DO: Domain, MI: Metric, MO: Measure> Measurement<DI, DO, MI, MO> {
    pub(crate) fn new(
        input_domain: DI,
        output_domain: DO,
        function: Function<DI::Carrier, DO::Carrier>,
        input_metric: MI,
        output_measure: MO,
        privacy_map: PrivacyMap<MI, MO>,
    ) -> Self {
        Self {
            input_domain,
            output_domain,
            function,
            input_metric,
            output_measure,
            privacy_map,
        }
    }

    pub fn input_domain(&self) -> &DI {
        &self.input_domain
    }

    pub fn output_domain(&self) -> &DO {
        &self.output_domain
    }

    pub fn input_metric(&self) -> &MI {
        &self.input_metric
    }

    pub fn output_measure(&self) -> &MO {
        &self.output_measure
    }

    pub fn invoke(&self, arg: &DI::Carrier) -> Fallible<DO::Carrier> {
        invoke_checked(&self.input_domain, &self.output_domain, &self.function, arg)
    }

    /// Privacy loss for inputs at most `d_in` apart.
    pub fn map(&self, d_in: &MI::Distance) -> Fallible<MO::Distance> {
        check_distance(d_in)?;
        self.privacy_map.eval(d_in)
    }

    pub fn check(
        &self,
        d_in: &MI::Distance,
        d_out: &<MO::Distance as PrivacyBound>::Budget,
    ) -> Fallible<bool>
    where
        MO::Distance: PrivacyBound,
    {
        self.map(d_in)?.within(d_out)
    }

    pub fn descriptor(&self) -> MeasurementDescriptor {
        MeasurementDescriptor {
            input_domain: self.input_domain.descriptor(),
            output_domain: self.output_domain.descriptor(),
            input_metric: self.input_metric.descriptor(),
            output_measure: self.output_measure.descriptor(),
        }
    }

    /// Erases the output type so measurements with different outputs can be
    /// composed together.
    pub fn into_any_output(self) -> Measurement<DI, AnyDomain, MI, MO>
    where
        DO::Carrier: Send + Sync,
    {
        let function = self.function;
        Measurement::new(
            self.input_domain,
            AnyDomain::new(self.output_domain),
            Function::new_fallible(move |arg| Ok(AnyObject::new(function.eval(arg)?))),
            self.input_metric,
            self.output_measure,
            self.privacy_map,
        )
    }
}

/// A data-independent step applied to a released value.
pub struct Postprocessor<DI: Domain, DO: Domain> {
    pub(crate) input_domain: DI,
    pub(crate) output_domain: DO,
    pub(crate) function: Function<DI::Carrier, DO::Carrier>,
}

impl<DI: Domain, DO: Domain> Clone for Postprocessor<DI, DO> {
    fn clone(&self) -> Self {
        Self {
            input_domain: self.input_domain.clone(),
            output_domain: self.output_domain.clone(),
            function: self.function.clone(),
        }
    }
}

impl<DI: Domain, DO: Domain> Postprocessor<DI, DO> {
    pub(crate) fn new(
        input_domain: DI,
        output_domain: DO,
        function: Function<DI::Carrier, DO::Carrier>,
    ) -> Self {
        Self {
            input_domain,
            output_domain,
            function,
        }
    }

    pub fn input_domain(&self) -> &DI {
        &self.input_domain
    }

    pub fn output_domain(&self) -> &DO {
        &self.output_domain
    }

    pub fn invoke(&self, arg: &DI::Carrier) -> Fallible<DO::Carrier> {
        invoke_checked(&self.input_domain, &self.output_domain, &self.function, arg)
    }
}

fn invoke_checked<DI: Domain, DO: Domain>(
    input_domain: &DI,
    output_domain: &DO,
    function: &Function<DI::Carrier, DO::Carrier>,
    arg: &DI::Carrier,
) -> Fallible<DO::Carrier> {
    if !input_domain.member(arg)? {
        return fallible!(DomainMismatch, "argument is not a member of {:?}", input_domain);
    }
    let output = function.eval(arg)?;
    if !output_domain.member(&output)? {
        return fallible!(FailedFunction, "output is not a member of {:?}", output_domain);
    }
    Ok(output)
}
