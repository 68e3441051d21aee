use tracing::warn;

use crate::capability::{Capabilities, Capability};
use crate::core::{Measurement, PrivacyMap};
use crate::domains::{Domain, SizedDataDomain};
use crate::error::{fallible, Fallible};
use crate::measures::{FixedSmoothedMaxDivergence, MaxDivergence, Measure};
use crate::metrics::Metric;
use crate::traits::{cast, inf_div, inf_exp_m1, inf_ln_1p, inf_mul, Float};

/// Measures that tighten under privacy amplification by subsampling.
pub trait AmplifiableMeasure: Measure {
    fn amplify(
        &self,
        budget: &Self::Distance,
        population_size: usize,
        sample_size: usize,
    ) -> Fallible<Self::Distance>;
}

fn sampling_rate<Q: Float>(population_size: usize, sample_size: usize) -> Fallible<Q> {
    Ok(inf_div(cast::<_, Q>(sample_size)?, cast::<_, Q>(population_size)?))
}

/// `ln(1 + q(e^ε − 1))`.
fn amplify_epsilon<Q: Float>(epsilon: Q, rate: Q) -> Q {
    inf_ln_1p(inf_mul(inf_exp_m1(epsilon), rate))
}

impl<Q: Float> AmplifiableMeasure for MaxDivergence<Q> {
    fn amplify(&self, epsilon: &Q, population_size: usize, sample_size: usize) -> Fallible<Q> {
        let rate = sampling_rate(population_size, sample_size)?;
        Ok(amplify_epsilon(*epsilon, rate))
    }
}

impl<Q: Float> AmplifiableMeasure for FixedSmoothedMaxDivergence<Q> {
    fn amplify(
        &self,
        budget: &(Q, Q),
        population_size: usize,
        sample_size: usize,
    ) -> Fallible<(Q, Q)> {
        let (epsilon, delta) = *budget;
        let rate = sampling_rate(population_size, sample_size)?;
        Ok((amplify_epsilon(epsilon, rate), inf_mul(delta, rate)))
    }
}

/// Treats the (sized) input as a simple random sample without replacement
/// from a population of `population_size` records and discounts the privacy
/// loss by the sampling rate. The claimed population size cannot be checked,
/// so this needs `honest-but-curious`.
pub fn make_population_amplification<DIA, DO, MI, MO>(
    capabilities: &Capabilities,
    measurement: &Measurement<DIA, DO, MI, MO>,
    population_size: usize,
) -> Fallible<Measurement<DIA, DO, MI, MO>>
where
    DIA: SizedDataDomain,
    DO: Domain,
    MI: Metric,
    MO: AmplifiableMeasure,
{
    capabilities.require(&[Capability::Contrib, Capability::HonestButCurious])?;
    let sample_size = measurement.input_domain.size();
    if population_size == 0 || population_size < sample_size {
        return fallible!(
            InvalidParameter,
            "population size ({}) must be positive and at least the sample size ({})",
            population_size,
            sample_size
        );
    }
    warn!(
        population_size,
        sample_size, "amplifying by a caller-claimed population size"
    );

    let privacy_map = measurement.privacy_map.clone();
    let output_measure = measurement.output_measure.clone();
    Ok(Measurement::new(
        measurement.input_domain.clone(),
        measurement.output_domain.clone(),
        measurement.function.clone(),
        measurement.input_metric.clone(),
        measurement.output_measure.clone(),
        PrivacyMap::new_fallible(move |d_in| {
            output_measure.amplify(&privacy_map.eval(d_in)?, population_size, sample_size)
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Function;
    use crate::domains::{AllDomain, SizedDomain, VectorDomain};
    use crate::error::Error;
    use crate::metrics::SymmetricDistance;
    use approx::assert_relative_eq;

    type Sized10 = SizedDomain<VectorDomain<AllDomain<f64>>>;

    fn mean_release(
        epsilon: f64,
    ) -> Measurement<Sized10, AllDomain<f64>, SymmetricDistance, MaxDivergence<f64>> {
        Measurement::new(
            SizedDomain::new(VectorDomain::new_all(), 10),
            AllDomain::new(),
            Function::new(|x: &Vec<f64>| x.iter().sum::<f64>() / x.len() as f64),
            SymmetricDistance,
            MaxDivergence::default(),
            PrivacyMap::new(move |d: &u32| *d as f64 * epsilon),
        )
    }

    #[test]
    fn amplification_applies_the_sampling_rate() {
        let amplified =
            make_population_amplification(&Capabilities::all(), &mean_release(1.0), 100).unwrap();
        let expected = (0.1 * (1f64.exp() - 1.0)).ln_1p();
        assert_relative_eq!(amplified.map(&1).unwrap(), expected, epsilon = 1e-12);
        assert!(amplified.map(&1).unwrap() < 1.0);
    }

    #[test]
    fn population_equal_to_sample_changes_nothing() {
        let amplified =
            make_population_amplification(&Capabilities::all(), &mean_release(0.7), 10).unwrap();
        assert_relative_eq!(amplified.map(&1).unwrap(), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn approximate_budgets_scale_delta() {
        let measure = FixedSmoothedMaxDivergence::<f64>::default();
        let (epsilon, delta) = measure.amplify(&(1.0, 1e-6), 50, 5).unwrap();
        assert!(epsilon < 1.0);
        assert_relative_eq!(delta, 1e-7, epsilon = 1e-20);
    }

    #[test]
    fn population_smaller_than_sample_is_rejected() {
        let err = make_population_amplification(&Capabilities::all(), &mean_release(1.0), 9)
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn requires_honest_but_curious() {
        let caps = Capabilities::none().with(Capability::Contrib);
        let err = make_population_amplification(&caps, &mean_release(1.0), 100)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::CapabilityDisabled(Capability::HonestButCurious)
        ));
    }
}
