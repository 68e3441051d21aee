//! Randomized response: report the truth with probability `prob`, otherwise
//! one of the other categories uniformly at random.
//!
//! With `t` categories the privacy loss of any change is
//! ε = ln(p / p'), where p' = (1 − p)/(t − 1) is the chance of each lie.

use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, Measurement, PrivacyMap};
use crate::domains::AllDomain;
use crate::error::{fallible, Fallible};
use crate::measures::MaxDivergence;
use crate::metrics::DiscreteDistance;
use crate::samplers::{fresh_rng, sample_bernoulli};
use crate::traits::{cast, inf_div, inf_ln, inf_mul, inf_sub, neg_inf_sub, Float, Hashable};

fn check_prob<QO: Float>(prob: QO, num_categories: usize) -> Fallible<()> {
    let lower = cast::<_, QO>(num_categories)?.recip();
    if prob.is_nan() || prob < lower || prob >= QO::one() {
        return fallible!(
            InvalidParameter,
            "probability ({:?}) must be within [1/{}, 1)",
            prob,
            num_categories
        );
    }
    Ok(())
}

fn discrete_privacy_map<QO: Float>(privacy_constant: QO) -> PrivacyMap<DiscreteDistance, MaxDivergence<QO>> {
    PrivacyMap::new(move |d_in: &u32| {
        if *d_in == 0 {
            QO::zero()
        } else {
            privacy_constant
        }
    })
}

pub fn make_randomized_response_bool<QO: Float>(
    capabilities: &Capabilities,
    prob: QO,
) -> Fallible<Measurement<AllDomain<bool>, AllDomain<bool>, DiscreteDistance, MaxDivergence<QO>>> {
    capabilities.require(&[Capability::Contrib])?;
    check_prob(prob, 2)?;

    let privacy_constant = inf_ln(inf_div(prob, neg_inf_sub(QO::one(), prob)));
    let f64_prob: f64 = cast(prob)?;
    debug!(prob = f64_prob, "built boolean randomized response");

    Ok(Measurement::new(
        AllDomain::new(),
        AllDomain::new(),
        Function::new_fallible(move |arg: &bool| {
            let mut rng = fresh_rng()?;
            Ok(arg ^ !sample_bernoulli(&mut rng, f64_prob)?)
        }),
        DiscreteDistance,
        MaxDivergence::default(),
        discrete_privacy_map(privacy_constant),
    ))
}

pub fn make_randomized_response<T, QO>(
    capabilities: &Capabilities,
    categories: HashSet<T>,
    prob: QO,
) -> Fallible<Measurement<AllDomain<T>, AllDomain<T>, DiscreteDistance, MaxDivergence<QO>>>
where
    T: Hashable,
    QO: Float,
{
    capabilities.require(&[Capability::Contrib])?;
    let categories: Vec<T> = categories.into_iter().collect();
    if categories.len() < 2 {
        return fallible!(InvalidParameter, "at least two categories are required");
    }
    check_prob(prob, categories.len())?;

    let num_categories: QO = cast(categories.len())?;
    let privacy_constant = inf_ln(inf_mul(
        inf_div(prob, neg_inf_sub(QO::one(), prob)),
        inf_sub(num_categories, QO::one()),
    ));
    let f64_prob: f64 = cast(prob)?;
    debug!(
        prob = f64_prob,
        categories = categories.len(),
        "built categorical randomized response"
    );

    Ok(Measurement::new(
        AllDomain::new(),
        AllDomain::new(),
        Function::new_fallible(move |truth: &T| {
            let mut rng = fresh_rng()?;
            let index = categories.iter().position(|category| category == truth);

            // draw a lie among the categories other than the truth
            let choices = categories.len() - usize::from(index.is_some());
            let mut sample = rng.gen_range(0..choices);
            if let Some(i) = index {
                if sample >= i {
                    sample += 1;
                }
            }

            let honest = sample_bernoulli(&mut rng, f64_prob)?;
            Ok(match index {
                Some(_) if honest => truth.clone(),
                _ => categories[sample].clone(),
            })
        }),
        DiscreteDistance,
        MaxDivergence::default(),
        discrete_privacy_map(privacy_constant),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn caps() -> Capabilities {
        Capabilities::none().with(Capability::Contrib)
    }

    #[test]
    fn boolean_loss_is_log_odds() {
        let m = make_randomized_response_bool(&caps(), 0.75f64).unwrap();
        assert!((m.map(&1).unwrap() - 3f64.ln()).abs() < 1e-12);
        assert_eq!(m.map(&0).unwrap(), 0.0);
        assert!(m.map(&1).unwrap() > 3f64.ln());
        assert!(m.check(&1, &1.1).unwrap());
        assert!(!m.check(&1, &1.09).unwrap());
        m.invoke(&false).unwrap();
    }

    #[test]
    fn boolean_probability_must_be_at_least_half() {
        for prob in [0.49, 1.0, f64::NAN] {
            assert!(matches!(
                make_randomized_response_bool(&caps(), prob),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn categorical_loss_accounts_for_category_count() {
        let categories: HashSet<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let m = make_randomized_response(&caps(), categories, 0.5f64).unwrap();
        assert!((m.map(&1).unwrap() - 3f64.ln()).abs() < 1e-12);
        let out = m.invoke(&"zz".to_string()).unwrap();
        assert!(["a", "b", "c", "d"].contains(&out.as_str()));
    }

    #[test]
    fn uniform_probability_is_free() {
        let categories: HashSet<i32> = (0..4).collect();
        let m = make_randomized_response(&caps(), categories, 0.25f64).unwrap();
        assert!(m.map(&1).unwrap().abs() < 1e-12);
    }

    #[test]
    fn needs_two_categories() {
        let categories: HashSet<i32> = [1].into_iter().collect();
        assert!(matches!(
            make_randomized_response(&caps(), categories, 0.9f64),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn mostly_honest_answers_dominate() {
        let categories: HashSet<u8> = (0..3).collect();
        let m = make_randomized_response(&caps(), categories, 0.9f64).unwrap();
        let honest = (0..2_000).filter(|_| m.invoke(&1).unwrap() == 1).count();
        assert!(honest > 1_600, "honest answers: {honest}");
    }
}
