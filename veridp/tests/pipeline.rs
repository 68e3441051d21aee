use approx::assert_relative_eq;
use tracing_subscriber::EnvFilter;
use veridp::combinators::{
    make_basic_composition, make_chain_mt, make_chain_pm, make_chain_tt,
    make_default_user_measurement, make_default_user_postprocessor, make_fix_delta,
    make_pureDP_to_fixed_approxDP, make_pureDP_to_zCDP, make_zCDP_to_approxDP,
};
use veridp::domains::{AllDomain, AnyDomain, VectorDomain};
use veridp::measurements::{make_base_discrete_laplace, make_base_gaussian, make_base_laplace};
use veridp::measures::{MaxDivergence, ZeroConcentratedDivergence};
use veridp::metrics::SymmetricDistance;
use veridp::transformations::{
    make_bounded_int_monotonic_sum, make_bounded_int_split_sum, make_clamp, make_count,
};
use veridp::{Capabilities, Capability, Measurement, MeasurementDescriptor};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn contrib() -> Capabilities {
    Capabilities::none().with(Capability::Contrib)
}

type HalfEpsilon = Measurement<VectorDomain<AllDomain<i32>>, AllDomain<i32>, SymmetricDistance, MaxDivergence<f64>>;

fn half_epsilon_release(caps: &Capabilities) -> HalfEpsilon {
    make_default_user_measurement(
        caps,
        |data: &Vec<i32>| Ok(data.iter().sum()),
        |d_in: &u32| Ok(f64::from(*d_in) * 0.5),
    )
    .unwrap()
}

#[test]
fn discrete_laplace_with_unit_scale_costs_one_epsilon() {
    let laplace = make_base_discrete_laplace::<AllDomain<i32>, f64>(&contrib(), 1.0).unwrap();
    assert_eq!(laplace.map(&1).unwrap(), 1.0);
}

#[test]
fn unit_bounded_sum_then_discrete_laplace() {
    init_tracing();
    let caps = contrib();
    let sum = make_bounded_int_split_sum(&caps, (0i32, 1)).unwrap();
    let laplace = make_base_discrete_laplace::<AllDomain<i32>, f64>(&caps, 1.0).unwrap();
    let release = make_chain_mt(&caps, &laplace, &sum).unwrap();

    assert_eq!(release.map(&1).unwrap(), 1.0);
    assert!(release.check(&1, &1.0).unwrap());
    release.invoke(&vec![0, 1, 1, 0, 1]).unwrap();
    assert!(release.invoke(&vec![0, 2]).is_err());
}

#[test]
fn nonnegative_sum_release_never_understates_epsilon() {
    let caps = contrib();
    let sum = make_bounded_int_monotonic_sum(&caps, (0i64, 1)).unwrap();
    let laplace = make_base_discrete_laplace::<AllDomain<i64>, f64>(&caps, 3.0).unwrap();
    let release = make_chain_mt(&caps, &laplace, &sum).unwrap();

    assert!(release.map(&1).unwrap() > 1.0 / 3.0);
    assert!(release.check(&1, &0.34).unwrap());
    release.invoke(&vec![1, 0, 1]).unwrap();
}

#[test]
fn clamp_and_sum_compose_into_a_stable_pipeline() {
    let caps = contrib();
    let clamp = make_clamp(&caps, (0i64, 10)).unwrap();
    let sum = make_bounded_int_split_sum(&caps, (0i64, 10)).unwrap();
    let clamped_sum = make_chain_tt(&caps, &sum, &clamp).unwrap();

    assert_eq!(clamped_sum.invoke(&vec![-4, 3, 25]).unwrap(), 13);
    assert_eq!(clamped_sum.map(&2).unwrap(), 20);
}

#[test]
fn composing_two_half_epsilon_releases_costs_one() {
    init_tracing();
    let caps = Capabilities::all();
    let first = half_epsilon_release(&caps);
    let second = half_epsilon_release(&caps);
    let composed = make_basic_composition(&caps, vec![&first, &second]).unwrap();

    assert_eq!(composed.map(&1).unwrap(), 1.0);
    assert_eq!(composed.invoke(&vec![1, 2, 3]).unwrap(), vec![6, 6]);
}

#[test]
fn heterogeneous_outputs_compose_after_erasure() {
    let caps = Capabilities::all();
    let total = half_epsilon_release(&caps).into_any_output();
    let any_positive = make_default_user_measurement::<
        VectorDomain<AllDomain<i32>>,
        AllDomain<bool>,
        SymmetricDistance,
        MaxDivergence<f64>,
    >(
        &caps,
        |data: &Vec<i32>| Ok(data.iter().any(|v| *v > 0)),
        |d_in: &u32| Ok(f64::from(*d_in)),
    )
    .unwrap()
    .into_any_output();
    assert_eq!(
        total.output_domain(),
        &AnyDomain::new(AllDomain::<i32>::new())
    );

    let composed = make_basic_composition(&caps, vec![&total, &any_positive]).unwrap();
    let mut outputs = composed.invoke(&vec![-1, 4]).unwrap().into_iter();
    assert_eq!(outputs.next().unwrap().downcast::<i32>().unwrap(), 3);
    assert!(outputs.next().unwrap().downcast::<bool>().unwrap());
    assert_eq!(composed.map(&2).unwrap(), 3.0);
}

#[test]
fn postprocessing_keeps_the_privacy_map() {
    let caps = Capabilities::all();
    let release = half_epsilon_release(&caps);
    let sign = make_default_user_postprocessor::<AllDomain<i32>, AllDomain<bool>>(&caps, |v: &i32| {
        Ok(*v >= 0)
    })
    .unwrap();
    let released_sign = make_chain_pm(&caps, &sign, &release).unwrap();
    assert_eq!(released_sign.map(&3).unwrap(), release.map(&3).unwrap());
    assert!(released_sign.invoke(&vec![1, 1]).unwrap());
}

#[test]
fn zcdp_route_never_beats_the_direct_conversion() {
    let caps = Capabilities::none()
        .with(Capability::Contrib)
        .with(Capability::FloatingPoint);
    let laplace = make_base_laplace::<AllDomain<f64>>(&caps, 1.0).unwrap();
    let direct = make_pureDP_to_fixed_approxDP(&caps, &laplace).unwrap();
    let via_zcdp = make_zCDP_to_approxDP(&caps, &make_pureDP_to_zCDP(&caps, &laplace).unwrap()).unwrap();

    for epsilon in [0.1, 0.5, 1.0, 2.0, 5.0, 10.0] {
        let (direct_epsilon, direct_delta) = direct.map(&epsilon).unwrap();
        assert_eq!(direct_delta, 0.0);
        for delta in [1e-4, 1e-6, 1e-9] {
            let curve = via_zcdp.map(&epsilon).unwrap();
            let zcdp_epsilon = curve.epsilon(&delta).unwrap();
            assert!(
                zcdp_epsilon >= direct_epsilon,
                "ε={epsilon}, δ={delta}: {zcdp_epsilon} < {direct_epsilon}"
            );
        }
    }
}

#[test]
fn fixing_delta_twice_changes_nothing() {
    let caps = Capabilities::none()
        .with(Capability::Contrib)
        .with(Capability::FloatingPoint);
    let gaussian = make_base_gaussian::<AllDomain<f64>>(&caps, 1.0).unwrap();
    let approx = make_zCDP_to_approxDP(&caps, &gaussian).unwrap();
    let fixed = make_fix_delta(&caps, &approx, 1e-6).unwrap();
    let fixed_again = make_fix_delta(&caps, &fixed, 1e-6).unwrap();

    for d_in in [0.5, 1.0, 3.0] {
        assert_eq!(fixed.map(&d_in).unwrap(), fixed_again.map(&d_in).unwrap());
    }
    let (epsilon, delta) = fixed.map(&1.0).unwrap();
    assert_relative_eq!(epsilon, 5.2215344445, max_relative = 1e-8);
    assert_eq!(delta, 1e-6);
}

#[test]
fn f32_parameters_select_f32_measures() {
    let caps = Capabilities::none()
        .with(Capability::Contrib)
        .with(Capability::FloatingPoint);
    let gaussian = make_base_gaussian::<AllDomain<f32>>(&caps, 2.0f32).unwrap();
    assert_eq!(gaussian.output_measure(), &ZeroConcentratedDivergence::<f32>::default());
    assert_eq!(gaussian.map(&2.0f32).unwrap(), 0.5f32);
}

#[test]
fn descriptors_survive_a_json_round_trip() {
    let caps = contrib();
    let count = make_count::<String, i32>(&caps).unwrap();
    let laplace = make_base_discrete_laplace::<AllDomain<i32>, f64>(&caps, 2.0).unwrap();
    let release = make_chain_mt(&caps, &laplace, &count).unwrap();

    let descriptor = release.descriptor();
    assert_eq!(
        descriptor.to_string(),
        "Measurement(VectorDomain<AllDomain<String>> -> AllDomain<i32>, SymmetricDistance -> MaxDivergence(f64))"
    );
    let json = serde_json::to_string(&descriptor).unwrap();
    let parsed: MeasurementDescriptor = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, descriptor);
}
