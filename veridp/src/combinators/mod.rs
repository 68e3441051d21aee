//! Combinators that build new Transformations and Measurements out of
//! existing ones.

mod amplify;
mod chain;
mod compose;
mod fix_delta;
mod measure_cast;
mod user;

pub use amplify::{make_population_amplification, AmplifiableMeasure};
pub use chain::{make_chain_mt, make_chain_pm, make_chain_tm, make_chain_tt};
pub use compose::{make_basic_composition, BasicCompositionMeasure};
pub use fix_delta::{make_fix_delta, FixDeltaMeasure};
pub use measure_cast::{
    cdp_epsilon, make_pureDP_to_fixed_approxDP, make_pureDP_to_zCDP, make_zCDP_to_approxDP,
};
pub use user::{
    make_default_user_measurement, make_default_user_postprocessor,
    make_default_user_transformation, UserDomain, UserMeasure, UserMetric,
};
