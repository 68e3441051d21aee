//! Deterministic, stable dataset transformations.

mod clamp;
mod count;
mod identity;
mod sum;

pub use clamp::make_clamp;
pub use count::{make_count, make_count_by};
pub use identity::make_identity;
pub use sum::{
    make_bounded_int_monotonic_sum, make_bounded_int_split_sum,
    make_sized_bounded_int_monotonic_sum, make_sized_bounded_int_split_sum,
};
