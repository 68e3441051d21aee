//! Noise-adding mechanisms.

use num_traits::NumCast;

use crate::domains::{AllDomain, Domain, VectorDomain};
use crate::error::Fallible;
use crate::metrics::{AbsoluteDistance, L1Distance, L2Distance, Metric};
use crate::traits::{Integer, Number};

mod discrete_gaussian;
mod discrete_laplace;
mod gaussian;
mod laplace;
mod ptr;
mod randomized_response;

pub use discrete_gaussian::make_base_discrete_gaussian;
#[allow(deprecated)]
pub use discrete_laplace::{make_base_discrete_laplace, make_base_geometric};
pub use gaussian::make_base_gaussian;
pub use laplace::make_base_laplace;
pub use ptr::make_base_ptr;
pub use randomized_response::{make_randomized_response, make_randomized_response_bool};

/// Scalar or vector data that noise is added to element-wise.
pub trait NoiseDomain: Domain + Default {
    type Atom: Number;

    fn map_atoms<F>(arg: &Self::Carrier, f: F) -> Fallible<Self::Carrier>
    where
        F: FnMut(Self::Atom) -> Fallible<Self::Atom>;
}

impl<T: Number> NoiseDomain for AllDomain<T> {
    type Atom = T;

    fn map_atoms<F>(arg: &T, mut f: F) -> Fallible<T>
    where
        F: FnMut(T) -> Fallible<T>,
    {
        f(*arg)
    }
}

impl<T: Number> NoiseDomain for VectorDomain<AllDomain<T>> {
    type Atom = T;

    fn map_atoms<F>(arg: &Vec<T>, mut f: F) -> Fallible<Vec<T>>
    where
        F: FnMut(T) -> Fallible<T>,
    {
        arg.iter().map(|v| f(*v)).collect()
    }
}

/// Sensitivity is measured in L1 (absolute distance for scalars).
pub trait LaplaceDomain: NoiseDomain {
    type InputMetric: Metric<Distance = Self::Atom>;
}

impl<T: Number> LaplaceDomain for AllDomain<T> {
    type InputMetric = AbsoluteDistance<T>;
}

impl<T: Number> LaplaceDomain for VectorDomain<AllDomain<T>> {
    type InputMetric = L1Distance<T>;
}

/// Sensitivity is measured in L2 (absolute distance for scalars).
pub trait GaussianDomain: NoiseDomain {
    type InputMetric: Metric<Distance = Self::Atom>;
}

impl<T: Number> GaussianDomain for AllDomain<T> {
    type InputMetric = AbsoluteDistance<T>;
}

impl<T: Number> GaussianDomain for VectorDomain<AllDomain<T>> {
    type InputMetric = L2Distance<T>;
}

/// Adds integer noise to an integer without wrapping.
pub(crate) fn saturating_add_noise<T: Integer>(value: T, noise: i64) -> T {
    if noise >= 0 {
        match <T as NumCast>::from(noise) {
            Some(noise) => value.saturating_add(noise),
            None => T::max_value(),
        }
    } else {
        match <T as NumCast>::from(noise.unsigned_abs()) {
            Some(noise) => value.saturating_sub(noise),
            None => T::min_value(),
        }
    }
}
