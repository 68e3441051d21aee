//! Distances between inputs.

use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

use crate::descriptor::MetricDescriptor;
use crate::traits::Number;

/// Distance between datasets, in number of records.
pub type IntDistance = u32;

pub trait Metric: Clone + PartialEq + Debug + Default + Send + Sync + 'static {
    type Distance: Number;

    fn descriptor(&self) -> MetricDescriptor;
}

/// Metrics between whole datasets.
pub trait DatasetMetric: Metric<Distance = IntDistance> {}

macro_rules! dataset_metric {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
            pub struct $name;

            impl Metric for $name {
                type Distance = IntDistance;

                fn descriptor(&self) -> MetricDescriptor {
                    MetricDescriptor::$name
                }
            }

            impl DatasetMetric for $name {}
        )+
    };
}

dataset_metric!(
    /// Size of the multiset symmetric difference.
    SymmetricDistance,
    /// Edit distance with insertions and deletions only.
    InsertDeleteDistance,
    /// Number of records changed, for datasets of equal size.
    ChangeOneDistance,
    /// Number of positions that differ.
    HammingDistance,
    /// Zero when equal, one otherwise.
    DiscreteDistance,
);

macro_rules! sensitivity_metric {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            pub struct $name<Q> {
                _marker: PhantomData<fn() -> Q>,
            }

            impl<Q> Default for $name<Q> {
                fn default() -> Self {
                    Self { _marker: PhantomData }
                }
            }

            impl<Q> Clone for $name<Q> {
                fn clone(&self) -> Self {
                    Self::default()
                }
            }

            impl<Q> PartialEq for $name<Q> {
                fn eq(&self, _other: &Self) -> bool {
                    true
                }
            }

            impl<Q: Number> Debug for $name<Q> {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({})", stringify!($name), Q::ATOM)
                }
            }

            impl<Q: Number> Metric for $name<Q> {
                type Distance = Q;

                fn descriptor(&self) -> MetricDescriptor {
                    MetricDescriptor::$name(Q::ATOM)
                }
            }
        )+
    };
}

sensitivity_metric!(
    /// `|a - b|` between scalars.
    AbsoluteDistance,
    /// Sum of absolute differences between vectors or maps.
    L1Distance,
    /// Euclidean distance between vectors.
    L2Distance,
);
