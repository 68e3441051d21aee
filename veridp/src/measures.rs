//! Privacy-loss measures between output distributions.

use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::descriptor::MeasureDescriptor;
use crate::error::Fallible;
use crate::traits::Float;

pub trait Measure: Clone + PartialEq + Debug + Default + Send + Sync + 'static {
    type Distance: Clone + Debug + Send + Sync + 'static;

    fn descriptor(&self) -> MeasureDescriptor;
}

/// ε as a function of δ. Evaluating at a δ the curve cannot support fails
/// with `UndefinedMapEvaluation`.
pub struct SMDCurve<Q> {
    epsilon: Arc<dyn Fn(&Q) -> Fallible<Q> + Send + Sync>,
}

impl<Q> Clone for SMDCurve<Q> {
    fn clone(&self) -> Self {
        Self {
            epsilon: self.epsilon.clone(),
        }
    }
}

impl<Q> Debug for SMDCurve<Q> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("SMDCurve")
    }
}

impl<Q> SMDCurve<Q> {
    pub fn new(epsilon: impl Fn(&Q) -> Fallible<Q> + Send + Sync + 'static) -> Self {
        Self {
            epsilon: Arc::new(epsilon),
        }
    }

    pub fn epsilon(&self, delta: &Q) -> Fallible<Q> {
        (self.epsilon)(delta)
    }
}

macro_rules! float_measure {
    ($($(#[$doc:meta])* $name:ident => $distance:ty),+ $(,)?) => {
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

            impl<Q: Float> Debug for $name<Q> {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({})", stringify!($name), Q::ATOM)
                }
            }

            impl<Q: Float> Measure for $name<Q> {
                type Distance = $distance;

                fn descriptor(&self) -> MeasureDescriptor {
                    MeasureDescriptor::$name(Q::ATOM)
                }
            }
        )+
    };
}

float_measure!(
    /// Pure differential privacy; distances are ε.
    MaxDivergence => Q,
    /// Approximate differential privacy as a full ε(δ) curve.
    SmoothedMaxDivergence => SMDCurve<Q>,
    /// Approximate differential privacy at one point; distances are (ε, δ).
    FixedSmoothedMaxDivergence => (Q, Q),
    /// Zero-concentrated differential privacy; distances are ρ.
    ZeroConcentratedDivergence => Q,
);

/// Whether a privacy-map result fits inside a budget.
pub trait PrivacyBound {
    type Budget;

    fn within(&self, budget: &Self::Budget) -> Fallible<bool>;
}

impl PrivacyBound for f32 {
    type Budget = f32;

    fn within(&self, budget: &f32) -> Fallible<bool> {
        Ok(self <= budget)
    }
}

impl PrivacyBound for f64 {
    type Budget = f64;

    fn within(&self, budget: &f64) -> Fallible<bool> {
        Ok(self <= budget)
    }
}

impl<Q: Float> PrivacyBound for (Q, Q) {
    type Budget = (Q, Q);

    fn within(&self, budget: &(Q, Q)) -> Fallible<bool> {
        Ok(self.0 <= budget.0 && self.1 <= budget.1)
    }
}

/// A curve fits an `(ε, δ)` budget when `curve(δ) ≤ ε`.
impl<Q: Float> PrivacyBound for SMDCurve<Q> {
    type Budget = (Q, Q);

    fn within(&self, budget: &(Q, Q)) -> Fallible<bool> {
        Ok(self.epsilon(&budget.1)? <= budget.0)
    }
}
