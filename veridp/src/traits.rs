//! Numeric and carrier bounds shared by domains, metrics and constructors.

use std::fmt::Debug;
use std::hash::Hash;

use num_traits::{Num, NumCast, PrimInt, ToPrimitive};

use crate::descriptor::Atom;
use crate::error::{fallible, Error, Fallible};

/// Values that can carry a "null" (NaN) which no domain admits.
pub trait CheckNull {
    fn is_null(&self) -> bool;
}

macro_rules! impl_check_null {
    (false; $($ty:ty),+) => {
        $(impl CheckNull for $ty {
            #[inline]
            fn is_null(&self) -> bool {
                false
            }
        })+
    };
    (nan; $($ty:ty),+) => {
        $(impl CheckNull for $ty {
            #[inline]
            fn is_null(&self) -> bool {
                self.is_nan()
            }
        })+
    };
}

impl_check_null!(false; bool, String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_check_null!(nan; f32, f64);

/// Primitive types that have a descriptor atom.
pub trait AtomType {
    const ATOM: Atom;
}

macro_rules! impl_atom_type {
    ($($ty:ty => $atom:ident),+ $(,)?) => {
        $(impl AtomType for $ty {
            const ATOM: Atom = Atom::$atom;
        })+
    };
}

impl_atom_type!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
);

/// Element types admitted by `AllDomain`.
pub trait Primitive: 'static + Clone + Debug + PartialEq + Send + Sync + CheckNull + AtomType {}
impl<T> Primitive for T where T: 'static + Clone + Debug + PartialEq + Send + Sync + CheckNull + AtomType {}

/// Primitives usable as keys and categories.
pub trait Hashable: Primitive + Eq + Hash {}
impl<T> Hashable for T where T: Primitive + Eq + Hash {}

/// Numeric primitives, which also serve as distances.
pub trait Number: Primitive + Copy + PartialOrd + Num + NumCast {}
impl<T> Number for T where T: Primitive + Copy + PartialOrd + Num + NumCast {}

pub trait Integer: Number + PrimInt + Hash {}
impl<T> Integer for T where T: Number + PrimInt + Hash {}

pub trait Float: Number + num_traits::Float + NextUp {}
impl<T> Float for T where T: Number + num_traits::Float + NextUp {}

/// Steps to the adjacent representable float.
pub trait NextUp: Copy {
    /// Smallest value strictly greater than `self`. NaN and +∞ are fixed points.
    fn next_up(self) -> Self;
    /// Largest value strictly less than `self`. NaN and −∞ are fixed points.
    fn next_down(self) -> Self;
}

macro_rules! impl_next_up {
    ($($ty:ty),+) => {
        $(impl NextUp for $ty {
            fn next_up(self) -> Self {
                if self.is_nan() || self == <$ty>::INFINITY {
                    return self;
                }
                if self == 0.0 {
                    return <$ty>::from_bits(1);
                }
                let bits = self.to_bits();
                <$ty>::from_bits(if self > 0.0 { bits + 1 } else { bits - 1 })
            }

            fn next_down(self) -> Self {
                -NextUp::next_up(-self)
            }
        })+
    };
}

impl_next_up!(f32, f64);

// Arithmetic on privacy losses rounds toward +∞ so a reported bound is
// never below the exact one. The four basic operations detect an exact
// result through their rounding error and only step when it is inexact.
// Transcendental functions always step.

/// `a + b`, rounded up.
pub fn inf_add<Q: Float>(a: Q, b: Q) -> Q {
    let sum = a + b;
    if !sum.is_finite() {
        return sum;
    }
    let b_part = sum - a;
    let error = (a - (sum - b_part)) + (b - b_part);
    if error > Q::zero() {
        sum.next_up()
    } else {
        sum
    }
}

/// `a - b`, rounded up.
pub fn inf_sub<Q: Float>(a: Q, b: Q) -> Q {
    inf_add(a, -b)
}

/// `a - b`, rounded down.
pub fn neg_inf_sub<Q: Float>(a: Q, b: Q) -> Q {
    -inf_add(b, -a)
}

/// `a * b`, rounded up.
pub fn inf_mul<Q: Float>(a: Q, b: Q) -> Q {
    let product = a * b;
    if !product.is_finite() {
        return product;
    }
    if a.mul_add(b, -product) > Q::zero() {
        product.next_up()
    } else {
        product
    }
}

/// `a / b`, rounded up.
pub fn inf_div<Q: Float>(a: Q, b: Q) -> Q {
    let quotient = a / b;
    if !quotient.is_finite() {
        return quotient;
    }
    // a - q·b, computed exactly
    let remainder = (-quotient).mul_add(b, a);
    if remainder != Q::zero() && (remainder > Q::zero()) == (b > Q::zero()) {
        quotient.next_up()
    } else {
        quotient
    }
}

/// `a / b`, rounded down.
pub fn neg_inf_div<Q: Float>(a: Q, b: Q) -> Q {
    -inf_div(-a, b)
}

/// `x²`, rounded up.
pub fn inf_square<Q: Float>(x: Q) -> Q {
    inf_mul(x, x)
}

/// `ln(x)`, rounded up.
pub fn inf_ln<Q: Float>(x: Q) -> Q {
    if x == Q::one() {
        return Q::zero();
    }
    x.ln().next_up()
}

/// `ln(x)`, rounded down.
pub fn neg_inf_ln<Q: Float>(x: Q) -> Q {
    if x == Q::one() {
        return Q::zero();
    }
    x.ln().next_down()
}

/// `ln(1 + x)`, rounded up.
pub fn inf_ln_1p<Q: Float>(x: Q) -> Q {
    if x.is_zero() {
        return x;
    }
    x.ln_1p().next_up()
}

/// `e^x`, rounded up.
pub fn inf_exp<Q: Float>(x: Q) -> Q {
    if x.is_zero() {
        return Q::one();
    }
    x.exp().next_up()
}

/// `e^x - 1`, rounded up.
pub fn inf_exp_m1<Q: Float>(x: Q) -> Q {
    if x.is_zero() {
        return x;
    }
    x.exp_m1().next_up()
}

/// Lossless-or-fail numeric conversion.
pub fn cast<T, U>(value: T) -> Fallible<U>
where
    T: ToPrimitive + Debug + Copy,
    U: NumCast,
{
    <U as NumCast>::from(value).ok_or_else(|| {
        Error::FailedCast(format!(
            "{value:?} is not representable as {}",
            std::any::type_name::<U>()
        ))
    })
}

/// Map inputs must be non-negative and not null.
pub fn check_distance<Q: Number>(d: &Q) -> Fallible<()> {
    if d.is_null() || *d < Q::zero() {
        return fallible!(UndefinedMapEvaluation, "distance {:?} must be non-negative", d);
    }
    Ok(())
}

/// Scale-type parameters must be finite and strictly positive.
pub fn check_positive<Q: Float>(name: &str, value: Q) -> Fallible<()> {
    if value.is_null() || !value.is_finite() || value <= Q::zero() {
        return fallible!(InvalidParameter, "{} must be finite and positive, got {:?}", name, value);
    }
    Ok(())
}
