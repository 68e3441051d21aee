use num_traits::{CheckedMul, CheckedSub, Saturating};
use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, StabilityMap, Transformation};
use crate::domains::{AllDomain, BoundedDomain, SizedDomain, VectorDomain};
use crate::error::{fallible, Fallible};
use crate::metrics::{AbsoluteDistance, IntDistance, SymmetricDistance};
use crate::traits::{cast, Integer};

/// Sums the positives and the negatives separately, each saturating, and
/// then adds the two partial sums. Saturation can only lose mass toward
/// zero on one side, so one record never moves the result by more than
/// its own magnitude.
fn split_sat_sum<T: Integer>(values: &[T]) -> T {
    let (neg, pos) = values.iter().fold((T::zero(), T::zero()), |(neg, pos), v| {
        if *v < T::zero() {
            (Saturating::saturating_add(neg, *v), pos)
        } else {
            (neg, Saturating::saturating_add(pos, *v))
        }
    });
    Saturating::saturating_add(neg, pos)
}

/// Plain saturating sum. Exact whenever every value shares one sign and the
/// total fits in `T`.
fn monotonic_sat_sum<T: Integer>(values: &[T]) -> T {
    values.iter().fold(T::zero(), |sum, v| Saturating::saturating_add(sum, *v))
}

fn same_sign<T: Integer>((lower, upper): (T, T)) -> bool {
    let zero = T::zero();
    (lower >= zero && upper >= zero) || (lower <= zero && upper <= zero)
}

fn checked_abs<T: Integer>(value: T) -> Fallible<T> {
    if value >= T::zero() {
        return Ok(value);
    }
    match CheckedSub::checked_sub(&T::zero(), &value) {
        Some(abs) => Ok(abs),
        None => fallible!(InvalidParameter, "|{:?}| is not representable", value),
    }
}

fn larger_magnitude<T: Integer>((lower, upper): (T, T)) -> Fallible<T> {
    let lower_abs = checked_abs(lower)?;
    let upper_abs = checked_abs(upper)?;
    Ok(if lower_abs > upper_abs { lower_abs } else { upper_abs })
}

fn checked_range<T: Integer>((lower, upper): (T, T)) -> Fallible<T> {
    match CheckedSub::checked_sub(&upper, &lower) {
        Some(range) => Ok(range),
        None => fallible!(InvalidParameter, "range {:?} - {:?} overflows", upper, lower),
    }
}

/// Each added or removed record moves the output by at most `sensitivity`.
fn per_record_stability<T: Integer>(sensitivity: T) -> StabilityMap<SymmetricDistance, AbsoluteDistance<T>> {
    StabilityMap::new_fallible(move |d_in: &IntDistance| {
        let d_in: T = cast(*d_in)?;
        match CheckedMul::checked_mul(&d_in, &sensitivity) {
            Some(d_out) => Ok(d_out),
            None => fallible!(
                UndefinedMapEvaluation,
                "{:?} * {:?} overflows the output type",
                d_in,
                sensitivity
            ),
        }
    })
}

/// Neighbors of a fixed size differ by ⌊d_in/2⌋ substitutions, each moving
/// the output by at most `range`.
fn substitution_stability<T: Integer>(range: T) -> StabilityMap<SymmetricDistance, AbsoluteDistance<T>> {
    StabilityMap::new_fallible(move |d_in: &IntDistance| {
        // an odd d_in still only admits (d_in - 1) / 2 substitutions
        let swaps: T = cast(*d_in / 2)?;
        match CheckedMul::checked_mul(&swaps, &range) {
            Some(d_out) => Ok(d_out),
            None => fallible!(
                UndefinedMapEvaluation,
                "{:?} * {:?} overflows the output type",
                swaps,
                range
            ),
        }
    })
}

/// Sum of bounded integers under unknown dataset size.
///
/// Adding or removing one record changes the sum by at most
/// max(|lower|, |upper|).
pub fn make_bounded_int_split_sum<T: Integer>(
    capabilities: &Capabilities,
    bounds: (T, T),
) -> Fallible<Transformation<VectorDomain<BoundedDomain<T>>, AllDomain<T>, SymmetricDistance, AbsoluteDistance<T>>> {
    capabilities.require(&[Capability::Contrib])?;
    let element_domain = BoundedDomain::new_closed(bounds)?;
    let (lower, upper) = bounds;
    let ideal_sensitivity = larger_magnitude(bounds)?;
    debug!(lower = ?lower, upper = ?upper, "built bounded integer sum");

    Ok(Transformation::new(
        VectorDomain::new(element_domain),
        AllDomain::new(),
        Function::new(|arg: &Vec<T>| split_sat_sum(arg)),
        SymmetricDistance,
        AbsoluteDistance::default(),
        per_record_stability(ideal_sensitivity),
    ))
}

/// Sum of bounded integers over datasets of exactly `size` records.
///
/// With the size fixed, neighbors differ by ⌊d_in/2⌋ substitutions, each
/// moving the sum by at most `upper - lower`.
pub fn make_sized_bounded_int_split_sum<T: Integer>(
    capabilities: &Capabilities,
    size: usize,
    bounds: (T, T),
) -> Fallible<
    Transformation<SizedDomain<VectorDomain<BoundedDomain<T>>>, AllDomain<T>, SymmetricDistance, AbsoluteDistance<T>>,
> {
    capabilities.require(&[Capability::Contrib])?;
    let element_domain = BoundedDomain::new_closed(bounds)?;
    let (lower, upper) = bounds;
    let range = checked_range(bounds)?;
    debug!(size, lower = ?lower, upper = ?upper, "built sized bounded integer sum");

    Ok(Transformation::new(
        SizedDomain::new(VectorDomain::new(element_domain), size),
        AllDomain::new(),
        Function::new(|arg: &Vec<T>| split_sat_sum(arg)),
        SymmetricDistance,
        AbsoluteDistance::default(),
        substitution_stability(range),
    ))
}

/// Sum of bounded integers that all share one sign, under unknown dataset
/// size. A single saturating accumulator suffices because the running total
/// only moves away from zero.
pub fn make_bounded_int_monotonic_sum<T: Integer>(
    capabilities: &Capabilities,
    bounds: (T, T),
) -> Fallible<Transformation<VectorDomain<BoundedDomain<T>>, AllDomain<T>, SymmetricDistance, AbsoluteDistance<T>>> {
    capabilities.require(&[Capability::Contrib])?;
    if !same_sign(bounds) {
        return fallible!(InvalidParameter, "bounds {:?} must share one sign", bounds);
    }
    let element_domain = BoundedDomain::new_closed(bounds)?;
    let ideal_sensitivity = larger_magnitude(bounds)?;
    debug!(lower = ?bounds.0, upper = ?bounds.1, "built bounded monotonic integer sum");

    Ok(Transformation::new(
        VectorDomain::new(element_domain),
        AllDomain::new(),
        Function::new(|arg: &Vec<T>| monotonic_sat_sum(arg)),
        SymmetricDistance,
        AbsoluteDistance::default(),
        per_record_stability(ideal_sensitivity),
    ))
}

/// Sum of same-signed bounded integers over datasets of exactly `size`
/// records.
pub fn make_sized_bounded_int_monotonic_sum<T: Integer>(
    capabilities: &Capabilities,
    size: usize,
    bounds: (T, T),
) -> Fallible<
    Transformation<SizedDomain<VectorDomain<BoundedDomain<T>>>, AllDomain<T>, SymmetricDistance, AbsoluteDistance<T>>,
> {
    capabilities.require(&[Capability::Contrib])?;
    if !same_sign(bounds) {
        return fallible!(InvalidParameter, "bounds {:?} must share one sign", bounds);
    }
    let element_domain = BoundedDomain::new_closed(bounds)?;
    let range = checked_range(bounds)?;
    debug!(size, lower = ?bounds.0, upper = ?bounds.1, "built sized bounded monotonic integer sum");

    Ok(Transformation::new(
        SizedDomain::new(VectorDomain::new(element_domain), size),
        AllDomain::new(),
        Function::new(|arg: &Vec<T>| monotonic_sat_sum(arg)),
        SymmetricDistance,
        AbsoluteDistance::default(),
        substitution_stability(range),
    ))
}
