//! Sets of admissible values.

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::hash::Hash;
use std::marker::PhantomData;

use crate::descriptor::DomainDescriptor;
use crate::error::{fallible, Fallible};
use crate::traits::{Number, Primitive};

mod any;

pub use any::{AnyDomain, AnyObject};

pub trait Domain: Clone + PartialEq + Debug + Send + Sync + 'static {
    type Carrier: 'static;

    fn member(&self, val: &Self::Carrier) -> Fallible<bool>;

    fn descriptor(&self) -> DomainDescriptor;
}

/// Domains whose members are collections with a length.
pub trait CollectionDomain: Domain {
    fn size_of(val: &Self::Carrier) -> usize;
}

/// Domains that pin the size of their members.
pub trait SizedDataDomain: Domain {
    fn size(&self) -> usize;
}

/// Every non-null value of `T`.
pub struct AllDomain<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> AllDomain<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for AllDomain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AllDomain<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> PartialEq for AllDomain<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T: Primitive> Debug for AllDomain<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AllDomain({})", T::ATOM)
    }
}

impl<T: Primitive> Domain for AllDomain<T> {
    type Carrier = T;

    fn member(&self, val: &T) -> Fallible<bool> {
        Ok(!val.is_null())
    }

    fn descriptor(&self) -> DomainDescriptor {
        DomainDescriptor::All(T::ATOM)
    }
}

/// The closed interval `[lower, upper]`.
#[derive(Clone, PartialEq)]
pub struct BoundedDomain<T> {
    lower: T,
    upper: T,
}

impl<T: Number> BoundedDomain<T> {
    pub fn new_closed(bounds: (T, T)) -> Fallible<Self> {
        let (lower, upper) = bounds;
        if lower.is_null() || upper.is_null() {
            return fallible!(InvalidParameter, "bounds must not be null");
        }
        if lower > upper {
            return fallible!(
                InvalidParameter,
                "lower bound {:?} may not exceed upper bound {:?}",
                lower,
                upper
            );
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> T {
        self.lower
    }

    pub fn upper(&self) -> T {
        self.upper
    }
}

impl<T: Number> Debug for BoundedDomain<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "BoundedDomain([{:?}, {:?}])", self.lower, self.upper)
    }
}

impl<T: Number> Domain for BoundedDomain<T> {
    type Carrier = T;

    fn member(&self, val: &T) -> Fallible<bool> {
        Ok(!val.is_null() && self.lower <= *val && *val <= self.upper)
    }

    fn descriptor(&self) -> DomainDescriptor {
        DomainDescriptor::Bounded(T::ATOM)
    }
}

/// Vectors whose every element is in `element_domain`.
#[derive(Clone, PartialEq, Default)]
pub struct VectorDomain<D> {
    element_domain: D,
}

impl<D: Domain> VectorDomain<D> {
    pub fn new(element_domain: D) -> Self {
        Self { element_domain }
    }

    pub fn element_domain(&self) -> &D {
        &self.element_domain
    }
}

impl<T: Primitive> VectorDomain<AllDomain<T>> {
    pub fn new_all() -> Self {
        Self::new(AllDomain::new())
    }
}

impl<D: Domain> Debug for VectorDomain<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "VectorDomain({:?})", self.element_domain)
    }
}

impl<D: Domain> Domain for VectorDomain<D> {
    type Carrier = Vec<D::Carrier>;

    fn member(&self, val: &Self::Carrier) -> Fallible<bool> {
        for element in val {
            if !self.element_domain.member(element)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn descriptor(&self) -> DomainDescriptor {
        DomainDescriptor::Vector(Box::new(self.element_domain.descriptor()))
    }
}

impl<D: Domain> CollectionDomain for VectorDomain<D> {
    fn size_of(val: &Self::Carrier) -> usize {
        val.len()
    }
}

/// Restricts a collection domain to members of exactly `size` elements.
#[derive(Clone, PartialEq)]
pub struct SizedDomain<D> {
    inner_domain: D,
    size: usize,
}

impl<D: CollectionDomain> SizedDomain<D> {
    pub fn new(inner_domain: D, size: usize) -> Self {
        Self { inner_domain, size }
    }

    pub fn inner_domain(&self) -> &D {
        &self.inner_domain
    }
}

impl<D: CollectionDomain> Debug for SizedDomain<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SizedDomain({:?}, size={})", self.inner_domain, self.size)
    }
}

impl<D: CollectionDomain> Domain for SizedDomain<D> {
    type Carrier = D::Carrier;

    fn member(&self, val: &Self::Carrier) -> Fallible<bool> {
        if D::size_of(val) != self.size {
            return Ok(false);
        }
        self.inner_domain.member(val)
    }

    fn descriptor(&self) -> DomainDescriptor {
        DomainDescriptor::Sized(Box::new(self.inner_domain.descriptor()))
    }
}

impl<D: CollectionDomain> SizedDataDomain for SizedDomain<D> {
    fn size(&self) -> usize {
        self.size
    }
}

/// Hash maps with keys in `key_domain` and values in `value_domain`.
#[derive(Clone, PartialEq, Default)]
pub struct MapDomain<DK, DV> {
    key_domain: DK,
    value_domain: DV,
}

impl<DK: Domain, DV: Domain> MapDomain<DK, DV>
where
    DK::Carrier: Eq + Hash,
{
    pub fn new(key_domain: DK, value_domain: DV) -> Self {
        Self {
            key_domain,
            value_domain,
        }
    }
}

impl<DK: Domain, DV: Domain> Debug for MapDomain<DK, DV> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "MapDomain({:?} => {:?})", self.key_domain, self.value_domain)
    }
}

impl<DK: Domain, DV: Domain> Domain for MapDomain<DK, DV>
where
    DK::Carrier: Eq + Hash,
{
    type Carrier = HashMap<DK::Carrier, DV::Carrier>;

    fn member(&self, val: &Self::Carrier) -> Fallible<bool> {
        for (k, v) in val {
            if !self.key_domain.member(k)? || !self.value_domain.member(v)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn descriptor(&self) -> DomainDescriptor {
        DomainDescriptor::Map(
            Box::new(self.key_domain.descriptor()),
            Box::new(self.value_domain.descriptor()),
        )
    }
}

impl<DK: Domain, DV: Domain> CollectionDomain for MapDomain<DK, DV>
where
    DK::Carrier: Eq + Hash,
{
    fn size_of(val: &Self::Carrier) -> usize {
        val.len()
    }
}

/// Fixed-length tuples, position `i` drawn from `domains[i]`.
#[derive(Clone, PartialEq)]
pub struct ProductDomain<D> {
    domains: Vec<D>,
}

impl<D: Domain> ProductDomain<D> {
    pub fn new(domains: Vec<D>) -> Self {
        Self { domains }
    }

    pub fn domains(&self) -> &[D] {
        &self.domains
    }
}

impl<D: Domain> Debug for ProductDomain<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProductDomain").field(&self.domains).finish()
    }
}

impl<D: Domain> Domain for ProductDomain<D> {
    type Carrier = Vec<D::Carrier>;

    fn member(&self, val: &Self::Carrier) -> Fallible<bool> {
        if val.len() != self.domains.len() {
            return Ok(false);
        }
        for (domain, element) in self.domains.iter().zip(val) {
            if !domain.member(element)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn descriptor(&self) -> DomainDescriptor {
        DomainDescriptor::Product(self.domains.iter().map(Domain::descriptor).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Atom;
    use crate::error::Error;

    #[test]
    fn all_domain_rejects_nan() {
        let domain = AllDomain::<f64>::new();
        assert!(domain.member(&1.5).unwrap());
        assert!(!domain.member(&f64::NAN).unwrap());
    }

    #[test]
    fn bounded_domain_is_closed() {
        let domain = BoundedDomain::new_closed((0, 10)).unwrap();
        assert!(domain.member(&0).unwrap());
        assert!(domain.member(&10).unwrap());
        assert!(!domain.member(&11).unwrap());
        assert!(matches!(
            BoundedDomain::new_closed((1.0, 0.0)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(BoundedDomain::new_closed((f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn sized_domain_checks_length() {
        let domain = SizedDomain::new(VectorDomain::<AllDomain<i32>>::new_all(), 3);
        assert!(domain.member(&vec![1, 2, 3]).unwrap());
        assert!(!domain.member(&vec![1, 2]).unwrap());
        assert_eq!(domain.size(), 3);
    }

    #[test]
    fn map_domain_checks_keys_and_values() {
        let domain = MapDomain::new(AllDomain::<String>::new(), AllDomain::<f64>::new());
        let mut counts = HashMap::new();
        counts.insert("a".to_string(), 1.0);
        assert!(domain.member(&counts).unwrap());
        counts.insert("b".to_string(), f64::NAN);
        assert!(!domain.member(&counts).unwrap());
    }

    #[test]
    fn product_domain_checks_each_position() {
        let domain = ProductDomain::new(vec![
            BoundedDomain::new_closed((0, 1)).unwrap(),
            BoundedDomain::new_closed((0, 5)).unwrap(),
        ]);
        assert!(domain.member(&vec![1, 5]).unwrap());
        assert!(!domain.member(&vec![2, 5]).unwrap());
        assert!(!domain.member(&vec![1]).unwrap());
    }

    #[test]
    fn descriptors_follow_nesting() {
        let domain = SizedDomain::new(
            VectorDomain::new(BoundedDomain::new_closed((0i64, 1)).unwrap()),
            4,
        );
        assert_eq!(
            domain.descriptor(),
            DomainDescriptor::Sized(Box::new(DomainDescriptor::Vector(Box::new(
                DomainDescriptor::Bounded(Atom::I64)
            ))))
        );
    }

    #[test]
    fn equality_is_structural() {
        let a = SizedDomain::new(VectorDomain::<AllDomain<u8>>::new_all(), 3);
        let b = SizedDomain::new(VectorDomain::<AllDomain<u8>>::new_all(), 4);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
