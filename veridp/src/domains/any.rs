use std::any::{type_name, Any};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use super::Domain;
use crate::descriptor::DomainDescriptor;
use crate::error::{fallible, Fallible};

/// A type-erased value.
pub struct AnyObject {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl AnyObject {
    pub fn new<T: 'static + Send + Sync>(value: T) -> Self {
        Self {
            type_name: type_name::<T>(),
            value: Box::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: 'static>(&self) -> Fallible<&T> {
        match self.value.downcast_ref::<T>() {
            Some(value) => Ok(value),
            None => fallible!(
                FailedCast,
                "expected {} but found {}",
                type_name::<T>(),
                self.type_name
            ),
        }
    }

    pub fn downcast<T: 'static>(self) -> Fallible<T> {
        let found = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => fallible!(FailedCast, "expected {} but found {}", type_name::<T>(), found),
        }
    }
}

impl Debug for AnyObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AnyObject({})", self.type_name)
    }
}

/// A type-erased domain over [`AnyObject`]s.
///
/// Equality compares the debug rendering of the wrapped domain, which
/// includes its parameters (bounds, sizes), so two erased domains are equal
/// exactly when the domains they wrap are.
#[derive(Clone)]
pub struct AnyDomain {
    repr: String,
    descriptor: DomainDescriptor,
    member: Arc<dyn Fn(&AnyObject) -> Fallible<bool> + Send + Sync>,
}

impl AnyDomain {
    pub fn new<D: Domain>(domain: D) -> Self
    where
        D::Carrier: Send + Sync,
    {
        let repr = format!("{domain:?}");
        let descriptor = domain.descriptor();
        Self {
            repr,
            descriptor,
            member: Arc::new(move |value: &AnyObject| match value.downcast_ref::<D::Carrier>() {
                Ok(value) => domain.member(value),
                Err(_) => Ok(false),
            }),
        }
    }
}

impl PartialEq for AnyDomain {
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}

impl Debug for AnyDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AnyDomain({})", self.repr)
    }
}

impl Domain for AnyDomain {
    type Carrier = AnyObject;

    fn member(&self, val: &AnyObject) -> Fallible<bool> {
        (self.member)(val)
    }

    fn descriptor(&self) -> DomainDescriptor {
        self.descriptor.clone()
    }
}
