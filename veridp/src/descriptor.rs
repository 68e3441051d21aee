//! Structural descriptions of domains, metrics and measures.
//!
//! Descriptors are what a consumer outside the type system sees of a
//! Transformation or Measurement: they can be printed, compared and shipped
//! as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Atom {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
}

impl Atom {
    pub fn name(self) -> &'static str {
        match self {
            Atom::Bool => "bool",
            Atom::I8 => "i8",
            Atom::I16 => "i16",
            Atom::I32 => "i32",
            Atom::I64 => "i64",
            Atom::Isize => "isize",
            Atom::U8 => "u8",
            Atom::U16 => "u16",
            Atom::U32 => "u32",
            Atom::U64 => "u64",
            Atom::Usize => "usize",
            Atom::F32 => "f32",
            Atom::F64 => "f64",
            Atom::String => "String",
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of")]
pub enum DomainDescriptor {
    All(Atom),
    Bounded(Atom),
    Vector(Box<DomainDescriptor>),
    Sized(Box<DomainDescriptor>),
    Map(Box<DomainDescriptor>, Box<DomainDescriptor>),
    Product(Vec<DomainDescriptor>),
}

impl fmt::Display for DomainDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainDescriptor::All(atom) => write!(f, "AllDomain<{atom}>"),
            DomainDescriptor::Bounded(atom) => write!(f, "BoundedDomain<{atom}>"),
            DomainDescriptor::Vector(inner) => write!(f, "VectorDomain<{inner}>"),
            DomainDescriptor::Sized(inner) => write!(f, "SizedDomain<{inner}>"),
            DomainDescriptor::Map(key, value) => write!(f, "MapDomain<{key}, {value}>"),
            DomainDescriptor::Product(inner) => {
                f.write_str("ProductDomain<")?;
                for (i, domain) in inner.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{domain}")?;
                }
                f.write_str(">")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of")]
pub enum MetricDescriptor {
    SymmetricDistance,
    InsertDeleteDistance,
    ChangeOneDistance,
    HammingDistance,
    DiscreteDistance,
    AbsoluteDistance(Atom),
    L1Distance(Atom),
    L2Distance(Atom),
}

impl fmt::Display for MetricDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricDescriptor::SymmetricDistance => f.write_str("SymmetricDistance"),
            MetricDescriptor::InsertDeleteDistance => f.write_str("InsertDeleteDistance"),
            MetricDescriptor::ChangeOneDistance => f.write_str("ChangeOneDistance"),
            MetricDescriptor::HammingDistance => f.write_str("HammingDistance"),
            MetricDescriptor::DiscreteDistance => f.write_str("DiscreteDistance"),
            MetricDescriptor::AbsoluteDistance(q) => write!(f, "AbsoluteDistance({q})"),
            MetricDescriptor::L1Distance(q) => write!(f, "L1Distance({q})"),
            MetricDescriptor::L2Distance(q) => write!(f, "L2Distance({q})"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of")]
pub enum MeasureDescriptor {
    MaxDivergence(Atom),
    SmoothedMaxDivergence(Atom),
    FixedSmoothedMaxDivergence(Atom),
    ZeroConcentratedDivergence(Atom),
}

impl fmt::Display for MeasureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureDescriptor::MaxDivergence(q) => write!(f, "MaxDivergence({q})"),
            MeasureDescriptor::SmoothedMaxDivergence(q) => write!(f, "SmoothedMaxDivergence({q})"),
            MeasureDescriptor::FixedSmoothedMaxDivergence(q) => {
                write!(f, "FixedSmoothedMaxDivergence({q})")
            }
            MeasureDescriptor::ZeroConcentratedDivergence(q) => {
                write!(f, "ZeroConcentratedDivergence({q})")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransformationDescriptor {
    pub input_domain: DomainDescriptor,
    pub output_domain: DomainDescriptor,
    pub input_metric: MetricDescriptor,
    pub output_metric: MetricDescriptor,
}

impl fmt::Display for TransformationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transformation({} -> {}, {} -> {})",
            self.input_domain, self.output_domain, self.input_metric, self.output_metric
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasurementDescriptor {
    pub input_domain: DomainDescriptor,
    pub output_domain: DomainDescriptor,
    pub input_metric: MetricDescriptor,
    pub output_measure: MeasureDescriptor,
}

impl fmt::Display for MeasurementDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Measurement({} -> {}, {} -> {})",
            self.input_domain, self.output_domain, self.input_metric, self.output_measure
        )
    }
}
