//! veridp – composable differential privacy with guarantees tracked by
//! construction.
//!
//! Pipelines are assembled from [`core::Transformation`]s (deterministic
//! steps with a stability map) and [`core::Measurement`]s (randomized steps
//! with a privacy map). Combinators in [`combinators`] chain, compose and
//! convert these objects so that the map of the result is always a valid
//! upper bound on the behavior of the whole pipeline. Maps can be evaluated
//! ahead of time without touching data.
//!
//! Every constructor takes a [`Capabilities`] value as its first argument and
//! refuses to run unless the capabilities it depends on were opted into.

pub mod capability;
pub mod combinators;
pub mod config;
pub mod core;
pub mod descriptor;
pub mod domains;
pub mod error;
pub mod measurements;
pub mod measures;
pub mod metrics;
pub mod samplers;
pub mod traits;
pub mod transformations;

pub use capability::{Capabilities, Capability};
pub use config::{load_capabilities, ConfigError, ConfigFormat};
pub use core::{Function, Measurement, Postprocessor, PrivacyMap, StabilityMap, Transformation};
pub use descriptor::{
    Atom, DomainDescriptor, MeasureDescriptor, MeasurementDescriptor, MetricDescriptor,
    TransformationDescriptor,
};
pub use error::{Error, Fallible};
