use thiserror::Error;
use veridp_entropy::EntropyError;

use crate::capability::Capability;

pub type Fallible<T> = Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("capability `{0}` is not enabled")]
    CapabilityDisabled(Capability),
    #[error("domain mismatch: {0}")]
    DomainMismatch(String),
    #[error("metric mismatch: {0}")]
    MetricMismatch(String),
    #[error("measure mismatch: {0}")]
    MeasureMismatch(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("undefined map evaluation: {0}")]
    UndefinedMapEvaluation(String),
    #[error("composition requires at least one measurement")]
    EmptyComposition,
    #[error("function failed: {0}")]
    FailedFunction(String),
    #[error("numeric cast failed: {0}")]
    FailedCast(String),
    #[error(transparent)]
    Entropy(#[from] EntropyError),
}

/// `fallible!(Variant, "fmt", args..)` expands to `Err(Error::Variant(format!(..)))`.
macro_rules! fallible {
    ($variant:ident, $($arg:tt)+) => {
        Err($crate::error::Error::$variant(format!($($arg)+)))
    };
}

pub(crate) use fallible;
