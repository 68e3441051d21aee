//! Opt-in capability flags.
//!
//! Nothing in the library consults global state: every constructor receives a
//! [`Capabilities`] value and calls [`Capabilities::require`] before it looks
//! at any of its other arguments.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::error::{Error, Fallible};

/// Environment variable read by [`Capabilities::from_env`].
pub const CAPABILITIES_ENV: &str = "VERIDP_CAPABILITIES";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Constructors whose proofs have not been externally vetted.
    Contrib,
    /// Mechanisms that sample continuous noise with machine floats.
    FloatingPoint,
    /// Escape hatches whose guarantee rests on the caller's honesty.
    HonestButCurious,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::Contrib,
        Capability::FloatingPoint,
        Capability::HonestButCurious,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Capability::Contrib => "contrib",
            Capability::FloatingPoint => "floating-point",
            Capability::HonestButCurious => "honest-but-curious",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|capability| capability.name() == s.trim())
            .ok_or_else(|| ConfigError::Validation(format!("unknown capability `{}`", s.trim())))
    }
}

/// The set of enabled capabilities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    enabled: BTreeSet<Capability>,
}

impl Capabilities {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self::new(Capability::ALL)
    }

    pub fn new(enabled: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            enabled: enabled.into_iter().collect(),
        }
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.enabled.insert(capability);
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.enabled.remove(&capability);
        self
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.enabled.iter().copied()
    }

    /// Fails with the first capability in `required` that is not enabled.
    pub fn require(&self, required: &[Capability]) -> Fallible<()> {
        match required.iter().find(|c| !self.is_enabled(**c)) {
            Some(missing) => Err(Error::CapabilityDisabled(*missing)),
            None => Ok(()),
        }
    }

    /// Parses a comma-separated list such as `contrib,floating-point`.
    pub fn parse_list(list: &str) -> Result<Self, ConfigError> {
        list.split(',')
            .filter(|item| !item.trim().is_empty())
            .map(Capability::from_str)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(|enabled| Self { enabled })
    }

    /// Reads [`CAPABILITIES_ENV`]. An unset variable enables nothing.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CAPABILITIES_ENV) {
            Ok(list) => Self::parse_list(&list),
            Err(std::env::VarError::NotPresent) => Ok(Self::none()),
            Err(err) => Err(ConfigError::Validation(format!(
                "{CAPABILITIES_ENV} is not valid unicode: {err}"
            ))),
        }
    }
}
