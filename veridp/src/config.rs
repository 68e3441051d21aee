//! Loading a [`Capabilities`] set from a TOML or YAML file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::capability::{Capabilities, Capability};

/// File syntax. `Auto` picks by extension: `.yaml`/`.yml` read as YAML and
/// anything else as TOML.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigFormat {
    Auto,
    Toml,
    Yaml,
}

impl ConfigFormat {
    fn for_path(self, path: &Path) -> Self {
        if self != ConfigFormat::Auto {
            return self;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {format:?} capability file: {details}")]
    Parse { format: ConfigFormat, details: String },
    #[error("invalid capability set: {0}")]
    Validation(String),
}

#[derive(Debug, Deserialize)]
struct CapabilityFile {
    capabilities: Capabilities,
}

impl CapabilityFile {
    fn parse(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parsed = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|err| err.to_string()),
            ConfigFormat::Toml | ConfigFormat::Auto => {
                toml::from_str(contents).map_err(|err| err.to_string())
            }
        };
        parsed.map_err(|details| ConfigError::Parse { format, details })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.capabilities.is_enabled(Capability::Contrib) {
            return Ok(());
        }
        // every constructor needs contrib, so the other flags alone do nothing
        match self.capabilities.iter().next() {
            Some(orphan) => Err(ConfigError::Validation(format!(
                "`{orphan}` has no effect unless `contrib` is enabled"
            ))),
            None => Ok(()),
        }
    }
}

/// Reads the `capabilities` section of `path` and validates it.
pub fn load_capabilities(path: &Path, format: ConfigFormat) -> Result<Capabilities, ConfigError> {
    let format = format.for_path(path);
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file = CapabilityFile::parse(&contents, format)?;
    file.validate()?;
    debug!(path = %path.display(), capabilities = ?file.capabilities, "loaded capabilities");
    Ok(file.capabilities)
}
