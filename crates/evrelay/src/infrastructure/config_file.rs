//! Optional TOML configuration file.
//!
//! Every key is optional; anything present overrides the built-in default and
//! is in turn overridden by a CLI argument or `EVRELAY_*` environment variable.
//!
//! ```toml
//! role = "inject"          # or "capture", "rx", "tx", 0, 1
//! device = "/dev/input/event4"
//! local_port = 5005
//! remote_port = 5000
//! remote_address = "192.168.24.67"
//! ```
//!
//! Unknown keys are rejected so a misspelt option fails at startup instead of
//! being silently ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::config::{RelayConfig, Role};

/// Error type for configuration file loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The on-disk schema: a partial [`RelayConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub role: Option<Role>,
    pub device: Option<PathBuf>,
    pub local_port: Option<u16>,
    pub remote_port: Option<u16>,
    pub remote_address: Option<String>,
}

impl FileConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the raw TOML error; [`load`] attaches the path.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overwrites the fields of `base` that this file sets.
    pub fn apply_to(self, base: &mut RelayConfig) {
        if let Some(role) = self.role {
            base.role = role;
        }
        if let Some(device) = self.device {
            base.device_path = device;
        }
        if let Some(port) = self.local_port {
            base.local_port = port;
        }
        if let Some(port) = self.remote_port {
            base.remote_port = port;
        }
        if let Some(address) = self.remote_address {
            base.remote_address = address;
        }
    }
}

/// Reads and parses the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or is not valid TOML
/// for [`FileConfig`].
pub fn load(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FileConfig::from_toml(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
