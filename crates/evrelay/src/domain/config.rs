//! Relay configuration types.
//!
//! [`RelayConfig`] is resolved once at startup (defaults, then an optional
//! TOML file, then CLI arguments / environment) and never changes afterwards.
//! It is a plain struct with no global state so tests can build one directly.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Default input device path.
pub const DEFAULT_DEVICE: &str = "/dev/input/event5";
/// Default peer address (loopback, useful for a single-host smoke test).
pub const DEFAULT_REMOTE_ADDRESS: &str = "127.0.0.1";
/// Default local UDP port.
pub const DEFAULT_LOCAL_PORT: u16 = 5000;
/// Default peer UDP port.
pub const DEFAULT_REMOTE_PORT: u16 = 5005;

/// Which of the two relay loops this process runs.
///
/// The numeric values are the historical `--job` numbers (`0` receives and
/// injects, `1` captures and transmits).  The CLI and the config file accept
/// the same spellings: either number, or `rx`/`inject`/`tx`/`capture`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RoleValue")]
#[repr(u8)]
pub enum Role {
    /// Receive datagrams and write admissible records to the local device.
    Inject = 0,
    /// Read records from the local device and send them to the peer.
    Capture = 1,
}

/// A role as written in a config file: `role = 1` or `role = "tx"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RoleValue {
    Number(i64),
    Name(String),
}

impl TryFrom<RoleValue> for Role {
    type Error = UnknownRole;

    fn try_from(value: RoleValue) -> Result<Self, Self::Error> {
        match value {
            RoleValue::Number(n) => n.to_string().parse(),
            RoleValue::Name(name) => name.parse(),
        }
    }
}

/// A `--job` value that names neither role.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role {0:?} (expected 0/rx/inject or 1/tx/capture)")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "rx" | "inject" => Ok(Role::Inject),
            "1" | "tx" | "capture" => Ok(Role::Capture),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Inject => f.write_str("RX (inject)"),
            Role::Capture => f.write_str("TX (capture)"),
        }
    }
}

/// All runtime configuration for one relay process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Capture or inject.
    pub role: Role,
    /// Event character device, e.g. `/dev/input/event5`.
    pub device_path: PathBuf,
    /// UDP port bound on all local interfaces.
    pub local_port: u16,
    /// UDP port of the peer.
    pub remote_port: u16,
    /// Peer IPv4 address in dotted-decimal text; validated by the transport.
    pub remote_address: String,
}

impl Default for RelayConfig {
    /// | Field          | Default             |
    /// |----------------|---------------------|
    /// | role           | `Capture`           |
    /// | device_path    | `/dev/input/event5` |
    /// | local_port     | `5000`              |
    /// | remote_port    | `5005`              |
    /// | remote_address | `127.0.0.1`         |
    fn default() -> Self {
        Self {
            role: Role::Capture,
            device_path: PathBuf::from(DEFAULT_DEVICE),
            local_port: DEFAULT_LOCAL_PORT,
            remote_port: DEFAULT_REMOTE_PORT,
            remote_address: DEFAULT_REMOTE_ADDRESS.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Arrange / Act
        let cfg = RelayConfig::default();

        // Assert
        assert_eq!(cfg.role, Role::Capture);
        assert_eq!(cfg.device_path, PathBuf::from("/dev/input/event5"));
        assert_eq!(cfg.local_port, 5000);
        assert_eq!(cfg.remote_port, 5005);
        assert_eq!(cfg.remote_address, "127.0.0.1");
    }

    #[test]
    fn test_role_parses_job_numbers() {
        assert_eq!("0".parse::<Role>(), Ok(Role::Inject));
        assert_eq!("1".parse::<Role>(), Ok(Role::Capture));
    }

    #[test]
    fn test_role_parses_names_case_insensitively() {
        assert_eq!("RX".parse::<Role>(), Ok(Role::Inject));
        assert_eq!("inject".parse::<Role>(), Ok(Role::Inject));
        assert_eq!("Tx".parse::<Role>(), Ok(Role::Capture));
        assert_eq!("CAPTURE".parse::<Role>(), Ok(Role::Capture));
    }

    #[test]
    fn test_role_rejects_unknown() {
        assert_eq!("2".parse::<Role>(), Err(UnknownRole("2".to_string())));
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_deserializes_numbers_and_names() {
        #[derive(Deserialize)]
        struct Doc {
            role: Role,
        }
        let role = |text: &str| toml::from_str::<Doc>(text).map(|doc| doc.role);

        assert_eq!(role("role = 0").unwrap(), Role::Inject);
        assert_eq!(role("role = 1").unwrap(), Role::Capture);
        assert_eq!(role("role = \"TX\"").unwrap(), Role::Capture);
        assert_eq!(role("role = \"inject\"").unwrap(), Role::Inject);
        assert!(role("role = 2").is_err());
        assert!(role("role = \"sideways\"").is_err());
    }

    #[test]
    fn test_role_numeric_values() {
        assert_eq!(Role::Inject as u8, 0);
        assert_eq!(Role::Capture as u8, 1);
    }

    #[test]
    fn test_role_display_names_direction() {
        assert_eq!(Role::Capture.to_string(), "TX (capture)");
        assert_eq!(Role::Inject.to_string(), "RX (inject)");
    }
}
