//! Domain types for the relay process.
//!
//! Only configuration lives here; the record format and filtering rules are
//! shared with the peer and therefore live in `evrelay-core`.

pub mod config;

pub use config::{RelayConfig, Role};
