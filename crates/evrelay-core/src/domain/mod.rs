//! Domain rules for evrelay.
//!
//! Nothing in here touches a socket or a device file, so every rule can be
//! unit-tested on any platform.

/// Dotted-quad IPv4 validation for the configured peer address.
pub mod address;

/// Per-record admissibility rules shared by both relay roles.
pub mod filter;
