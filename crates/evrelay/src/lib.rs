//! evrelay library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does evrelay do?
//!
//! Two hosts each run one `evrelay` process per direction:
//!
//! 1. The *capture* process opens a local `/dev/input/eventN`, reads raw
//!    input events, and sends them to its peer over UDP.
//! 2. The *inject* process on the peer receives those datagrams, drops any
//!    record that is malformed or of an unsupported kind, and writes the rest
//!    into its own event device, where the kernel treats them like local input.
//!
//! No acknowledgement, retry, ordering, or encryption is provided.  Lost
//! datagrams are simply lost.

/// Domain layer: relay configuration.
pub mod domain;

/// Application layer: capture and inject loops.
pub mod application;

/// Infrastructure layer: UDP endpoint, input device, config file.
pub mod infrastructure;
