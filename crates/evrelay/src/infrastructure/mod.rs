//! Infrastructure layer for the relay.
//!
//! Contains the OS-facing adapters: the UDP socket and the input device node,
//! plus the on-disk configuration file.
//!
//! **Dependency rule**: this layer may depend on `evrelay_core`, but MUST NOT
//! be imported by `evrelay_core`.  The application layer sees these adapters
//! only through the `DatagramTransport`, `EventSource`, and `EventSink` traits.
//!
//! # Sub-modules
//!
//! - **`transport`** – the single UDP endpoint (bound local port + fixed peer).
//! - **`device`** – the evdev character device, opened read+write.
//! - **`config_file`** – optional TOML file layered under the CLI arguments.

pub mod config_file;
pub mod device;
pub mod transport;
