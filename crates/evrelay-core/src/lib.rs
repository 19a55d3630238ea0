//! # evrelay-core
//!
//! Shared library for evrelay containing the input-event record layout, the
//! datagram codec, and the rules that decide which records may reach a live
//! input device.
//!
//! This crate is used by both relay roles (capture and inject).
//! It has zero dependencies on OS APIs, device files, or network sockets.
//!
//! # Architecture overview
//!
//! evrelay lets one machine's physical keyboard and mouse drive another
//! machine's Linux input subsystem.  A *capture* process reads raw
//! `struct input_event` records from `/dev/input/eventN` and sends them over
//! UDP; an *inject* process on the peer receives them and writes them into
//! its own event device.
//!
//! This crate (`evrelay-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – How bytes travel over the network.  A datagram is a
//!   back-to-back sequence of fixed-size records in the kernel's native
//!   layout, with no header, length prefix, or checksum.
//!
//! - **`domain`** – Pure rules with no OS dependencies: the admissibility
//!   predicate applied to every record and the dotted-quad validation used to
//!   reject a malformed peer address at startup.

pub mod domain;
pub mod protocol;

pub use domain::address::{validate_ipv4, AddressError};
pub use domain::filter::{is_admissible, passes_capture_prefilter, Rejection};
pub use protocol::codec::{decode_batch, decode_record, encode_batch, CodecError, DecodedBatch};
pub use protocol::record::{EventCategory, InputEventRecord, TimeWord, RECORD_SIZE};
