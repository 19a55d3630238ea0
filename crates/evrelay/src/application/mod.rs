//! Application layer: the two relay loops.
//!
//! Exactly one loop runs per process, chosen once at startup by role.
//!
//! - **`capture`** – reads one record at a time from the local device, drops
//!   categories the peer would never accept, and sends the rest as
//!   single-record datagrams.
//! - **`inject`** – receives datagrams of up to ten records, applies the
//!   admissibility predicate to each record, and writes the survivors to the
//!   local device.
//!
//! Both loops depend only on the transport and device traits, and both expose
//! a per-iteration `step` that returns a typed result so every transient
//! failure can be asserted on directly.  `run` wraps `step` with the
//! log-and-continue policy and an externally controlled run flag.

pub mod capture;
pub mod inject;

pub use capture::{CaptureFault, CaptureLoop, CaptureOutcome, CaptureStats};
pub use inject::{BatchReport, InjectFault, InjectLoop, InjectStats, WriteFault, BATCH_CAPACITY};
