//! CaptureLoop: reads records from the local device and sends them to the peer.
//!
//! One iteration ([`CaptureLoop::step`]) is:
//!
//! 1. Block on a read of exactly one record from the device.
//! 2. A read that does not return a full record is a [`CaptureFault::ShortRead`].
//! 3. Records at or above `EV_MSC` are skipped without touching the socket.
//! 4. Everything else goes out as a single-record datagram; a send failure is
//!    a [`CaptureFault::Send`] and the record is gone.
//!
//! [`CaptureLoop::run`] repeats `step` while the run flag is set, logging every
//! fault and carrying on.  There is no backoff and no retry budget.

use std::sync::atomic::{AtomicBool, Ordering};

use evrelay_core::{passes_capture_prefilter, InputEventRecord, RECORD_SIZE};
use thiserror::Error;
use tracing::{info, trace, warn};

use crate::infrastructure::device::{DeviceError, EventSource};
use crate::infrastructure::transport::{DatagramTransport, TransportError};

/// What one successful capture iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The record was handed to the transport, which reported `bytes` sent.
    Sent { bytes: usize },
    /// The record's category failed the pre-filter.
    Skipped { event_type: u16 },
}

/// A transient failure in one capture iteration.  The loop always continues.
#[derive(Debug, Error)]
pub enum CaptureFault {
    #[error("short read from device: got {got} of {expected} bytes")]
    ShortRead { got: usize, expected: usize },
    #[error("device read failed: {0}")]
    DeviceRead(#[from] DeviceError),
    #[error("transmit failed: {0}")]
    Send(#[from] TransportError),
}

/// Running totals, reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub read: u64,
    pub sent: u64,
    pub skipped: u64,
    pub faults: u64,
}

/// The producer side of the relay.
pub struct CaptureLoop<S, T> {
    source: S,
    transport: T,
    stats: CaptureStats,
}

impl<S: EventSource, T: DatagramTransport> CaptureLoop<S, T> {
    /// Creates a loop over an opened device and a set-up transport.
    pub fn new(source: S, transport: T) -> Self {
        Self {
            source,
            transport,
            stats: CaptureStats::default(),
        }
    }

    /// Performs one read-filter-send iteration.
    ///
    /// # Errors
    ///
    /// Returns a [`CaptureFault`] describing the dropped unit of work.
    pub fn step(&mut self) -> Result<CaptureOutcome, CaptureFault> {
        let result = self.read_and_forward();
        match &result {
            Ok(CaptureOutcome::Sent { .. }) => self.stats.sent += 1,
            Ok(CaptureOutcome::Skipped { .. }) => self.stats.skipped += 1,
            Err(_) => self.stats.faults += 1,
        }
        result
    }

    fn read_and_forward(&mut self) -> Result<CaptureOutcome, CaptureFault> {
        let mut buf = [0u8; RECORD_SIZE];
        let got = self.source.read_event(&mut buf)?;
        if got != RECORD_SIZE {
            return Err(CaptureFault::ShortRead {
                got,
                expected: RECORD_SIZE,
            });
        }
        self.stats.read += 1;

        let record = InputEventRecord::from_bytes(&buf);
        if !passes_capture_prefilter(&record) {
            trace!("skipping {record}");
            return Ok(CaptureOutcome::Skipped {
                event_type: record.event_type,
            });
        }

        let bytes = self.transport.send(&buf)?;
        trace!("sent {record}");
        Ok(CaptureOutcome::Sent { bytes })
    }

    /// Runs [`step`](Self::step) until `running` is cleared.
    ///
    /// The flag is checked before every blocking read, so the loop exits at
    /// most one record after the flag drops.
    pub fn run(&mut self, running: &AtomicBool) -> CaptureStats {
        info!("capture loop started");
        while running.load(Ordering::Relaxed) {
            if let Err(fault) = self.step() {
                warn!("{fault}");
            }
        }
        info!(
            "capture loop stopped: read={} sent={} skipped={} faults={}",
            self.stats.read, self.stats.sent, self.stats.skipped, self.stats.faults
        );
        self.stats
    }

    /// Counters so far.
    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// Releases the device and transport, e.g. for teardown.
    pub fn into_parts(self) -> (S, T) {
        (self.source, self.transport)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
