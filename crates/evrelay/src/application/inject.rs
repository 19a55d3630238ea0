//! InjectLoop: receives datagrams from the peer and writes records to the
//! local device.
//!
//! One iteration ([`InjectLoop::step`]) is:
//!
//! 1. Block on receiving one datagram into a buffer of [`BATCH_CAPACITY`]
//!    records (longer datagrams are truncated by the socket).
//! 2. A receive failure is an [`InjectFault::Receive`].
//! 3. The payload is decoded into `len / RECORD_SIZE` whole records; any
//!    trailing partial record is counted but never interpreted.
//! 4. Each record, in arrival order, goes through the admissibility predicate.
//!    Admissible records are written to the device one per call; a short or
//!    failed write is recorded in the report and the next record is tried.

use std::sync::atomic::{AtomicBool, Ordering};

use evrelay_core::{decode_batch, domain::filter, RECORD_SIZE};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::infrastructure::device::{DeviceError, EventSink};
use crate::infrastructure::transport::{DatagramTransport, TransportError};

/// Number of records the receive buffer holds.
pub const BATCH_CAPACITY: usize = 10;

/// Size of the receive buffer in bytes.
pub const RECEIVE_BUFFER_SIZE: usize = BATCH_CAPACITY * RECORD_SIZE;

/// A failed receive; the whole datagram is lost.
#[derive(Debug, Error)]
pub enum InjectFault {
    #[error("receive failed: {0}")]
    Receive(#[from] TransportError),
}

/// A failed write of one admissible record.
#[derive(Debug, Error)]
pub enum WriteFault {
    #[error("short write to device: wrote {got} of {expected} bytes")]
    ShortWrite { got: usize, expected: usize },
    #[error("device write failed: {0}")]
    Device(#[from] DeviceError),
}

/// What happened to one received datagram.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Whole records decoded from the datagram.
    pub records: usize,
    /// Records fully written to the device.
    pub written: usize,
    /// Records refused by the admissibility predicate.
    pub rejected: usize,
    /// Bytes after the last whole record.
    pub trailing_bytes: usize,
    /// One entry per admissible record whose write did not complete.
    pub write_faults: Vec<WriteFault>,
}

/// Running totals, reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectStats {
    pub datagrams: u64,
    pub written: u64,
    pub rejected: u64,
    pub faults: u64,
}

/// The consumer side of the relay.
pub struct InjectLoop<T, K> {
    transport: T,
    sink: K,
    buf: [u8; RECEIVE_BUFFER_SIZE],
    stats: InjectStats,
}

impl<T: DatagramTransport, K: EventSink> InjectLoop<T, K> {
    /// Creates a loop over a set-up transport and an opened device.
    pub fn new(transport: T, sink: K) -> Self {
        Self {
            transport,
            sink,
            buf: [0u8; RECEIVE_BUFFER_SIZE],
            stats: InjectStats::default(),
        }
    }

    /// Receives one datagram and writes its admissible records.
    ///
    /// # Errors
    ///
    /// Returns [`InjectFault::Receive`] if no datagram could be received.
    /// Per-record write failures do not fail the step; they are listed in
    /// [`BatchReport::write_faults`].
    pub fn step(&mut self) -> Result<BatchReport, InjectFault> {
        self.buf.fill(0);
        let len = match self.transport.receive(&mut self.buf) {
            Ok(len) => len,
            Err(e) => {
                self.stats.faults += 1;
                return Err(e.into());
            }
        };
        self.stats.datagrams += 1;

        let batch = decode_batch(&self.buf[..len]);
        let mut report = BatchReport {
            records: batch.records.len(),
            trailing_bytes: batch.trailing_bytes,
            ..BatchReport::default()
        };
        if batch.is_empty() {
            debug!("datagram of {len} bytes carried no whole record");
        } else if batch.trailing_bytes > 0 {
            debug!("ignoring {} trailing bytes", batch.trailing_bytes);
        }

        for record in &batch.records {
            if let Err(reason) = filter::check(record) {
                debug!("rejected {record}: {reason}");
                report.rejected += 1;
                continue;
            }
            match self.sink.write_event(&record.to_bytes()) {
                Ok(RECORD_SIZE) => {
                    trace!("wrote {record}");
                    report.written += 1;
                }
                Ok(got) => report.write_faults.push(WriteFault::ShortWrite {
                    got,
                    expected: RECORD_SIZE,
                }),
                Err(e) => report.write_faults.push(e.into()),
            }
        }

        self.stats.written += report.written as u64;
        self.stats.rejected += report.rejected as u64;
        self.stats.faults += report.write_faults.len() as u64;
        Ok(report)
    }

    /// Runs [`step`](Self::step) until `running` is cleared.
    ///
    /// The flag is checked before every blocking receive.
    pub fn run(&mut self, running: &AtomicBool) -> InjectStats {
        info!("inject loop started");
        while running.load(Ordering::Relaxed) {
            match self.step() {
                Ok(report) => {
                    for fault in &report.write_faults {
                        warn!("{fault}");
                    }
                }
                Err(fault) => warn!("{fault}"),
            }
        }
        info!(
            "inject loop stopped: datagrams={} written={} rejected={} faults={}",
            self.stats.datagrams, self.stats.written, self.stats.rejected, self.stats.faults
        );
        self.stats
    }

    /// Counters so far.
    pub fn stats(&self) -> InjectStats {
        self.stats
    }

    /// Releases the transport and device, e.g. for teardown.
    pub fn into_parts(self) -> (T, K) {
        (self.transport, self.sink)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
