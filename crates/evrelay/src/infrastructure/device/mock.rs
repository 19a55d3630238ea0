//! Mock input device for unit testing.
//!
//! The real [`super::InputDevice`] needs an evdev node, which in turn needs
//! root (or the `input` group) and real hardware.  `MockDevice` replaces it
//! with in-memory scripting:
//!
//! - Reads are served from a queue of scripted results (full records, short
//!   chunks, or errors).  When the queue is empty, reads fail with
//!   `UnexpectedEof` and, if attached, a stop flag is cleared.
//! - Writes are recorded in `written`.  Set `short_write_at` to make a
//!   particular write (by zero-based index) accept fewer bytes than offered.

use std::collections::VecDeque;
use std::io;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use evrelay_core::{InputEventRecord, RECORD_SIZE};

use super::{DeviceError, EventSink, EventSource};

enum ScriptedRead {
    Bytes(Vec<u8>),
    Error(io::ErrorKind),
}

/// A scripted, recording stand-in for an input device.
#[derive(Default)]
pub struct MockDevice {
    pub(crate) reads: VecDeque<ScriptedRead>,
    pub(crate) stop_flag: Option<Arc<AtomicBool>>,
    /// Every byte slice passed to `write_event`, in order (only the accepted
    /// prefix for a short write).
    pub written: Vec<Vec<u8>>,
    /// Write index (zero-based) that will accept only half the bytes.
    pub short_write_at: Option<usize>,
    /// When `true`, every write fails with `PermissionDenied`.
    pub fail_writes: bool,
    pub(crate) writes_attempted: usize,
}

impl MockDevice {
    /// Creates a mock with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears `running` when the read script runs out.
    pub fn stop_when_drained(mut self, running: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(running);
        self
    }

    /// Scripts one full-record read.
    pub fn push_record(&mut self, record: InputEventRecord) {
        self.reads
            .push_back(ScriptedRead::Bytes(record.to_bytes().to_vec()));
    }

    /// Scripts a read that returns `bytes` verbatim (truncated to one record).
    pub fn push_raw(&mut self, bytes: impl Into<Vec<u8>>) {
        self.reads.push_back(ScriptedRead::Bytes(bytes.into()));
    }

    /// Scripts a failed read.
    pub fn push_read_error(&mut self, kind: io::ErrorKind) {
        self.reads.push_back(ScriptedRead::Error(kind));
    }

    /// Decodes every full-size write back into records.
    pub fn written_records(&self) -> Vec<InputEventRecord> {
        self.written
            .iter()
            .filter_map(|w| <&[u8; RECORD_SIZE]>::try_from(w.as_slice()).ok())
            .map(InputEventRecord::from_bytes)
            .collect()
    }
}

impl EventSource for MockDevice {
    fn read_event(&mut self, buf: &mut [u8; RECORD_SIZE]) -> Result<usize, DeviceError> {
        match self.reads.pop_front() {
            Some(ScriptedRead::Bytes(bytes)) => {
                let len = bytes.len().min(RECORD_SIZE);
                buf[..len].copy_from_slice(&bytes[..len]);
                Ok(len)
            }
            Some(ScriptedRead::Error(kind)) => {
                Err(DeviceError::Io(io::Error::new(kind, "mock read failure")))
            }
            None => {
                if let Some(flag) = &self.stop_flag {
                    flag.store(false, Ordering::SeqCst);
                }
                Err(DeviceError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "read script exhausted",
                )))
            }
        }
    }
}

impl EventSink for MockDevice {
    fn write_event(&mut self, bytes: &[u8]) -> Result<usize, DeviceError> {
        let index = self.writes_attempted;
        self.writes_attempted += 1;
        if self.fail_writes {
            return Err(DeviceError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock write failure",
            )));
        }
        let accepted = if self.short_write_at == Some(index) {
            bytes.len() / 2
        } else {
            bytes.len()
        };
        self.written.push(bytes[..accepted].to_vec());
        Ok(accepted)
    }
}
