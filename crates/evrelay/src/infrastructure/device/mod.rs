//! Input device adapters.
//!
//! A Linux evdev node (`/dev/input/eventN`) yields exactly one
//! `struct input_event` per `read(2)` and accepts one per `write(2)`.
//! [`InputDevice`] wraps the opened character device and issues exactly one
//! raw system call per operation, with no userspace buffering, so a short
//! read or write is visible to the caller instead of being papered over.
//!
//! # Testability
//!
//! The relay loops depend on the [`EventSource`] and [`EventSink`] traits;
//! tests use [`mock::MockDevice`] in place of a real device node.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use evrelay_core::RECORD_SIZE;
use thiserror::Error;
use tracing::info;

pub mod mock;

/// Error type for device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device node could not be opened read+write.
    #[error("failed to open input device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A read or write system call failed.
    #[error("device I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Something that produces raw event records, one per call.
pub trait EventSource {
    /// Blocks until the device yields data and returns how many bytes were
    /// placed in `buf`.  Anything other than `RECORD_SIZE` is a short read.
    fn read_event(&mut self, buf: &mut [u8; RECORD_SIZE]) -> Result<usize, DeviceError>;
}

/// Something that consumes raw event records, one per call.
pub trait EventSink {
    /// Writes `bytes` in a single call and returns how many were accepted.
    fn write_event(&mut self, bytes: &[u8]) -> Result<usize, DeviceError>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn read_event(&mut self, buf: &mut [u8; RECORD_SIZE]) -> Result<usize, DeviceError> {
        (**self).read_event(buf)
    }
}

impl<K: EventSink + ?Sized> EventSink for &mut K {
    fn write_event(&mut self, bytes: &[u8]) -> Result<usize, DeviceError> {
        (**self).write_event(bytes)
    }
}

/// An opened evdev (or uinput-backed) character device.
#[derive(Debug)]
pub struct InputDevice {
    file: File,
    path: PathBuf,
}

impl InputDevice {
    /// Opens `path` for reading and writing.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Open`] if the node does not exist or the process
    /// lacks permission (evdev nodes are usually root or `input` group only).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| DeviceError::Open {
                path: path.clone(),
                source,
            })?;
        info!("opened input device {}", path.display());
        Ok(Self { file, path })
    }

    /// The path this device was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for InputDevice {
    fn read_event(&mut self, buf: &mut [u8; RECORD_SIZE]) -> Result<usize, DeviceError> {
        Ok(self.file.read(buf)?)
    }
}

impl EventSink for InputDevice {
    fn write_event(&mut self, bytes: &[u8]) -> Result<usize, DeviceError> {
        Ok(self.file.write(bytes)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// A scratch regular file standing in for a device node.
    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("evrelay-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_open_missing_device_fails_with_path() {
        // Arrange
        let path = scratch_path("does-not-exist");

        // Act
        let result = InputDevice::open(&path);

        // Assert
        match result {
            Err(DeviceError::Open { path: p, source }) => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Open error, got {other:?}"),
        }
    }

    #[test]
    fn test_write_then_read_one_record() {
        // Arrange
        let path = scratch_path("roundtrip");
        std::fs::write(&path, []).expect("create scratch file");
        let payload = [0x5Au8; RECORD_SIZE];

        // Act
        let written = InputDevice::open(&path)
            .expect("open for write")
            .write_event(&payload)
            .expect("write");
        let mut reader = InputDevice::open(&path).expect("open for read");
        let mut buf = [0u8; RECORD_SIZE];
        let read = reader.read_event(&mut buf).expect("read");

        // Assert
        assert_eq!(written, RECORD_SIZE);
        assert_eq!(read, RECORD_SIZE);
        assert_eq!(buf, payload);
        assert_eq!(reader.path(), path.as_path());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_reports_short_read() {
        // Arrange: a file holding less than one record.
        let path = scratch_path("short");
        std::fs::write(&path, [1u8; 3]).expect("create scratch file");
        let mut device = InputDevice::open(&path).expect("open");
        let mut buf = [0u8; RECORD_SIZE];

        // Act
        let first = device.read_event(&mut buf).expect("read");
        let second = device.read_event(&mut buf).expect("read at EOF");

        // Assert
        assert_eq!(first, 3);
        assert_eq!(second, 0);
        let _ = std::fs::remove_file(&path);
    }
}
