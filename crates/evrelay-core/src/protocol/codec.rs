//! Datagram codec for evrelay.
//!
//! Wire format:
//! ```text
//! [record:R][record:R]...[record:R][trailing:L mod R]
//! ```
//! A datagram carries whole records back to back with no header, length
//! prefix, or checksum.  The number of records is inferred purely from the
//! datagram length `L` and the record size `R`; a trailing partial record is
//! reported but never interpreted.

use thiserror::Error;

use crate::protocol::record::{InputEventRecord, RECORD_SIZE};

/// Errors that can occur while decoding a single record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The byte slice is not exactly one record long.
    #[error("record length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// The records recovered from one datagram.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedBatch {
    /// Whole records in arrival order.
    pub records: Vec<InputEventRecord>,
    /// Bytes after the last whole record (`L mod R`); never decoded.
    pub trailing_bytes: usize,
}

impl DecodedBatch {
    /// Returns `true` when the datagram did not contain a single whole record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes exactly one record from `bytes`.
///
/// # Errors
///
/// Returns [`CodecError::LengthMismatch`] unless `bytes.len() == RECORD_SIZE`.
///
/// # Examples
///
/// ```rust
/// use evrelay_core::protocol::{decode_record, InputEventRecord, EV_KEY};
///
/// let original = InputEventRecord::new(EV_KEY, 30, 1);
/// let decoded = decode_record(&original.to_bytes()).unwrap();
/// assert_eq!(decoded, original);
/// ```
pub fn decode_record(bytes: &[u8]) -> Result<InputEventRecord, CodecError> {
    let exact: &[u8; RECORD_SIZE] = bytes.try_into().map_err(|_| CodecError::LengthMismatch {
        expected: RECORD_SIZE,
        actual: bytes.len(),
    })?;
    Ok(InputEventRecord::from_bytes(exact))
}

/// Decodes every whole record in a received datagram.
///
/// Exactly `bytes.len() / RECORD_SIZE` records are produced; the remaining
/// `bytes.len() % RECORD_SIZE` bytes are only counted.
///
/// # Examples
///
/// ```rust
/// use evrelay_core::protocol::{decode_batch, encode_batch, InputEventRecord, RECORD_SIZE, EV_SYN};
///
/// let mut bytes = encode_batch(&[InputEventRecord::new(EV_SYN, 0, 0)]);
/// bytes.extend_from_slice(&[0xFF; 3]);
/// let batch = decode_batch(&bytes);
/// assert_eq!(batch.records.len(), 1);
/// assert_eq!(batch.trailing_bytes, 3);
/// ```
pub fn decode_batch(bytes: &[u8]) -> DecodedBatch {
    let chunks = bytes.chunks_exact(RECORD_SIZE);
    let trailing_bytes = chunks.remainder().len();
    let records = chunks
        .map(|chunk| {
            let mut exact = [0u8; RECORD_SIZE];
            exact.copy_from_slice(chunk);
            InputEventRecord::from_bytes(&exact)
        })
        .collect();
    DecodedBatch {
        records,
        trailing_bytes,
    }
}

/// Encodes records back to back into one datagram payload.
pub fn encode_batch(records: &[InputEventRecord]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(records.len() * RECORD_SIZE);
    for record in records {
        buf.extend_from_slice(&record.to_bytes());
    }
    buf
}

// ── Tests ─────────────────────────────────────────────────────────────────────
