//! The input-event record exchanged between the two relay roles.
//!
//! The record mirrors the Linux kernel's `struct input_event` byte for byte:
//!
//! ```text
//! [tv_sec:word][tv_usec:word][type:2][code:2][value:4]
//! ```
//!
//! `word` is the platform's `long` width (8 bytes on 64-bit targets, 4 on
//! 32-bit).  All fields use native byte order, because the bytes are read
//! straight out of one kernel and written straight into another.  Both peers
//! must therefore share word width and endianness.

use std::fmt;
use std::mem::size_of;

// ── Layout ────────────────────────────────────────────────────────────────────

/// Width of each timestamp field (`time_t` / `suseconds_t`).
#[cfg(target_pointer_width = "64")]
pub type TimeWord = i64;

/// Width of each timestamp field (`time_t` / `suseconds_t`).
#[cfg(not(target_pointer_width = "64"))]
pub type TimeWord = i32;

const WORD: usize = size_of::<TimeWord>();

/// Size of one encoded record in bytes (24 on 64-bit Linux, 16 on 32-bit).
pub const RECORD_SIZE: usize = 2 * WORD + 2 + 2 + 4;

const SEC_OFF: usize = 0;
const USEC_OFF: usize = WORD;
const TYPE_OFF: usize = 2 * WORD;
const CODE_OFF: usize = TYPE_OFF + 2;
const VALUE_OFF: usize = CODE_OFF + 2;

// ── Event type and code constants (linux/input-event-codes.h) ────────────────

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;
pub const EV_SW: u16 = 0x05;
pub const EV_LED: u16 = 0x11;
pub const EV_SND: u16 = 0x12;
pub const EV_REP: u16 = 0x14;
pub const EV_FF: u16 = 0x15;
pub const EV_PWR: u16 = 0x16;
pub const EV_FF_STATUS: u16 = 0x17;

pub const SYN_REPORT: u16 = 0x00;

pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;
pub const REL_Z: u16 = 0x02;
pub const REL_HWHEEL: u16 = 0x06;
pub const REL_DIAL: u16 = 0x07;
pub const REL_WHEEL: u16 = 0x08;

/// Key released.
pub const KEY_RELEASED: i32 = 0;
/// Key pressed.
pub const KEY_PRESSED: i32 = 1;
/// Key autorepeat (never relayed).
pub const KEY_REPEAT: i32 = 2;

// ── Categories ────────────────────────────────────────────────────────────────

/// The named top-level event categories.
///
/// Used by the `Display` impl of [`InputEventRecord`] for log output.  The
/// filter works on the raw `u16` so that unknown categories are handled
/// without a conversion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EventCategory {
    Synchronization = EV_SYN,
    Key = EV_KEY,
    Relative = EV_REL,
    Absolute = EV_ABS,
    Miscellaneous = EV_MSC,
    Switch = EV_SW,
    Led = EV_LED,
    Sound = EV_SND,
    Repeat = EV_REP,
    ForceFeedback = EV_FF,
    Power = EV_PWR,
    ForceFeedbackStatus = EV_FF_STATUS,
}

impl TryFrom<u16> for EventCategory {
    type Error = ();

    fn try_from(value: u16) -> Result<Self, ()> {
        match value {
            EV_SYN => Ok(EventCategory::Synchronization),
            EV_KEY => Ok(EventCategory::Key),
            EV_REL => Ok(EventCategory::Relative),
            EV_ABS => Ok(EventCategory::Absolute),
            EV_MSC => Ok(EventCategory::Miscellaneous),
            EV_SW => Ok(EventCategory::Switch),
            EV_LED => Ok(EventCategory::Led),
            EV_SND => Ok(EventCategory::Sound),
            EV_REP => Ok(EventCategory::Repeat),
            EV_FF => Ok(EventCategory::ForceFeedback),
            EV_PWR => Ok(EventCategory::Power),
            EV_FF_STATUS => Ok(EventCategory::ForceFeedbackStatus),
            _ => Err(()),
        }
    }
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One input event, as produced by `read(2)` on an evdev character device.
///
/// Records are plain values: built fresh from every device read or datagram,
/// never mutated, and dropped once forwarded or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputEventRecord {
    /// Timestamp seconds.
    pub sec: TimeWord,
    /// Timestamp microseconds.
    pub usec: TimeWord,
    /// Category code (`EV_*`).
    pub event_type: u16,
    /// Sub-code within the category (`KEY_*`, `REL_*`, `SYN_*`, ...).
    pub code: u16,
    /// Signed payload (key state, relative delta, ...).
    pub value: i32,
}

impl InputEventRecord {
    /// Creates a record with a zero timestamp.
    ///
    /// The kernel stamps events it receives through a device write, so a zero
    /// timestamp is fine for records that are built rather than captured.
    pub const fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            sec: 0,
            usec: 0,
            event_type,
            code,
            value,
        }
    }

    /// Returns the same record with the given timestamp.
    pub const fn with_timestamp(self, sec: TimeWord, usec: TimeWord) -> Self {
        Self { sec, usec, ..self }
    }

    /// Returns the named category, or `None` for codes outside the known set.
    pub fn category(&self) -> Option<EventCategory> {
        EventCategory::try_from(self.event_type).ok()
    }

    /// Encodes the record into its native wire layout.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[SEC_OFF..USEC_OFF].copy_from_slice(&self.sec.to_ne_bytes());
        buf[USEC_OFF..TYPE_OFF].copy_from_slice(&self.usec.to_ne_bytes());
        buf[TYPE_OFF..CODE_OFF].copy_from_slice(&self.event_type.to_ne_bytes());
        buf[CODE_OFF..VALUE_OFF].copy_from_slice(&self.code.to_ne_bytes());
        buf[VALUE_OFF..RECORD_SIZE].copy_from_slice(&self.value.to_ne_bytes());
        buf
    }

    /// Decodes a record from its native wire layout.
    ///
    /// Every bit pattern is a structurally valid record; whether it may be
    /// relayed is decided separately by [`crate::domain::filter`].
    pub fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        let mut sec = [0u8; WORD];
        let mut usec = [0u8; WORD];
        sec.copy_from_slice(&buf[SEC_OFF..USEC_OFF]);
        usec.copy_from_slice(&buf[USEC_OFF..TYPE_OFF]);
        Self {
            sec: TimeWord::from_ne_bytes(sec),
            usec: TimeWord::from_ne_bytes(usec),
            event_type: u16::from_ne_bytes([buf[TYPE_OFF], buf[TYPE_OFF + 1]]),
            code: u16::from_ne_bytes([buf[CODE_OFF], buf[CODE_OFF + 1]]),
            value: i32::from_ne_bytes([
                buf[VALUE_OFF],
                buf[VALUE_OFF + 1],
                buf[VALUE_OFF + 2],
                buf[VALUE_OFF + 3],
            ]),
        }
    }
}

impl fmt::Display for InputEventRecord {
    /// Formats as `Key code=30 value=1`, or `type 0x1F code=.. value=..` for
    /// categories outside the named set.  Timestamps are left out.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category() {
            Some(category) => write!(f, "{category:?}")?,
            None => write!(f, "type 0x{:02X}", self.event_type)?,
        }
        write!(f, " code={} value={}", self.code, self.value)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
