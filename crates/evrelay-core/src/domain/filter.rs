//! Admissibility rules for relayed input events.
//!
//! Two gates exist and they are deliberately different:
//!
//! - [`passes_capture_prefilter`] is a cheap range check on the capture side.
//!   Anything with a category below `EV_MSC` is worth a send attempt.  It is
//!   broader than the fine predicate (absolute-axis events pass it).
//! - [`is_admissible`] is the fine predicate on the inject side and the only
//!   thing standing between the network and a live input device.
//!
//! | Category | Admitted when                          |
//! |----------|----------------------------------------|
//! | `EV_KEY` | value is 0 (released) or 1 (pressed)   |
//! | `EV_REL` | code is `REL_X`, `REL_Y`, or `REL_WHEEL` |
//! | `EV_SYN` | value is 0                             |
//! | other    | never                                  |
//!
//! Key autorepeat (value 2) is rejected: the receiving kernel generates its
//! own repeats from the held key state.

use thiserror::Error;

use crate::protocol::record::{
    InputEventRecord, EV_KEY, EV_MSC, EV_REL, EV_SYN, KEY_PRESSED, KEY_RELEASED, REL_WHEEL,
    REL_X, REL_Y,
};

/// Why a record was refused by [`check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("key event with value {0} (only press/release are relayed)")]
    KeyValue(i32),
    #[error("relative event with unsupported axis code {0}")]
    RelativeAxis(u16),
    #[error("sync event with nonzero value {0}")]
    SyncValue(i32),
    #[error("event category 0x{0:02X} is never relayed")]
    Category(u16),
}

/// Applies the fine admissibility predicate, reporting why a record fails.
///
/// # Errors
///
/// Returns the [`Rejection`] describing the first rule the record breaks.
pub fn check(record: &InputEventRecord) -> Result<(), Rejection> {
    match record.event_type {
        EV_KEY => match record.value {
            KEY_RELEASED | KEY_PRESSED => Ok(()),
            other => Err(Rejection::KeyValue(other)),
        },
        EV_REL => match record.code {
            REL_X | REL_Y | REL_WHEEL => Ok(()),
            other => Err(Rejection::RelativeAxis(other)),
        },
        EV_SYN => match record.value {
            0 => Ok(()),
            other => Err(Rejection::SyncValue(other)),
        },
        other => Err(Rejection::Category(other)),
    }
}

/// Returns `true` if `record` may be written to a local input device.
pub fn is_admissible(record: &InputEventRecord) -> bool {
    check(record).is_ok()
}

/// Returns `true` if the capture side should attempt to send `record` at all.
pub fn passes_capture_prefilter(record: &InputEventRecord) -> bool {
    record.event_type < EV_MSC
}

// ── Tests ─────────────────────────────────────────────────────────────────────
