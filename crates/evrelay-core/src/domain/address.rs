//! Dotted-quad IPv4 address validation.
//!
//! The peer address is checked once at startup so that a typo in the
//! configuration fails loudly instead of sending every event into the void.
//! The accepted form is strict: four non-empty groups of ASCII decimal digits,
//! each in `0..=255`, separated by exactly three dots.  Leading zeros are read
//! as decimal (`"010"` is 10), not octal.

use std::net::Ipv4Addr;

use thiserror::Error;

/// Reasons a peer address string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,
    #[error("expected 4 dot-separated octets, found {0}")]
    WrongOctetCount(usize),
    #[error("octet {0:?} contains a non-digit character")]
    NonDigit(String),
    #[error("octet {0:?} is greater than 255")]
    OctetOutOfRange(String),
}

/// Validates `text` as a four-octet dotted-decimal address.
///
/// # Errors
///
/// Returns [`AddressError`] describing the first problem found.
///
/// # Examples
///
/// ```rust
/// use evrelay_core::validate_ipv4;
///
/// assert_eq!(validate_ipv4("192.168.24.67").unwrap().octets(), [192, 168, 24, 67]);
/// assert!(validate_ipv4("192.168.24").is_err());
/// assert!(validate_ipv4("192.168.24.256").is_err());
/// ```
pub fn validate_ipv4(text: &str) -> Result<Ipv4Addr, AddressError> {
    if text.is_empty() {
        return Err(AddressError::Empty);
    }

    let groups: Vec<&str> = text.split('.').collect();
    if groups.len() != 4 {
        return Err(AddressError::WrongOctetCount(groups.len()));
    }

    let mut octets = [0u8; 4];
    for (slot, group) in octets.iter_mut().zip(&groups) {
        *slot = parse_octet(group)?;
    }
    Ok(Ipv4Addr::from(octets))
}

fn parse_octet(group: &str) -> Result<u8, AddressError> {
    if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressError::NonDigit(group.to_string()));
    }
    // Overlong digit strings overflow u32 as well; both are out of range.
    group
        .parse::<u32>()
        .ok()
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| AddressError::OctetOutOfRange(group.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
