//! Bluetooth MAC address codec.
//!
//! A controller stores its pairing target as six raw bytes. Users type it as
//! either `AABBCCDDEEFF` or `AA:BB:CC:DD:EE:FF`; both forms are accepted by
//! [`parse`], and [`format`] renders lower-case hex with or without colons.
//!
//! Bytes are copied verbatim between text, [`MacAddress`] and the wire: no
//! byte swapping happens anywhere in this crate.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of the plain form, `AABBCCDDEEFF`.
pub const PLAIN_LEN: usize = 12;
/// Length of the colon form, `AA:BB:CC:DD:EE:FF`.
pub const COLON_LEN: usize = 17;

/// Why a MAC string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacParseError {
    #[error("expected 12 or 17 characters, got {0}")]
    Length(usize),

    #[error("invalid hex digit at position {position}")]
    InvalidDigit { position: usize },

    #[error("unexpected trailing input at position {position}")]
    Trailing { position: usize },

    #[error("only {bytes} of 6 bytes present")]
    Incomplete { bytes: usize },
}

/// Six raw address bytes, in wire order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Build from the first six bytes of `data`, if there are that many.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = data.get(..6)?.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Render as lower-case hex; see [`format`].
    pub fn to_string_with(&self, separators: bool) -> String {
        format(self, separators)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self, true))
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[inline]
fn nibble(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

/// Parse `AABBCCDDEEFF` or `AA:BB:CC:DD:EE:FF` (any case).
///
/// Colons are skipped wherever they appear rather than checked by position;
/// every consumed pair must be two hex digits, the whole input must be
/// consumed, and exactly six bytes must come out.
pub fn parse(text: &str) -> Result<MacAddress, MacParseError> {
    let input = text.as_bytes();
    if input.len() != PLAIN_LEN && input.len() != COLON_LEN {
        return Err(MacParseError::Length(input.len()));
    }

    let mut out = [0u8; 6];
    let mut produced = 0;
    let mut pos = 0;

    while pos + 1 < input.len() && produced < out.len() {
        if input[pos] == b':' {
            pos += 1;
            continue;
        }
        let hi = nibble(input[pos]).ok_or(MacParseError::InvalidDigit { position: pos })?;
        let lo = nibble(input[pos + 1]).ok_or(MacParseError::InvalidDigit {
            position: pos + 1,
        })?;
        out[produced] = (hi << 4) | lo;
        produced += 1;
        pos += 2;
    }

    if pos < input.len() {
        return Err(MacParseError::Trailing { position: pos });
    }
    if produced < out.len() {
        return Err(MacParseError::Incomplete { bytes: produced });
    }
    Ok(MacAddress(out))
}

/// Lower-case hex, colon-separated when `separators` is set.
pub fn format(mac: &MacAddress, separators: bool) -> String {
    let sep = if separators { ":" } else { "" };
    mac.0
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(sep)
}
