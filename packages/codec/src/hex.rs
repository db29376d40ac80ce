//! Hex digit helpers shared by the path and text codecs.
//!
//! Both codecs emit lowercase digits only and, on the way back in, accept
//! lowercase digits only. Rejecting `A`-`F` keeps decoding exact: an
//! uppercase escape is never produced here, so seeing one means the text
//! came from somewhere else and is refused rather than guessed at.

use crate::CodecError;

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Append the two lowercase hex digits of `byte`.
pub(crate) fn push_pair(out: &mut String, byte: u8) {
    out.push(DIGITS[(byte >> 4) as usize] as char);
    out.push(DIGITS[(byte & 0x0f) as usize] as char);
}

/// Value of a single lowercase hex digit.
pub(crate) fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Decode a two-digit pair into its byte.
pub(crate) fn pair(hi: u8, lo: u8) -> Option<u8> {
    Some((nibble(hi)? << 4) | nibble(lo)?)
}

/// Reserve exactly `len` bytes for an output string.
pub(crate) fn with_exact_capacity(len: usize) -> Result<String, CodecError> {
    let mut out = String::new();
    out.try_reserve_exact(len)
        .map_err(|_| CodecError::AllocationFailure { requested: len })?;
    Ok(out)
}

/// Reserve exactly `len` bytes for an output byte buffer.
pub(crate) fn bytes_with_exact_capacity(len: usize) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| CodecError::AllocationFailure { requested: len })?;
    Ok(out)
}
