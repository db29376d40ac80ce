//! Entity-encoding of values into quote-safe text.
//!
//! Every byte outside `[A-Za-z0-9\-_.: ]` becomes `&x` + two lowercase hex
//! digits + `;`. The output never contains `"`, which lets the payload
//! parser find the end of a quoted field without any backslash handling.

use crate::hex;
use crate::{ByteString, CodecError, Limits};

/// Bytes written per escaped input byte (`&x##;`).
pub const ENTITY_WIDTH: usize = 5;

/// Check if a byte passes through text encoding unchanged.
///
/// Same class as path names, plus space.
pub fn is_text_byte(b: u8) -> bool {
    b == b' ' || crate::path::is_name_byte(b)
}

/// Length a raw quoted span decodes to, given how many entities it holds.
///
/// Returns `None` if the span is too short to contain that many entities.
pub fn decoded_len(raw_len: usize, entities: usize) -> Option<usize> {
    raw_len.checked_sub(entities.checked_mul(ENTITY_WIDTH - 1)?)
}

/// Reversible mapping between arbitrary value bytes and quote-safe text.
///
/// # Examples
///
/// ```rust
/// use rowfs_codec::TextCodec;
///
/// let codec = TextCodec::default();
/// let text = codec.encode(b"say \"hi\"").unwrap();
/// assert_eq!(text, "say &x22;hi&x22;");
/// assert_eq!(codec.decode(text.as_bytes(), text.len()).unwrap(), b"say \"hi\"");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TextCodec {
    limits: Limits,
}

impl TextCodec {
    pub fn new(limits: Limits) -> Self {
        TextCodec { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Exact length `encode` would produce for `value`.
    pub fn encoded_len(&self, value: &[u8]) -> Result<usize, CodecError> {
        let max = self.limits.string_ceiling();
        if value.len() > max {
            return Err(CodecError::InputTooLarge {
                length: value.len(),
                max,
            });
        }

        let escaped = value.iter().filter(|&&b| !is_text_byte(b)).count();
        let len = escaped
            .checked_mul(ENTITY_WIDTH - 1)
            .and_then(|extra| extra.checked_add(value.len()))
            .ok_or(CodecError::InputTooLarge {
                length: value.len(),
                max,
            })?;
        if len > max {
            return Err(CodecError::InputTooLarge { length: len, max });
        }
        Ok(len)
    }

    /// Encode value bytes as quote-safe text. Empty input yields `""`.
    pub fn encode(&self, value: &[u8]) -> Result<String, CodecError> {
        let len = self.encoded_len(value).inspect_err(|e| {
            log::debug!("text encode rejected {} byte value: {}", value.len(), e);
        })?;

        let mut out = hex::with_exact_capacity(len)?;
        for &b in value {
            if is_text_byte(b) {
                out.push(b as char);
            } else {
                out.push_str("&x");
                hex::push_pair(&mut out, b);
                out.push(';');
            }
        }
        debug_assert_eq!(out.len(), len);
        Ok(out)
    }

    /// Decode the first `declared_len` bytes of `text`.
    ///
    /// An `&` must start a complete `&x##;` entity lying entirely inside the
    /// declared span. Any other byte is copied through.
    pub fn decode(&self, text: &[u8], declared_len: usize) -> Result<ByteString, CodecError> {
        let max = self.limits.string_ceiling();
        if declared_len > max {
            return Err(CodecError::InputTooLarge {
                length: declared_len,
                max,
            });
        }
        let span = text.get(..declared_len).ok_or_else(|| {
            log::debug!(
                "text decode: declared {} bytes, only {} present",
                declared_len,
                text.len()
            );
            CodecError::malformed(text.len(), "declared length exceeds input")
        })?;

        let mut out = hex::bytes_with_exact_capacity(span.len())?;
        let mut i = 0;
        while i < span.len() {
            let b = span[i];
            if b != b'&' {
                out.push(b);
                i += 1;
                continue;
            }

            out.push(entity_at(span, i)?);
            i += ENTITY_WIDTH;
        }

        Ok(ByteString::from(out))
    }
}

/// Decode the `&x##;` entity starting at `offset`.
fn entity_at(span: &[u8], offset: usize) -> Result<u8, CodecError> {
    let Some(entity) = span.get(offset..offset + ENTITY_WIDTH) else {
        log::debug!("text decode: truncated entity at offset {}", offset);
        return Err(CodecError::malformed(offset, "truncated entity"));
    };
    if entity[1] != b'x' || entity[4] != b';' {
        log::debug!("text decode: mistyped entity at offset {}", offset);
        return Err(CodecError::malformed(offset, "entity is not of the form &x##;"));
    }
    hex::pair(entity[2], entity[3]).ok_or_else(|| {
        log::debug!("text decode: bad hex digits at offset {}", offset);
        CodecError::malformed(offset, "entity is not two lowercase hex digits")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TextCodec {
        TextCodec::default()
    }

    fn decode_all(text: &str) -> Result<ByteString, CodecError> {
        codec().decode(text.as_bytes(), text.len())
    }

    #[test]
    fn space_passes_through() {
        assert_eq!(codec().encode(b"hello world").unwrap(), "hello world");
    }

    #[test]
    fn quotes_and_ampersands_are_entities() {
        assert_eq!(codec().encode(b"\"").unwrap(), "&x22;");
        assert_eq!(codec().encode(b"&").unwrap(), "&x26;");
        assert_eq!(codec().encode(b"a\0").unwrap(), "a&x00;");
    }

    #[test]
    fn empty_value_is_allowed() {
        assert_eq!(codec().encode(b"").unwrap(), "");
        assert_eq!(decode_all("").unwrap(), b"");
    }

    #[test]
    fn encoded_len_matches_output() {
        let value = b"x\"y\n";
        assert_eq!(
            codec().encoded_len(value).unwrap(),
            codec().encode(value).unwrap().len()
        );
        assert_eq!(codec().encoded_len(value).unwrap(), 2 + 2 * 5);
    }

    #[test]
    fn expansion_over_limit() {
        let codec = TextCodec::new(Limits::default().with_max_string_len(8));
        assert_eq!(
            codec.encode(b"\n\n"),
            Err(CodecError::InputTooLarge { length: 10, max: 8 })
        );
        assert_eq!(
            codec.encode(b"123456789"),
            Err(CodecError::InputTooLarge { length: 9, max: 8 })
        );
    }

    #[test]
    fn decode_stops_at_declared_length() {
        let text = b"abc&x22;def";
        assert_eq!(codec().decode(text, 3).unwrap(), b"abc");
        assert_eq!(codec().decode(text, 8).unwrap(), b"abc\"");
    }

    #[test]
    fn entity_cut_by_declared_length() {
        let text = b"abc&x22;";
        assert!(matches!(
            codec().decode(text, 6),
            Err(CodecError::MalformedEncoding { offset: 3, .. })
        ));
    }

    #[test]
    fn declared_length_past_input() {
        assert!(matches!(
            codec().decode(b"abc", 4),
            Err(CodecError::MalformedEncoding { .. })
        ));
    }

    #[test]
    fn bare_ampersand_fails() {
        assert!(matches!(
            decode_all("fish & chips"),
            Err(CodecError::MalformedEncoding { offset: 5, .. })
        ));
        assert!(matches!(
            decode_all("&"),
            Err(CodecError::MalformedEncoding { offset: 0, .. })
        ));
    }

    #[test]
    fn bad_entity_fails() {
        assert!(matches!(
            decode_all("&xZZ;"),
            Err(CodecError::MalformedEncoding { offset: 0, .. })
        ));
        assert!(matches!(
            decode_all("&y41;"),
            Err(CodecError::MalformedEncoding { .. })
        ));
        assert!(matches!(
            decode_all("&x41:"),
            Err(CodecError::MalformedEncoding { .. })
        ));
        assert!(matches!(
            decode_all("&x4A;"),
            Err(CodecError::MalformedEncoding { .. })
        ));
    }

    #[test]
    fn raw_bytes_copy_through() {
        assert_eq!(decode_all("café").unwrap(), "café".as_bytes());
    }

    #[test]
    fn predicted_length() {
        assert_eq!(decoded_len(13, 2), Some(5));
        assert_eq!(decoded_len(3, 1), None);
    }
}
