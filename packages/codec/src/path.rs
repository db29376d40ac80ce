//! Percent-encoding of primary keys into directory entry names.

use crate::hex;
use crate::{ByteString, CodecError, Limits};

/// Escape introducer for path names.
pub const ESCAPE: u8 = b'%';

/// Bytes written per escaped input byte (`%` plus two digits).
const ESCAPED_WIDTH: usize = 3;

/// Check if a byte passes through path encoding unchanged.
///
/// The class is `[A-Za-z0-9\-_.:]`, chosen without regard to locale.
pub fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':')
}

/// Reversible mapping between arbitrary key bytes and a filesystem-safe name.
///
/// # Examples
///
/// ```rust
/// use rowfs_codec::PathCodec;
///
/// let codec = PathCodec::default();
/// let name = codec.encode(b"cron last\0").unwrap();
/// assert_eq!(name, "cron%20last%00");
/// assert_eq!(codec.decode(&name).unwrap(), b"cron last\0");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PathCodec {
    limits: Limits,
}

impl PathCodec {
    pub fn new(limits: Limits) -> Self {
        PathCodec { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Exact length `encode` would produce for `key`.
    ///
    /// Fails on empty keys and on keys whose encoding would cross the
    /// configured ceiling.
    pub fn encoded_len(&self, key: &[u8]) -> Result<usize, CodecError> {
        let max = self.limits.string_ceiling();
        if key.is_empty() {
            return Err(CodecError::EmptyInput);
        }
        if key.len() > max {
            return Err(CodecError::InputTooLarge {
                length: key.len(),
                max,
            });
        }

        let escaped = key.iter().filter(|&&b| !is_name_byte(b)).count();
        // 3x a key at the ceiling does not fit a 32-bit usize.
        let len = escaped
            .checked_mul(ESCAPED_WIDTH - 1)
            .and_then(|extra| extra.checked_add(key.len()))
            .ok_or(CodecError::InputTooLarge {
                length: key.len(),
                max,
            })?;
        if len > max {
            return Err(CodecError::InputTooLarge { length: len, max });
        }
        Ok(len)
    }

    /// Encode key bytes as a directory entry name.
    pub fn encode(&self, key: &[u8]) -> Result<String, CodecError> {
        let len = self.encoded_len(key).inspect_err(|e| {
            log::debug!("path encode rejected {} byte key: {}", key.len(), e);
        })?;

        let mut out = hex::with_exact_capacity(len)?;
        for &b in key {
            if is_name_byte(b) {
                out.push(b as char);
            } else {
                out.push(ESCAPE as char);
                hex::push_pair(&mut out, b);
            }
        }
        debug_assert_eq!(out.len(), len);
        Ok(out)
    }

    /// Decode a directory entry name back into key bytes.
    ///
    /// `%` must be followed by two lowercase hex digits. Bytes outside the
    /// name class are copied through unchanged, so several names may decode
    /// to the same key; use [`PathCodec::decode_canonical`] where that
    /// matters.
    pub fn decode(&self, name: impl AsRef<[u8]>) -> Result<ByteString, CodecError> {
        let name = name.as_ref();
        let max = self.limits.string_ceiling();
        if name.is_empty() {
            return Err(CodecError::EmptyInput);
        }
        if name.len() > max {
            return Err(CodecError::InputTooLarge {
                length: name.len(),
                max,
            });
        }

        let mut out = hex::bytes_with_exact_capacity(name.len())?;
        let mut i = 0;
        while i < name.len() {
            let b = name[i];
            if b != ESCAPE {
                out.push(b);
                i += 1;
                continue;
            }

            if i + ESCAPED_WIDTH > name.len() {
                log::debug!("path decode: truncated escape at offset {}", i);
                return Err(CodecError::malformed(i, "truncated escape"));
            }
            let byte = hex::pair(name[i + 1], name[i + 2]).ok_or_else(|| {
                log::debug!("path decode: bad hex digits at offset {}", i);
                CodecError::malformed(i, "escape is not two lowercase hex digits")
            })?;
            out.push(byte);
            i += ESCAPED_WIDTH;
        }

        Ok(ByteString::from(out))
    }

    /// Decode a name and require it to be exactly what `encode` produces.
    ///
    /// Rejects alternate spellings such as `cro%6e_last` for `cron_last`,
    /// for collaborators that key access rules on the name.
    pub fn decode_canonical(&self, name: impl AsRef<[u8]>) -> Result<ByteString, CodecError> {
        let name = name.as_ref();
        let key = self.decode(name)?;
        let reencoded = self.encode(&key)?;
        if reencoded.as_bytes() != name {
            log::debug!("path decode: non-canonical name of {} bytes", name.len());
            return Err(CodecError::NonCanonical);
        }
        Ok(key)
    }

    /// Decode the key from an absolute filesystem path such as `/abc%20d`.
    ///
    /// One leading `/` is stripped. The root itself names no key, and a
    /// further separator would point into a subdirectory, which does not
    /// exist in a flat table listing.
    pub fn decode_path(&self, path: impl AsRef<[u8]>) -> Result<ByteString, CodecError> {
        let path = path.as_ref();
        let name = path.strip_prefix(b"/").unwrap_or(path);
        if let Some(pos) = name.iter().position(|&b| b == b'/') {
            let offset = pos + (path.len() - name.len());
            return Err(CodecError::malformed(offset, "path separator inside name"));
        }
        self.decode(name)
    }
}
