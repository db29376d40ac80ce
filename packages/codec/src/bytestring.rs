//! Explicit-length owned byte buffers.

use std::fmt;
use std::ops::Deref;

use bytes::Bytes;

/// An owned byte sequence whose length is carried explicitly.
///
/// Database values can contain any byte, including NUL, so nothing here
/// relies on a terminator. Cloning is cheap (reference-counted).
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteString(Bytes);

impl ByteString {
    /// Create an empty byte string.
    pub fn new() -> Self {
        ByteString(Bytes::new())
    }

    /// Copy a slice into a new byte string.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        ByteString(Bytes::copy_from_slice(data))
    }

    /// Wrap a static slice without copying.
    pub const fn from_static(data: &'static [u8]) -> Self {
        ByteString(Bytes::from_static(data))
    }

    /// Number of meaningful bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the contents as UTF-8, if they are.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Consume into the underlying `Bytes`.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl Deref for ByteString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(v: Vec<u8>) -> Self {
        ByteString(Bytes::from(v))
    }
}

impl From<Bytes> for ByteString {
    fn from(b: Bytes) -> Self {
        ByteString(b)
    }
}

impl From<&[u8]> for ByteString {
    fn from(s: &[u8]) -> Self {
        ByteString::copy_from_slice(s)
    }
}

impl<const N: usize> From<&[u8; N]> for ByteString {
    fn from(s: &[u8; N]) -> Self {
        ByteString::copy_from_slice(s)
    }
}

impl From<&str> for ByteString {
    fn from(s: &str) -> Self {
        ByteString::copy_from_slice(s.as_bytes())
    }
}

impl From<String> for ByteString {
    fn from(s: String) -> Self {
        ByteString(Bytes::from(s))
    }
}

impl PartialEq<[u8]> for ByteString {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl PartialEq<&[u8]> for ByteString {
    fn eq(&self, other: &&[u8]) -> bool {
        self.0 == *other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for ByteString {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.0 == other[..]
    }
}

impl<const N: usize> PartialEq<[u8; N]> for ByteString {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.0 == other[..]
    }
}

impl PartialEq<str> for ByteString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for ByteString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bytes renders as b"..." with escapes, which keeps NULs visible.
        fmt::Debug::fmt(&self.0, f)
    }
}
