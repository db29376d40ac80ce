//! rowfs codec layer: reversible byte encodings for keys and values.
//!
//! Database keys and values are arbitrary bytes (NUL included). This crate
//! makes them representable in two places that cannot carry raw bytes:
//!
//! - [`PathCodec`]: percent-encoding into directory entry names,
//!   `[A-Za-z0-9\-_.:]` plus `%##` escapes.
//! - [`TextCodec`]: entity-encoding into quote-safe text, `[A-Za-z0-9\-_.: ]`
//!   plus `&x##;` escapes.
//!
//! Both codecs size their output exactly before writing, reject inputs
//! past [`Limits::max_string_len`], and decode only the lowercase escapes
//! they produce.
//!
//! # Example
//!
//! ```rust
//! use rowfs_codec::{PathCodec, TextCodec};
//!
//! let key = b"user\0one";
//! let name = PathCodec::default().encode(key).unwrap();
//! assert_eq!(name, "user%00one");
//!
//! let text = TextCodec::default().encode(b"a \"quoted\" value").unwrap();
//! assert!(!text.contains('"'));
//! ```

mod bytestring;
mod error;
mod hex;
mod limits;
pub mod path;
pub mod text;

pub use bytestring::ByteString;
pub use error::CodecError;
pub use limits::{Limits, DEFAULT_MAX_DEPTH, MAX_STRING_LENGTH};
pub use path::PathCodec;
pub use text::TextCodec;

// Re-export for callers that want zero-copy conversions
pub use bytes::Bytes;
