//! Error types for the codec layer.

/// Errors produced while encoding or decoding keys and values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input was empty where a non-empty value is required.
    #[error("empty input")]
    EmptyInput,

    /// Input (or the buffer it would expand to) exceeds the configured ceiling.
    #[error("input of {length} bytes exceeds the {max} byte limit")]
    InputTooLarge { length: usize, max: usize },

    /// An escape sequence is truncated, mistyped, or outside the declared span.
    #[error("malformed encoding at offset {offset}: {reason}")]
    MalformedEncoding { offset: usize, reason: &'static str },

    /// The name decodes, but is not the codec's own spelling of those bytes.
    #[error("name is not in canonical encoded form")]
    NonCanonical,

    /// An output buffer could not be reserved.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },
}

impl CodecError {
    pub(crate) fn malformed(offset: usize, reason: &'static str) -> Self {
        CodecError::MalformedEncoding { offset, reason }
    }
}
