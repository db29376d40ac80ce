//! Error types for rendering, parsing and forging.

use rowfs_codec::CodecError;

/// Coarse failure class, for collaborators that map failures onto their
/// own error surface (an errno, an HTTP status) without matching every
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AllocationFailure,
    InputTooLarge,
    MalformedEncoding,
    UnbalancedStructure,
    UnexpectedToken,
    SizeMismatch,
    TooDeep,
    /// Empty or otherwise unusable input that is not a structural error.
    InvalidInput,
}

/// Errors from the JSON-like layer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },

    #[error("{length} bytes exceeds the {max} byte limit")]
    InputTooLarge { length: usize, max: usize },

    /// Brace nesting went negative, or input ended with objects still open.
    #[error("unbalanced braces at offset {offset} (depth {depth})")]
    UnbalancedStructure { offset: usize, depth: usize },

    #[error("unexpected {} at offset {offset}", describe_byte(.byte))]
    UnexpectedToken { offset: usize, byte: u8 },

    #[error("unterminated quoted token starting at offset {offset}")]
    UnterminatedQuote { offset: usize },

    /// A computed length disagrees with the length actually produced.
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("objects nested deeper than {max} levels")]
    TooDeep { max: usize },

    #[error("empty input")]
    EmptyInput,

    #[error("tree has no scalar fields to update")]
    NothingToUpdate,

    #[error("row has no columns")]
    EmptyRow,
}

impl Error {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Codec(CodecError::AllocationFailure { .. }) | Error::AllocationFailure { .. } => {
                ErrorKind::AllocationFailure
            }
            Error::Codec(CodecError::InputTooLarge { .. }) | Error::InputTooLarge { .. } => {
                ErrorKind::InputTooLarge
            }
            Error::Codec(CodecError::MalformedEncoding { .. })
            | Error::Codec(CodecError::NonCanonical)
            | Error::UnterminatedQuote { .. } => ErrorKind::MalformedEncoding,
            Error::UnbalancedStructure { .. } => ErrorKind::UnbalancedStructure,
            Error::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            Error::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            Error::TooDeep { .. } => ErrorKind::TooDeep,
            Error::Codec(CodecError::EmptyInput)
            | Error::EmptyInput
            | Error::NothingToUpdate
            | Error::EmptyRow => ErrorKind::InvalidInput,
        }
    }
}

fn describe_byte(b: &u8) -> String {
    let b = *b;
    if b.is_ascii_graphic() {
        format!("'{}'", b as char)
    } else {
        format!("byte 0x{:02x}", b)
    }
}
