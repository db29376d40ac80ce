//! rowfs: database rows exposed as files.
//!
//! Each row of a table is a directory entry named by its primary key and
//! holds either the raw bytes of one column or the whole row as JSON-like
//! text. Writing the text back turns into an UPDATE. This crate is the
//! pure core of that mapping; fetching rows and running statements is
//! left to the caller.
//!
//! The layers are re-exported here:
//!
//! - [`codec`]: [`PathCodec`] and [`TextCodec`], the reversible byte
//!   encodings for entry names and quoted text.
//! - [`json`]: [`JsonSerializer`], [`JsonParser`], [`UpdateForger`] and
//!   [`RowContent`].
//!
//! # Example
//!
//! ```rust
//! use rowfs::{Column, JsonParser, Limits, PathCodec, RenderMode, RowContent, UpdateForger};
//!
//! // Listing: the key becomes a safe entry name.
//! let name = PathCodec::default().encode(b"a/b").unwrap();
//! assert_eq!(name, "a%2fb");
//!
//! // Reading: the entry name maps back to the key, the row to text.
//! let key = PathCodec::default().decode(&name).unwrap();
//! let row = [Column::new("title", "Dune")];
//! let content = RowContent::render(RenderMode::Json, &key, &row, Limits::default()).unwrap();
//!
//! // Writing: edited text becomes SET assignments.
//! let edited = String::from_utf8(content.as_bytes().to_vec()).unwrap().replace("Dune", "Emma");
//! let tree = JsonParser::default().parse_str(&edited).unwrap();
//! assert_eq!(UpdateForger::default().forge(&tree).unwrap(), "`title`='Emma'");
//! ```

pub use rowfs_codec as codec;
pub use rowfs_json as json;

pub use rowfs_codec::{
    ByteString, Bytes, CodecError, Limits, PathCodec, TextCodec, DEFAULT_MAX_DEPTH,
    MAX_STRING_LENGTH,
};
pub use rowfs_json::{
    Column, Error, ErrorKind, JsonParser, JsonSerializer, Node, NodeValue, RenderMode,
    RowContent, Tree, UpdateForger, NULL_LINK_TARGET,
};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A key survives listing, reading and writing back
        #[test]
        fn prop_key_survives_every_layer(
            key in proptest::collection::vec(any::<u8>(), 1..64),
            value in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let name = PathCodec::default().encode(&key).unwrap();
            let decoded = PathCodec::default().decode(&name).unwrap();
            prop_assert_eq!(decoded.as_bytes(), &key[..]);

            let row = [Column::new("v", value.clone())];
            let text = JsonSerializer::default().serialize(&decoded, &row).unwrap();
            let tree = JsonParser::default().parse_str(&text).unwrap();
            let (addressed, columns) = tree.wrapper().unwrap();
            prop_assert_eq!(addressed.as_bytes(), &key[..]);
            let stored = columns.unwrap().get(b"v").unwrap().as_scalar().unwrap();
            prop_assert_eq!(stored.as_bytes(), &value[..]);
        }
    }
}
