//! rowfs JSON layer: rows as text, text back to trees, trees to updates.
//!
//! - [`JsonSerializer`]: renders a row (primary key plus ordered columns)
//!   as JSON-like text, every name and value entity-encoded.
//! - [`JsonParser`]: reads a client payload in the same format into a
//!   [`Tree`], with an explicit nesting stack bounded by
//!   [`Limits::max_depth`].
//! - [`UpdateForger`]: turns a tree into the `SET` assignments of an
//!   UPDATE statement.
//! - [`RowContent`]: the bytes a row exposes as a file, raw or as text.
//!
//! Nothing here touches a database. Callers fetch rows and run updates.
//!
//! # Example
//!
//! ```rust
//! use rowfs_json::{Column, JsonParser, JsonSerializer, UpdateForger};
//!
//! let text = JsonSerializer::default()
//!     .serialize(b"42", &[Column::new("name", "Alice"), Column::null("note")])
//!     .unwrap();
//!
//! let edited = text.replace("Alice", "Bob");
//! let tree = JsonParser::default().parse_str(&edited).unwrap();
//! let (key, _) = tree.wrapper().unwrap();
//! assert_eq!(key, "42");
//!
//! let set = UpdateForger::default().forge(&tree).unwrap();
//! assert_eq!(set, "`name`='Bob'");
//! ```

mod content;
mod error;
mod forge;
mod parse;
mod serialize;
mod tree;

pub use content::{RenderMode, RowContent, NULL_LINK_TARGET};
pub use error::{Error, ErrorKind};
pub use forge::UpdateForger;
pub use parse::JsonParser;
pub use serialize::JsonSerializer;
pub use tree::{Column, Node, NodeValue, Tree};

// Re-export codec types for convenience
pub use rowfs_codec::{ByteString, CodecError, Limits};
