//! What a row looks like as file content.

use rowfs_codec::{ByteString, Limits};
use serde::{Deserialize, Serialize};

use crate::serialize::JsonSerializer;
use crate::tree::Column;
use crate::Error;

/// Where SQL NULL points when a row is exposed as a symbolic link.
pub const NULL_LINK_TARGET: &str = "/dev/null";

/// How a row is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// The bytes of the first fetched column, unchanged.
    #[default]
    Raw,
    /// The whole row as JSON-like text.
    Json,
}

/// The content served for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowContent {
    Raw(ByteString),
    /// The value is SQL NULL; shown as a link to [`NULL_LINK_TARGET`].
    NullLink,
    Json(String),
}

impl RowContent {
    pub fn render(
        mode: RenderMode,
        key: &[u8],
        columns: &[Column],
        limits: Limits,
    ) -> Result<Self, Error> {
        match mode {
            RenderMode::Raw => {
                let first = columns.first().ok_or(Error::EmptyRow)?;
                Ok(match &first.value {
                    Some(value) => RowContent::Raw(value.clone()),
                    None => RowContent::NullLink,
                })
            }
            RenderMode::Json => JsonSerializer::new(limits)
                .serialize(key, columns)
                .map(RowContent::Json),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RowContent::Raw(bytes) => bytes.as_bytes(),
            RowContent::NullLink => NULL_LINK_TARGET.as_bytes(),
            RowContent::Json(text) => text.as_bytes(),
        }
    }

    /// Size to report for the row. A null link reports its target's length.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_link(&self) -> bool {
        matches!(self, RowContent::NullLink)
    }

    /// Up to `size` bytes starting at `offset`, clipped to the end.
    pub fn read_at(&self, offset: usize, size: usize) -> &[u8] {
        let bytes = self.as_bytes();
        let Some(rest) = bytes.get(offset..) else {
            return &[];
        };
        &rest[..size.min(rest.len())]
    }
}
