//! Forging the `SET` clause of an UPDATE statement from a parsed payload.
//!
//! Only the assignment list is produced, e.g.
//!
//! ```text
//! `name`='Alice', `city`='O\'Fallon'
//! ```
//!
//! Embedding it in a statement and running it is up to the caller.

use rowfs_codec::{ByteString, Limits};

use crate::tree::{NodeValue, Tree};
use crate::Error;

const SEPARATOR: &[u8] = b", ";
const ASSIGN: &[u8] = b"`='";

/// MySQL string-literal escape for `b`, if it needs one.
fn value_escape(b: u8) -> Option<&'static [u8]> {
    match b {
        0 => Some(b"\\0"),
        b'\n' => Some(b"\\n"),
        b'\r' => Some(b"\\r"),
        b'\\' => Some(b"\\\\"),
        b'\'' => Some(b"\\'"),
        b'"' => Some(b"\\\""),
        0x1a => Some(b"\\Z"),
        _ => None,
    }
}

/// Append-only buffer that refuses to grow past `max`.
struct Fragment {
    buf: Vec<u8>,
    max: usize,
}

impl Fragment {
    fn new(max: usize) -> Self {
        Fragment {
            buf: Vec::new(),
            max,
        }
    }

    fn append(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let length = self
            .buf
            .len()
            .checked_add(bytes.len())
            .ok_or(Error::InputTooLarge {
                length: usize::MAX,
                max: self.max,
            })?;
        if length > self.max {
            return Err(Error::InputTooLarge {
                length,
                max: self.max,
            });
        }
        self.buf
            .try_reserve(bytes.len())
            .map_err(|_| Error::AllocationFailure { requested: length })?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Append `raw`, replacing bytes that `escape` maps.
    fn append_escaped(
        &mut self,
        raw: &[u8],
        escape: impl Fn(u8) -> Option<&'static [u8]>,
    ) -> Result<(), Error> {
        let mut start = 0;
        for (i, &b) in raw.iter().enumerate() {
            if let Some(replacement) = escape(b) {
                self.append(&raw[start..i])?;
                self.append(replacement)?;
                start = i + 1;
            }
        }
        self.append(&raw[start..])
    }
}

/// Builds `SET` assignments from a tree.
///
/// Every scalar leaf becomes `` `name`='value' ``. Nested objects are
/// flattened: their leaves are assigned under their own names, not
/// qualified by the parent's, so a wrapped row payload
/// `{"42": {"name": "Alice"}}` forges to `` `name`='Alice' ``. `Null`
/// nodes are left out.
///
/// Escaping is byte-wise and does not know the connection charset. The
/// fragment is only safe to execute over a connection whose charset keeps
/// `\` and `'` as standalone bytes (utf8mb4, latin1, binary). Under GBK,
/// Big5 or SJIS a lead byte such as `0xbf` swallows the inserted backslash
/// and leaves the quote unescaped.
///
/// ```rust
/// use rowfs_json::{JsonParser, UpdateForger};
///
/// let tree = JsonParser::default()
///     .parse_str(r#"{"42": {"name": "O&x27;Brien", "note": null}}"#)
///     .unwrap();
/// let set = UpdateForger::default().forge(&tree).unwrap();
/// assert_eq!(set, r"`name`='O\'Brien'");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateForger {
    limits: Limits,
}

impl UpdateForger {
    pub fn new(limits: Limits) -> Self {
        UpdateForger { limits }
    }

    pub fn forge(&self, tree: &Tree) -> Result<ByteString, Error> {
        let mut out = Fragment::new(self.limits.update_ceiling());
        let mut clauses = 0usize;

        let mut stack = vec![tree.iter()];
        while let Some(level) = stack.last_mut() {
            let Some(node) = level.next() else {
                stack.pop();
                continue;
            };
            let value = match &node.value {
                NodeValue::Scalar(value) => value,
                NodeValue::Child(child) => {
                    stack.push(child.iter());
                    continue;
                }
                NodeValue::Null => continue,
            };

            if clauses > 0 {
                out.append(SEPARATOR)?;
            }
            let name = node.name.as_deref().unwrap_or_default();
            out.append(b"`")?;
            out.append_escaped(name, |b| (b == b'`').then_some(&b"``"[..]))?;
            out.append(ASSIGN)?;
            out.append_escaped(value, value_escape)?;
            out.append(b"'")?;
            clauses += 1;
        }

        if clauses == 0 {
            log::debug!("update payload carried no scalar fields");
            return Err(Error::NothingToUpdate);
        }
        log::trace!("forged {} assignments in {} bytes", clauses, out.buf.len());
        Ok(ByteString::from(out.buf))
    }
}
