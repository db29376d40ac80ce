//! Rendering rows (and whole trees) as JSON-like text.
//!
//! Output is sized exactly before it is written: every literal and every
//! encoded fragment is collected and measured first, one buffer of that
//! size is reserved, and the written length is checked against it.

use rowfs_codec::{Limits, TextCodec};

use crate::tree::{Column, NodeValue, Tree};
use crate::Error;

const OPEN: &str = "{\n";
const CLOSE: &str = "}";
const NESTED_CLOSE: &str = "\t}";
const NEWLINE: &str = "\n";
const PRE_NAME: &str = "\t\"";
const MID_QUOTED: &str = "\": \"";
const MID_BARE: &str = "\": ";
const POST_QUOTED: &str = "\",\n";
const POST_BARE: &str = ",\n";
const NULL: &str = "null";

/// A measured piece of output.
enum Piece {
    Lit(&'static str),
    Enc(String),
}

impl Piece {
    fn as_str(&self) -> &str {
        match self {
            Piece::Lit(s) => s,
            Piece::Enc(s) => s,
        }
    }
}

/// Output pieces plus their running total, checked against the ceiling as
/// they are added.
struct Pieces {
    pieces: Vec<Piece>,
    total: usize,
    max: usize,
}

impl Pieces {
    fn new(max: usize) -> Self {
        Pieces {
            pieces: Vec::new(),
            total: 0,
            max,
        }
    }

    fn push(&mut self, piece: Piece) -> Result<(), Error> {
        self.total = self.total.saturating_add(piece.as_str().len());
        if self.total > self.max {
            log::debug!(
                "rendered text would exceed {} bytes, abandoning",
                self.max
            );
            return Err(Error::InputTooLarge {
                length: self.total,
                max: self.max,
            });
        }
        self.pieces.push(piece);
        Ok(())
    }

    fn lit(&mut self, s: &'static str) -> Result<(), Error> {
        self.push(Piece::Lit(s))
    }

    fn assemble(self) -> Result<String, Error> {
        let mut out = String::new();
        out.try_reserve_exact(self.total)
            .map_err(|_| Error::AllocationFailure {
                requested: self.total,
            })?;
        for piece in &self.pieces {
            out.push_str(piece.as_str());
        }
        if out.len() != self.total {
            return Err(Error::SizeMismatch {
                expected: self.total,
                actual: out.len(),
            });
        }
        log::trace!("rendered {} bytes of text", out.len());
        Ok(out)
    }
}

/// Renders rows in the JSON-like format the payload parser reads back.
///
/// ```rust
/// use rowfs_json::{Column, JsonSerializer};
///
/// let text = JsonSerializer::default()
///     .serialize(b"42", &[Column::new("name", "Alice"), Column::null("note")])
///     .unwrap();
/// assert_eq!(
///     text,
///     "{\n\t\"42\": {\n\t\"name\": \"Alice\",\n\t\"note\": null,\n\t}\n}"
/// );
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer {
    codec: TextCodec,
    limits: Limits,
}

impl JsonSerializer {
    pub fn new(limits: Limits) -> Self {
        JsonSerializer {
            codec: TextCodec::new(limits),
            limits,
        }
    }

    /// Render one row: the primary key wraps one line per column, in order.
    ///
    /// Present values are quoted; SQL NULL is the bare token `null`.
    pub fn serialize(&self, key: &[u8], columns: &[Column]) -> Result<String, Error> {
        let mut out = Pieces::new(self.limits.string_ceiling());

        out.lit(OPEN)?;
        out.lit(PRE_NAME)?;
        out.push(Piece::Enc(self.codec.encode(key)?))?;
        out.lit(MID_BARE)?;
        out.lit(OPEN)?;
        for column in columns {
            out.lit(PRE_NAME)?;
            out.push(Piece::Enc(self.codec.encode(&column.name)?))?;
            match &column.value {
                Some(value) => {
                    out.lit(MID_QUOTED)?;
                    out.push(Piece::Enc(self.codec.encode(value)?))?;
                    out.lit(POST_QUOTED)?;
                }
                None => {
                    out.lit(MID_BARE)?;
                    out.lit(NULL)?;
                    out.lit(POST_BARE)?;
                }
            }
        }
        out.lit(NESTED_CLOSE)?;
        out.lit(NEWLINE)?;
        out.lit(CLOSE)?;

        out.assemble()
    }

    /// Render an arbitrary tree in the same layout.
    ///
    /// Leaves end in `,` and nested objects do not, so a tree built with
    /// [`Tree::from_row`] renders exactly as [`JsonSerializer::serialize`]
    /// renders the same non-empty row. Nameless nodes are written with an
    /// empty name, and a `Child` holding an empty tree is written as `{}`,
    /// which parses back as `Null`.
    pub fn serialize_tree(&self, tree: &Tree) -> Result<String, Error> {
        let mut out = Pieces::new(self.limits.string_ceiling());

        out.lit(OPEN)?;
        let mut stack = vec![tree.iter()];
        while let Some(level) = stack.last_mut() {
            let Some(node) = level.next() else {
                stack.pop();
                if stack.is_empty() {
                    out.lit(CLOSE)?;
                } else {
                    out.lit(NESTED_CLOSE)?;
                    out.lit(NEWLINE)?;
                }
                continue;
            };

            out.lit(PRE_NAME)?;
            let name = node.name.as_deref().unwrap_or_default();
            out.push(Piece::Enc(self.codec.encode(name)?))?;
            match &node.value {
                NodeValue::Scalar(value) => {
                    out.lit(MID_QUOTED)?;
                    out.push(Piece::Enc(self.codec.encode(value)?))?;
                    out.lit(POST_QUOTED)?;
                }
                NodeValue::Null => {
                    out.lit(MID_BARE)?;
                    out.lit(NULL)?;
                    out.lit(POST_BARE)?;
                }
                NodeValue::Child(child) => {
                    out.lit(MID_BARE)?;
                    out.lit(OPEN)?;
                    stack.push(child.iter());
                }
            }
        }

        out.assemble()
    }
}
