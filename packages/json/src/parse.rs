//! Parsing client payloads in the JSON-like format back into a tree.
//!
//! The grammar is deliberately small:
//!
//! ```text
//! object = '{' ( name value )* '}'
//! name   = quoted
//! value  = quoted | object | 'null'
//! quoted = '"' entity-encoded text '"'
//! ```
//!
//! Whitespace, `,` and `:` carry no meaning outside quotes. There are no
//! arrays, numbers or booleans. Quoted text never contains a raw `"`
//! (the text codec escapes it), so a token ends at the first `"` that is
//! not inside an `&x##;` entity.
//!
//! Nesting is tracked with an explicit stack of frames rather than native
//! recursion, and bounded by [`Limits::max_depth`].

use rowfs_codec::{text, ByteString, CodecError, Limits, TextCodec};

use crate::tree::{Node, NodeValue, Tree};
use crate::Error;

/// What the innermost open object accepts next.
///
/// Quoted tokens are consumed whole by `Scanner::quoted`, and nested
/// objects are frames on the stack, so neither needs a state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// A name or the closing brace.
    ExpectingNameOrClose,
    /// A name was read; a quoted value, an object or `null` comes next.
    ExpectingValue,
}

/// One open object.
struct Frame {
    /// Name this object is the value of; `None` for the top level.
    name: Option<ByteString>,
    nodes: Vec<Node>,
    /// A name read but not yet given a value.
    pending: Option<ByteString>,
}

impl Frame {
    fn new(name: Option<ByteString>) -> Self {
        Frame {
            name,
            nodes: Vec::new(),
            pending: None,
        }
    }

    fn state(&self) -> State {
        if self.pending.is_some() {
            State::ExpectingValue
        } else {
            State::ExpectingNameOrClose
        }
    }

    /// Close the object: a dangling name becomes a `Null` node.
    fn finish(mut self) -> (Option<ByteString>, Tree) {
        if let Some(name) = self.pending.take() {
            self.nodes.push(Node::null(name));
        }
        (self.name, self.nodes.into_iter().collect())
    }
}

/// Parses payload bytes into a [`Tree`].
///
/// ```rust
/// use rowfs_json::JsonParser;
///
/// let tree = JsonParser::default().parse_str(r#"{"a": {"b": "2"}}"#).unwrap();
/// let a = tree.get(b"a").unwrap().as_child().unwrap();
/// assert_eq!(a.get(b"b").unwrap().as_scalar().unwrap(), "2");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonParser {
    codec: TextCodec,
    limits: Limits,
}

impl JsonParser {
    pub fn new(limits: Limits) -> Self {
        JsonParser {
            codec: TextCodec::new(limits),
            limits,
        }
    }

    /// Parse the first `declared_len` bytes of `buf`.
    ///
    /// On failure nothing built so far survives: every partial frame is
    /// dropped before the error is returned.
    pub fn parse(&self, buf: &[u8], declared_len: usize) -> Result<Tree, Error> {
        let max = self.limits.string_ceiling();
        if declared_len > max {
            return Err(Error::InputTooLarge {
                length: declared_len,
                max,
            });
        }
        let input = buf.get(..declared_len).ok_or(Error::SizeMismatch {
            expected: declared_len,
            actual: buf.len(),
        })?;

        let result = Scanner::new(input, &self.codec, self.limits.max_depth).run();
        match &result {
            Ok(tree) => log::trace!("parsed payload into {} top-level nodes", tree.len()),
            Err(e) => log::debug!("rejected {} byte payload: {}", input.len(), e),
        }
        result
    }

    /// Parse a whole string.
    pub fn parse_str(&self, text: &str) -> Result<Tree, Error> {
        self.parse(text.as_bytes(), text.len())
    }
}

struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    codec: &'a TextCodec,
    max_depth: usize,
    stack: Vec<Frame>,
    root: Option<Tree>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8], codec: &'a TextCodec, max_depth: usize) -> Self {
        Scanner {
            input,
            pos: 0,
            codec,
            max_depth,
            stack: Vec::new(),
            root: None,
        }
    }

    fn run(mut self) -> Result<Tree, Error> {
        while self.pos < self.input.len() {
            let b = self.input[self.pos];

            if self.root.is_some() {
                self.trailing(b)?;
                continue;
            }

            match b {
                b' ' | b'\t' | b'\r' | b'\n' | b',' | b':' => self.pos += 1,
                b'{' => self.open()?,
                b'}' => self.close()?,
                b'"' => {
                    let open = self.pos;
                    let token = self.quoted()?;
                    self.accept(token, open)?;
                }
                b'n' if self.state() == Some(State::ExpectingValue) => self.null()?,
                _ => return Err(self.unexpected()),
            }
        }

        if !self.stack.is_empty() {
            return Err(Error::UnbalancedStructure {
                offset: self.input.len(),
                depth: self.stack.len(),
            });
        }
        self.root.take().ok_or(Error::EmptyInput)
    }

    fn state(&self) -> Option<State> {
        self.stack.last().map(Frame::state)
    }

    fn unexpected(&self) -> Error {
        Error::UnexpectedToken {
            offset: self.pos,
            byte: self.input[self.pos],
        }
    }

    /// After the top-level object closes only whitespace may follow.
    fn trailing(&mut self, b: u8) -> Result<(), Error> {
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                self.pos += 1;
                Ok(())
            }
            b'}' => Err(Error::UnbalancedStructure {
                offset: self.pos,
                depth: 0,
            }),
            _ => Err(self.unexpected()),
        }
    }

    fn open(&mut self) -> Result<(), Error> {
        let nested = !self.stack.is_empty();
        let name = self.stack.last_mut().and_then(|frame| frame.pending.take());
        if nested && name.is_none() {
            // An object where a name belongs.
            return Err(self.unexpected());
        }

        if self.stack.len() >= self.max_depth {
            return Err(Error::TooDeep {
                max: self.max_depth,
            });
        }
        self.stack.push(Frame::new(name));
        self.pos += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        let Some(frame) = self.stack.pop() else {
            return Err(Error::UnbalancedStructure {
                offset: self.pos,
                depth: 0,
            });
        };
        self.pos += 1;

        let (name, tree) = frame.finish();
        let Some(parent) = self.stack.last_mut() else {
            self.root = Some(tree);
            return Ok(());
        };
        let value = if tree.is_empty() {
            NodeValue::Null
        } else {
            NodeValue::Child(tree)
        };
        parent.nodes.push(Node { name, value });
        Ok(())
    }

    /// A quoted token becomes the pending name, or the value of one.
    fn accept(&mut self, token: ByteString, open: usize) -> Result<(), Error> {
        let Some(frame) = self.stack.last_mut() else {
            // A string before the first '{'.
            return Err(Error::UnexpectedToken {
                offset: open,
                byte: b'"',
            });
        };
        match frame.pending.take() {
            Some(name) => frame.nodes.push(Node::scalar(name, token)),
            None => frame.pending = Some(token),
        }
        Ok(())
    }

    fn null(&mut self) -> Result<(), Error> {
        const NULL: &[u8] = b"null";
        if !self.input[self.pos..].starts_with(NULL) {
            return Err(self.unexpected());
        }
        if let Some(frame) = self.stack.last_mut() {
            if let Some(name) = frame.pending.take() {
                frame.nodes.push(Node::null(name));
            }
        }
        self.pos += NULL.len();
        Ok(())
    }

    /// Read the quoted token at `pos` and decode it.
    fn quoted(&mut self) -> Result<ByteString, Error> {
        let open = self.pos;
        let start = open + 1;
        let mut i = start;
        let mut entities = 0usize;

        loop {
            match self.input.get(i) {
                None => return Err(Error::UnterminatedQuote { offset: open }),
                Some(b'"') => break,
                Some(b'&') => {
                    let entity = self
                        .input
                        .get(i..i + text::ENTITY_WIDTH)
                        .ok_or(CodecError::MalformedEncoding {
                            offset: i,
                            reason: "truncated entity",
                        })?;
                    if entity[1] != b'x' || entity[4] != b';' {
                        return Err(CodecError::MalformedEncoding {
                            offset: i,
                            reason: "entity is not of the form &x##;",
                        }
                        .into());
                    }
                    entities += 1;
                    i += text::ENTITY_WIDTH;
                }
                Some(_) => i += 1,
            }
        }

        let span = &self.input[start..i];
        let expected = text::decoded_len(span.len(), entities).ok_or(Error::SizeMismatch {
            expected: 0,
            actual: span.len(),
        })?;
        let decoded = self
            .codec
            .decode(span, span.len())
            .map_err(|e| rebase(e, start))?;
        if decoded.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: decoded.len(),
            });
        }

        self.pos = i + 1;
        Ok(decoded)
    }
}

/// Shift a codec error offset from token-relative to input-relative.
fn rebase(err: CodecError, base: usize) -> Error {
    match err {
        CodecError::MalformedEncoding { offset, reason } => CodecError::MalformedEncoding {
            offset: offset + base,
            reason,
        }
        .into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Tree, Error> {
        JsonParser::default().parse_str(text)
    }

    #[test]
    fn flat_object() {
        let tree = parse(r#"{"a": "1", "b": "2"}"#).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.nodes()[0], Node::scalar("a", "1"));
        assert_eq!(tree.nodes()[1], Node::scalar("b", "2"));
    }

    #[test]
    fn nested_object() {
        let tree = parse(r#"{"a": {"b": "2"}}"#).unwrap();
        assert_eq!(tree.len(), 1);
        let a = &tree.nodes()[0];
        assert_eq!(a.name.as_ref().unwrap(), "a");
        let child = a.as_child().unwrap();
        assert_eq!(child.len(), 1);
        assert_eq!(child.nodes()[0], Node::scalar("b", "2"));
    }

    #[test]
    fn null_and_empty_object_are_null() {
        let tree = parse(r#"{"a": null, "b": {}}"#).unwrap();
        assert!(tree.get(b"a").unwrap().is_null());
        assert!(tree.get(b"b").unwrap().is_null());
    }

    #[test]
    fn dangling_name_is_null() {
        let tree = parse(r#"{"a": "1", "b"}"#).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.get(b"b").unwrap().is_null());
    }

    #[test]
    fn empty_object() {
        assert!(parse("{}").unwrap().is_empty());
    }

    #[test]
    fn separators_are_insignificant() {
        let a = parse(r#"{"a" "1" "b" "2"}"#).unwrap();
        let b = parse("{\r\n\t\"a\"::,\"1\",,\n\"b\":\"2\",}").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn entities_decode_in_names_and_values() {
        let tree = parse(r#"{"a&x20;b": "&x22;q&x22;&x00;"}"#).unwrap();
        let node = &tree.nodes()[0];
        assert_eq!(node.name.as_ref().unwrap(), "a b");
        assert_eq!(node.as_scalar().unwrap(), b"\"q\"\0");
    }

    #[test]
    fn entity_is_not_a_terminator() {
        // "&x22;" is a quote character inside the token, not the end of it.
        let tree = parse(r#"{"k": "&x22;"}"#).unwrap();
        assert_eq!(tree.nodes()[0].as_scalar().unwrap(), b"\"");
    }

    #[test]
    fn declared_length_bounds_the_scan() {
        let text = br#"{"a": "1"} trailing garbage"#;
        let tree = JsonParser::default().parse(text, 10).unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn declared_length_past_buffer() {
        assert_eq!(
            JsonParser::default().parse(b"{}", 3),
            Err(Error::SizeMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn declared_length_over_limit() {
        let parser = JsonParser::new(Limits::default().with_max_string_len(4));
        assert!(matches!(
            parser.parse(b"{\"a\": \"1\"}", 10),
            Err(Error::InputTooLarge { length: 10, max: 4 })
        ));
    }

    #[test]
    fn missing_close_is_unbalanced() {
        assert_eq!(
            parse(r#"{"a": "1""#),
            Err(Error::UnbalancedStructure {
                offset: 9,
                depth: 1
            })
        );
    }

    #[test]
    fn missing_nested_close_is_unbalanced() {
        assert!(matches!(
            parse(r#"{"a": {"b": "1"}"#),
            Err(Error::UnbalancedStructure { depth: 1, .. })
        ));
        assert!(matches!(
            parse(r#"{"a": {"b": "1""#),
            Err(Error::UnbalancedStructure { depth: 2, .. })
        ));
    }

    #[test]
    fn extra_close_is_unbalanced() {
        assert!(matches!(
            parse("{}}"),
            Err(Error::UnbalancedStructure { offset: 2, depth: 0 })
        ));
        assert!(matches!(
            parse("}"),
            Err(Error::UnbalancedStructure { offset: 0, depth: 0 })
        ));
    }

    #[test]
    fn bare_word_is_unexpected() {
        assert_eq!(
            parse(r#"{"a": x}"#),
            Err(Error::UnexpectedToken {
                offset: 6,
                byte: b'x'
            })
        );
        assert!(matches!(
            parse(r#"{"a": nul}"#),
            Err(Error::UnexpectedToken { offset: 6, .. })
        ));
    }

    #[test]
    fn null_in_name_position_is_unexpected() {
        assert!(matches!(
            parse("{null}"),
            Err(Error::UnexpectedToken { offset: 1, byte: b'n' })
        ));
    }

    #[test]
    fn object_in_name_position_is_unexpected() {
        assert!(matches!(
            parse(r#"{{"a": "1"}}"#),
            Err(Error::UnexpectedToken { offset: 1, byte: b'{' })
        ));
    }

    #[test]
    fn arrays_and_numbers_are_unexpected() {
        assert!(matches!(
            parse(r#"{"a": [1]}"#),
            Err(Error::UnexpectedToken { byte: b'[', .. })
        ));
        assert!(matches!(
            parse(r#"{"a": 1}"#),
            Err(Error::UnexpectedToken { byte: b'1', .. })
        ));
    }

    #[test]
    fn string_before_object_is_unexpected() {
        assert!(matches!(
            parse(r#""a" {}"#),
            Err(Error::UnexpectedToken { offset: 0, byte: b'"' })
        ));
    }

    #[test]
    fn content_after_object_is_rejected() {
        assert!(parse("{}  \n").is_ok());
        assert!(matches!(
            parse("{} {}"),
            Err(Error::UnexpectedToken { offset: 3, byte: b'{' })
        ));
        assert!(matches!(
            parse("{},"),
            Err(Error::UnexpectedToken { offset: 2, byte: b',' })
        ));
    }

    #[test]
    fn unterminated_quote() {
        assert_eq!(
            parse(r#"{"a": "1}"#),
            Err(Error::UnterminatedQuote { offset: 6 })
        );
    }

    #[test]
    fn bad_entity_is_malformed() {
        let err = parse(r#"{"a": "&xZZ;"}"#).unwrap_err();
        assert_eq!(
            err,
            Error::Codec(CodecError::MalformedEncoding {
                offset: 7,
                reason: "entity is not two lowercase hex digits"
            })
        );
    }

    #[test]
    fn bare_ampersand_is_malformed() {
        assert!(matches!(
            parse(r#"{"a": "fish & chips"}"#),
            Err(Error::Codec(CodecError::MalformedEncoding { offset: 12, .. }))
        ));
        assert!(matches!(
            parse(r#"{"a": "&x2"#),
            Err(Error::Codec(CodecError::MalformedEncoding { .. }))
        ));
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(parse(""), Err(Error::EmptyInput));
        assert_eq!(parse(" \n\t"), Err(Error::EmptyInput));
    }

    #[test]
    fn depth_limit() {
        let parser = JsonParser::new(Limits::default().with_max_depth(2));
        assert!(parser.parse_str(r#"{"a": {"b": "1"}}"#).is_ok());
        assert_eq!(
            parser.parse_str(r#"{"a": {"b": {"c": "1"}}}"#),
            Err(Error::TooDeep { max: 2 })
        );
    }

    #[test]
    fn default_depth_rejects_hostile_nesting() {
        let mut text = String::from("{");
        for _ in 0..10_000 {
            text.push_str("\"a\": {");
        }
        assert!(matches!(parse(&text), Err(Error::TooDeep { .. })));
    }

    #[test]
    fn deep_nesting_without_native_recursion() {
        let depth = 50_000;
        let mut text = String::from("{");
        for _ in 0..depth {
            text.push_str("\"a\":{");
        }
        text.push_str("\"leaf\":\"x\"");
        for _ in 0..=depth {
            text.push('}');
        }

        let parser = JsonParser::new(Limits::default().with_max_depth(depth + 1));
        let tree = parser.parse_str(&text).unwrap();
        assert_eq!(tree.depth(), depth + 1);
    }

    #[test]
    fn states() {
        let mut frame = Frame::new(None);
        assert_eq!(frame.state(), State::ExpectingNameOrClose);
        frame.pending = Some(ByteString::from("a"));
        assert_eq!(frame.state(), State::ExpectingValue);
        let nested = Frame::new(Some(ByteString::from("a")));
        assert_eq!(nested.state(), State::ExpectingNameOrClose);
    }
}
