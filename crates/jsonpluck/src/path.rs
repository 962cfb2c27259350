//! Compiled JSON-path expressions.
//!
//! A path is a sequence of [`Segment`]s, always starting with
//! [`Segment::Root`]. [`JsonPath::compile`] accepts the textual syntax
//!
//! - `$` — the root,
//! - `.name` or `['name']` — an object member,
//! - `[n]` — a non-negative array index,
//! - `.*` or `[*]` — every member or element.
//!
//! Negative indices, slices (`[1:2]`), filters (`[?(...)]`), and descendant
//! operators (`..`) are deliberately out of scope and rejected with
//! [`ErrorKind::UnsupportedJsonPath`], as is any other malformed path text.

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::{Error, ErrorKind};

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// The document root; only ever the first segment.
    Root,
    /// Select the object member with this literal name.
    Key(Arc<str>),
    /// Select the array element at this position (0-based).
    Index(usize),
    /// Select every member or element of the current container.
    Wildcard,
}

/// A compiled JSON-path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// The path selecting the whole document (`$`).
    #[must_use]
    pub fn root() -> Self {
        Self {
            segments: alloc::vec![Segment::Root],
        }
    }

    /// Append an object-member step.
    #[must_use]
    pub fn key(mut self, name: &str) -> Self {
        self.segments.push(Segment::Key(Arc::from(name)));
        self
    }

    /// Append an array-index step.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    /// Append a wildcard step.
    #[must_use]
    pub fn wildcard(mut self) -> Self {
        self.segments.push(Segment::Wildcard);
        self
    }

    /// The compiled segments; the first is always [`Segment::Root`].
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the path is `$` alone.
    pub(crate) fn is_root_only(&self) -> bool {
        self.segments.len() == 1
    }

    /// Compile `text` into a path.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::UnsupportedJsonPath`] with the offset of the offending
    /// byte in `text`.
    pub fn compile(text: &str) -> Result<Self, Error> {
        Compiler {
            text: text.as_bytes(),
            pos: 0,
        }
        .run()
    }
}

struct Compiler<'t> {
    text: &'t [u8],
    pos: usize,
}

impl<'t> Compiler<'t> {
    fn fail<T>(&self) -> Result<T, Error> {
        Err(Error::new(ErrorKind::UnsupportedJsonPath, self.pos))
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    fn run(mut self) -> Result<JsonPath, Error> {
        if self.peek() != Some(b'$') {
            return self.fail();
        }
        self.pos += 1;
        let mut segments = alloc::vec![Segment::Root];
        while let Some(c) = self.peek() {
            match c {
                b'.' => {
                    self.pos += 1;
                    segments.push(self.dot_step()?);
                }
                b'[' => {
                    self.pos += 1;
                    segments.push(self.bracket_step()?);
                }
                _ => return self.fail(),
            }
        }
        Ok(JsonPath { segments })
    }

    /// A step after `.`: either `*` or a bare member name running to the
    /// next `.`, `[`, or the end of the text.
    fn dot_step(&mut self) -> Result<Segment, Error> {
        match self.peek() {
            // `..` is the descendant operator.
            None | Some(b'.') => self.fail(),
            Some(b'*') => {
                self.pos += 1;
                Ok(Segment::Wildcard)
            }
            Some(b'[') => self.fail(),
            Some(_) => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == b'.' || c == b'[' {
                        break;
                    }
                    self.pos += 1;
                }
                let name = &self.text[start..self.pos];
                // The input was a `&str`, and the name ends on an ASCII
                // delimiter, so it is still valid UTF-8.
                let name = core::str::from_utf8(name).expect("split on ascii delimiter");
                Ok(Segment::Key(Arc::from(name)))
            }
        }
    }

    /// A step after `[`: a quoted name, a non-negative integer, or `*`.
    fn bracket_step(&mut self) -> Result<Segment, Error> {
        let segment = match self.peek() {
            Some(q @ (b'\'' | b'"')) => {
                self.pos += 1;
                let name = self.quoted_name(q)?;
                Segment::Key(name)
            }
            Some(b'*') => {
                self.pos += 1;
                Segment::Wildcard
            }
            Some(b'0'..=b'9') => {
                let mut index = 0usize;
                while let Some(c @ b'0'..=b'9') = self.peek() {
                    index = index
                        .checked_mul(10)
                        .and_then(|i| i.checked_add(usize::from(c - b'0')))
                        .ok_or(Error::new(ErrorKind::UnsupportedJsonPath, self.pos))?;
                    self.pos += 1;
                }
                Segment::Index(index)
            }
            // `-`, `:`, `?`, and everything else: negative index, slice,
            // filter, or garbage.
            _ => return self.fail(),
        };
        if self.peek() != Some(b']') {
            return self.fail();
        }
        self.pos += 1;
        Ok(segment)
    }

    fn quoted_name(&mut self, quote: u8) -> Result<Arc<str>, Error> {
        let mut name = Vec::new();
        loop {
            let Some(c) = self.peek() else {
                return self.fail();
            };
            self.pos += 1;
            match c {
                _ if c == quote => break,
                b'\\' => {
                    let Some(escaped) = self.peek() else {
                        return self.fail();
                    };
                    if escaped == quote || escaped == b'\\' {
                        name.push(escaped);
                        self.pos += 1;
                    } else {
                        return self.fail();
                    }
                }
                _ => name.push(c),
            }
        }
        // Escapes only ever push ASCII; everything else is copied verbatim
        // from the `&str` input up to an ASCII quote, so the name is UTF-8.
        let name = core::str::from_utf8(&name).map_err(|_| {
            // A quote byte inside a multi-byte scalar cannot occur in valid
            // UTF-8 input, but fail closed rather than panic.
            Error::new(ErrorKind::UnsupportedJsonPath, self.pos)
        })?;
        Ok(Arc::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> Segment {
        Segment::Key(Arc::from(name))
    }

    #[test]
    fn compiles_root() {
        let path = JsonPath::compile("$").unwrap();
        assert_eq!(path.segments(), &[Segment::Root]);
        assert!(path.is_root_only());
    }

    #[test]
    fn compiles_dot_keys_and_indices() {
        let path = JsonPath::compile("$.a.b[3]").unwrap();
        assert_eq!(
            path.segments(),
            &[Segment::Root, key("a"), key("b"), Segment::Index(3)]
        );
    }

    #[test]
    fn compiles_bracket_keys() {
        let path = JsonPath::compile("$['kéy']['w\\'s'][\"dq\"]").unwrap();
        assert_eq!(
            path.segments(),
            &[Segment::Root, key("kéy"), key("w's"), key("dq")]
        );
    }

    #[test]
    fn compiles_wildcards() {
        let path = JsonPath::compile("$.*[*].x").unwrap();
        assert_eq!(
            path.segments(),
            &[Segment::Root, Segment::Wildcard, Segment::Wildcard, key("x")]
        );
    }

    #[test]
    fn builder_matches_compiler() {
        let built = JsonPath::root().key("a").index(1).wildcard();
        assert_eq!(built, JsonPath::compile("$.a[1].*").unwrap());
    }

    #[test]
    fn rejects_unsupported_constructs() {
        for text in [
            "", "a.b", ".a", "$..a", "$[-1]", "$[1:2]", "$[?(@.x)]", "$[", "$['a", "$['a'",
            "$.a.", "$[]", "$.[a]", "$['a\\qb']", "$[18446744073709551616]",
        ] {
            let err = JsonPath::compile(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedJsonPath, "{text:?}");
        }
    }

    #[test]
    fn error_reports_offset() {
        let err = JsonPath::compile("$.a[-1]").unwrap_err();
        assert_eq!(err.offset(), 4);
    }
}
