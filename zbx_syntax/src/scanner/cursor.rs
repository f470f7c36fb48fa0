//! Byte cursor over a borrowed source string
//!
//! Every grammar this crate parses is delimited by ASCII characters, so the
//! cursor walks bytes. Slices are only ever taken at positions next to an ASCII
//! byte (or at the ends of the source), which are always char boundaries.

/// Source text plus the current byte offset
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `source`
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Create a cursor at byte offset `pos`, clamped to the source length
    pub fn at(source: &'a str, pos: usize) -> Self {
        Self {
            source,
            pos: pos.min(source.len()),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Roll back (or forward) to a previously observed position
    pub fn reset(&mut self, pos: usize) {
        self.pos = pos.min(self.source.len());
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Current byte without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    /// Byte `n` positions ahead of the current one
    pub fn peek_nth(&self, n: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + n).copied()
    }

    /// Full character starting at the current position, if it is a boundary
    pub fn current_char(&self) -> Option<char> {
        self.source.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    /// Consume one byte
    pub fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Consume `n` bytes
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.source.len());
    }

    /// Consume `expected` if it is the current byte
    pub fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `literal` if the source continues with it
    pub fn eat_str(&mut self, literal: &str) -> bool {
        if self.source.as_bytes()[self.pos..].starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consume the longest run of bytes accepted by `class` and return it.
    /// `class` must only accept ASCII characters.
    pub fn eat_while<F>(&mut self, class: F) -> &'a str
    where
        F: Fn(char) -> bool,
    {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii() && class(byte as char) {
                self.pos += 1;
            } else {
                break;
            }
        }
        &self.source[start..self.pos]
    }

    /// Skip space characters, returning how many were skipped
    pub fn skip_spaces(&mut self) -> usize {
        let start = self.pos;
        while self.eat(b' ') {}
        self.pos - start
    }

    /// Text between two positions previously observed on this cursor
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    /// Text from `start` up to the current position
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.pos]
    }

    /// Unconsumed text, empty when the cursor is not on a char boundary
    pub fn rest(&self) -> &'a str {
        self.source.get(self.pos..).unwrap_or("")
    }
}
