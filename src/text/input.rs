//! Line-oriented text input cursor.
//!
//! This module provides [`TextInput`], the low-level scanner the readers are
//! built on. It walks the input one physical line at a time and offers
//! whitespace-skipping token primitives within the current line.
//!
//! # Architecture
//!
//! The cursor keeps the current line, a position within it, and an end
//! marker. The end marker normally sits at the end of the line; it moves
//! earlier when a `#` comment starts, or when [`TextInput::skip_eol`] consumes
//! a trailing terminator character such as the `:` of a label.
//!
//! ## Navigation Methods
//! - [`TextInput::read_new_line`] - Move to the next physical line
//! - [`TextInput::at_eol`] - Check for the end of the line (or a comment)
//!
//! ## Token Methods
//! - [`TextInput::read_id`] - Read an identifier
//! - [`TextInput::read_char`] - Read a single non-whitespace character
//! - [`TextInput::peek`] - Look at the next non-whitespace character
//! - [`TextInput::skip`] / [`TextInput::expect`] - Optional / mandatory punctuation
//! - [`TextInput::expect_keyword`] - Mandatory keyword
//!
//! # Examples
//!
//! ```rust
//! use flowir::text::TextInput;
//!
//! let mut inp = TextInput::new("if (c) goto done  # branch\n");
//! assert_eq!(inp.read_id()?, "if");
//! inp.expect('(')?;
//! assert_eq!(inp.read_id()?, "c");
//! inp.expect(')')?;
//! inp.expect_keyword("goto")?;
//! assert_eq!(inp.read_id()?, "done");
//! assert!(inp.at_eol());
//! assert!(!inp.read_new_line());
//! # Ok::<(), flowir::Error>(())
//! ```

use std::str::Lines;

use crate::{Error, Result};

/// Starts a comment that runs to the end of the line.
const COMMENT_CHAR: char = '#';

/// A cursor over line-oriented text input.
///
/// On construction the cursor is positioned at the start of the first line.
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    lines: Lines<'a>,
    line: &'a str,
    line_number: usize,
    pos: usize,
    end: usize,
}

impl<'a> TextInput<'a> {
    /// Creates a cursor positioned at the start of the first line of `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let mut lines = text.lines();
        let line = lines.next().unwrap_or_default();
        let mut inp = TextInput {
            lines,
            line,
            line_number: 1,
            pos: 0,
            end: 0,
        };
        inp.load_line(line);
        inp
    }

    fn load_line(&mut self, line: &'a str) {
        self.line = line;
        self.pos = 0;
        self.end = line.find(COMMENT_CHAR).unwrap_or(line.len());
    }

    /// Advances to the next physical line.
    ///
    /// Returns `false` at the end of the input, leaving the cursor on the last line.
    pub fn read_new_line(&mut self) -> bool {
        match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                self.load_line(line);
                true
            }
            None => {
                self.pos = self.end;
                false
            }
        }
    }

    /// Returns the 1-based number of the current line.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns the 1-based column of the cursor in the current line.
    #[must_use]
    pub fn column(&self) -> usize {
        self.line[..self.pos].chars().count() + 1
    }

    /// Returns the unread remainder of the current line, up to any comment.
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.line[self.pos..self.end]
    }

    /// Builds a parse error located at the cursor.
    #[must_use]
    pub fn error(&self, message: String) -> Error {
        Error::Parse {
            message,
            line: self.line_number,
            column: self.column(),
        }
    }

    /// Skips whitespace within the current line.
    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    /// Returns `true` if only whitespace or a comment remains on the line.
    pub fn at_eol(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.end
    }

    /// Returns the next non-whitespace character without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    /// Consumes and returns the next non-whitespace character.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] at the end of the line.
    pub fn read_char(&mut self) -> Result<char> {
        match self.peek() {
            Some(c) => {
                self.pos += c.len_utf8();
                Ok(c)
            }
            None => Err(parse_error!(self, "Unexpected end of line")),
        }
    }

    /// Consumes `c` if it is the next non-whitespace character.
    pub fn skip(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consumes `c` if it is the last non-whitespace character on the line.
    ///
    /// On success the line is shortened to end just before `c`, so the text
    /// between the cursor and `c` can be read as usual.
    pub fn skip_eol(&mut self, c: char) -> bool {
        let rest = self.rest().trim_end();
        if rest.ends_with(c) {
            self.end = self.pos + rest.len() - c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consumes `c`, which must be the next non-whitespace character.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if a different character (or nothing) follows.
    pub fn expect(&mut self, c: char) -> Result<()> {
        if self.skip(c) {
            Ok(())
        } else {
            Err(parse_error!(self, "Expected '{}'", c))
        }
    }

    /// Consumes the identifier `keyword`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the next token is not `keyword`.
    pub fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        self.skip_whitespace();
        let start = self.pos;
        match self.read_id() {
            Ok(id) if id == keyword => Ok(()),
            _ => {
                self.pos = start;
                Err(parse_error!(self, "Expected \"{}\"", keyword))
            }
        }
    }

    /// Requires that nothing but whitespace or a comment remains on the line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if unread text remains.
    pub fn expect_eol(&mut self) -> Result<()> {
        if self.at_eol() {
            Ok(())
        } else {
            Err(parse_error!(self, "Unexpected text after statement"))
        }
    }

    /// Reads an identifier: a letter or `_` followed by letters, digits or `_`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if no identifier starts at the cursor.
    pub fn read_id(&mut self) -> Result<&'a str> {
        self.skip_whitespace();
        let rest = self.rest();

        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_alphabetic() || c == '_' => {}
            _ => return Err(parse_error!(self, "Expected identifier")),
        }

        let len = chars
            .find(|&(_, c)| !(c.is_alphanumeric() || c == '_'))
            .map_or(rest.len(), |(idx, _)| idx);

        self.pos += len;
        Ok(&rest[..len])
    }
}
