//! Line splitter for the block parser.
//!
//! Kumihan notation is line oriented: every structural decision (block
//! open/close, list marker, blank line) is made on a whole line, so the
//! lexer's only job is to hand out lines with their 1-based number and byte
//! span. Newlines are found with `memchr`.

use crate::span::Span;
use memchr::memchr;

/// A single line of input, without its line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
    /// 1-based line number.
    pub number: usize,
    pub span: Span,
}

impl<'a> Line<'a> {
    /// True for lines made only of whitespace, ideographic space included.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    /// The line without leading or trailing whitespace.
    #[inline]
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }
}

/// Iterator over the lines of a document.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    offset: usize,
    line_number: usize,
}

impl<'a> Lexer<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            offset: 0,
            line_number: 0,
        }
    }

    /// Number of lines handed out so far.
    #[inline]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn read_line(&mut self) -> Option<Line<'a>> {
        if self.offset >= self.bytes.len() {
            return None;
        }

        let start = self.offset;
        let end = match memchr(b'\n', &self.bytes[start..]) {
            Some(pos) => start + pos,
            None => self.bytes.len(),
        };

        // Tolerate CRLF even when the caller skipped normalization.
        let text_end = if end > start && self.bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };

        self.offset = if end < self.bytes.len() { end + 1 } else { end };
        self.line_number += 1;

        Some(Line {
            // SAFETY: `start` is 0 or one past a `\n`, and `text_end` sits on
            // a `\r`, a `\n` or the end of input. ASCII bytes never occur
            // inside a multi-byte UTF-8 sequence, so both are char boundaries.
            text: unsafe { self.input.get_unchecked(start..text_end) },
            number: self.line_number,
            span: Span::new(start as u32, text_end as u32),
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Line<'a>;

    #[inline]
    fn next(&mut self) -> Option<Line<'a>> {
        self.read_line()
    }
}
