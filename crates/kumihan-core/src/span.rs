//! Byte ranges into the normalized source text.
//!
//! Nodes do not carry spans; diagnostics do, so that front ends can point
//! at the offending line (the CLI hands them to `codespan-reporting`).

use std::ops::Range;

/// A `[start, end)` byte range in the normalized source.
///
/// # Example
///
/// ```rust
/// use kumihan_core::span::Span;
///
/// let span = Span::new(4, 10);
/// assert_eq!(span.len(), 6);
/// assert_eq!(span.range(), 4..10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: u32,
    /// Ending byte offset (exclusive).
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Length in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The span as a `usize` range, for slicing or diagnostic labels.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}
