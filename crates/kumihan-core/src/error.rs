use crate::span::Span;
use std::fmt;

/// How bad a diagnostic is. Errors make [`crate::ParseResult::success`] false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Diagnostic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A close-block line with no open block.
    UnmatchedClose,
    /// An open block still open at end of input.
    UnclosedBlock,
    /// A block or inline keyword that has no dedicated node type.
    UnknownKeyword,
    /// A malformed or rejected `key=value` attribute.
    InvalidAttribute,
    /// A heading block spanning more than one line.
    MultiLineHeading,
    /// A heading block with no text.
    EmptyHeading,
}

impl DiagnosticKind {
    /// Stable kebab-case code, used as the diagnostic code in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnmatchedClose => "unmatched-close",
            DiagnosticKind::UnclosedBlock => "unclosed-block",
            DiagnosticKind::UnknownKeyword => "unknown-keyword",
            DiagnosticKind::InvalidAttribute => "invalid-attribute",
            DiagnosticKind::MultiLineHeading => "multi-line-heading",
            DiagnosticKind::EmptyHeading => "empty-heading",
        }
    }
}

/// A problem found while parsing, located by line and byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// 1-based source line.
    pub line: usize,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>, line: usize, span: Span) -> Self {
        Self {
            message: message.into(),
            kind,
            severity: Severity::Error,
            line,
            span,
        }
    }

    pub fn warning(
        kind: DiagnosticKind,
        message: impl Into<String>,
        line: usize,
        span: Span,
    ) -> Self {
        Self {
            message: message.into(),
            kind,
            severity: Severity::Warning,
            line,
            span,
        }
    }

    pub fn unmatched_close(line: usize, span: Span) -> Self {
        Self::error(
            DiagnosticKind::UnmatchedClose,
            "block close marker without a matching open marker",
            line,
            span,
        )
    }

    pub fn unclosed_block(keyword: &str, line: usize, span: Span) -> Self {
        Self::error(
            DiagnosticKind::UnclosedBlock,
            format!("block ';;;{}' is never closed", keyword),
            line,
            span,
        )
    }

    pub fn unknown_keyword(keyword: &str, line: usize, span: Span) -> Self {
        Self::warning(
            DiagnosticKind::UnknownKeyword,
            format!("unknown keyword '{}'", keyword),
            line,
            span,
        )
    }

    pub fn invalid_attribute(detail: &str, line: usize, span: Span) -> Self {
        Self::warning(
            DiagnosticKind::InvalidAttribute,
            format!("invalid attribute: {}", detail),
            line,
            span,
        )
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.severity, self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Collector passed through a parse; replaces any global error state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
