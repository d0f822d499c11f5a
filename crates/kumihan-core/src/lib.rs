//! # Kumihan Core
//!
//! Parser and HTML renderer for Kumihan notation, a line-oriented,
//! keyword-based markup for Japanese prose.
//!
//! Blocks are opened with `;;;keyword`, closed with a lone `;;;`, and may
//! nest. Inside a line, `**bold**`, `*italic*`, `[[label|url]]` and
//! `;;keyword text;;` spans are recognised.
//!
//! ## Quick Start
//!
//! ```rust
//! use kumihan_core::{generate_toc, parse, render, TocAccumulator};
//!
//! let input = ";;;見出し1\nTitle\n;;;\nSome **bold** text.";
//! let result = parse(input);
//! assert!(result.success());
//!
//! let mut toc = TocAccumulator::new();
//! let html = render(&result.nodes, &mut toc);
//! assert!(html.contains("<strong>bold</strong>"));
//!
//! let tree = generate_toc(toc.entries());
//! assert_eq!(tree.roots[0].entry.title, "Title");
//! ```
//!
//! ## Error Recovery
//!
//! Malformed markup never stops the parser. Problems are collected as
//! [`Diagnostic`]s next to a best-effort tree:
//!
//! ```rust
//! use kumihan_core::parse;
//!
//! let result = parse(";;;太字\nnever closed");
//! assert!(!result.success());
//! assert_eq!(result.errors().next().map(|e| e.line), Some(1));
//! assert_eq!(result.nodes.len(), 1);
//! ```

pub mod ast;
pub mod error;
pub mod inline;
pub mod keyword;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod span;
pub mod toc;

pub use ast::{AttrValue, Content, Node, NodeKind};
pub use error::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use parser::{parse, ParseResult, Parser};
pub use render::{render, render_html};
pub use toc::{generate_toc, render_toc, TocAccumulator, TocEntry, TocTree};
