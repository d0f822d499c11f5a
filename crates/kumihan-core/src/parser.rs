//! Line-oriented block parser with local error recovery.
//!
//! A single pass over the lines keeps an explicit stack of open block
//! frames. An open line pushes a frame, a close line pops it and attaches
//! the finished block to its parent, and everything else lands in the frame
//! on top. Errors are collected into [`Diagnostics`] and parsing always
//! runs to the end of the input.

use std::mem;

use crate::ast::{AttrValue, Content, Node, NodeKind};
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::inline;
use crate::keyword::{self, BlockHeader, KeywordKind, BLOCK_MARKER};
use crate::lexer::{Line, Lexer};
use crate::normalize::normalize_document;
use crate::span::Span;

/// Attributes the parser sets itself and users may not override.
const RESERVED_ATTRIBUTES: &[&str] = &["keyword", "level", "ordered", "start", "href"];

/// Output of a parse: the best-effort tree plus everything that went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// Root nodes in document order. Always populated, even on errors.
    pub nodes: Vec<Node>,
    pub diagnostics: Diagnostics,
}

impl ParseResult {
    /// False if any error was collected. Warnings do not count.
    pub fn success(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.errors()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.warnings()
    }
}

/// Parse a document with default settings.
pub fn parse(text: &str) -> ParseResult {
    Parser::new().parse_with_recovery(text)
}

/// Kumihan notation parser.
pub struct Parser {
    diagnostics: Diagnostics,
    normalize: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            normalize: true,
        }
    }

    /// Enable or disable input normalization (on by default).
    ///
    /// Disable it only when the caller already normalized the text and
    /// needs diagnostic spans to match its own copy byte for byte.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Parse, collecting diagnostics and keeping the partial tree.
    pub fn parse_with_recovery(&mut self, input: &str) -> ParseResult {
        self.diagnostics = Diagnostics::new();
        let nodes = if self.normalize {
            let text = normalize_document(input);
            self.parse_internal(&text)
        } else {
            self.parse_internal(input)
        };
        ParseResult {
            nodes,
            diagnostics: mem::take(&mut self.diagnostics),
        }
    }

    /// Parse, returning the first error instead of a partial tree.
    pub fn parse(&mut self, input: &str) -> Result<Vec<Node>, Diagnostic> {
        let result = self.parse_with_recovery(input);
        match result.diagnostics.into_iter().find(Diagnostic::is_error) {
            Some(error) => Err(error),
            None => Ok(result.nodes),
        }
    }

    fn parse_internal(&mut self, input: &str) -> Vec<Node> {
        let mut stack = vec![Frame::root()];
        let mut lexer = Lexer::new(input);

        for line in lexer.by_ref() {
            match classify(&line) {
                LineClass::Blank => top(&mut stack).flush(),
                LineClass::Close => {
                    if stack.len() == 1 {
                        self.diagnostics
                            .push(Diagnostic::unmatched_close(line.number, line.span));
                        continue;
                    }
                    if let Some(frame) = stack.pop() {
                        log::trace!("line {}: close ;;;{}", line.number, frame.label());
                        let node = self.close_frame(frame);
                        top(&mut stack).push_node(node);
                    }
                }
                LineClass::Open(spec) => {
                    let header = keyword::parse_header(spec);
                    if header.keywords.is_empty() {
                        let node = self.parse_line_node(line.text, &line);
                        top(&mut stack).push_line(node);
                        continue;
                    }
                    log::trace!("line {}: open ;;;{}", line.number, header.label());
                    self.check_header(&header, &line);
                    top(&mut stack).flush();
                    stack.push(Frame::block(header, &line));
                }
                LineClass::OneLine(body) => {
                    let (token, rest) = keyword::split_keyword_spec(body);
                    let keywords = keyword::parse_keywords(token);
                    if keywords.is_empty() {
                        let node = self.parse_line_node(line.text, &line);
                        top(&mut stack).push_line(node);
                        continue;
                    }
                    let header = BlockHeader {
                        keywords,
                        ..BlockHeader::default()
                    };
                    self.check_header(&header, &line);
                    let children = if rest.is_empty() {
                        Vec::new()
                    } else {
                        vec![self.parse_line_node(rest, &line)]
                    };
                    let node = self.build_block(&header, line.number, line.span, children);
                    top(&mut stack).push_node(node);
                }
                LineClass::ListItem {
                    ordered,
                    number,
                    content,
                } => {
                    let item = Node::list_item(self.parse_inline_children(content, &line));
                    top(&mut stack).push_item(ordered, number, item);
                }
                LineClass::Plain => {
                    let text = line.text.trim_start_matches([' ', '\t']);
                    let node = self.parse_line_node(text, &line);
                    top(&mut stack).push_line(node);
                }
            }
        }

        while stack.len() > 1 {
            if let Some(frame) = stack.pop() {
                self.diagnostics.push(Diagnostic::unclosed_block(
                    &frame.label(),
                    frame.line,
                    frame.span,
                ));
                let node = self.close_frame(frame);
                top(&mut stack).push_node(node);
            }
        }

        let nodes = stack.pop().map(Frame::finish).unwrap_or_default();
        log::debug!(
            "parsed {} lines into {} root nodes ({} diagnostics)",
            lexer.line_number(),
            nodes.len(),
            self.diagnostics.len()
        );
        nodes
    }

    fn parse_line_node(&mut self, text: &str, line: &Line) -> Node {
        let parsed = inline::parse_line(text);
        self.report_unknown_inline(&parsed.unknown_keywords, line);
        parsed.node
    }

    fn parse_inline_children(&mut self, text: &str, line: &Line) -> Vec<Node> {
        let mut unknown = Vec::new();
        let children = inline::parse_inlines_into(text, &mut unknown);
        self.report_unknown_inline(&unknown, line);
        children
    }

    fn report_unknown_inline(&mut self, names: &[String], line: &Line) {
        for name in names {
            self.diagnostics
                .push(Diagnostic::unknown_keyword(name, line.number, line.span));
        }
    }

    /// Warn about unknown keywords and unparsable attributes on an open line.
    fn check_header(&mut self, header: &BlockHeader, line: &Line) {
        for kw in &header.keywords {
            if kw.kind == KeywordKind::Unknown {
                self.diagnostics
                    .push(Diagnostic::unknown_keyword(&kw.name, line.number, line.span));
            }
        }
        for problem in &header.problems {
            self.diagnostics
                .push(Diagnostic::invalid_attribute(problem, line.number, line.span));
        }
    }

    fn close_frame(&mut self, frame: Frame) -> Node {
        let line = frame.line;
        let span = frame.span;
        let header = frame.header.clone().unwrap_or_default();
        let children = frame.finish();
        self.build_block(&header, line, span, children)
    }

    /// Wrap `children` in one node per keyword, innermost last.
    fn build_block(
        &mut self,
        header: &BlockHeader,
        line: usize,
        span: Span,
        mut children: Vec<Node>,
    ) -> Node {
        let mut node = None;
        for kw in header.keywords.iter().rev() {
            let inner = match node.take() {
                Some(inner) => vec![inner],
                None => mem::take(&mut children),
            };
            let built = match kw.kind {
                KeywordKind::Heading(level) => {
                    Node::heading(level, self.heading_children(inner, line, span))
                }
                KeywordKind::Bold => Node::bold(inner),
                KeywordKind::Italic => Node::italic(inner),
                KeywordKind::Div(Some(class)) => Node::div(inner).with_attribute("class", class),
                KeywordKind::Div(None) => Node::div(inner),
                KeywordKind::Section => Node::section(inner),
                KeywordKind::List { ordered } => Node::list(ordered, list_items(inner)),
                KeywordKind::Unknown => Node::block(&kw.name, inner),
            };
            node = Some(built.with_attribute("keyword", kw.name.as_str()));
        }

        let node = node.unwrap_or_else(|| Node::block("", children));
        self.apply_user_attributes(node, &header.attributes, line, span)
    }

    /// Headings hold inline content only: paragraphs are flattened and
    /// separate lines joined with a space.
    fn heading_children(&mut self, children: Vec<Node>, line: usize, span: Span) -> Vec<Node> {
        let mut lines = Vec::new();
        for child in children {
            if child.kind == NodeKind::Paragraph {
                lines.extend(into_children(child));
            } else {
                lines.push(child);
            }
        }

        if lines.iter().filter(|n| n.is_line()).count() > 1 {
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticKind::MultiLineHeading,
                "heading spans several lines; they are joined with spaces",
                line,
                span,
            ));
        }
        if lines.iter().all(|n| n.plain_text().trim().is_empty()) {
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticKind::EmptyHeading,
                "heading has no text",
                line,
                span,
            ));
        }

        let mut out = Vec::with_capacity(lines.len() * 2);
        for (i, node) in lines.into_iter().enumerate() {
            if i > 0 {
                out.push(Node::text(" "));
            }
            out.push(node);
        }
        out
    }

    fn apply_user_attributes(
        &mut self,
        mut node: Node,
        attributes: &[(String, AttrValue)],
        line: usize,
        span: Span,
    ) -> Node {
        for (key, value) in attributes {
            if RESERVED_ATTRIBUTES.contains(&key.as_str()) {
                self.diagnostics.push(Diagnostic::invalid_attribute(
                    &format!("'{}' is reserved", key),
                    line,
                    span,
                ));
                continue;
            }
            match key.as_str() {
                "class" => {
                    let class = match node.attr_str("class") {
                        Some(existing) => format!("{} {}", existing, value),
                        None => value.to_string(),
                    };
                    node.attributes.insert(key.clone(), AttrValue::Str(class));
                }
                "color" => {
                    let color = value.to_string();
                    if !is_highlight(&node) {
                        self.diagnostics.push(Diagnostic::invalid_attribute(
                            "'color' only applies to highlight blocks",
                            line,
                            span,
                        ));
                    } else if keyword::is_valid_color(&color) {
                        node.attributes.insert(key.clone(), AttrValue::Str(color));
                    } else {
                        self.diagnostics.push(Diagnostic::invalid_attribute(
                            &format!("'{}' is not a colour", color),
                            line,
                            span,
                        ));
                    }
                }
                _ => {
                    node.attributes.insert(key.clone(), value.clone());
                }
            }
        }
        node
    }
}

fn top(stack: &mut [Frame]) -> &mut Frame {
    // The root frame is only popped after the main loop.
    let last = stack.len() - 1;
    &mut stack[last]
}

fn is_highlight(node: &Node) -> bool {
    node.kind == NodeKind::Div
        && node
            .attr_str("class")
            .is_some_and(|class| class.split_whitespace().any(|c| c == "highlight"))
}

fn into_children(node: Node) -> Vec<Node> {
    match node.content {
        Content::Children(children) => children,
        Content::Text(_) => vec![node],
    }
}

/// Inline content of a line node, for use as list item children.
fn line_inlines(node: Node) -> Vec<Node> {
    match node.kind {
        NodeKind::Composite => into_children(node),
        _ => vec![node],
    }
}

/// Turn the body of a `list` keyword block into list items.
fn list_items(children: Vec<Node>) -> Vec<Node> {
    let mut items = Vec::with_capacity(children.len());
    for child in children {
        match child.kind {
            // Marker lists merge in; keyword lists stay whole inside an item.
            NodeKind::List if child.attribute("keyword").is_none() => {
                items.extend(into_children(child))
            }
            NodeKind::Paragraph => items.extend(
                into_children(child)
                    .into_iter()
                    .map(|line| Node::list_item(line_inlines(line))),
            ),
            NodeKind::Text | NodeKind::Composite => {
                items.push(Node::list_item(line_inlines(child)))
            }
            _ => items.push(Node::list_item(vec![child])),
        }
    }
    items
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineClass<'a> {
    Blank,
    Close,
    /// Keyword spec after `;;;`.
    Open(&'a str),
    /// Keyword spec and content between `;;;` and the trailing `;;;`.
    OneLine(&'a str),
    ListItem {
        ordered: bool,
        number: u64,
        content: &'a str,
    },
    Plain,
}

fn classify<'a>(line: &Line<'a>) -> LineClass<'a> {
    if line.is_blank() {
        return LineClass::Blank;
    }
    let text = line.text;
    let trimmed = line.trimmed();
    if trimmed == BLOCK_MARKER {
        return LineClass::Close;
    }
    if let Some(rest) = trimmed.strip_prefix(BLOCK_MARKER) {
        if let Some(body) = rest.strip_suffix(BLOCK_MARKER) {
            if !body.trim().is_empty() {
                return LineClass::OneLine(body);
            }
            return LineClass::Plain;
        }
        return LineClass::Open(rest);
    }

    let body = text.trim_start();
    for marker in ["- ", "* "] {
        if let Some(content) = body.strip_prefix(marker) {
            return LineClass::ListItem {
                ordered: false,
                number: 1,
                content: content.trim(),
            };
        }
    }
    if let Some(content) = body.strip_prefix('・') {
        let content = content.trim();
        if !content.is_empty() {
            return LineClass::ListItem {
                ordered: false,
                number: 1,
                content,
            };
        }
    }

    let digits = body.bytes().take_while(u8::is_ascii_digit).count();
    if (1..=9).contains(&digits) {
        if let Some(content) = body[digits..].strip_prefix(". ") {
            if let Ok(number) = body[..digits].parse::<u64>() {
                return LineClass::ListItem {
                    ordered: true,
                    number,
                    content: content.trim(),
                };
            }
        }
    }

    LineClass::Plain
}

/// A run of consecutive lines that has not been attached yet.
#[derive(Debug, Default)]
enum Pending {
    #[default]
    Empty,
    Lines(Vec<Node>),
    List {
        ordered: bool,
        start: u64,
        items: Vec<Node>,
    },
}

/// The document root or an open block.
#[derive(Debug)]
struct Frame {
    /// `None` for the root.
    header: Option<BlockHeader>,
    line: usize,
    span: Span,
    children: Vec<Node>,
    pending: Pending,
}

impl Frame {
    fn root() -> Self {
        Self {
            header: None,
            line: 0,
            span: Span::default(),
            children: Vec::new(),
            pending: Pending::Empty,
        }
    }

    fn block(header: BlockHeader, line: &Line) -> Self {
        Self {
            header: Some(header),
            line: line.number,
            span: line.span,
            children: Vec::new(),
            pending: Pending::Empty,
        }
    }

    fn label(&self) -> String {
        self.header
            .as_ref()
            .map(BlockHeader::label)
            .unwrap_or_default()
    }

    fn flush(&mut self) {
        match mem::take(&mut self.pending) {
            Pending::Empty => {}
            Pending::Lines(mut lines) => {
                if lines.len() == 1 {
                    self.children.push(lines.remove(0));
                } else {
                    self.children.push(Node::paragraph(lines));
                }
            }
            Pending::List {
                ordered,
                start,
                items,
            } => {
                let mut list = Node::list(ordered, items);
                if ordered && start != 1 {
                    list = list.with_attribute("start", start as i64);
                }
                self.children.push(list);
            }
        }
    }

    fn push_line(&mut self, node: Node) {
        if let Pending::Lines(lines) = &mut self.pending {
            lines.push(node);
            return;
        }
        self.flush();
        self.pending = Pending::Lines(vec![node]);
    }

    fn push_item(&mut self, ordered: bool, number: u64, item: Node) {
        if let Pending::List {
            ordered: current,
            items,
            ..
        } = &mut self.pending
        {
            if *current == ordered {
                items.push(item);
                return;
            }
        }
        self.flush();
        self.pending = Pending::List {
            ordered,
            start: number,
            items: vec![item],
        };
    }

    fn push_node(&mut self, node: Node) {
        self.flush();
        self.children.push(node);
    }

    /// Flush pending runs. When the scope holds several children, bare
    /// lines are wrapped in their own paragraph.
    fn finish(mut self) -> Vec<Node> {
        self.flush();
        if self.children.len() <= 1 {
            return self.children;
        }
        self.children
            .into_iter()
            .map(|child| {
                if child.is_line() {
                    Node::paragraph(vec![child])
                } else {
                    child
                }
            })
            .collect()
    }
}
