//! Inline span tokenizer.
//!
//! Greedy, left to right, no backtracking: the first delimiter that closes
//! wins. Spans may contain spans one level deep; inside a nested span every
//! delimiter is literal text. Escapes apply at every depth, and an escaped
//! delimiter never closes a span.
//!
//! | syntax              | node                      |
//! |---------------------|---------------------------|
//! | `**text**`          | bold                      |
//! | `*text*`            | italic                    |
//! | `[[label\|url]]`    | link                      |
//! | `;;keyword text;;`  | bold / italic / block     |
//! | `\x`                | literal `x`               |

use memchr::{memchr, memchr2, memchr3};

use crate::ast::{Node, NodeKind};
use crate::keyword::{self, KeywordKind, INLINE_MARKER};

/// Spans are recognized at depths `0..MAX_SPAN_DEPTH`.
pub const MAX_SPAN_DEPTH: usize = 2;

/// One parsed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// A `text` node, or a `composite` when the line contains spans.
    pub node: Node,
    /// Inline keywords without a dedicated node type, in order of appearance.
    pub unknown_keywords: Vec<String>,
}

/// Parse a line into a single line node.
pub fn parse_line(text: &str) -> ParsedLine {
    let mut unknown_keywords = Vec::new();
    let mut inlines = InlineParser::new(text, 0, &mut unknown_keywords).parse();

    let node = if inlines.len() == 1 && inlines[0].kind == NodeKind::Text {
        inlines.remove(0)
    } else if inlines.is_empty() {
        Node::text("")
    } else {
        Node::composite(inlines)
    };

    ParsedLine {
        node,
        unknown_keywords,
    }
}

/// Parse inline content into a flat list of nodes, ignoring unknown keywords.
pub fn parse_inlines(text: &str) -> Vec<Node> {
    let mut unknown = Vec::new();
    InlineParser::new(text, 0, &mut unknown).parse()
}

/// Parse inline content, recording unknown keywords.
pub(crate) fn parse_inlines_into(text: &str, unknown: &mut Vec<String>) -> Vec<Node> {
    InlineParser::new(text, 0, unknown).parse()
}

struct InlineParser<'a, 'u> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    /// Pending literal text not yet turned into a node.
    buf: String,
    text_start: usize,
    out: Vec<Node>,
    unknown: &'u mut Vec<String>,
}

impl<'a, 'u> InlineParser<'a, 'u> {
    fn new(text: &'a str, depth: usize, unknown: &'u mut Vec<String>) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            depth,
            buf: String::new(),
            text_start: 0,
            out: Vec::new(),
            unknown,
        }
    }

    fn parse(mut self) -> Vec<Node> {
        if self.text.is_empty() {
            return Vec::new();
        }
        let spans = self.depth < MAX_SPAN_DEPTH;

        while self.pos < self.bytes.len() {
            let next = self.find_next_special();
            if next >= self.bytes.len() {
                break;
            }
            self.pos = next;

            let parsed = match self.bytes[self.pos] {
                b'\\' => self.try_escape(),
                b'*' if spans => self.try_asterisk(),
                b'[' if spans => self.try_link(),
                b';' if spans => self.try_keyword_span(),
                _ => false,
            };

            if !parsed {
                self.pos += 1;
            }
        }

        self.pos = self.bytes.len();
        self.flush_text();
        self.out
    }

    #[inline]
    fn find_next_special(&self) -> usize {
        let remaining = &self.bytes[self.pos..];
        let common = memchr3(b'*', b'[', b';', remaining);
        let escape = memchr(b'\\', remaining);
        match (common, escape) {
            (Some(a), Some(b)) => self.pos + a.min(b),
            (Some(a), None) => self.pos + a,
            (None, Some(b)) => self.pos + b,
            (None, None) => self.bytes.len(),
        }
    }

    /// Move `text_start..pos` into the buffer and emit it as a text node.
    fn flush_text(&mut self) {
        let text = self.text;
        self.buf.push_str(&text[self.text_start..self.pos]);
        if !self.buf.is_empty() {
            self.out.push(Node::text(std::mem::take(&mut self.buf)));
        }
        self.text_start = self.pos;
    }

    fn push_span(&mut self, node: Node, end: usize) {
        self.flush_text();
        self.out.push(node);
        self.pos = end;
        self.text_start = end;
    }

    fn parse_nested(&mut self, content: &str) -> Vec<Node> {
        InlineParser::new(content, self.depth + 1, self.unknown).parse()
    }

    fn try_escape(&mut self) -> bool {
        let text = self.text;
        let Some(escaped) = text[self.pos + 1..].chars().next() else {
            return false;
        };
        self.buf.push_str(&text[self.text_start..self.pos]);
        self.text_start = self.pos + 1;
        self.pos += 1 + escaped.len_utf8();
        true
    }

    fn try_asterisk(&mut self) -> bool {
        if self.bytes.get(self.pos + 1) == Some(&b'*') {
            self.try_delimited(2, b'*', NodeKind::Bold)
        } else {
            self.try_delimited(1, b'*', NodeKind::Italic)
        }
    }

    /// `width` copies of `delim`, content, `width` copies of `delim`.
    fn try_delimited(&mut self, width: usize, delim: u8, kind: NodeKind) -> bool {
        let text = self.text;
        let start = self.pos;
        let content_start = start + width;

        if content_start >= self.bytes.len() || self.bytes[content_start].is_ascii_whitespace() {
            return false;
        }

        let mut search = content_start;
        while let Some(close) = find_unescaped(self.bytes, search, &[delim]) {
            let run = self.bytes[close..].iter().take_while(|&&b| b == delim).count();

            if width == 1 && run >= 2 {
                // `**` inside an italic span belongs to a nested bold.
                search = close + run;
                continue;
            }

            if run >= width
                && close > content_start
                && !self.bytes[close - 1].is_ascii_whitespace()
            {
                let children = self.parse_nested(&text[content_start..close]);
                let node = match kind {
                    NodeKind::Bold => Node::bold(children),
                    _ => Node::italic(children),
                };
                self.push_span(node, close + width);
                return true;
            }
            search = close + run.max(1);
        }

        false
    }

    fn try_link(&mut self) -> bool {
        let text = self.text;
        if self.bytes.get(self.pos + 1) != Some(&b'[') {
            return false;
        }
        let content_start = self.pos + 2;

        let Some(close) = find_unescaped(self.bytes, content_start, b"]]") else {
            return false;
        };
        let content = &text[content_start..close];
        let (label, url) = match content.find('|') {
            Some(pipe) => (content[..pipe].trim(), content[pipe + 1..].trim()),
            None => (content.trim(), content.trim()),
        };
        if url.is_empty() {
            return false;
        }
        let label = if label.is_empty() { url } else { label };
        // Labels take escapes but no spans.
        let label = InlineParser::new(label, MAX_SPAN_DEPTH, self.unknown).parse();
        self.push_span(Node::link(url, label), close + 2);
        true
    }

    fn try_keyword_span(&mut self) -> bool {
        let text = self.text;
        let start = self.pos;
        if !text[start..].starts_with(INLINE_MARKER) {
            return false;
        }
        let after = &text[start + INLINE_MARKER.len()..];

        let keyword_len = after.find(char::is_whitespace).unwrap_or(after.len());
        let name = &after[..keyword_len];
        if name.is_empty() || name.contains(';') {
            return false;
        }

        let Some(ws) = after[keyword_len..].chars().next() else {
            return false;
        };
        let body_start = start + INLINE_MARKER.len() + keyword_len + ws.len_utf8();
        let Some(close) = find_unescaped(self.bytes, body_start, INLINE_MARKER.as_bytes()) else {
            return false;
        };
        let content = &text[body_start..close];
        if content.trim().is_empty() {
            return false;
        }

        let end = close + INLINE_MARKER.len();
        let children = self.parse_nested(content);
        let node = match keyword::lookup(name) {
            KeywordKind::Bold => Node::bold(children).with_attribute("keyword", name),
            KeywordKind::Italic => Node::italic(children).with_attribute("keyword", name),
            KeywordKind::Div(Some(class)) => Node::block(name, children).with_attribute("class", class),
            KeywordKind::Unknown => {
                self.unknown.push(name.to_string());
                Node::block(name, children)
            }
            _ => Node::block(name, children),
        };
        self.push_span(node, end);
        true
    }
}

/// First occurrence of `pattern` at or after `from` that is not preceded by
/// an escaping backslash.
fn find_unescaped(bytes: &[u8], mut from: usize, pattern: &[u8]) -> Option<usize> {
    let (&first, _) = pattern.split_first()?;
    while let Some(offset) = memchr2(first, b'\\', bytes.get(from..)?) {
        let at = from + offset;
        if bytes[at] == b'\\' {
            // Continuation bytes are never ASCII, so skipping one byte is enough.
            from = at + 2;
        } else if bytes[at..].starts_with(pattern) {
            return Some(at);
        } else {
            from = at + 1;
        }
    }
    None
}
