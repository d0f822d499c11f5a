//! HTML renderer.
//!
//! One exhaustive match over [`NodeKind`]; there is no registry of
//! per-type handlers. All text and attribute values are escaped. Block
//! level siblings are separated by a newline, inline siblings are
//! concatenated.

use std::fmt::Write as _;

use crate::ast::{AttrValue, Node, NodeKind};
use crate::normalize::escape_html;
use crate::toc::TocAccumulator;

/// Render `nodes` to an HTML fragment, recording headings into `toc`.
///
/// ```rust
/// use kumihan_core::{parse, render, TocAccumulator};
///
/// let result = parse("- item1\n- item2");
/// let mut toc = TocAccumulator::new();
/// assert_eq!(render(&result.nodes, &mut toc), "<ul><li>item1</li><li>item2</li></ul>");
/// ```
pub fn render(nodes: &[Node], toc: &mut TocAccumulator) -> String {
    let mut out = String::with_capacity(nodes.len() * 64);
    Renderer { toc }.render_siblings(nodes, &mut out);
    out
}

/// Render without keeping the table of contents.
pub fn render_html(nodes: &[Node]) -> String {
    render(nodes, &mut TocAccumulator::new())
}

/// Link targets allowed through as-is. Anything else becomes `#`.
fn is_safe_href(href: &str) -> bool {
    let href = href.trim();
    match href.find(':') {
        Some(colon) => {
            let scheme = &href[..colon];
            // A colon after a path or query separator is not a scheme.
            if scheme.contains(['/', '?', '#']) {
                return true;
            }
            matches!(
                scheme.to_ascii_lowercase().as_str(),
                "http" | "https" | "mailto"
            )
        }
        None => true,
    }
}

struct Renderer<'t> {
    toc: &'t mut TocAccumulator,
}

impl Renderer<'_> {
    fn render_siblings(&mut self, nodes: &[Node], out: &mut String) {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 && (node.kind.is_block_level() || nodes[i - 1].kind.is_block_level()) {
                out.push('\n');
            }
            self.render_node(node, out);
        }
    }

    fn render_node(&mut self, node: &Node, out: &mut String) {
        match node.kind {
            NodeKind::Text => {
                out.push_str(&escape_html(node.text_content().unwrap_or_default()));
            }
            NodeKind::Composite => {
                for child in node.children() {
                    self.render_node(child, out);
                }
            }
            NodeKind::Paragraph => {
                out.push_str("<p");
                write_attributes(node, &[], out);
                out.push('>');
                for (i, line) in node.children().iter().enumerate() {
                    if i > 0 {
                        out.push_str("<br>\n");
                    }
                    self.render_node(line, out);
                }
                out.push_str("</p>");
            }
            NodeKind::Heading => self.render_heading(node, out),
            NodeKind::List => {
                let ordered = node
                    .attribute("ordered")
                    .and_then(AttrValue::as_bool)
                    .unwrap_or(false);
                let tag = if ordered { "ol" } else { "ul" };
                out.push('<');
                out.push_str(tag);
                if let Some(start) = node.attribute("start").and_then(AttrValue::as_int) {
                    let _ = write!(out, " start=\"{}\"", start);
                }
                write_attributes(node, &["ordered", "start"], out);
                out.push('>');
                for item in node.children() {
                    self.render_node(item, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            NodeKind::ListItem => self.render_element("li", node, &[], out),
            NodeKind::Bold => self.render_element("strong", node, &[], out),
            NodeKind::Italic => self.render_element("em", node, &[], out),
            NodeKind::Link => {
                let href = node.attr_str("href").unwrap_or("#");
                let href = if is_safe_href(href) { href } else { "#" };
                out.push_str("<a href=\"");
                out.push_str(&escape_html(href));
                out.push('"');
                write_attributes(node, &["href"], out);
                out.push('>');
                self.render_children(node, out);
                out.push_str("</a>");
            }
            NodeKind::Div => self.render_element("div", node, &[], out),
            NodeKind::Section => self.render_element("section", node, &[], out),
            NodeKind::Block => {
                // `<span>` cannot hold paragraphs or lists.
                let tag = if node.children().iter().any(|c| c.kind.is_block_level()) {
                    "div"
                } else {
                    "span"
                };
                self.render_element(tag, node, &[], out);
            }
        }
    }

    fn render_children(&mut self, node: &Node, out: &mut String) {
        self.render_siblings(node.children(), out);
    }

    fn render_element(&mut self, tag: &str, node: &Node, skip: &[&str], out: &mut String) {
        out.push('<');
        out.push_str(tag);
        write_attributes(node, skip, out);
        out.push('>');
        self.render_children(node, out);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    fn render_heading(&mut self, node: &Node, out: &mut String) {
        let level = node.level().unwrap_or(1);
        let anchor = self
            .toc
            .record(level, &node.plain_text(), node.attr_str("id"));

        let _ = write!(out, "<h{} id=\"{}\"", level, escape_html(&anchor));
        write_attributes(node, &["level", "id"], out);
        out.push('>');
        self.render_children(node, out);
        let _ = write!(out, "</h{}>", level);
    }
}

/// Write `id`, `class`, `style` and `data-*` attributes.
///
/// `keyword` is written for `block` nodes only. `color` becomes an inline
/// background colour; every other attribute that is not a plain HTML one
/// is exposed as `data-<key>`.
fn write_attributes(node: &Node, skip: &[&str], out: &mut String) {
    for (key, value) in &node.attributes {
        if skip.contains(&key.as_str()) {
            continue;
        }
        if key == "keyword" && node.kind != NodeKind::Block {
            continue;
        }
        let value = value.to_string();
        match key.as_str() {
            "id" | "class" => {
                let _ = write!(out, " {}=\"{}\"", key, escape_html(&value));
            }
            "color" => {
                let _ = write!(
                    out,
                    " style=\"background-color:{}\"",
                    escape_html(&value)
                );
            }
            _ => {
                let _ = write!(out, " data-{}=\"{}\"", data_key(key), escape_html(&value));
            }
        }
    }
}

/// Attribute keys reduced to characters valid in an HTML attribute name.
fn data_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
