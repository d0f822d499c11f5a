//! Table of contents.
//!
//! Entries are recorded while the renderer walks the tree, so every heading
//! gets exactly one anchor and the TOC links match the rendered ids. A
//! [`TocAccumulator`] is owned by one render call; renders on separate
//! threads use separate accumulators and concatenate their entries.

use std::collections::HashMap;

use crate::ast::{walk, Node, NodeKind};
use crate::normalize::{escape_html, normalize_whitespace, slugify};

/// One heading as seen by the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// 1..=6.
    pub level: u8,
    /// Whitespace-normalized heading text.
    pub title: String,
    /// Unique anchor id within the document.
    pub anchor: String,
}

/// Collects headings in document order and hands out unique anchors.
#[derive(Debug, Default)]
pub struct TocAccumulator {
    entries: Vec<TocEntry>,
    used: HashMap<String, usize>,
}

impl TocAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heading and return its anchor.
    ///
    /// An explicit id wins over the slug of the title. Titles that slug to
    /// nothing get `heading-N`. Repeats get `-1`, `-2`, ... appended.
    pub fn record(&mut self, level: u8, title: &str, explicit_id: Option<&str>) -> String {
        let title = normalize_whitespace(title);
        let base = match explicit_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let slug = slugify(&title);
                if slug.is_empty() {
                    format!("heading-{}", self.entries.len() + 1)
                } else {
                    slug
                }
            }
        };
        let anchor = self.unique(base);

        self.entries.push(TocEntry {
            level: level.clamp(1, 6),
            title,
            anchor: anchor.clone(),
        });
        anchor
    }

    fn unique(&mut self, base: String) -> String {
        let mut anchor = base.clone();
        while let Some(count) = self.used.get_mut(&anchor) {
            *count += 1;
            anchor = format!("{}-{}", base, count);
        }
        self.used.insert(anchor.clone(), 0);
        anchor
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TocEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collect TOC entries straight from a tree, without rendering it.
///
/// Anchors are assigned exactly as [`crate::render::render`] assigns them.
pub fn collect_toc_entries(nodes: &[Node]) -> Vec<TocEntry> {
    let mut toc = TocAccumulator::new();
    for node in walk(nodes).filter(|n| n.kind == NodeKind::Heading) {
        toc.record(
            node.level().unwrap_or(1),
            &node.plain_text(),
            node.attr_str("id"),
        );
    }
    toc.into_entries()
}

/// A TOC entry and the entries nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocNode {
    pub entry: TocEntry,
    pub children: Vec<TocNode>,
}

/// Hierarchical table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocTree {
    pub roots: Vec<TocNode>,
}

impl TocTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Entries in document order.
    pub fn flatten(&self) -> Vec<&TocEntry> {
        fn visit<'a>(nodes: &'a [TocNode], out: &mut Vec<&'a TocEntry>) {
            for node in nodes {
                out.push(&node.entry);
                visit(&node.children, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.roots, &mut out);
        out
    }
}

/// Nest entries by level.
///
/// Each entry becomes a child of the nearest preceding entry with a smaller
/// level; an entry with no such predecessor is a root. Skipped levels are
/// not filled in.
pub fn generate_toc(entries: &[TocEntry]) -> TocTree {
    // Open path from a root down to the most recent entry.
    let mut stack: Vec<TocNode> = Vec::new();
    let mut roots = Vec::new();

    for entry in entries {
        while stack.last().is_some_and(|top| top.entry.level >= entry.level) {
            close_top(&mut stack, &mut roots);
        }
        stack.push(TocNode {
            entry: entry.clone(),
            children: Vec::new(),
        });
    }
    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    TocTree { roots }
}

fn close_top(stack: &mut Vec<TocNode>, roots: &mut Vec<TocNode>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

/// Render the tree as nested `<ul class="toc">` lists.
///
/// Returns an empty string for an empty tree.
pub fn render_toc(tree: &TocTree) -> String {
    if tree.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    write_level(&tree.roots, true, &mut out);
    out
}

fn write_level(nodes: &[TocNode], top: bool, out: &mut String) {
    out.push_str(if top { "<ul class=\"toc\">\n" } else { "<ul>\n" });
    for node in nodes {
        out.push_str("<li><a href=\"#");
        out.push_str(&escape_html(&node.entry.anchor));
        out.push_str("\">");
        out.push_str(&escape_html(&node.entry.title));
        out.push_str("</a>");
        if !node.children.is_empty() {
            out.push('\n');
            write_level(&node.children, false, out);
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
}
