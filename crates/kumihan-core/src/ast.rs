//! Document tree produced by the parser.
//!
//! There is a single node type, [`Node`], discriminated by a closed
//! [`NodeKind`]. Leaf text and child lists are the two arms of [`Content`],
//! so a node can never hold both. The tree is built once by the parser and
//! only read afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The closed set of node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Group of consecutive source lines.
    Paragraph,
    /// Section heading; carries a `level` attribute in 1..=6.
    Heading,
    /// Ordered or unordered list of `ListItem`s.
    List,
    ListItem,
    /// Generic keyword container: unknown block keywords and arbitrary
    /// inline keyword spans.
    Block,
    Bold,
    Italic,
    /// Leaf text.
    Text,
    Div,
    Section,
    /// A line mixing plain text and inline spans.
    Composite,
    /// Hyperlink; carries an `href` attribute.
    Link,
}

impl NodeKind {
    pub const ALL: [NodeKind; 12] = [
        NodeKind::Paragraph,
        NodeKind::Heading,
        NodeKind::List,
        NodeKind::ListItem,
        NodeKind::Block,
        NodeKind::Bold,
        NodeKind::Italic,
        NodeKind::Text,
        NodeKind::Div,
        NodeKind::Section,
        NodeKind::Composite,
        NodeKind::Link,
    ];

    /// The snake_case tag used in dumps and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::List => "list",
            NodeKind::ListItem => "list_item",
            NodeKind::Block => "block",
            NodeKind::Bold => "bold",
            NodeKind::Italic => "italic",
            NodeKind::Text => "text",
            NodeKind::Div => "div",
            NodeKind::Section => "section",
            NodeKind::Composite => "composite",
            NodeKind::Link => "link",
        }
    }

    /// Kinds that occupy their own line in rendered output.
    pub fn is_block_level(self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading
                | NodeKind::List
                | NodeKind::Div
                | NodeKind::Section
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a tag names no [`NodeKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNodeKind(pub String);

impl fmt::Display for UnknownNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node kind: {}", self.0)
    }
}

impl std::error::Error for UnknownNodeKind {}

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

/// Scalar attribute value. There is no null: a missing value is a missing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl AttrValue {
    /// Value of a user `key=value` pair, kept as written.
    ///
    /// Only one layer of matching quotes is removed; `007` stays `"007"`.
    /// Typed values are reserved for attributes the parser sets itself.
    pub fn from_raw(raw: &str) -> AttrValue {
        let unquoted = if raw.len() >= 2
            && ((raw.starts_with('"') && raw.ends_with('"'))
                || (raw.starts_with('\'') && raw.ends_with('\'')))
        {
            &raw[1..raw.len() - 1]
        } else {
            raw
        };

        AttrValue::Str(unquoted.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// Attributes in key order, so output is deterministic.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Either leaf text or an ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Children(Vec<Node>),
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub attributes: Attributes,
    pub content: Content,
}

impl Node {
    fn container(kind: NodeKind, children: Vec<Node>) -> Node {
        Node {
            kind,
            attributes: Attributes::new(),
            content: Content::Children(children),
        }
    }

    /// Leaf text node.
    pub fn text(content: impl Into<String>) -> Node {
        Node {
            kind: NodeKind::Text,
            attributes: Attributes::new(),
            content: Content::Text(content.into()),
        }
    }

    pub fn paragraph(lines: Vec<Node>) -> Node {
        Node::container(NodeKind::Paragraph, lines)
    }

    /// Heading at `level`, clamped into 1..=6.
    pub fn heading(level: u8, children: Vec<Node>) -> Node {
        Node::container(NodeKind::Heading, children)
            .with_attribute("level", i64::from(level.clamp(1, 6)))
    }

    pub fn list(ordered: bool, items: Vec<Node>) -> Node {
        let node = Node::container(NodeKind::List, items);
        if ordered {
            node.with_attribute("ordered", true)
        } else {
            node
        }
    }

    pub fn list_item(children: Vec<Node>) -> Node {
        Node::container(NodeKind::ListItem, children)
    }

    /// Generic keyword container.
    pub fn block(keyword: &str, children: Vec<Node>) -> Node {
        Node::container(NodeKind::Block, children).with_attribute("keyword", keyword)
    }

    pub fn bold(children: Vec<Node>) -> Node {
        Node::container(NodeKind::Bold, children)
    }

    pub fn italic(children: Vec<Node>) -> Node {
        Node::container(NodeKind::Italic, children)
    }

    pub fn div(children: Vec<Node>) -> Node {
        Node::container(NodeKind::Div, children)
    }

    pub fn section(children: Vec<Node>) -> Node {
        Node::container(NodeKind::Section, children)
    }

    pub fn composite(children: Vec<Node>) -> Node {
        Node::container(NodeKind::Composite, children)
    }

    pub fn link(href: &str, label: Vec<Node>) -> Node {
        Node::container(NodeKind::Link, label).with_attribute("href", href)
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: &str, value: impl Into<AttrValue>) -> Node {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// String attribute, if present and a string.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(AttrValue::as_str)
    }

    /// Children of a container; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match &self.content {
            Content::Children(children) => children,
            Content::Text(_) => &[],
        }
    }

    /// Leaf text, `None` for containers.
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            Content::Children(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.content, Content::Text(_))
    }

    /// Heading level, for heading nodes.
    pub fn level(&self) -> Option<u8> {
        if self.kind != NodeKind::Heading {
            return None;
        }
        self.attribute("level")
            .and_then(AttrValue::as_int)
            .and_then(|l| u8::try_from(l).ok())
    }

    /// Is this a bare source line (plain text or a line with inline spans)?
    pub fn is_line(&self) -> bool {
        matches!(self.kind, NodeKind::Text | NodeKind::Composite)
    }

    /// Concatenated leaf text of this subtree, with paragraph lines joined
    /// by a space.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.content {
            Content::Text(text) => out.push_str(text),
            Content::Children(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 && self.kind == NodeKind::Paragraph {
                        out.push(' ');
                    }
                    child.collect_text(out);
                }
            }
        }
    }

    /// Pre-order traversal of this node and all its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Pre-order traversal over a list of root nodes.
pub fn walk(nodes: &[Node]) -> impl Iterator<Item = &Node> {
    nodes.iter().flat_map(Node::descendants)
}
