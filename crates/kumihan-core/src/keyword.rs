//! Keyword vocabulary and block header parsing.
//!
//! A block open line looks like `;;;枠線+太字 id=intro color=#ffe` : one or
//! more `+`-joined keywords followed by `key=value` attributes. Every
//! keyword has a Japanese name and English aliases.

use crate::ast::AttrValue;

/// Prefix shared by block open, close and one-line block lines.
pub const BLOCK_MARKER: &str = ";;;";
/// Delimiter of inline keyword spans.
pub const INLINE_MARKER: &str = ";;";

/// What a keyword turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Heading(u8),
    Bold,
    Italic,
    /// `div` with an optional CSS class.
    Div(Option<&'static str>),
    Section,
    List { ordered: bool },
    /// No dedicated node type; rendered through the generic fallback.
    Unknown,
}

const KEYWORDS: &[(&str, KeywordKind)] = &[
    ("太字", KeywordKind::Bold),
    ("bold", KeywordKind::Bold),
    ("イタリック", KeywordKind::Italic),
    ("italic", KeywordKind::Italic),
    ("枠線", KeywordKind::Div(Some("box"))),
    ("box", KeywordKind::Div(Some("box"))),
    ("ハイライト", KeywordKind::Div(Some("highlight"))),
    ("highlight", KeywordKind::Div(Some("highlight"))),
    ("注意", KeywordKind::Div(Some("warning"))),
    ("warning", KeywordKind::Div(Some("warning"))),
    ("div", KeywordKind::Div(None)),
    ("セクション", KeywordKind::Section),
    ("section", KeywordKind::Section),
    ("リスト", KeywordKind::List { ordered: false }),
    ("list", KeywordKind::List { ordered: false }),
    ("番号付きリスト", KeywordKind::List { ordered: true }),
    ("ordered-list", KeywordKind::List { ordered: true }),
];

const HEADING_PREFIXES: &[&str] = &["見出し", "heading", "h"];

/// Resolve a keyword name.
pub fn lookup(name: &str) -> KeywordKind {
    if let Some(level) = heading_level(name) {
        return KeywordKind::Heading(level);
    }
    KEYWORDS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, kind)| *kind)
        .unwrap_or(KeywordKind::Unknown)
}

fn heading_level(name: &str) -> Option<u8> {
    HEADING_PREFIXES.iter().find_map(|prefix| {
        let digits = name.strip_prefix(prefix)?;
        match digits.parse::<u8>() {
            Ok(level @ 1..=6) => Some(level),
            _ => None,
        }
    })
}

/// A keyword as written plus its resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub name: String,
    pub kind: KeywordKind,
}

impl Keyword {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: lookup(name),
        }
    }
}

/// Parsed `;;;` open line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockHeader {
    /// Outermost first.
    pub keywords: Vec<Keyword>,
    pub attributes: Vec<(String, AttrValue)>,
    /// Attribute fragments that could not be parsed.
    pub problems: Vec<String>,
}

impl BlockHeader {
    /// The compound keyword as written, e.g. `枠線+太字`.
    pub fn label(&self) -> String {
        self.keywords
            .iter()
            .map(|k| k.name.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Split the text after `;;;` into the keyword token and the remainder.
pub fn split_keyword_spec(spec: &str) -> (&str, &str) {
    let spec = spec.trim();
    match spec.find(char::is_whitespace) {
        Some(pos) => (&spec[..pos], spec[pos..].trim_start()),
        None => (spec, ""),
    }
}

/// Parse `+`-joined keywords. A token containing `;` names no keyword.
pub fn parse_keywords(token: &str) -> Vec<Keyword> {
    if token.contains(';') {
        return Vec::new();
    }
    token
        .split('+')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Keyword::new)
        .collect()
}

/// Parse the text following `;;;` on an open line.
pub fn parse_header(spec: &str) -> BlockHeader {
    let (token, rest) = split_keyword_spec(spec);
    let mut header = BlockHeader {
        keywords: parse_keywords(token),
        ..BlockHeader::default()
    };
    parse_attributes(rest, &mut header);
    header
}

fn parse_attributes(s: &str, header: &mut BlockHeader) {
    let mut remaining = s.trim();
    while !remaining.is_empty() {
        let eq_pos = match remaining.find('=') {
            Some(p) => p,
            None => {
                header
                    .problems
                    .push(format!("expected key=value, found '{}'", remaining));
                break;
            }
        };

        let key = remaining[..eq_pos].trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            header
                .problems
                .push(format!("expected key=value, found '{}'", remaining));
            break;
        }
        remaining = remaining[eq_pos + 1..].trim_start();

        let raw = if let Some(quoted) = remaining.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => {
                    let raw = &remaining[..end + 2];
                    remaining = remaining[end + 2..].trim_start();
                    raw
                }
                None => {
                    header
                        .problems
                        .push(format!("unterminated quote in '{}'", key));
                    break;
                }
            }
        } else {
            let end = remaining
                .find(char::is_whitespace)
                .unwrap_or(remaining.len());
            let raw = &remaining[..end];
            remaining = remaining[end..].trim_start();
            raw
        };

        header
            .attributes
            .push((key.to_ascii_lowercase(), AttrValue::from_raw(raw)));
    }
}

/// Accepts `#rgb`, `#rrggbb` and plain alphabetic colour names.
pub fn is_valid_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit());
    }
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphabetic())
}
