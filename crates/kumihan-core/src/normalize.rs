//! Text utilities: input normalization, HTML entities, word counts, slugs.
//!
//! All functions are pure. The `Cow`-returning ones borrow their input when
//! nothing needs to change, which is the common case for clean documents.

use std::borrow::Cow;

use memchr::{memchr, memchr3};

const BOM: char = '\u{feff}';

/// Normalize a whole document before parsing.
///
/// Strips a leading byte-order mark, turns CRLF and lone CR into LF, and
/// removes trailing spaces and tabs from every line. Idempotent.
pub fn normalize_document(input: &str) -> Cow<'_, str> {
    if !needs_document_normalization(input) {
        return Cow::Borrowed(input);
    }

    let body = input.strip_prefix(BOM).unwrap_or(input);
    let unified = body.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    for (i, line) in unified.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.trim_end_matches([' ', '\t']));
    }
    Cow::Owned(out)
}

fn needs_document_normalization(input: &str) -> bool {
    if input.starts_with(BOM) || memchr(b'\r', input.as_bytes()).is_some() {
        return true;
    }
    input
        .split('\n')
        .any(|line| line.ends_with(' ') || line.ends_with('\t'))
}

/// Collapse every whitespace run (ideographic space included) into a single
/// ASCII space and trim both ends. Idempotent.
///
/// ```rust
/// use kumihan_core::normalize::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  見出し\u{3000}\tone  "), "見出し one");
/// ```
pub fn normalize_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Escape `&`, `<`, `>` and `"` for use in HTML text or attribute values.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    if memchr3(b'&', b'<', b'>', bytes).is_none() && memchr(b'"', bytes).is_none() {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decode named (`amp lt gt quot apos nbsp`) and numeric entities.
///
/// Anything that does not decode cleanly is kept verbatim.
pub fn unescape_html(s: &str) -> Cow<'_, str> {
    if memchr(b'&', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_entity(tail) {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode one entity at the start of `s` (which begins with `&`).
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let semi = s.get(..12).unwrap_or(s).find(';')?;
    let name = &s[1..semi];
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((c, semi + 1))
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309f}'     // hiragana
        | '\u{30a0}'..='\u{30ff}'   // katakana
        | '\u{3400}'..='\u{4dbf}'
        | '\u{4e00}'..='\u{9fff}'
        | '\u{f900}'..='\u{faff}'
        | '\u{ff66}'..='\u{ff9f}')  // half-width katakana
}

fn is_cjk_punctuation(c: char) -> bool {
    matches!(c, '\u{3000}'..='\u{303f}' | '\u{ff01}'..='\u{ff0f}')
}

/// Count words: whitespace-separated runs, with every CJK character
/// counted as a word of its own.
///
/// ```rust
/// use kumihan_core::normalize::count_words;
///
/// assert_eq!(count_words("hello world"), 2);
/// assert_eq!(count_words("日本語 text"), 4);
/// ```
pub fn count_words(s: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;
    for c in s.chars() {
        if c.is_whitespace() || is_cjk_punctuation(c) {
            in_word = false;
        } else if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if !in_word {
            count += 1;
            in_word = true;
        }
    }
    count
}

/// Anchor slug: lowercase alphanumerics (Unicode aware), every other run of
/// characters becomes a single `-`, no leading or trailing `-`.
///
/// ```rust
/// use kumihan_core::normalize::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("第1章 はじめに"), "第1章-はじめに");
/// ```
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut pending_dash = false;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
