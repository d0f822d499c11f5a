//! Integration tests for table of contents generation

use kumihan_core::toc::collect_toc_entries;
use kumihan_core::{generate_toc, parse, render, render_toc, TocAccumulator, TocEntry};

fn entry(level: u8, title: &str) -> TocEntry {
    TocEntry {
        level,
        title: title.to_string(),
        anchor: title.to_lowercase(),
    }
}

fn titles(entries: &[&TocEntry]) -> Vec<String> {
    entries.iter().map(|e| e.title.clone()).collect()
}

#[test]
fn test_toc_single_heading() {
    let result = parse(";;;見出し1\nTitle\n;;;\nSome text");
    let mut toc = TocAccumulator::new();
    render(&result.nodes, &mut toc);

    let tree = generate_toc(toc.entries());
    assert_eq!(tree.roots.len(), 1);
    assert_eq!(tree.roots[0].entry.level, 1);
    assert_eq!(tree.roots[0].entry.title, "Title");
    assert!(tree.roots[0].children.is_empty());
}

#[test]
fn test_toc_nesting() {
    let tree = generate_toc(&[
        entry(1, "A"),
        entry(2, "B"),
        entry(2, "C"),
        entry(1, "D"),
        entry(2, "E"),
    ]);
    assert_eq!(tree.roots.len(), 2);
    assert_eq!(tree.roots[0].children.len(), 2);
    assert_eq!(tree.roots[1].children.len(), 1);
    assert_eq!(tree.roots[1].children[0].entry.title, "E");
}

#[test]
fn test_toc_skipped_levels() {
    let tree = generate_toc(&[entry(1, "A"), entry(3, "B"), entry(2, "C")]);
    assert_eq!(tree.roots.len(), 1);
    let a = &tree.roots[0];
    assert_eq!(a.children.len(), 2);
    assert_eq!(a.children[0].entry.title, "B");
    assert_eq!(a.children[1].entry.title, "C");
}

#[test]
fn test_toc_starting_below_top_level() {
    let tree = generate_toc(&[entry(3, "deep"), entry(1, "top"), entry(2, "sub")]);
    assert_eq!(tree.roots.len(), 2);
    assert_eq!(tree.roots[0].entry.title, "deep");
    assert_eq!(tree.roots[1].children[0].entry.title, "sub");
}

#[test]
fn test_toc_empty() {
    let tree = generate_toc(&[]);
    assert!(tree.is_empty());
    assert_eq!(render_toc(&tree), "");
}

#[test]
fn test_toc_flatten_preserves_document_order() {
    let entries = vec![
        entry(2, "a"),
        entry(1, "b"),
        entry(3, "c"),
        entry(2, "d"),
        entry(1, "e"),
    ];
    let tree = generate_toc(&entries);
    assert_eq!(titles(&tree.flatten()), vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn test_toc_collect_matches_render() {
    let input = ";;;見出し1 Intro;;;\ntext\n;;;枠線\n;;;見出し2 Intro;;;\n;;;\n;;;見出し2 id=x\nOther\n;;;";
    let result = parse(input);
    let mut toc = TocAccumulator::new();
    render(&result.nodes, &mut toc);

    let collected = collect_toc_entries(&result.nodes);
    assert_eq!(collected, toc.entries());
    let anchors: Vec<_> = collected.iter().map(|e| e.anchor.as_str()).collect();
    assert_eq!(anchors, vec!["intro", "intro-1", "x"]);
}

#[test]
fn test_toc_title_is_normalized() {
    let result = parse(";;;見出し1\n**Bold**   title\n;;;");
    let entries = collect_toc_entries(&result.nodes);
    assert_eq!(entries[0].title, "Bold title");
}

#[test]
fn test_render_toc_html() {
    let tree = generate_toc(&[entry(1, "A"), entry(2, "B")]);
    assert_eq!(
        render_toc(&tree),
        "<ul class=\"toc\">\n<li><a href=\"#a\">A</a>\n<ul>\n<li><a href=\"#b\">B</a></li>\n</ul>\n</li>\n</ul>\n"
    );
}

#[test]
fn test_render_toc_escapes_titles() {
    let tree = generate_toc(&[TocEntry {
        level: 1,
        title: "<T&C>".to_string(),
        anchor: "t-c".to_string(),
    }]);
    assert!(render_toc(&tree).contains("<a href=\"#t-c\">&lt;T&amp;C&gt;</a>"));
}
