//! Mutation-based robustness checks.
//!
//! Realistic documents are damaged with seeded edits (a dropped close
//! marker, a truncated tail, a misspelled keyword, ...) and every variant
//! must still parse, render, and report diagnostics on real lines.

use kumihan_core::ast::walk;
use kumihan_core::{parse, render, NodeKind, Parser, TocAccumulator};

struct Lcg {
    state: u64,
}

const SEED: u64 = 0x5eed;
const MAX_MUTATION_STEPS: usize = 3;
const VARIANT_COUNT: usize = 32;

type MutationList = &'static [&'static str];

const MUTATIONS: MutationList = &[
    "drop_close",
    "duplicate_close",
    "drop_blank_line",
    "truncate_tail",
    "typo_keyword",
    "strip_list_dash",
    "whitespace_noise",
    "break_inline",
    "crlf",
];

const NOVEL: &str = "\
;;;見出し1
吾輩は猫である
;;;

吾輩は猫である。名前はまだ無い。
どこで生れたかとんと見当がつかぬ。

;;;見出し2 第一章;;;

;;;枠線+太字
何でも薄暗いじめじめした所で**ニャーニャー**泣いていた事だけは記憶している。
;;;

- 吾輩
- 書生
- 主人

;;;注意
この作品は*パブリックドメイン*です。詳しくは[[青空文庫|https://www.aozora.gr.jp/]]を参照。
;;;
";

const MANUAL: &str = "\
;;;見出し1 id=top
Kumihan manual
;;;

;;;セクション
;;;見出し2
Install
;;;
1. Download the archive
2. Unpack it
3. Run the binary

;;;ハイライト color=#ffe
Use ;;太字 bold;; and ;;ルビ 漢字;; spans inline.
;;;
;;;

;;;リスト
first
second
;;;枠線
nested box
;;;
;;;
";

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn choose(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }
}

fn floor_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn apply_mutations(mut input: String, rng: &mut Lcg) -> String {
    for _ in 0..MAX_MUTATION_STEPS {
        match MUTATIONS[rng.choose(MUTATIONS.len())] {
            "drop_close" => {
                if let Some(pos) = input.rfind("\n;;;\n") {
                    input.replace_range(pos..pos + 4, "");
                }
            }
            "duplicate_close" => {
                if let Some(pos) = input.find("\n;;;\n") {
                    input.insert_str(pos, "\n;;;");
                }
            }
            "drop_blank_line" => {
                if let Some(pos) = input.find("\n\n") {
                    input.replace_range(pos..pos + 2, "\n");
                }
            }
            "truncate_tail" => {
                let len = input.len();
                if len > 8 {
                    let cut = rng.choose(len / 4).max(1);
                    let end = floor_boundary(&input, len - cut);
                    input.truncate(end);
                }
            }
            "typo_keyword" => {
                if let Some(pos) = input.find(";;;見出し") {
                    input.replace_range(pos..pos + ";;;見出し".len(), ";;;見だし");
                }
            }
            "strip_list_dash" => {
                if let Some(pos) = input.find("- ") {
                    input.replace_range(pos..pos + 2, "");
                }
            }
            "whitespace_noise" => {
                input = input.replace("\n;;;", "\n \u{3000};;;");
            }
            "break_inline" => {
                if let Some(pos) = input.find("**") {
                    input.replace_range(pos..pos + 2, "*");
                }
            }
            "crlf" => {
                input = input.replace('\n', "\r\n");
            }
            _ => {}
        }
    }
    input
}

fn generate_variants(input: &str, seed: u64) -> Vec<String> {
    let mut rng = Lcg::new(seed);
    (0..VARIANT_COUNT)
        .map(|_| apply_mutations(input.to_string(), &mut rng))
        .collect()
}

fn check_variant(input: &str) {
    let result = parse(input);
    let line_count = input.lines().count().max(1);
    for diagnostic in &result.diagnostics {
        assert!(
            (1..=line_count).contains(&diagnostic.line),
            "diagnostic on line {} of {}: {}",
            diagnostic.line,
            line_count,
            diagnostic
        );
    }

    let mut strict = Parser::new();
    assert_eq!(strict.parse(input).is_ok(), result.success());

    let mut toc = TocAccumulator::new();
    let html = render(&result.nodes, &mut toc);
    let headings = walk(&result.nodes)
        .filter(|n| n.kind == NodeKind::Heading)
        .count();
    assert_eq!(toc.len(), headings);
    assert!(!html.contains("<script"));
}

#[test]
fn test_clean_documents_parse_without_errors() {
    for doc in [NOVEL, MANUAL] {
        let result = parse(doc);
        assert!(result.success(), "{:?}", result.diagnostics);
        assert!(!result.nodes.is_empty());
    }
}

#[test]
fn test_mutated_novel_recovers() {
    for variant in generate_variants(NOVEL, SEED) {
        check_variant(&variant);
    }
}

#[test]
fn test_mutated_manual_recovers() {
    for variant in generate_variants(MANUAL, SEED ^ 0xa5a5) {
        check_variant(&variant);
    }
}

#[test]
fn test_dropped_close_reports_opening_line() {
    let damaged = MANUAL.replacen(";;;\n\n;;;リスト", "\n;;;リスト", 1);
    let result = parse(&damaged);
    assert!(!result.success());
    let lines: Vec<_> = result.errors().map(|e| e.line).collect();
    assert!(lines.contains(&5), "{:?}", lines);
}
