use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const DOCUMENT: &str = ";;;見出し1\nTitle\n;;;\n\nSome **bold** text.\n\n- one\n- two\n";

fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ============================================================================
// convert
// ============================================================================

#[test]
fn convert_body_only_to_stdout() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.txt", DOCUMENT);

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert").arg(&input).arg("-").arg("--body-only");

    cmd.assert().success().stdout(
        predicate::str::contains("<h1 id=\"title\">Title</h1>")
            .and(predicate::str::contains("<strong>bold</strong>"))
            .and(predicate::str::contains("<ul><li>one</li><li>two</li></ul>"))
            .and(predicate::str::contains("<html").not()),
    );
}

#[test]
fn convert_writes_page_next_to_input() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.txt", DOCUMENT);

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert").arg(&input);
    cmd.assert().success();

    let html = read(&dir.path().join("doc.html"));
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<html lang=\"ja\">"));
    assert!(html.contains("<title>Title</title>"));
    assert!(html.contains("<nav class=\"toc-nav\">"));
    assert!(html.contains("<a href=\"#title\">Title</a>"));
}

#[test]
fn convert_without_toc() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.txt", DOCUMENT);
    let output = dir.path().join("out.html");

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert")
        .arg(&input)
        .arg(&output)
        .arg("--no-toc")
        .arg("--title")
        .arg("Custom & Title");
    cmd.assert().success();

    let html = read(&output);
    assert!(!html.contains("<nav"));
    assert!(html.contains("<title>Custom &amp; Title</title>"));
}

#[test]
fn convert_title_falls_back_to_file_stem() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "chapter1.txt", "no headings here\n");

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert").arg(&input).arg("-");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<title>chapter1</title>"));
}

#[test]
fn convert_from_stdin() {
    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert")
        .arg("-")
        .arg("--body-only")
        .write_stdin("- item1\n- item2\n");

    cmd.assert()
        .success()
        .stdout("<ul><li>item1</li><li>item2</li></ul>\n");
}

#[test]
fn convert_recovers_from_errors_by_default() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "broken.txt", ";;;太字\nline\n");
    let output = dir.path().join("broken.html");

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("--no-color")
        .arg("convert")
        .arg(&input)
        .arg(&output)
        .arg("--body-only");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("never closed"));
    assert_eq!(read(&output), "<strong>line</strong>\n");
}

#[test]
fn convert_strict_refuses_broken_input() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "broken.txt", ";;;太字\nline\n");
    let output = dir.path().join("broken.html");

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("--no-color")
        .arg("convert")
        .arg(&input)
        .arg(&output)
        .arg("--strict");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unclosed-block"));
    assert!(!output.exists());
}

#[test]
fn convert_reads_config_file() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.txt", DOCUMENT);
    let config = write_doc(
        &dir,
        "kumihan.toml",
        "[output]\ntitle = \"Configured\"\nlang = \"en\"\nstylesheet = \"book.css\"\n",
    );

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert")
        .arg(&input)
        .arg("-")
        .arg("--config")
        .arg(&config);

    cmd.assert().success().stdout(
        predicate::str::contains("<title>Configured</title>")
            .and(predicate::str::contains("<html lang=\"en\">"))
            .and(predicate::str::contains("href=\"book.css\"")),
    );
}

#[test]
fn convert_rejects_invalid_config() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.txt", DOCUMENT);
    let config = write_doc(&dir, "bad.toml", "[output]\ntoc = \"maybe\"\n");

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert").arg(&input).arg("--config").arg(&config);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn convert_refuses_to_overwrite_input() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "page.html", DOCUMENT);

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert").arg(&input);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("would overwrite the input"));
    assert_eq!(read(&input), DOCUMENT);

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert").arg(&input).arg(&input);
    cmd.assert().failure().code(1);
    assert_eq!(read(&input), DOCUMENT);

    let output = dir.path().join("out.html");
    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert").arg(&input).arg(&output);
    cmd.assert().success();
    assert!(read(&output).contains("<h1 id=\"title\">Title</h1>"));
}

#[test]
fn convert_missing_input() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("convert").arg(dir.path().join("missing.txt"));

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

// ============================================================================
// lint
// ============================================================================

#[test]
fn lint_clean_files() {
    let dir = tempdir().unwrap();
    let a = write_doc(&dir, "a.txt", DOCUMENT);
    let b = write_doc(&dir, "b.txt", "plain\n");

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("lint").arg(&a).arg(&b);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("2 file(s) checked"));
}

#[test]
fn lint_reports_errors_with_location() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "bad.txt", "text\n;;;\n");

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("--no-color").arg("lint").arg(&input);

    cmd.assert().failure().code(1).stderr(
        predicate::str::contains("unmatched-close")
            .and(predicate::str::contains("bad.txt:2:1"))
            .and(predicate::str::contains("1 error(s)")),
    );
}

#[test]
fn lint_warnings_pass_unless_denied() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "warn.txt", ";;;ルビ\n漢字\n;;;\n");

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("--no-color").arg("lint").arg(&input);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("unknown keyword 'ルビ'"));

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("--no-color")
        .arg("lint")
        .arg(&input)
        .arg("--deny-warnings");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("1 warning(s)"));
}

#[test]
fn lint_requires_input() {
    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("lint");
    cmd.assert().failure().code(2);
}

// ============================================================================
// parse / stats
// ============================================================================

#[test]
fn parse_prints_outline() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.txt", DOCUMENT);

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("parse").arg(&input);

    cmd.assert().success().stdout(
        predicate::str::starts_with("heading keyword=見出し1 level=1\n  text \"Title\"\n")
            .and(predicate::str::contains("list\n  list_item\n    text \"one\"")),
    );
}

#[test]
fn parse_json_output() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.txt", DOCUMENT);

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("parse").arg(&input).arg("--json");
    let output = cmd.assert().success().get_output().stdout.clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["nodes"][0]["type"], "heading");
    assert_eq!(value["nodes"][1]["type"], "paragraph");
    assert_eq!(value["nodes"][2]["type"], "list");
    assert!(value["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn stats_counts_nodes() {
    let dir = tempdir().unwrap();
    let input = write_doc(&dir, "doc.txt", DOCUMENT);

    let mut cmd = cargo_bin_cmd!("kumihan");
    cmd.arg("stats").arg(&input);

    cmd.assert().success().stdout(
        predicate::str::contains("Headings:       1")
            .and(predicate::str::contains("Lists:          1"))
            .and(predicate::str::contains("list_item:      2"))
            .and(predicate::str::contains("Errors:         0")),
    );
}
