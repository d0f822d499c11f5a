//! kumihan - Convert, lint and inspect Kumihan documents
//!
//! Usage:
//!   kumihan [OPTIONS] <COMMAND>
//!
//! Commands:
//!   convert   Render a document to an HTML page
//!   lint      Report diagnostics for one or more documents
//!   parse     Display the node tree (text outline or JSON)
//!   stats     Show document statistics

mod config;
mod error;
mod json;
mod report;
mod template;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use kumihan_core::ast::walk;
use kumihan_core::normalize::{count_words, normalize_document};
use kumihan_core::{generate_toc, render, render_toc, Node, NodeKind, ParseResult, TocAccumulator};

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::report::Reporter;

/// Path argument meaning standard input or standard output.
const STDIO: &str = "-";

#[derive(Parser)]
#[command(name = "kumihan", version, about = "Kumihan notation to HTML converter")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored diagnostic output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a document to an HTML page
    Convert(ConvertArgs),

    /// Report diagnostics for one or more documents
    Lint(LintArgs),

    /// Display the node tree
    Parse(ParseArgs),

    /// Show document statistics
    Stats(StatsArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Input file, or `-` for standard input
    input: String,

    /// Output file, or `-` for standard output [default: INPUT with .html]
    output: Option<String>,

    /// Page title
    #[arg(long)]
    title: Option<String>,

    /// Do not include a table of contents
    #[arg(long)]
    no_toc: bool,

    /// Write only the rendered body, without the page template
    #[arg(long)]
    body_only: bool,

    /// Fail without writing output if the document has parse errors
    #[arg(long)]
    strict: bool,

    /// Configuration file [default: ./kumihan.toml if present]
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct LintArgs {
    /// Files to check (`-` for standard input)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Fail on warnings as well as errors
    #[arg(long)]
    deny_warnings: bool,

    /// Configuration file [default: ./kumihan.toml if present]
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ParseArgs {
    /// Input file, or `-` for standard input
    input: String,

    /// Output JSON instead of a text outline
    #[arg(short, long)]
    json: bool,
}

#[derive(Args)]
struct StatsArgs {
    /// Input file, or `-` for standard input
    input: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert(args) => cmd_convert(args, cli.no_color),
        Command::Lint(args) => cmd_lint(args, cli.no_color),
        Command::Parse(args) => cmd_parse(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

/// A document read and normalized, ready for parsing.
struct Source {
    name: String,
    text: String,
}

impl Source {
    fn read(input: &str) -> Result<Source> {
        let raw = if input == STDIO {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Read {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            buf
        } else {
            fs::read_to_string(input).map_err(|source| CliError::Read {
                path: PathBuf::from(input),
                source,
            })?
        };

        let name = if input == STDIO { "<stdin>" } else { input };
        // Normalized once here so diagnostic spans match the text shown.
        Ok(Source {
            name: name.to_string(),
            text: normalize_document(&raw).into_owned(),
        })
    }

    fn parse(&self) -> ParseResult {
        kumihan_core::Parser::new()
            .with_normalization(false)
            .parse_with_recovery(&self.text)
    }

    /// Report diagnostics, if any, through `reporter`.
    fn report(&self, result: &ParseResult, reporter: &mut Reporter) {
        if result.diagnostics.is_empty() {
            return;
        }
        let file_id = reporter.add_file(&self.name, &self.text);
        reporter.emit(file_id, &result.diagnostics);
    }
}

// =============================================================================
// Convert Command
// =============================================================================

fn cmd_convert(args: ConvertArgs, no_color: bool) -> Result<()> {
    let output = match &args.output {
        Some(output) => output.clone(),
        None if args.input == STDIO => STDIO.to_string(),
        None => Path::new(&args.input)
            .with_extension("html")
            .to_string_lossy()
            .into_owned(),
    };
    if output != STDIO && Path::new(&output) == Path::new(&args.input) {
        return Err(CliError::OverwriteInput(PathBuf::from(output)));
    }

    let config = Config::load(args.config.as_deref())?;
    let source = Source::read(&args.input)?;
    let result = source.parse();

    let mut reporter = Reporter::new(no_color);
    source.report(&result, &mut reporter);

    let strict = args.strict || config.lint.strict;
    if strict && !result.success() {
        return Err(CliError::ParseFailed(result.diagnostics.error_count()));
    }

    let mut toc = TocAccumulator::new();
    let body = render(&result.nodes, &mut toc);

    let body_only = args.body_only || config.output.body_only;
    let html = if body_only {
        let mut body = body;
        if !body.is_empty() {
            body.push('\n');
        }
        body
    } else {
        let toc_html = if config.output.toc && !args.no_toc {
            render_toc(&generate_toc(toc.entries()))
        } else {
            String::new()
        };
        let title = args
            .title
            .or(config.output.title.clone())
            .or_else(|| toc.entries().first().map(|e| e.title.clone()))
            .unwrap_or_else(|| file_stem(&args.input));
        let page = template::Page {
            title: &title,
            lang: &config.output.lang,
            stylesheet: config.output.stylesheet.as_deref(),
            toc: &toc_html,
        };
        template::render_page(&page, &body)
    };

    write_output(&output, &html)?;

    log::info!(
        "converted {} ({} headings, {} errors, {} warnings)",
        source.name,
        toc.len(),
        result.diagnostics.error_count(),
        result.diagnostics.warning_count()
    );
    Ok(())
}

fn file_stem(input: &str) -> String {
    if input == STDIO {
        return "Untitled".to_string();
    }
    Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}

fn write_output(output: &str, html: &str) -> Result<()> {
    if output == STDIO {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(html.as_bytes())?;
        lock.flush()?;
        return Ok(());
    }
    fs::write(output, html).map_err(|source| CliError::Write {
        path: PathBuf::from(output),
        source,
    })?;
    log::debug!("wrote {}", output);
    Ok(())
}

// =============================================================================
// Lint Command
// =============================================================================

fn cmd_lint(args: LintArgs, no_color: bool) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let deny_warnings = args.deny_warnings || config.lint.deny_warnings;

    let mut reporter = Reporter::new(no_color);
    let mut errors = 0;
    let mut warnings = 0;

    for input in &args.inputs {
        let source = Source::read(input)?;
        let result = source.parse();
        source.report(&result, &mut reporter);
        errors += result.diagnostics.error_count();
        warnings += result.diagnostics.warning_count();
        log::debug!("{}: {} diagnostics", source.name, result.diagnostics.len());
    }

    if errors > 0 || (deny_warnings && warnings > 0) {
        return Err(CliError::Lint { errors, warnings });
    }

    eprintln!(
        "ok: {} file(s) checked, {} warning(s)",
        args.inputs.len(),
        warnings
    );
    Ok(())
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(args: ParseArgs) -> Result<()> {
    let source = Source::read(&args.input)?;
    let result = source.parse();

    if args.json {
        let doc = json::convert_result(&result);
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    for diagnostic in &result.diagnostics {
        eprintln!("{}: {}", source.name, diagnostic);
    }
    let mut out = String::new();
    for node in &result.nodes {
        write_outline(node, 0, &mut out);
    }
    print!("{}", out);
    Ok(())
}

fn write_outline(node: &Node, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(node.kind.as_str());
    for (key, value) in &node.attributes {
        out.push_str(&format!(" {}={}", key, value));
    }
    if let Some(text) = node.text_content() {
        out.push_str(&format!(" {:?}", text));
    }
    out.push('\n');
    for child in node.children() {
        write_outline(child, depth + 1, out);
    }
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(args: StatsArgs) -> Result<()> {
    let source = Source::read(&args.input)?;
    let result = source.parse();
    let stats = DocumentStats::from_result(&result, &source.text);

    println!("Document Statistics");
    println!("-------------------");
    println!("Content:");
    println!("  Headings:       {}", stats.headings);
    println!("  Paragraphs:     {}", stats.paragraphs);
    println!("  Lists:          {}", stats.lists);
    println!("  Keyword blocks: {}", stats.keyword_blocks);
    println!();
    println!("Nodes:");
    for (kind, count) in &stats.by_kind {
        println!("  {:<15} {}", format!("{}:", kind), count);
    }
    println!();
    println!("Size:");
    println!("  Characters:     {}", stats.chars);
    println!("  Words:          {}", stats.words);
    println!("  Lines:          {}", stats.lines);
    println!();
    println!("Errors:         {}", result.diagnostics.error_count());
    println!("Warnings:       {}", result.diagnostics.warning_count());

    Ok(())
}

struct DocumentStats {
    headings: usize,
    paragraphs: usize,
    lists: usize,
    keyword_blocks: usize,
    by_kind: BTreeMap<&'static str, usize>,
    chars: usize,
    words: usize,
    lines: usize,
}

impl DocumentStats {
    fn from_result(result: &ParseResult, text: &str) -> Self {
        let mut by_kind = BTreeMap::new();
        let mut keyword_blocks = 0;
        for node in walk(&result.nodes) {
            *by_kind.entry(node.kind.as_str()).or_insert(0) += 1;
            if node.attribute("keyword").is_some() {
                keyword_blocks += 1;
            }
        }
        let count = |kind: NodeKind| by_kind.get(kind.as_str()).copied().unwrap_or(0);

        let plain: Vec<String> = result.nodes.iter().map(Node::plain_text).collect();

        Self {
            headings: count(NodeKind::Heading),
            paragraphs: count(NodeKind::Paragraph),
            lists: count(NodeKind::List),
            keyword_blocks,
            chars: text.chars().count(),
            words: count_words(&plain.join(" ")),
            lines: text.lines().count(),
            by_kind,
        }
    }
}
