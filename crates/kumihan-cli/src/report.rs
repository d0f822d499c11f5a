//! Diagnostic reporting through `codespan-reporting`.

use codespan_reporting::diagnostic::{Diagnostic as Report, Label, Severity as ReportSeverity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use kumihan_core::{Diagnostic, DiagnosticKind, Diagnostics, Severity};

/// Source files shown in reports.
pub struct Reporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl Reporter {
    pub fn new(no_color: bool) -> Self {
        let color_choice = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(color_choice),
            config: term::Config::default(),
        }
    }

    /// Register a source and return its id.
    pub fn add_file(&mut self, name: &str, source: &str) -> usize {
        self.files.add(name.to_string(), source.to_string())
    }

    /// Print every diagnostic of one file to stderr.
    pub fn emit(&self, file_id: usize, diagnostics: &Diagnostics) {
        for diagnostic in diagnostics {
            let report = to_report(file_id, diagnostic);
            let _ = term::emit_to_write_style(
                &mut self.writer.lock(),
                &self.config,
                &self.files,
                &report,
            );
        }
    }
}

fn to_report(file_id: usize, diagnostic: &Diagnostic) -> Report<usize> {
    let severity = match diagnostic.severity {
        Severity::Error => ReportSeverity::Error,
        Severity::Warning => ReportSeverity::Warning,
    };
    let label = match diagnostic.kind {
        DiagnosticKind::UnclosedBlock => "opened here",
        DiagnosticKind::UnmatchedClose => "nothing to close",
        _ => "here",
    };
    Report::new(severity)
        .with_message(&diagnostic.message)
        .with_code(diagnostic.kind.as_str())
        .with_labels(vec![
            Label::primary(file_id, diagnostic.span.range()).with_message(label)
        ])
}
