//! Turns a [`SequinError`] into miette reports.
//!
//! A parse failure becomes one [`Report`] per parser diagnostic, pointing
//! into the diagram source. Every other failure becomes a single report with
//! a `sequin::<kind>` code and a hint for the user.

use std::fmt;

use miette::{
    Diagnostic as MietteDiagnostic, LabeledSpan, Severity as MietteSeverity, SourceSpan,
};

use sequin::SequinError;
use sequin_parser::{
    Span,
    error::{Diagnostic, Severity},
};

/// One rendered problem: a message with its code, hint and source labels.
#[derive(Debug)]
pub struct Report<'a> {
    message: String,
    code: String,
    help: Option<String>,
    severity: MietteSeverity,
    labels: Vec<LabeledSpan>,
    src: Option<&'a str>,
}

impl<'a> Report<'a> {
    /// Builds a report for a parser diagnostic found in `src`.
    ///
    /// Diagnostics without their own help fall back to the description of
    /// their error code.
    pub fn from_diagnostic(diag: &Diagnostic, src: &'a str) -> Self {
        let help = diag
            .help()
            .map(str::to_string)
            .or_else(|| diag.code().map(|code| code.description().to_string()));
        let severity = match diag.severity() {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        };

        Self {
            message: diag.message().to_string(),
            code: diag
                .code()
                .map_or_else(|| "sequin::parse".to_string(), |code| code.to_string()),
            help,
            severity,
            labels: diag
                .labels()
                .iter()
                .map(|label| {
                    let message = Some(label.message().to_string());
                    let span = to_source_span(label.span());
                    if label.is_primary() {
                        LabeledSpan::new_primary_with_span(message, span)
                    } else {
                        LabeledSpan::new_with_span(message, span)
                    }
                })
                .collect(),
            src: Some(src),
        }
    }

    fn without_source(err: &SequinError, code: &str, help: &str) -> Self {
        Self {
            message: err.to_string(),
            code: code.to_string(),
            help: Some(help.to_string()),
            severity: MietteSeverity::Error,
            labels: Vec::new(),
            src: None,
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Report<'_> {}

impl MietteDiagnostic for Report<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(self.severity)
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'b>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|src| src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.labels.iter().cloned()))
    }
}

fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Splits `err` into the reports to print, in order.
pub fn reports(err: &SequinError) -> Vec<Report<'_>> {
    match err {
        SequinError::Parse { err: parse_err, src } => parse_err
            .diagnostics()
            .iter()
            .map(|diag| Report::from_diagnostic(diag, src))
            .collect(),
        SequinError::Io(_) => vec![Report::without_source(
            err,
            "sequin::io",
            "check that the input exists and the output directory is writable",
        )],
        SequinError::Config(_) => vec![Report::without_source(
            err,
            "sequin::config",
            "colours accept CSS syntax, e.g. `#336699` or `steelblue`",
        )],
        SequinError::Layout(_) => vec![Report::without_source(
            err,
            "sequin::layout",
            "every agent a stage names must be listed exactly once",
        )],
        SequinError::Export(_) => vec![Report::without_source(
            err,
            "sequin::export",
            "the SVG could not be written to its destination",
        )],
    }
}
