//! Terminal reports for [`SitestackError`].
//!
//! Every failure is flattened into one or more [`Report`]s before miette
//! renders it. A parse error yields one report per diagnostic, each carrying
//! the template or output expression it points into; every other error yields
//! a single report tagged with a `sitestack::<category>` code.

use std::{error::Error as _, fmt};

use miette::{
    Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, Severity, SourceCode,
    SourceSpan,
};

use sitestack::SitestackError;
use sitestack_parser::{Span, error::Diagnostic};

/// A failure ready to be rendered by miette.
#[derive(Debug)]
pub struct Report<'a> {
    message: String,
    code: Option<String>,
    severity: Severity,
    help: Option<String>,
    source_text: Option<&'a str>,
    labels: Vec<LabeledSpan>,
    cause: Option<&'a (dyn std::error::Error + 'static)>,
}

impl<'a> Report<'a> {
    /// A parser diagnostic shown against the text it was raised for.
    pub fn from_diagnostic(diag: &Diagnostic, src: &'a str) -> Self {
        let labels = diag
            .labels()
            .iter()
            .map(|label| {
                let message = Some(label.message().to_string());
                let span = source_span(label.span());
                if label.is_primary() {
                    LabeledSpan::new_primary_with_span(message, span)
                } else {
                    LabeledSpan::new_with_span(message, span)
                }
            })
            .collect();

        Self {
            message: diag.message().to_string(),
            code: diag.code().map(|code| code.to_string()),
            severity: if diag.severity().is_warning() {
                Severity::Warning
            } else {
                Severity::Error
            },
            help: diag.help().map(str::to_string),
            source_text: Some(src),
            labels,
            cause: None,
        }
    }

    /// Any other error, without source text.
    pub fn from_error(err: &'a SitestackError) -> Self {
        Self {
            message: err.to_string(),
            code: category(err).map(str::to_string),
            severity: Severity::Error,
            help: hint(err).map(str::to_string),
            source_text: None,
            labels: Vec::new(),
            cause: err.source(),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Report<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.code
            .as_ref()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.source_text
            .as_ref()
            .map(|text| text as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.iter().cloned()))
        }
    }
}

/// Error code shown next to errors that carry no diagnostics of their own.
fn category(err: &SitestackError) -> Option<&'static str> {
    Some(match err {
        SitestackError::Io(_) => "sitestack::io",
        SitestackError::Parse { .. } => return None,
        SitestackError::InvalidConfiguration(_) => "sitestack::config",
        SitestackError::UnresolvedTokenReference { .. } => "sitestack::unresolved_token",
        SitestackError::CyclicDependency { .. } => "sitestack::cycle",
        SitestackError::Graph(_) => "sitestack::graph",
        SitestackError::Identity(_) => "sitestack::identity",
        SitestackError::Export(_) => "sitestack::export",
    })
}

fn hint(err: &SitestackError) -> Option<&'static str> {
    match err {
        SitestackError::Identity(_) => {
            Some("pass --account-id or configure AWS credentials for the STS lookup")
        }
        _ => None,
    }
}

fn source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Flatten `err` into reports, one per parse diagnostic.
pub fn reports(err: &SitestackError) -> Vec<Report<'_>> {
    match err {
        SitestackError::Parse { err: parse, src } => parse
            .diagnostics()
            .iter()
            .map(|diag| Report::from_diagnostic(diag, src))
            .collect(),
        _ => vec![Report::from_error(err)],
    }
}

/// Render `err` for the terminal.
///
/// A report miette fails to draw falls back to its plain message.
pub fn render(err: &SitestackError) -> Vec<String> {
    let handler = GraphicalReportHandler::new();
    reports(err)
        .iter()
        .map(|report| {
            let mut out = String::new();
            match handler.render_report(&mut out, report) {
                Ok(()) => out,
                Err(_) => report.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use sitestack_parser::error::{ErrorCode, ParseError};

    use super::*;

    #[test]
    fn test_each_diagnostic_is_reported() {
        let diags = vec![
            Diagnostic::error("unterminated placeholder")
                .with_code(ErrorCode::E001)
                .with_label(Span::new(0..5), "opened here"),
            Diagnostic::error("unknown placeholder `name`")
                .with_code(ErrorCode::E200)
                .with_label(Span::new(10..14), "not bound")
                .with_help("known placeholders: timestamp"),
        ];
        let err = SitestackError::new_parse_error(ParseError::new(diags), "{{ a   {{ name }}");

        let reports = reports(&err);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].to_string(), "unterminated placeholder");
        assert_eq!(
            reports[1].code().map(|code| code.to_string()).as_deref(),
            Some("E200")
        );
        assert!(reports[1].help().is_some());
        assert!(reports[1].source_code().is_some());
    }

    #[test]
    fn test_labels_keep_primary_flag() {
        let diag = Diagnostic::error("`cdn` is not a resource of this stack")
            .with_code(ErrorCode::E201)
            .with_label(Span::new(2..5), "unknown resource")
            .with_secondary_label(Span::new(0..18), "in this reference");

        let report = Report::from_diagnostic(&diag, "${cdn.domain_name}");

        let labels: Vec<_> = report.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert_eq!(labels[0].label(), Some("unknown resource"));
        assert!(!labels[1].primary());
        assert_eq!(labels[1].offset(), 0);
        assert_eq!(labels[1].len(), 18);
    }

    #[test]
    fn test_error_codes_by_category() {
        let err = SitestackError::InvalidConfiguration("bucket name must not be empty".into());
        let reports = reports(&err);

        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].to_string(),
            "Invalid configuration: bucket name must not be empty"
        );
        assert_eq!(
            reports[0].code().map(|code| code.to_string()).as_deref(),
            Some("sitestack::config")
        );
        assert!(reports[0].help().is_none());
        assert!(reports[0].labels().is_none());
    }

    #[test]
    fn test_identity_error_has_help() {
        let err = SitestackError::Identity(sitestack::identity::IdentityError::Lookup(
            "no credentials".into(),
        ));

        assert!(reports(&err)[0].help().is_some());
    }

    #[test]
    fn test_render_one_report_per_error() {
        let err = SitestackError::InvalidConfiguration("region must not be empty".into());
        let rendered = render(&err);

        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].contains("region must not be empty"));
    }
}
