//! Parser for content templates.
//!
//! Templates are literal text with `{{ name }}` placeholders. Whitespace
//! inside the braces is ignored. Every placeholder must name one of the
//! bindings the caller knows how to supply, may appear only once, and a
//! template needs at least one.

use std::collections::HashMap;

use log::debug;
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location},
    token::{literal, rest, take_until},
};

use sitestack_core::template::{Template, TemplatePart};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    is_identifier,
    span::Span,
};

/// Diagnostic context attached to template parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TemplateDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// Where the failing construct started.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<TemplateDiagnostic>>;

#[derive(Debug)]
enum Piece<'a> {
    Text(&'a str),
    Placeholder {
        body: &'a str,
        body_start: usize,
        span: Span,
    },
}

/// Literal text up to the next `{{`, or to the end of input.
fn text<'a>(input: &mut Input<'a>) -> IResult<'a, Piece<'a>> {
    alt((
        take_until(1.., "{{"),
        rest.verify(|s: &str| !s.is_empty()),
    ))
    .map(Piece::Text)
    .parse_next(input)
}

/// A `{{ ... }}` placeholder. Commits once `{{` is seen.
fn placeholder<'a>(input: &mut Input<'a>) -> IResult<'a, Piece<'a>> {
    let start = input.current_token_start();

    literal("{{").parse_next(input)?;
    let body_start = input.current_token_start();

    let body = cut_err(terminated(take_until(0.., "}}"), literal("}}")))
        .context(TemplateDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated placeholder",
            help: Some("close the placeholder with `}}`"),
            start,
        })
        .parse_next(input)?;

    let end = input.current_token_start();
    Ok(Piece::Placeholder {
        body,
        body_start,
        span: Span::new(start..end),
    })
}

/// Check a placeholder body and return its name.
fn placeholder_name(
    body: &str,
    body_start: usize,
    span: Span,
    known: &[&str],
) -> Result<String, Diagnostic> {
    let name = body.trim();
    if name.is_empty() {
        return Err(Diagnostic::error("empty placeholder")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
            .with_help("write a name between the braces, e.g. `{{ timestamp }}`"));
    }

    let name_start = body_start + (body.len() - body.trim_start().len());
    let name_span = Span::new(name_start..name_start + name.len());

    if !is_identifier(name) {
        return Err(Diagnostic::error(format!("invalid placeholder name `{name}`"))
            .with_code(ErrorCode::E003)
            .with_label(name_span, ErrorCode::E003.description())
            .with_help("names start with a letter or `_` and contain only letters, digits and `_`"));
    }

    if !known.contains(&name) {
        return Err(
            Diagnostic::error(format!("unknown template placeholder `{name}`"))
                .with_code(ErrorCode::E200)
                .with_label(name_span, "not a known placeholder")
                .with_secondary_label(span, "in this placeholder")
                .with_help(format!("known placeholders: {}", known.join(", "))),
        );
    }

    Ok(name.to_string())
}

/// Convert a winnow failure into a diagnostic running to the end of input.
fn convert_err_mode(err: ErrMode<ContextError<TemplateDiagnostic>>, end: usize) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    match context_error.context().next() {
        Some(TemplateDiagnostic {
            code,
            message,
            help,
            start,
        }) => {
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(Span::new(*start..end), code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            diag
        }
        None => Diagnostic::error("unexpected input")
            .with_code(ErrorCode::E001)
            .with_label(Span::new(end..end), "here"),
    }
}

/// Parse a content template.
///
/// `known` lists the placeholder names the caller binds when rendering.
/// All problems in the source are reported together.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying `E001`, `E002`, `E003`, `E200`,
/// `E203` or `E204` diagnostics.
///
/// # Example
///
/// ```
/// # use sitestack_parser::parse_template;
/// let template = parse_template("<h1>Hello {{ timestamp }}</h1>", &["timestamp"]).unwrap();
/// assert_eq!(template.placeholders().collect::<Vec<_>>(), ["timestamp"]);
/// ```
pub fn parse_template(source: &str, known: &[&str]) -> Result<Template, ParseError> {
    let mut input = LocatingSlice::new(source);
    let mut parts = Vec::new();
    let mut diagnostics = DiagnosticCollector::new();
    let mut has_placeholder = false;
    let mut first_use: HashMap<String, Span> = HashMap::new();

    while !input.is_empty() {
        match alt((placeholder, text)).parse_next(&mut input) {
            Ok(Piece::Text(text)) => parts.push(TemplatePart::Text(text.to_string())),
            Ok(Piece::Placeholder {
                body,
                body_start,
                span,
            }) => {
                has_placeholder = true;
                match placeholder_name(body, body_start, span, known) {
                    Ok(name) => match first_use.get(&name) {
                        Some(&first) => diagnostics.emit(
                            Diagnostic::error(format!("placeholder `{name}` is used more than once"))
                                .with_code(ErrorCode::E203)
                                .with_label(span, ErrorCode::E203.description())
                                .with_secondary_label(first, "first used here")
                                .with_help("keep a single substitution point"),
                        ),
                        None => {
                            first_use.insert(name.clone(), span);
                            parts.push(TemplatePart::Placeholder(name));
                        }
                    },
                    Err(diagnostic) => diagnostics.emit(diagnostic),
                }
            }
            Err(err) => {
                // Only an unterminated placeholder fails here; nothing after it can parse.
                diagnostics.emit(convert_err_mode(err, source.len()));
                break;
            }
        }
    }

    if !has_placeholder {
        diagnostics.emit(
            Diagnostic::error("template has no placeholders")
                .with_code(ErrorCode::E204)
                .with_label(Span::new(0..source.len()), ErrorCode::E204.description())
                .with_help(format!("known placeholders: {}", known.join(", "))),
        );
    }

    diagnostics.finish()?;

    let template = Template::new(parts);
    debug!(
        placeholders = template.placeholders().count();
        "Parsed content template"
    );
    Ok(template)
}
