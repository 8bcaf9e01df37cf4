//! Parser for reference expressions.
//!
//! An expression is literal text with `${node.attribute}` references to
//! attributes of other resources, e.g. `https://${website_distribution.domain_name}/`.
//! `$${` writes a literal `${`.

use log::debug;
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, not, peek, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location},
    token::{literal, take_till},
};

use sitestack_core::{
    expr::Expr,
    identifier::Id,
    resource::ResourceKind,
    token::{Attribute, Token},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    is_identifier,
    span::{Span, Spanned},
};

/// Diagnostic context attached to expression parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExpressionDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<ExpressionDiagnostic>>;

#[derive(Debug)]
enum Piece<'a> {
    Text(&'a str),
    Reference {
        body: &'a str,
        body_start: usize,
        span: Span,
    },
}

/// A parsed expression with the location of each reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    expr: Expr,
    references: Vec<Spanned<Token>>,
}

impl ParsedExpression {
    /// The expression, ready to be resolved.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Every reference with the span of its `${...}`.
    pub fn references(&self) -> &[Spanned<Token>] {
        &self.references
    }
}

/// Literal text, an escaped `$${`, or a `$` that does not open a reference.
fn text<'a>(input: &mut Input<'a>) -> IResult<'a, Piece<'a>> {
    alt((
        literal("$${").value("${"),
        take_till(1.., '$'),
        terminated(literal("$"), peek(not('{'))),
    ))
    .map(Piece::Text)
    .parse_next(input)
}

/// A `${...}` reference. Commits once `${` is seen.
fn reference<'a>(input: &mut Input<'a>) -> IResult<'a, Piece<'a>> {
    let start = input.current_token_start();

    literal("${").parse_next(input)?;
    let body_start = input.current_token_start();

    let body = cut_err(terminated(take_till(0.., '}'), '}'))
        .context(ExpressionDiagnostic {
            code: ErrorCode::E100,
            message: "unterminated reference",
            help: Some("close the reference with `}`"),
            start,
        })
        .parse_next(input)?;

    let end = input.current_token_start();
    Ok(Piece::Reference {
        body,
        body_start,
        span: Span::new(start..end),
    })
}

/// Check a reference body and build its token.
fn reference_token(body: &str, body_start: usize, span: Span) -> Result<Token, Diagnostic> {
    let malformed = || {
        Diagnostic::error(format!("malformed reference `${{{body}}}`"))
            .with_code(ErrorCode::E101)
            .with_label(span, ErrorCode::E101.description())
            .with_help("write references as `${node.attribute}`, e.g. `${website_distribution.domain_name}`")
    };

    let (node, attribute) = body.split_once('.').ok_or_else(malformed)?;
    if !is_identifier(node) || !is_identifier(attribute) {
        return Err(malformed());
    }

    let attribute_start = body_start + node.len() + 1;
    let attribute = attribute.parse::<Attribute>().map_err(|_| {
        let known: Vec<&str> = Attribute::ALL.iter().map(Attribute::as_str).collect();
        Diagnostic::error(format!("unknown attribute `{attribute}`"))
            .with_code(ErrorCode::E102)
            .with_label(
                Span::new(attribute_start..attribute_start + attribute.len()),
                ErrorCode::E102.description(),
            )
            .with_help(format!("known attributes: {}", known.join(", ")))
    })?;

    Ok(Token::new(Id::new(node), attribute))
}

fn convert_err_mode(err: ErrMode<ContextError<ExpressionDiagnostic>>, end: usize) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    match context_error.context().next() {
        Some(ExpressionDiagnostic {
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
            .with_code(ErrorCode::E101)
            .with_label(Span::new(end..end), "here"),
    }
}

/// Parse a reference expression.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying `E100`, `E101` or `E102` diagnostics.
///
/// # Example
///
/// ```
/// # use sitestack_parser::parse_expression;
/// let parsed = parse_expression("https://${website_distribution.domain_name}/").unwrap();
/// assert_eq!(parsed.references().len(), 1);
/// assert_eq!(
///     parsed.expr().to_string(),
///     "https://${TOKEN[website_distribution.domain_name]}/"
/// );
/// ```
pub fn parse_expression(source: &str) -> Result<ParsedExpression, ParseError> {
    let mut input = LocatingSlice::new(source);
    let mut expr = Expr::default();
    let mut references = Vec::new();
    let mut diagnostics = DiagnosticCollector::new();

    while !input.is_empty() {
        match alt((reference, text)).parse_next(&mut input) {
            Ok(Piece::Text(text)) => expr = expr.with_literal(text),
            Ok(Piece::Reference {
                body,
                body_start,
                span,
            }) => match reference_token(body, body_start, span) {
                Ok(token) => {
                    expr = expr.with_token(token);
                    references.push(Spanned::new(token, span));
                }
                Err(diagnostic) => diagnostics.emit(diagnostic),
            },
            Err(err) => {
                diagnostics.emit(convert_err_mode(err, source.len()));
                break;
            }
        }
    }

    diagnostics.finish()?;

    debug!(references = references.len(); "Parsed reference expression");
    Ok(ParsedExpression { expr, references })
}

/// Check every reference of `expression` against the resources of a stack.
///
/// `kind_of` returns the kind of a declared node, or `None` if no node has
/// that name.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying `E201` for references to undeclared
/// resources and `E202` for attributes the referenced kind does not export.
pub fn check_references(
    expression: &ParsedExpression,
    kind_of: impl Fn(Id) -> Option<ResourceKind>,
) -> Result<(), ParseError> {
    let mut diagnostics = DiagnosticCollector::new();

    for reference in expression.references() {
        let token = *reference.inner();
        let span = reference.span();
        let owner = token.owner().to_name();
        // Skip the leading `${`.
        let node_span = Span::new(span.start() + 2..span.start() + 2 + owner.len());
        let attribute_span = Span::new(node_span.end() + 1..span.end() - 1);

        match kind_of(token.owner()) {
            None => diagnostics.emit(
                Diagnostic::error(format!("`{owner}` is not a resource of this stack"))
                    .with_code(ErrorCode::E201)
                    .with_label(node_span, ErrorCode::E201.description())
                    .with_secondary_label(span, "in this reference"),
            ),
            Some(kind) if !kind.exports(token.attribute()) => {
                let exported: Vec<&str> = kind
                    .exported_attributes()
                    .iter()
                    .map(Attribute::as_str)
                    .collect();
                let help = if exported.is_empty() {
                    format!("a {kind} exports no attributes")
                } else {
                    format!("a {kind} exports: {}", exported.join(", "))
                };
                diagnostics.emit(
                    Diagnostic::error(format!(
                        "`{owner}` does not export `{}`",
                        token.attribute()
                    ))
                    .with_code(ErrorCode::E202)
                    .with_label(attribute_span, format!("not exported by a {kind}"))
                    .with_help(help),
                );
            }
            Some(_) => {}
        }
    }

    diagnostics.finish()
}
