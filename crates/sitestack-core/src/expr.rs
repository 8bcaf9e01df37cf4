//! Text expressions mixing literal text with identifier tokens.
//!
//! An [`Expr`] is how a property refers to a value that is only known after
//! another resource exists, e.g. `arn:aws:s3:::<bucket id>/*`. Substitution
//! happens on the segments, never by searching and replacing text.
//!
//! Resolved text is written in the backend's interpolation syntax: `${...}`
//! is a reference the backend substitutes at apply time, and literal text has
//! its `${` and `%{` sequences escaped as `$${` and `%%{`.

use std::{borrow::Cow, fmt};

use serde::{Serialize, Serializer};

use crate::token::{ResolveError, Token, TokenTable};

/// One piece of an [`Expr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim.
    Literal(String),
    /// A value substituted at resolution time.
    Token(Token),
}

/// A sequence of literal and token segments.
///
/// # Examples
///
/// ```
/// use sitestack_core::{expr::Expr, identifier::Id, token::{Attribute, Token, TokenTable}};
///
/// let bucket = Token::new(Id::new("static_website"), Attribute::Id);
/// let resource = Expr::literal("arn:aws:s3:::").with_token(bucket).with_literal("/*");
///
/// let mut tokens = TokenTable::new();
/// tokens.resolve(bucket, "demo-bucket").unwrap();
///
/// assert_eq!(resource.resolve(&tokens).unwrap(), "arn:aws:s3:::demo-bucket/*");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expr {
    segments: Vec<Segment>,
}

impl Expr {
    /// Create an expression from segments, merging adjacent literals.
    pub fn new(segments: impl IntoIterator<Item = Segment>) -> Self {
        segments
            .into_iter()
            .fold(Self::default(), |expr, segment| expr.with_segment(segment))
    }

    /// Create an expression consisting of literal text only.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::default().with_literal(text)
    }

    /// Create an expression consisting of a single token.
    pub fn token(token: Token) -> Self {
        Self::default().with_token(token)
    }

    /// Append literal text.
    pub fn with_literal(self, text: impl Into<String>) -> Self {
        self.with_segment(Segment::Literal(text.into()))
    }

    /// Append a token.
    pub fn with_token(self, token: Token) -> Self {
        self.with_segment(Segment::Token(token))
    }

    fn with_segment(mut self, segment: Segment) -> Self {
        match segment {
            Segment::Literal(text) if text.is_empty() => {}
            Segment::Literal(text) => {
                if let Some(Segment::Literal(last)) = self.segments.last_mut() {
                    last.push_str(&text);
                } else {
                    self.segments.push(Segment::Literal(text));
                }
            }
            token => self.segments.push(token),
        }
        self
    }

    /// Borrow the segments of this expression.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate over the tokens referenced by this expression, in order.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Token(token) => Some(*token),
            Segment::Literal(_) => None,
        })
    }

    /// Returns `true` if the expression holds no tokens.
    pub fn is_literal(&self) -> bool {
        self.tokens().next().is_none()
    }

    /// Substitute every token with its resolved value, writing the result in
    /// interpolation syntax.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unresolved`] for the first token whose owner
    /// has not been emitted. A placeholder is never written in its place.
    pub fn resolve(&self, tokens: &TokenTable) -> Result<String, ResolveError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(&escape_literal(text)),
                Segment::Token(token) => out.push_str(&tokens.lookup(token)?.to_string()),
            }
        }
        Ok(out)
    }
}

/// Escape literal text for interpolation syntax.
///
/// ```
/// use sitestack_core::expr::escape_literal;
///
/// assert_eq!(escape_literal("`${location.host}`"), "`$${location.host}`");
/// assert_eq!(escape_literal("plain"), "plain");
/// ```
pub fn escape_literal(text: &str) -> Cow<'_, str> {
    if text.contains("${") || text.contains("%{") {
        Cow::Owned(text.replace("${", "$${").replace("%{", "%%{"))
    } else {
        Cow::Borrowed(text)
    }
}

impl From<&str> for Expr {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for Expr {
    fn from(text: String) -> Self {
        Self::literal(text)
    }
}

impl From<Token> for Expr {
    fn from(token: Token) -> Self {
        Self::token(token)
    }
}

impl fmt::Display for Expr {
    /// Writes the expression with unresolved tokens as placeholders.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Token(token) => write!(f, "{token}")?,
            }
        }
        Ok(())
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
