//! # Sitestack Parser
//!
//! Parsers for the two small languages operators write by hand:
//!
//! - **Content templates**: literal text with `{{ name }}` placeholders,
//!   parsed by [`parse_template`].
//! - **Reference expressions**: literal text with `${node.attribute}`
//!   references to other resources, parsed by [`parse_expression`] and
//!   checked against a stack with [`check_references`].
//!
//! Both parsers collect every problem into a single [`error::ParseError`]
//! whose diagnostics carry spans into the source text.
//!
//! ## Usage
//!
//! ```
//! # use sitestack_parser::{parse_expression, parse_template, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let template = parse_template("<h1>Hello {{ timestamp }}</h1>", &["timestamp"])?;
//!     let output = parse_expression("https://${website_distribution.domain_name}")?;
//!
//!     assert_eq!(template.placeholders().count(), 1);
//!     assert_eq!(output.references().len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
mod expression;
mod span;
mod template;

pub use expression::{ParsedExpression, check_references, parse_expression};
pub use span::{Span, Spanned};
pub use template::parse_template;

/// Returns `true` for names made of ASCII letters, digits and `_` that do not
/// start with a digit.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
