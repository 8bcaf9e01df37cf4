//! Error and diagnostic system for sitestack parsers.
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. Multiple diagnostics are wrapped in [`ParseError`]
//! so that one pass over a template or expression reports every problem.
//!
//! # Example
//!
//! ```
//! # use sitestack_parser::error::{Diagnostic, ErrorCode};
//! # use sitestack_parser::Span;
//!
//! let diag = Diagnostic::error("unknown template placeholder `time`")
//!     .with_code(ErrorCode::E200)
//!     .with_label(Span::new(40..50), "not a known placeholder")
//!     .with_help("known placeholders: timestamp, bucket, region, index_document");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
