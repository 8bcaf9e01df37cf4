//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span of the source.
///
/// A diagnostic normally has one primary label marking where the problem is,
/// plus any number of secondary labels giving context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let primary = Label::primary(Span::new(2..9), "not exported by `static_website`");
        let secondary = Label::secondary(Span::new(2..16), "in this reference");

        assert_eq!(primary.span(), Span::new(2..9));
        assert_eq!(primary.message(), "not exported by `static_website`");
        assert!(primary.is_primary());
        assert!(!secondary.is_primary());
    }
}
