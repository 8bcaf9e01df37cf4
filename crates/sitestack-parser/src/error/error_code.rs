//! Error codes for sitestack diagnostics.
//!
//! Error codes are organized by input:
//! - `E0xx` - Content template syntax
//! - `E1xx` - Reference expression syntax
//! - `E2xx` - Name checks against the stack being built

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Template Errors (E0xx)
    // =========================================================================
    /// Unterminated placeholder.
    ///
    /// A `{{` was opened but never closed with `}}`.
    E001,

    /// Empty placeholder.
    ///
    /// A placeholder `{{ }}` contains no name.
    E002,

    /// Invalid placeholder name.
    ///
    /// Placeholder names start with a letter or underscore and contain only
    /// ASCII letters, digits and underscores.
    E003,

    // =========================================================================
    // Expression Errors (E1xx)
    // =========================================================================
    /// Unterminated reference.
    ///
    /// A `${` was opened but never closed with `}`.
    E100,

    /// Malformed reference.
    ///
    /// A reference must have the form `${node.attribute}`.
    E101,

    /// Unknown attribute.
    ///
    /// The attribute is not one any resource kind exports.
    E102,

    // =========================================================================
    // Name Errors (E2xx)
    // =========================================================================
    /// Unknown template placeholder.
    ///
    /// The placeholder is syntactically valid but nothing binds it.
    E200,

    /// Undeclared resource.
    ///
    /// A reference names a node that is not part of the stack.
    E201,

    /// Attribute not exported.
    ///
    /// The referenced node exists but its kind does not export the attribute.
    E202,

    /// Repeated placeholder.
    ///
    /// A template binds each placeholder at one substitution point only.
    E203,

    /// Template without placeholders.
    ///
    /// A template must contain at least one substitution point.
    E204,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated placeholder",
            ErrorCode::E002 => "empty placeholder",
            ErrorCode::E003 => "invalid placeholder name",
            ErrorCode::E100 => "unterminated reference",
            ErrorCode::E101 => "malformed reference",
            ErrorCode::E102 => "unknown attribute",
            ErrorCode::E200 => "unknown placeholder",
            ErrorCode::E201 => "undeclared resource",
            ErrorCode::E202 => "attribute not exported",
            ErrorCode::E203 => "repeated placeholder",
            ErrorCode::E204 => "no placeholder",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E102.to_string(), "E102");
        assert_eq!(ErrorCode::E202.to_string(), "E202");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unterminated placeholder");
        assert_eq!(ErrorCode::E101.description(), "malformed reference");
        assert_eq!(ErrorCode::E201.description(), "undeclared resource");
    }
}
