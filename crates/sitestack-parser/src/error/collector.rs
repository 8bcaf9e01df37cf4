//! Collector for accumulating diagnostics during a parse.
//!
//! The [`DiagnosticCollector`] lets a parser report every problem it finds
//! instead of failing on the first one.

use log::warn;

use crate::error::{Diagnostic, ParseError};

/// Accumulates diagnostics and decides whether the parse failed.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection.
    ///
    /// Returns `Err(ParseError)` with every diagnostic if any error was
    /// emitted. Otherwise warnings are logged and `Ok(())` is returned.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors {
            return Err(ParseError::new(self.diagnostics));
        }
        for diagnostic in &self.diagnostics {
            warn!(diagnostic = diagnostic.to_string(); "Parser warning");
        }
        Ok(())
    }
}
