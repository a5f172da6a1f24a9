//! Sinks for accumulating diagnostics during a processing round.
//!
//! The [`DiagnosticCollector`] allows a round to report every finding
//! instead of failing on the first one encountered.

use crate::error::{Diagnostic, ValidationError};

/// Destination for findings. Passed explicitly to every step that reports.
pub trait DiagnosticSink {
    /// Record a single finding.
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// A collector for accumulating diagnostics during a processing round.
///
/// # Example
///
/// ```
/// # use bindery_validate::error::{Diagnostic, DiagnosticCollector, DiagnosticSink, ErrorCode};
///
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(
///     Diagnostic::error("module `A` is declared more than once").with_code(ErrorCode::E305),
/// );
/// collector.emit(Diagnostic::warning("module `B` is never installed"));
///
/// let result = collector.finish();
/// assert!(result.is_err());
/// ```
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

    /// Returns `true` once an error-severity diagnostic has been emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take every collected diagnostic regardless of severity.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Finish collection and return a result.
    ///
    /// - If there are errors, returns `Err(ValidationError)` with all diagnostics.
    /// - Otherwise returns the warnings and notes that were collected.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ValidationError> {
        if self.has_errors {
            Err(ValidationError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}

impl DiagnosticSink for DiagnosticCollector {
    /// The diagnostic is added to the collection and if it's an error,
    /// the collector is marked as having errors.
    fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }
}
