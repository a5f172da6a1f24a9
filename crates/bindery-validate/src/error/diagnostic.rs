//! The core diagnostic type for the Bindery error system.
//!
//! A [`Diagnostic`] represents a single finding with optional error code,
//! labeled element references, and help text.

use std::fmt;

use bindery_core::element::ElementId;

use crate::error::{Severity, error_code::ErrorCode, label::Label};

/// A single validation finding.
///
/// Diagnostics carry:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - Zero or more labeled element references
/// - Optional help text with suggestions
///
/// # Example
///
/// ```text
/// error[E301]: module `ClockModule` is replaced more than once in `SingletonComponent`
///   = replaced by `FakeClockModule`, `FrozenClockModule`
///   = help: keep a single replacement per component
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use bindery_core::element::ElementId;
    /// # use bindery_validate::error::{Diagnostic, ErrorCode};
    ///
    /// let diag = Diagnostic::error("@BindsInstance parameters may not be type variables")
    ///     .with_code(ErrorCode::E202)
    ///     .with_label(ElementId::new(4), "type variable")
    ///     .with_help("bind a concrete type instead");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create a note diagnostic.
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The element referenced by the first primary label, if any.
    pub fn element(&self) -> Option<ElementId> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::element)
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, element: ElementId, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(element, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, element: ElementId, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(element, message));
        self
    }

    /// Add a primary label when the element is known.
    pub fn with_optional_label(self, element: Option<ElementId>, message: impl Into<String>) -> Self {
        match element {
            Some(element) => self.with_label(element, message),
            None => self,
        }
    }

    /// Add a secondary label when the element is known.
    pub fn with_optional_secondary_label(
        self,
        element: Option<ElementId>,
        message: impl Into<String>,
    ) -> Self {
        match element {
            Some(element) => self.with_secondary_label(element, message),
            None => self,
        }
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E100]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
