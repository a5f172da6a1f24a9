//! Severity levels for diagnostics.

use std::fmt;

/// The severity level of a diagnostic.
///
/// Only [`Severity::Error`] fails a build; warnings and notes are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A placement violation or configuration conflict that must be fixed.
    Error,

    /// A suspicious construct that does not block code generation.
    Warning,

    /// Additional information attached to a round.
    Note,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    /// Returns `true` if this is a note severity.
    pub fn is_note(&self) -> bool {
        matches!(self, Severity::Note)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}
