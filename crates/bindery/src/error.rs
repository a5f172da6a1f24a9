//! Error types for Bindery operations.
//!
//! This module provides the main error type [`BinderyError`] which wraps
//! the conditions that can end a processing round.

use std::io;

use thiserror::Error;

use bindery_validate::{ProcessingError, error::ValidationError};

use crate::manifest::{ManifestError, ManifestSource, SourceMap};

/// The main error type for Bindery operations.
///
/// # Diagnostic Variants
///
/// `Manifest` and `Validation` keep the manifest text they refer to when it
/// is available, so front ends can render source snippets.
#[derive(Debug, Error)]
pub enum BinderyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Manifest { err: ManifestError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Internal(#[from] ProcessingError),

    #[error("{err}")]
    Validation {
        err: ValidationError,
        src: Option<Box<ManifestSource>>,
    },
}

impl BinderyError {
    /// Create a new `Manifest` error with the associated manifest text.
    pub fn new_manifest_error(err: ManifestError, src: impl Into<String>) -> Self {
        Self::Manifest {
            err,
            src: src.into(),
        }
    }

    /// Attach manifest text and element spans to a `Validation` error.
    ///
    /// Other variants are returned unchanged.
    pub fn with_manifest_source(self, text: impl Into<String>, spans: &SourceMap) -> Self {
        match self {
            Self::Validation { err, .. } => Self::Validation {
                err,
                src: Some(Box::new(ManifestSource::new(text, spans.clone()))),
            },
            other => other,
        }
    }
}

impl From<ValidationError> for BinderyError {
    fn from(err: ValidationError) -> Self {
        Self::Validation { err, src: None }
    }
}

#[cfg(test)]
mod tests {
    use bindery_validate::error::{Diagnostic, ErrorCode};

    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err: BinderyError = ValidationError::new(vec![
            Diagnostic::error("module `A` is declared more than once").with_code(ErrorCode::E305),
        ])
        .into();
        assert!(err.to_string().contains("declared more than once"));
    }

    #[test]
    fn test_with_manifest_source_only_touches_validation() {
        let err = BinderyError::Config("bad".to_string())
            .with_manifest_source("text", &SourceMap::default());
        assert!(matches!(err, BinderyError::Config(_)));

        let err = BinderyError::from(ValidationError::new(vec![Diagnostic::error("x")]))
            .with_manifest_source("text", &SourceMap::default());
        match err {
            BinderyError::Validation { src: Some(src), .. } => assert_eq!(src.text(), "text"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
