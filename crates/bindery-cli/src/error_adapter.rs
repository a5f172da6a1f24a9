//! Error adapter for converting BinderyError to miette diagnostics.
//!
//! This module bridges the library's error types and miette's diagnostic
//! formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! A failed round carries every finding of the round. Each finding is
//! rendered independently, with its labels resolved to manifest snippets
//! when the manifest text is available.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use bindery::{BinderyError, Diagnostic, manifest::ManifestSource};
use bindery_validate::error::Severity;

/// Adapter for a single bindery diagnostic.
pub struct DiagnosticAdapter<'a> {
    /// The wrapped diagnostic
    diag: &'a Diagnostic,
    /// Manifest text and element spans, if the round came from a manifest
    src: Option<&'a ManifestSource>,
    /// Manifest text for displaying snippets
    text: Option<&'a str>,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: Option<&'a ManifestSource>) -> Self {
        Self {
            diag,
            src,
            text: src.map(ManifestSource::text),
        }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Note => miette::Severity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.text
            .as_ref()
            .map(|text| text as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let src = self.src?;
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().filter_map(move |label| {
            let span = SourceSpan::from(src.spans().span(label.element())?);
            let message = Some(label.message().to_string());
            Some(if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            })
        })))
    }
}

/// Adapter for [`BinderyError`] variants that are not round findings.
pub struct ErrorAdapter<'a>(pub &'a BinderyError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            BinderyError::Io(_) => "bindery::io",
            BinderyError::Manifest { .. } => "bindery::manifest",
            BinderyError::Config(_) => "bindery::config",
            BinderyError::Internal(_) => "bindery::internal",
            BinderyError::Validation { .. } => return None,
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            BinderyError::Internal(_) => Some(Box::new(
                "this is a bug in the processor, not in the manifest",
            )),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match &self.0 {
            BinderyError::Manifest { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match &self.0 {
            BinderyError::Manifest { err, .. } => {
                let span = SourceSpan::from(err.span()?);
                Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
                    Some("here".to_string()),
                    span,
                ))))
            }
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
///
/// This enum wraps either a single round finding or a non-finding error,
/// providing a uniform interface for error rendering.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A round finding, optionally with manifest snippets.
    Diagnostic(DiagnosticAdapter<'a>),
    /// Any other error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`BinderyError`] into a list of reportable errors.
///
/// For [`BinderyError::Validation`], this returns one [`Reportable`] per
/// finding of the round. For other error variants, this returns a single
/// [`Reportable`].
pub fn to_reportables(err: &BinderyError) -> Vec<Reportable<'_>> {
    match err {
        BinderyError::Validation { err: validation, src } => validation
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src.as_deref())))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use bindery::{element::ElementId, manifest::ManifestSource};
    use bindery_validate::error::{ErrorCode, ValidationError};

    use super::*;

    const MANIFEST: &str = "[[types]]\nname = \"com.example.Service\"\n";

    fn round_source() -> (bindery::manifest::Round, ManifestSource) {
        let round = bindery::manifest::load_round(MANIFEST).unwrap();
        let source = ManifestSource::new(MANIFEST, round.spans().clone());
        (round, source)
    }

    #[test]
    fn test_single_diagnostic() {
        let err = BinderyError::from(ValidationError::new(vec![
            Diagnostic::error("test error")
                .with_code(ErrorCode::E200)
                .with_help("try this"),
        ]));

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.to_string(), "test error");
                assert_eq!(d.code().map(|c| c.to_string()), Some("E200".to_string()));
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_multiple_diagnostics() {
        let err = BinderyError::from(ValidationError::new(vec![
            Diagnostic::error("first error").with_code(ErrorCode::E300),
            Diagnostic::error("second error").with_code(ErrorCode::E301),
            Diagnostic::warning("a warning"),
        ]));

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 3);
        assert_eq!(reportables[0].to_string(), "first error");
        assert_eq!(reportables[1].to_string(), "second error");
        assert_eq!(reportables[2].severity(), Some(miette::Severity::Warning));
    }

    #[test]
    fn test_non_validation_error() {
        let err = BinderyError::Config("broken".to_string());

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Configuration error: broken");
                assert_eq!(e.code().map(|c| c.to_string()), Some("bindery::config".to_string()));
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_labels_resolved_through_manifest_spans() {
        let (round, source) = round_source();
        let service = round.model().iter().next().unwrap().id();
        let diag = Diagnostic::error("not a module")
            .with_label(service, "primary label")
            .with_secondary_label(ElementId::new(99), "no span for this one");

        let adapter = DiagnosticAdapter::new(&diag, Some(&source));

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].label(), Some("primary label"));
        assert!(labels[0].primary());
        assert!(adapter.source_code().is_some());
    }

    #[test]
    fn test_no_labels_without_manifest() {
        let diag = Diagnostic::error("detached").with_label(ElementId::new(0), "here");
        let adapter = DiagnosticAdapter::new(&diag, None);

        assert!(adapter.labels().is_none());
        assert!(adapter.source_code().is_none());
    }

    #[test]
    fn test_manifest_error_has_snippet() {
        let processor = bindery::RoundProcessor::default();
        let err = processor.load("[[types]]\nname = 42\n").unwrap_err();

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert!(reportables[0].source_code().is_some());
        assert_eq!(
            reportables[0].code().map(|c| c.to_string()),
            Some("bindery::manifest".to_string())
        );
    }
}
