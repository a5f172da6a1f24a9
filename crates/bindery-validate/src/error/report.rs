//! Append-only reports produced by validators.

use crate::error::{Diagnostic, DiagnosticSink};

/// Ordered sequence of findings. An empty report means "valid".
///
/// Reports can only grow. Concatenating two reports keeps every finding of
/// both, in order, without deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    findings: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding.
    pub fn push(&mut self, finding: Diagnostic) {
        self.findings.push(finding);
    }

    /// Append all findings of `other`.
    pub fn extend(&mut self, other: ValidationReport) {
        self.findings.extend(other.findings);
    }

    pub fn findings(&self) -> &[Diagnostic] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Returns `true` when no findings were recorded.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|finding| finding.severity().is_error())
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity().is_error())
            .count()
    }

    /// Forward every finding to `sink`, one message per finding.
    pub fn print_to(self, sink: &mut dyn DiagnosticSink) {
        for finding in self.findings {
            sink.emit(finding);
        }
    }

    pub fn into_findings(self) -> Vec<Diagnostic> {
        self.findings
    }
}

impl From<Vec<Diagnostic>> for ValidationReport {
    fn from(findings: Vec<Diagnostic>) -> Self {
        Self { findings }
    }
}

impl IntoIterator for ValidationReport {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}
