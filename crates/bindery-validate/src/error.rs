//! Error and diagnostic system for Bindery validation.
//!
//! This module provides:
//! - Error codes for documentation and searchability
//! - Labels that point at program elements
//! - Severity levels
//! - Append-only validation reports
//! - A sink abstraction and a collector that accumulates a round's findings
//!
//! # Overview
//!
//! A single finding is a [`Diagnostic`]. Validators return findings grouped
//! in a [`ValidationReport`]; reports are forwarded to a [`DiagnosticSink`]
//! one finding at a time. [`DiagnosticCollector`] is the standard sink and
//! turns a round with errors into a [`ValidationError`].
//!
//! # Example
//!
//! ```
//! # use bindery_core::element::ElementId;
//! # use bindery_validate::error::{Diagnostic, ErrorCode};
//!
//! let method = ElementId::new(3);
//! let module = ElementId::new(1);
//!
//! let diag = Diagnostic::error("@BindsInstance methods must not be abstract")
//!     .with_code(ErrorCode::E100)
//!     .with_label(method, "abstract method")
//!     .with_secondary_label(module, "declared in this module")
//!     .with_help("provide a concrete implementation");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod report;
mod severity;
mod validation_error;

pub use collector::{DiagnosticCollector, DiagnosticSink};
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use report::ValidationReport;
pub use severity::Severity;
pub use validation_error::ValidationError;
