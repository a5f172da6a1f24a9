//! Bindery validation - annotation placement rules and module installation.
//!
//! This crate holds the two halves of a processing round that produce
//! findings:
//!
//! - [`dispatch`] routes elements carrying a claimed marker annotation to the
//!   [`validators`] registered for their element kind.
//! - [`resolver`] computes each component's effective module set from
//!   [`declarations`], applying test-only replacements.
//!
//! Findings are [`error::Diagnostic`] values collected into
//! [`error::ValidationReport`]s and forwarded to an [`error::DiagnosticSink`].
//!
//! # Example
//!
//! ```
//! use bindery_core::module::{ComponentId, ModuleDeclaration};
//! use bindery_validate::resolver::{BuildVariant, ModuleInstallationResolver};
//!
//! let singleton = ComponentId::new("SingletonComponent");
//! let modules = [
//!     ModuleDeclaration::new("ClockModule").installed_in(singleton),
//!     ModuleDeclaration::new("FakeClockModule")
//!         .installed_in(singleton)
//!         .replacing("ClockModule")
//!         .test_only(),
//! ];
//!
//! let resolution = ModuleInstallationResolver::new(BuildVariant::Test).resolve(&modules);
//! assert!(resolution.report().is_clean());
//! assert_eq!(resolution.modules().get(&singleton).map(<[_]>::len), Some(1));
//! ```

pub mod declarations;
pub mod dispatch;
pub mod error;
pub mod markers;
pub mod resolver;
pub mod validators;

pub use declarations::extract_module_declarations;
pub use dispatch::{DispatchStep, ElementReport, ProcessingError, ProcessingStep};
pub use markers::Markers;
pub use resolver::{BuildVariant, ComponentModules, ModuleInstallationResolver, Resolution};
