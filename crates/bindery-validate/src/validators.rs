//! Kind validators and the registry that selects them.
//!
//! Each [`KindValidator`] handles exactly one [`ElementKind`]. The
//! [`ValidatorRegistry`] maps kinds to validators once at setup, so adding a
//! legal placement for a marker is a single registration.

mod method;
mod parameter;

pub use method::MethodValidator;
pub use parameter::ParameterValidator;

use indexmap::IndexMap;

use bindery_core::{
    element::{ElementKind, ProgramElement},
    model::ElementModel,
};

use crate::error::ValidationReport;

/// Validates an annotated element of one structural kind.
///
/// Implementations are pure: they read the element and the model and return
/// a report, without I/O and without mutating anything.
pub trait KindValidator: Send + Sync {
    /// The element kind this validator accepts.
    fn kind(&self) -> ElementKind;

    /// Validate `element`, which is guaranteed to be of [`KindValidator::kind`].
    fn validate(&self, element: &ProgramElement, model: &ElementModel) -> ValidationReport;
}

/// Mapping from element kind to its validator.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: IndexMap<ElementKind, Box<dyn KindValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `validator` under its kind, replacing any previous registration.
    pub fn register(mut self, validator: impl KindValidator + 'static) -> Self {
        self.validators.insert(validator.kind(), Box::new(validator));
        self
    }

    pub fn get(&self, kind: ElementKind) -> Option<&dyn KindValidator> {
        self.validators.get(&kind).map(|validator| validator.as_ref())
    }

    /// Kinds with a registered validator, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = ElementKind> + '_ {
        self.validators.keys().copied()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("kinds", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}
