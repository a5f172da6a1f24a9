//! Module declarations and installation edges.
//!
//! A module is a declarative container of binding rules. It is installed in
//! one or more components and may, in test builds, replace another module in
//! those components. Both relations are plain data here; the resolution
//! logic lives in the validation crate.

use std::fmt;

use indexmap::IndexSet;
use serde::Deserialize;

use crate::{element::ElementId, identifier::Id};

/// Identifier of a component: a named scope aggregating installed modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(Id);

impl ComponentId {
    pub fn new(name: impl Into<Id>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> Id {
        self.0
    }
}

impl From<Id> for ComponentId {
    fn from(name: Id) -> Self {
        Self(name)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A module and its declared installation metadata.
///
/// ```
/// use bindery_core::module::{ComponentId, ModuleDeclaration};
///
/// let production = ModuleDeclaration::new("com.example.ClockModule")
///     .installed_in(ComponentId::new("SingletonComponent"));
/// let fake = ModuleDeclaration::new("com.example.FakeClockModule")
///     .installed_in(ComponentId::new("SingletonComponent"))
///     .replacing("com.example.ClockModule")
///     .test_only();
///
/// assert!(!production.is_test_only());
/// assert!(fake.replaces().contains(&production.name()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDeclaration {
    name: Id,
    install_targets: IndexSet<ComponentId>,
    replaces: IndexSet<Id>,
    is_test_only: bool,
    origin: Option<ElementId>,
}

impl ModuleDeclaration {
    pub fn new(name: impl Into<Id>) -> Self {
        Self {
            name: name.into(),
            install_targets: IndexSet::new(),
            replaces: IndexSet::new(),
            is_test_only: false,
            origin: None,
        }
    }

    pub fn installed_in(mut self, component: ComponentId) -> Self {
        self.install_targets.insert(component);
        self
    }

    pub fn replacing(mut self, module: impl Into<Id>) -> Self {
        self.replaces.insert(module.into());
        self
    }

    pub fn test_only(mut self) -> Self {
        self.is_test_only = true;
        self
    }

    /// Record the type element this declaration was read from.
    pub fn with_origin(mut self, origin: ElementId) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn install_targets(&self) -> &IndexSet<ComponentId> {
        &self.install_targets
    }

    pub fn replaces(&self) -> &IndexSet<Id> {
        &self.replaces
    }

    pub fn is_test_only(&self) -> bool {
        self.is_test_only
    }

    pub fn origin(&self) -> Option<ElementId> {
        self.origin
    }

    /// Returns `true` if the module contributes to at least one component.
    pub fn is_installed(&self) -> bool {
        !self.install_targets.is_empty()
    }
}

/// A validated `replacement -> replaced` relation scoped to one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstallationEdge {
    replacement: Id,
    replaced: Id,
    component: ComponentId,
}

impl InstallationEdge {
    pub fn new(replacement: Id, replaced: Id, component: ComponentId) -> Self {
        Self {
            replacement,
            replaced,
            component,
        }
    }

    pub fn replacement(&self) -> Id {
        self.replacement
    }

    pub fn replaced(&self) -> Id {
        self.replaced
    }

    pub fn component(&self) -> ComponentId {
        self.component
    }
}

impl fmt::Display for InstallationEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} in {}",
            self.replacement, self.replaced, self.component
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_targets_keep_order_and_dedup() {
        let module = ModuleDeclaration::new("M")
            .installed_in(ComponentId::new("B"))
            .installed_in(ComponentId::new("A"))
            .installed_in(ComponentId::new("B"));

        let targets: Vec<_> = module.install_targets().iter().copied().collect();
        assert_eq!(targets, vec![ComponentId::new("B"), ComponentId::new("A")]);
    }

    #[test]
    fn test_uninstalled_module() {
        assert!(!ModuleDeclaration::new("M").is_installed());
    }

    #[test]
    fn test_edge_display() {
        let edge = InstallationEdge::new(Id::new("Fake"), Id::new("Real"), ComponentId::new("C"));
        assert_eq!(edge.to_string(), "Fake -> Real in C");
    }
}
