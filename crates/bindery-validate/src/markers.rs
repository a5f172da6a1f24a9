//! The annotation names and framework types validation keys on.
//!
//! [`Markers`] is plain configuration: every field has a default matching the
//! stock annotation set, and any of them may be overridden when loading
//! configuration through serde.

use serde::Deserialize;

use bindery_core::{element::TypeRef, identifier::Id, marker::AnnotationMarker};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Marks a direct-instance binding (a method or a creator parameter).
    binds_instance: AnnotationMarker,

    /// Marks a declarative configuration container.
    module: AnnotationMarker,

    /// Marks component builder and factory types.
    creators: Vec<AnnotationMarker>,

    /// Installs a module in one or more components.
    install_in: AnnotationMarker,

    /// Installs a test-only module that replaces production modules.
    test_install_in: AnnotationMarker,

    /// Deferred wrapper types that can never be bound as instances.
    forbidden_wrappers: Vec<Id>,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            binds_instance: AnnotationMarker::new("dagger.BindsInstance"),
            module: AnnotationMarker::new("dagger.Module"),
            creators: [
                "dagger.Component.Builder",
                "dagger.Component.Factory",
                "dagger.Subcomponent.Builder",
                "dagger.Subcomponent.Factory",
            ]
            .into_iter()
            .map(AnnotationMarker::new)
            .collect(),
            install_in: AnnotationMarker::new("dagger.hilt.InstallIn"),
            test_install_in: AnnotationMarker::new("dagger.hilt.testing.TestInstallIn"),
            forbidden_wrappers: [
                "javax.inject.Provider",
                "jakarta.inject.Provider",
                "dagger.Lazy",
                "dagger.producers.Producer",
                "dagger.producers.Produced",
            ]
            .into_iter()
            .map(Id::new)
            .collect(),
        }
    }
}

impl Markers {
    pub fn binds_instance(&self) -> &AnnotationMarker {
        &self.binds_instance
    }

    pub fn module(&self) -> &AnnotationMarker {
        &self.module
    }

    pub fn creators(&self) -> &[AnnotationMarker] {
        &self.creators
    }

    pub fn install_in(&self) -> &AnnotationMarker {
        &self.install_in
    }

    pub fn test_install_in(&self) -> &AnnotationMarker {
        &self.test_install_in
    }

    pub fn forbidden_wrappers(&self) -> &[Id] {
        &self.forbidden_wrappers
    }

    /// Returns `true` if the erasure of `ty` is one of the forbidden wrappers.
    pub fn is_forbidden_wrapper(&self, ty: &TypeRef) -> bool {
        ty.erasure()
            .is_some_and(|name| self.forbidden_wrappers.contains(&name))
    }
}
