//! Marker annotations.
//!
//! An [`AnnotationMarker`] is the fully-qualified name of an annotation used
//! purely as a lookup key. It carries no behavior of its own.

use std::fmt;

use serde::Deserialize;

use crate::identifier::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct AnnotationMarker(Id);

impl AnnotationMarker {
    pub fn new(name: impl Into<Id>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> Id {
        self.0
    }
}

impl From<Id> for AnnotationMarker {
    fn from(name: Id) -> Self {
        Self(name)
    }
}

impl fmt::Display for AnnotationMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}
