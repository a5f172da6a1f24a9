//! The per-round element arena.
//!
//! [`ElementModel`] owns every [`ProgramElement`] of one processing round and
//! resolves the weak [`ElementId`] back-references between them. It is built
//! once through [`ElementModelBuilder`] and is read-only afterwards.

use log::trace;
use thiserror::Error;

use crate::{
    element::{ElementDraft, ElementId, ElementKind, ProgramElement},
    marker::AnnotationMarker,
};

/// Structural errors raised while assembling a model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("enclosing element {0} does not exist")]
    UnknownEnclosing(ElementId),

    #[error("a {child} cannot be enclosed by a {parent}")]
    IllegalNesting {
        child: ElementKind,
        parent: ElementKind,
    },

    #[error("a {0} must have an enclosing element")]
    MissingEnclosing(ElementKind),
}

/// Read-only view of all program elements in a round.
#[derive(Debug, Default)]
pub struct ElementModel {
    elements: Vec<ProgramElement>,
}

impl ElementModel {
    pub fn builder() -> ElementModelBuilder {
        ElementModelBuilder::default()
    }

    pub fn get(&self, id: ElementId) -> Option<&ProgramElement> {
        self.elements.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgramElement> {
        self.elements.iter()
    }

    /// Resolve the enclosing element of `element`.
    pub fn enclosing(&self, element: &ProgramElement) -> Option<&ProgramElement> {
        element.enclosing().and_then(|id| self.get(id))
    }

    /// Walk outwards until the nearest enclosing type declaration.
    pub fn enclosing_type(&self, element: &ProgramElement) -> Option<&ProgramElement> {
        let mut current = self.enclosing(element);
        while let Some(candidate) = current {
            if candidate.kind().is_type() {
                return Some(candidate);
            }
            current = self.enclosing(candidate);
        }
        None
    }

    /// Elements directly enclosed by `parent`, in declaration order.
    pub fn enclosed_by(&self, parent: ElementId) -> impl Iterator<Item = &ProgramElement> {
        self.elements
            .iter()
            .filter(move |element| element.enclosing() == Some(parent))
    }

    /// Parameters of an executable element, in declaration order.
    pub fn parameters(&self, executable: ElementId) -> impl Iterator<Item = &ProgramElement> {
        self.enclosed_by(executable)
            .filter(|element| element.kind() == ElementKind::Parameter)
    }

    /// Ids of all elements carrying `marker`, in declaration order.
    pub fn annotated_with<'a>(
        &'a self,
        marker: &'a AnnotationMarker,
    ) -> impl Iterator<Item = ElementId> + 'a {
        self.elements
            .iter()
            .filter(move |element| element.has_annotation(marker))
            .map(ProgramElement::id)
    }
}

/// Incremental builder for an [`ElementModel`].
///
/// Elements must be added parent-first so that enclosing references always
/// point backwards.
///
/// ```
/// use bindery_core::element::{ElementDraft, ElementKind, TypeRef};
/// use bindery_core::model::ElementModel;
///
/// let mut builder = ElementModel::builder();
/// let module = builder.add(ElementDraft::new(ElementKind::Class, "AppModule")).unwrap();
/// let method = builder
///     .add(ElementDraft::new(ElementKind::Method, "clock").enclosed_by(module))
///     .unwrap();
/// builder
///     .add(ElementDraft::new(ElementKind::Parameter, "zone")
///         .enclosed_by(method)
///         .of_type(TypeRef::declared("java.time.ZoneId")))
///     .unwrap();
///
/// let model = builder.build();
/// assert_eq!(model.parameters(method).count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ElementModelBuilder {
    elements: Vec<ProgramElement>,
}

impl ElementModelBuilder {
    /// Add an element and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the enclosing element is unknown, or if the
    /// nesting is not something a host compiler could produce (for example a
    /// parameter enclosed directly by a class).
    pub fn add(&mut self, draft: ElementDraft) -> Result<ElementId, ModelError> {
        let parent_kind = match draft.enclosing() {
            Some(parent) => Some(
                self.elements
                    .get(parent.index())
                    .map(ProgramElement::kind)
                    .ok_or(ModelError::UnknownEnclosing(parent))?,
            ),
            None => None,
        };
        check_nesting(draft.kind(), parent_kind)?;

        let id = ElementId::new(self.elements.len());
        let element = ProgramElement::new(id, draft);
        trace!(id:% = id, kind:% = element.kind(), name:% = element.name(); "Element added");
        self.elements.push(element);
        Ok(id)
    }

    pub fn build(self) -> ElementModel {
        ElementModel {
            elements: self.elements,
        }
    }
}

fn check_nesting(child: ElementKind, parent: Option<ElementKind>) -> Result<(), ModelError> {
    match (child, parent) {
        (kind, None) if kind.is_type() => Ok(()),
        (kind, None) => Err(ModelError::MissingEnclosing(kind)),
        (kind, Some(parent)) if kind.is_type() && parent.is_type() => Ok(()),
        (ElementKind::Method | ElementKind::Constructor | ElementKind::Field, Some(parent))
            if parent.is_type() =>
        {
            Ok(())
        }
        (ElementKind::Parameter, Some(parent)) if parent.is_executable() => Ok(()),
        (child, Some(parent)) => Err(ModelError::IllegalNesting { child, parent }),
    }
}
