//! Annotation dispatch steps.
//!
//! A [`ProcessingStep`] claims a fixed set of marker annotations and, for each
//! element carrying one of them, produces exactly one [`ValidationReport`].
//! [`DispatchStep`] implements this by routing every element to the
//! [`KindValidator`](crate::validators::KindValidator) registered for its
//! kind.
//!
//! Hosts screen the claimed elements with [`DispatchStep::screen_placements`]
//! first, which turns a marker on an unsupported kind into an E105 finding.
//! Reaching such an element during dispatch anyway means the host skipped
//! that screening. That is reported as a [`ProcessingError`] and aborts the
//! step before any finding is emitted.

use std::collections::HashSet;

use indexmap::IndexSet;
use log::{debug, info};
use thiserror::Error;

use bindery_core::{
    element::{ElementId, ElementKind, ProgramElement},
    identifier::Id,
    marker::AnnotationMarker,
    model::ElementModel,
};

use crate::{
    error::{Diagnostic, DiagnosticSink, ErrorCode, ValidationReport},
    markers::Markers,
    validators::{MethodValidator, ParameterValidator, ValidatorRegistry},
};

/// Internal invariant violations. These are developer-facing and fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessingError {
    #[error(
        "internal error: no validator registered for {kind} `{name}` ({element}) annotated with {marker}"
    )]
    UnregisteredKind {
        element: ElementId,
        kind: ElementKind,
        name: Id,
        marker: AnnotationMarker,
    },

    #[error("internal error: element {0} is not part of the element model")]
    UnknownElement(ElementId),
}

/// The report produced for one dispatched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementReport {
    element: ElementId,
    report: ValidationReport,
}

impl ElementReport {
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn into_report(self) -> ValidationReport {
        self.report
    }
}

/// A unit of annotation processing that owns one or more markers.
pub trait ProcessingStep {
    /// The markers this step claims. Constant for the lifetime of the step.
    fn claims(&self) -> &IndexSet<AnnotationMarker>;

    /// Validate `elements` without side effects.
    ///
    /// Returns one report per distinct element carrying a claimed marker,
    /// in input order.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError`] when an element cannot be dispatched.
    fn validate(
        &self,
        model: &ElementModel,
        elements: &[ElementId],
    ) -> Result<Vec<ElementReport>, ProcessingError>;

    /// Validate `elements` and forward every finding to `sink`.
    ///
    /// Nothing is emitted if any element fails to dispatch. Returns the
    /// number of elements that were validated.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError`] when an element cannot be dispatched.
    fn process(
        &self,
        model: &ElementModel,
        elements: &[ElementId],
        sink: &mut dyn DiagnosticSink,
    ) -> Result<usize, ProcessingError> {
        let reports = self.validate(model, elements)?;
        let count = reports.len();
        for element_report in reports {
            element_report.into_report().print_to(sink);
        }
        Ok(count)
    }
}

/// Kind-keyed dispatch of annotated elements to their validators.
#[derive(Debug)]
pub struct DispatchStep {
    claims: IndexSet<AnnotationMarker>,
    registry: ValidatorRegistry,
}

impl DispatchStep {
    /// Create a step claiming `claims` and dispatching through `registry`.
    pub fn new(
        claims: impl IntoIterator<Item = AnnotationMarker>,
        registry: ValidatorRegistry,
    ) -> Self {
        Self {
            claims: claims.into_iter().collect(),
            registry,
        }
    }

    /// The binds-instance step: methods and parameters are the legal placements.
    pub fn binds_instance(markers: &Markers) -> Self {
        let registry = ValidatorRegistry::new()
            .register(MethodValidator::new(markers.clone()))
            .register(ParameterValidator::new(markers.clone()));
        Self::new([*markers.binds_instance()], registry)
    }

    /// All elements of `model` carrying a claimed marker, in model order.
    pub fn claimed_elements(&self, model: &ElementModel) -> Vec<ElementId> {
        model
            .iter()
            .filter(|element| {
                element
                    .annotations()
                    .iter()
                    .any(|annotation| self.claims.contains(&AnnotationMarker::from(annotation.name())))
            })
            .map(|element| element.id())
            .collect()
    }

    /// Returns `true` if a validator is registered for `kind`.
    pub fn accepts(&self, kind: ElementKind) -> bool {
        self.registry.get(kind).is_some()
    }

    /// Split `elements` into the ones this step can dispatch and a report
    /// with one E105 finding per claimed element of an unsupported kind.
    ///
    /// Ids unknown to the model are passed through so that dispatch still
    /// reports them as internal errors.
    pub fn screen_placements(
        &self,
        model: &ElementModel,
        elements: &[ElementId],
    ) -> (Vec<ElementId>, ValidationReport) {
        let mut seen = HashSet::with_capacity(elements.len());
        let mut dispatchable = Vec::with_capacity(elements.len());
        let mut report = ValidationReport::new();

        for &id in elements {
            if !seen.insert(id) {
                continue;
            }
            let Some(element) = model.get(id) else {
                dispatchable.push(id);
                continue;
            };
            match self.claimed_marker(element) {
                Some(marker) if !self.accepts(element.kind()) => {
                    debug!(element:% = element.name(), kind:% = element.kind(); "Marker on unsupported kind");
                    report.push(self.misplaced_marker(element, marker));
                }
                _ => dispatchable.push(id),
            }
        }

        (dispatchable, report)
    }

    fn claimed_marker(&self, element: &ProgramElement) -> Option<AnnotationMarker> {
        element
            .annotations()
            .iter()
            .map(|annotation| AnnotationMarker::from(annotation.name()))
            .find(|marker| self.claims.contains(marker))
    }

    fn misplaced_marker(&self, element: &ProgramElement, marker: AnnotationMarker) -> Diagnostic {
        let allowed: Vec<String> = self.registry.kinds().map(|kind| format!("{kind}s")).collect();
        Diagnostic::error(format!(
            "{marker} cannot be applied to {} `{}`",
            element.kind(),
            element.name()
        ))
        .with_code(ErrorCode::E105)
        .with_label(element.id(), format!("annotated {}", element.kind()))
        .with_help(format!("{marker} is only allowed on {}", allowed.join(" and ")))
    }
}

impl ProcessingStep for DispatchStep {
    fn claims(&self) -> &IndexSet<AnnotationMarker> {
        &self.claims
    }

    fn validate(
        &self,
        model: &ElementModel,
        elements: &[ElementId],
    ) -> Result<Vec<ElementReport>, ProcessingError> {
        info!(elements = elements.len(), claims = self.claims.len(); "Dispatching annotated elements");

        let mut seen = HashSet::with_capacity(elements.len());
        let mut reports = Vec::with_capacity(elements.len());

        for &id in elements {
            if !seen.insert(id) {
                continue;
            }
            let element = model.get(id).ok_or(ProcessingError::UnknownElement(id))?;

            let Some(marker) = self.claimed_marker(element) else {
                debug!(element:% = element.name(); "Element carries no claimed marker, skipping");
                continue;
            };

            let validator = self.registry.get(element.kind()).ok_or_else(|| {
                ProcessingError::UnregisteredKind {
                    element: id,
                    kind: element.kind(),
                    name: element.name(),
                    marker,
                }
            })?;

            let report = validator.validate(element, model);
            debug!(
                element:% = element.name(),
                kind:% = element.kind(),
                findings = report.len();
                "Element validated"
            );
            reports.push(ElementReport {
                element: id,
                report,
            });
        }

        Ok(reports)
    }
}
