//! Placement rules for binds-instance parameters.

use log::trace;

use bindery_core::{
    element::{ElementKind, ProgramElement, TypeRef},
    model::ElementModel,
};

use crate::{
    error::{Diagnostic, ErrorCode, ValidationReport},
    markers::Markers,
    validators::KindValidator,
};

/// Validates parameters carrying the binds-instance marker.
///
/// The enclosing executable must be a constructor, or a method of a
/// component builder or factory. The parameter must bind a concrete value:
/// not `void`, not a type variable, and not a deferred wrapper.
#[derive(Debug, Clone)]
pub struct ParameterValidator {
    markers: Markers,
}

impl ParameterValidator {
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }

    fn is_eligible_executable(&self, executable: &ProgramElement, model: &ElementModel) -> bool {
        match executable.kind() {
            ElementKind::Constructor => true,
            ElementKind::Method => model.enclosing_type(executable).is_some_and(|owner| {
                self.markers
                    .creators()
                    .iter()
                    .any(|creator| owner.has_annotation(creator))
            }),
            _ => false,
        }
    }
}

impl KindValidator for ParameterValidator {
    fn kind(&self) -> ElementKind {
        ElementKind::Parameter
    }

    fn validate(&self, element: &ProgramElement, model: &ElementModel) -> ValidationReport {
        let marker = self.markers.binds_instance();
        let mut report = ValidationReport::new();

        let executable = model.enclosing(element);
        if !executable.is_some_and(|executable| self.is_eligible_executable(executable, model)) {
            report.push(
                Diagnostic::error(format!(
                    "{marker} parameters may only be used in constructors or in methods of component builders and factories"
                ))
                .with_code(ErrorCode::E200)
                .with_label(element.id(), "parameter of an ineligible executable")
                .with_optional_secondary_label(
                    executable.map(ProgramElement::id),
                    "this executable cannot receive bound instances",
                ),
            );
        }

        let ty = element.declared_type();
        match ty {
            TypeRef::Void => report.push(
                Diagnostic::error(format!("{marker} parameters may not be void"))
                    .with_code(ErrorCode::E203)
                    .with_label(element.id(), "void parameter"),
            ),
            TypeRef::Variable(name) => report.push(
                Diagnostic::error(format!(
                    "{marker} parameters may not be type variables, found `{name}`"
                ))
                .with_code(ErrorCode::E202)
                .with_label(element.id(), "type variable")
                .with_help("bind a concrete type"),
            ),
            _ if self.markers.is_forbidden_wrapper(ty) => report.push(
                Diagnostic::error(format!(
                    "{marker} parameters may not be framework type `{ty}`"
                ))
                .with_code(ErrorCode::E201)
                .with_label(element.id(), "deferred wrapper")
                .with_help("bind the instance directly and request the wrapper at the injection site"),
            ),
            _ => {}
        }

        trace!(parameter:% = element.name(), findings = report.len(); "Parameter validated");
        report
    }
}
