//! Placement rules for binds-instance methods.

use log::trace;

use bindery_core::{
    element::{ElementKind, ProgramElement},
    model::ElementModel,
};

use crate::{
    error::{Diagnostic, ErrorCode, ValidationReport},
    markers::Markers,
    validators::KindValidator,
};

/// Validates methods carrying the binds-instance marker.
///
/// A binds-instance method must be a concrete, value-returning method of a
/// module that takes exactly one parameter, and that parameter must not be a
/// deferred wrapper type.
#[derive(Debug, Clone)]
pub struct MethodValidator {
    markers: Markers,
}

impl MethodValidator {
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }
}

impl KindValidator for MethodValidator {
    fn kind(&self) -> ElementKind {
        ElementKind::Method
    }

    fn validate(&self, element: &ProgramElement, model: &ElementModel) -> ValidationReport {
        let marker = self.markers.binds_instance();
        let mut report = ValidationReport::new();

        if element.is_abstract() {
            report.push(
                Diagnostic::error(format!("{marker} methods must not be abstract"))
                    .with_code(ErrorCode::E100)
                    .with_label(element.id(), "abstract method")
                    .with_help("give the method a body that provides the bound instance"),
            );
        }

        if element.declared_type().is_void() {
            report.push(
                Diagnostic::error(format!("{marker} methods must return a value"))
                    .with_code(ErrorCode::E101)
                    .with_label(element.id(), "returns void"),
            );
        }

        let enclosing_type = model.enclosing_type(element);
        if !enclosing_type.is_some_and(|ty| ty.has_annotation(self.markers.module())) {
            report.push(
                Diagnostic::error(format!(
                    "{marker} methods may only be declared in {} types",
                    self.markers.module()
                ))
                .with_code(ErrorCode::E102)
                .with_label(element.id(), "declared outside a module")
                .with_optional_secondary_label(
                    enclosing_type.map(ProgramElement::id),
                    "this type is not a module",
                ),
            );
        }

        let parameters: Vec<&ProgramElement> = model.parameters(element.id()).collect();
        match parameters.as_slice() {
            [parameter] => {
                if self.markers.is_forbidden_wrapper(parameter.declared_type()) {
                    report.push(
                        Diagnostic::error(format!(
                            "{marker} methods may not bind framework type `{}`",
                            parameter.declared_type()
                        ))
                        .with_code(ErrorCode::E104)
                        .with_label(parameter.id(), "deferred wrapper")
                        .with_secondary_label(element.id(), "in this method")
                        .with_help("bind the wrapped type directly"),
                    );
                }
            }
            _ => {
                report.push(
                    Diagnostic::error(format!(
                        "{marker} methods must declare exactly one parameter, found {}",
                        parameters.len()
                    ))
                    .with_code(ErrorCode::E103)
                    .with_label(element.id(), "wrong parameter count"),
                );
            }
        }

        trace!(method:% = element.name(), findings = report.len(); "Method validated");
        report
    }
}
