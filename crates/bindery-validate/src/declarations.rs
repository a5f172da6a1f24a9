//! Reading module declarations from annotated types.
//!
//! Modules announce where they are installed with the install-in marker, or
//! with the test-install-in marker when they replace production modules in
//! test builds. This module turns those annotations into
//! [`ModuleDeclaration`]s for the resolver.

use log::debug;

use bindery_core::{
    element::{Annotation, ProgramElement},
    model::ElementModel,
    module::{ComponentId, ModuleDeclaration},
};

use crate::{
    error::{Diagnostic, ErrorCode, ValidationReport},
    markers::Markers,
};

/// Annotation argument holding the install targets.
pub const COMPONENTS_ARGUMENT: &str = "components";

/// Annotation argument holding the replaced modules.
pub const REPLACES_ARGUMENT: &str = "replaces";

/// Extract every module declaration carried by a type in `model`.
///
/// Types annotated with neither install marker are not modules for the
/// purpose of installation and are skipped silently.
pub fn extract_module_declarations(
    model: &ElementModel,
    markers: &Markers,
) -> (Vec<ModuleDeclaration>, ValidationReport) {
    let mut declarations = Vec::new();
    let mut report = ValidationReport::new();

    for element in model.iter().filter(|element| element.kind().is_type()) {
        let install_in = element.annotation(markers.install_in());
        let test_install_in = element.annotation(markers.test_install_in());

        let declaration = match (install_in, test_install_in) {
            (None, None) => continue,
            (Some(_), Some(_)) => {
                report.push(
                    Diagnostic::error(format!(
                        "`{}` cannot carry both {} and {}",
                        element.name(),
                        markers.install_in(),
                        markers.test_install_in()
                    ))
                    .with_code(ErrorCode::E307)
                    .with_label(element.id(), "conflicting install annotations")
                    .with_help("production modules use the first, test replacements the second"),
                );
                continue;
            }
            (Some(annotation), None) => installed(element, annotation),
            (None, Some(annotation)) => {
                let declaration = annotation
                    .id_list(REPLACES_ARGUMENT)
                    .into_iter()
                    .fold(installed(element, annotation), |module, replaced| {
                        module.replacing(replaced)
                    })
                    .test_only();
                if declaration.replaces().is_empty() {
                    report.push(
                        Diagnostic::error(format!(
                            "{} on `{}` must name at least one replaced module",
                            markers.test_install_in(),
                            element.name()
                        ))
                        .with_code(ErrorCode::E309)
                        .with_label(element.id(), "replaces nothing")
                        .with_help(format!(
                            "use {} for modules that only add bindings",
                            markers.install_in()
                        )),
                    );
                }
                declaration
            }
        };

        if !element.has_annotation(markers.module()) {
            let marker = install_in
                .map(|_| markers.install_in())
                .unwrap_or(markers.test_install_in());
            report.push(
                Diagnostic::error(format!(
                    "{marker} can only be used on {} types, but `{}` is not one",
                    markers.module(),
                    element.name()
                ))
                .with_code(ErrorCode::E308)
                .with_label(element.id(), "not a module"),
            );
        }

        debug!(
            module:% = declaration.name(),
            components = declaration.install_targets().len(),
            replaces = declaration.replaces().len(),
            test_only = declaration.is_test_only();
            "Module declaration extracted"
        );
        declarations.push(declaration);
    }

    (declarations, report)
}

fn installed(element: &ProgramElement, annotation: &Annotation) -> ModuleDeclaration {
    annotation
        .id_list(COMPONENTS_ARGUMENT)
        .into_iter()
        .map(ComponentId::from)
        .fold(
            ModuleDeclaration::new(element.name()).with_origin(element.id()),
            ModuleDeclaration::installed_in,
        )
}

#[cfg(test)]
mod tests {
    use bindery_core::{
        element::{AnnotationValue, ElementDraft, ElementKind},
        identifier::Id,
    };

    use super::*;

    fn list(values: &[&str]) -> AnnotationValue {
        AnnotationValue::List(values.iter().map(|value| value.to_string()).collect())
    }

    fn install_in(components: &[&str]) -> Annotation {
        Annotation::new("dagger.hilt.InstallIn").with_argument(COMPONENTS_ARGUMENT, list(components))
    }

    fn test_install_in(components: &[&str], replaces: &[&str]) -> Annotation {
        Annotation::new("dagger.hilt.testing.TestInstallIn")
            .with_argument(COMPONENTS_ARGUMENT, list(components))
            .with_argument(REPLACES_ARGUMENT, list(replaces))
    }

    fn module_type(name: &str, annotation: Annotation) -> ElementDraft {
        ElementDraft::new(ElementKind::Class, name)
            .with_annotation(Annotation::new("dagger.Module"))
            .with_annotation(annotation)
    }

    fn extract(drafts: Vec<ElementDraft>) -> (Vec<ModuleDeclaration>, ValidationReport) {
        let mut builder = ElementModel::builder();
        for draft in drafts {
            builder.add(draft).unwrap();
        }
        extract_module_declarations(&builder.build(), &Markers::default())
    }

    fn codes(report: &ValidationReport) -> Vec<ErrorCode> {
        report.findings().iter().filter_map(Diagnostic::code).collect()
    }

    #[test]
    fn test_install_in_declaration() {
        let (modules, report) = extract(vec![module_type(
            "ClockModule",
            install_in(&["SingletonComponent", "ActivityComponent"]),
        )]);

        assert!(report.is_clean());
        assert_eq!(modules.len(), 1);
        let module = &modules[0];
        assert_eq!(module.name(), "ClockModule");
        assert!(!module.is_test_only());
        assert_eq!(module.install_targets().len(), 2);
        assert!(module.origin().is_some());
    }

    #[test]
    fn test_test_install_in_declaration() {
        let (modules, report) = extract(vec![module_type(
            "FakeClockModule",
            test_install_in(&["SingletonComponent"], &["ClockModule"]),
        )]);

        assert!(report.is_clean());
        let module = &modules[0];
        assert!(module.is_test_only());
        assert!(module.replaces().contains(&Id::new("ClockModule")));
    }

    #[test]
    fn test_both_markers_rejected() {
        let draft = module_type("Confused", install_in(&["C"]))
            .with_annotation(test_install_in(&["C"], &["Other"]));
        let (modules, report) = extract(vec![draft]);

        assert!(modules.is_empty());
        assert_eq!(codes(&report), vec![ErrorCode::E307]);
    }

    #[test]
    fn test_install_in_requires_module_marker() {
        let draft = ElementDraft::new(ElementKind::Class, "Plain").with_annotation(install_in(&["C"]));
        let (modules, report) = extract(vec![draft]);

        assert_eq!(modules.len(), 1);
        assert_eq!(codes(&report), vec![ErrorCode::E308]);
    }

    #[test]
    fn test_empty_replaces_rejected() {
        let (modules, report) = extract(vec![module_type("Fake", test_install_in(&["C"], &[]))]);

        assert_eq!(modules.len(), 1);
        assert_eq!(codes(&report), vec![ErrorCode::E309]);
    }

    #[test]
    fn test_unannotated_types_skipped() {
        let (modules, report) = extract(vec![ElementDraft::new(ElementKind::Class, "Service")]);
        assert!(modules.is_empty());
        assert!(report.is_clean());
    }
}
