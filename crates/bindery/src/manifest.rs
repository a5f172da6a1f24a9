//! Round manifests: element models described as TOML.
//!
//! A manifest lists top-level types with their methods, constructors,
//! fields and nested types, and optionally module declarations that do not
//! come from annotated types. Loading a manifest produces a [`Round`]: the
//! [`ElementModel`], the directly declared modules, and a [`SourceMap`]
//! pointing every element back at its name in the manifest text.
//!
//! ```toml
//! [[types]]
//! name = "com.example.AppComponent.Builder"
//! kind = "interface"
//! annotations = [{ name = "dagger.Component.Builder" }]
//!
//! [[types.methods]]
//! name = "application"
//! returns = "com.example.AppComponent.Builder"
//! modifiers = ["abstract"]
//!
//! [[types.methods.parameters]]
//! name = "app"
//! type = "com.example.Application"
//! annotations = [{ name = "dagger.BindsInstance" }]
//!
//! [[modules]]
//! name = "com.example.ExtraModule"
//! install_in = ["SingletonComponent"]
//! ```

use std::{collections::HashMap, ops::Range};

use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;
use toml::Spanned;

use bindery_core::{
    element::{Annotation, AnnotationValue, ElementDraft, ElementId, ElementKind, Modifier, TypeRef},
    identifier::Id,
    model::{ElementModel, ElementModelBuilder, ModelError},
    module::{ComponentId, ModuleDeclaration},
};

use crate::type_expr::{self, TypeExprError};

/// Name given to constructor elements.
const CONSTRUCTOR_NAME: &str = "<init>";

/// Errors raised while loading a manifest. Each carries the byte range of
/// the offending manifest text when it is known.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid manifest: {message}")]
    Syntax {
        message: String,
        span: Option<Range<usize>>,
    },

    #[error("{error}")]
    Type {
        error: TypeExprError,
        span: Range<usize>,
    },

    #[error("invalid element `{name}`: {error}")]
    Model {
        name: String,
        error: ModelError,
        span: Range<usize>,
    },
}

impl ManifestError {
    /// The manifest text the error points at.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            ManifestError::Syntax { span, .. } => span.clone(),
            ManifestError::Type { span, .. } | ManifestError::Model { span, .. } => {
                Some(span.clone())
            }
        }
    }
}

/// Maps elements back to the manifest text that declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    spans: HashMap<ElementId, Range<usize>>,
}

impl SourceMap {
    pub fn span(&self, element: ElementId) -> Option<Range<usize>> {
        self.spans.get(&element).cloned()
    }

    fn insert(&mut self, element: ElementId, span: Range<usize>) {
        self.spans.insert(element, span);
    }
}

/// Manifest text together with the spans of the elements it declared.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    text: String,
    spans: SourceMap,
}

impl ManifestSource {
    pub fn new(text: impl Into<String>, spans: SourceMap) -> Self {
        Self {
            text: text.into(),
            spans,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &SourceMap {
        &self.spans
    }
}

/// The input of one processing round.
#[derive(Debug)]
pub struct Round {
    model: ElementModel,
    modules: Vec<ModuleDeclaration>,
    spans: SourceMap,
}

impl Round {
    /// Assemble a round from an already built model.
    pub fn new(model: ElementModel, modules: Vec<ModuleDeclaration>) -> Self {
        Self {
            model,
            modules,
            spans: SourceMap::default(),
        }
    }

    pub fn model(&self) -> &ElementModel {
        &self.model
    }

    /// Module declarations listed directly in the manifest.
    pub fn modules(&self) -> &[ModuleDeclaration] {
        &self.modules
    }

    pub fn spans(&self) -> &SourceMap {
        &self.spans
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoundManifest {
    #[serde(default)]
    types: Vec<TypeEntry>,
    #[serde(default)]
    modules: Vec<ModuleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeEntry {
    name: Spanned<String>,
    #[serde(default = "TypeEntry::default_kind")]
    kind: ElementKind,
    #[serde(default)]
    annotations: Vec<AnnotationEntry>,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    #[serde(default)]
    type_parameters: Vec<String>,
    #[serde(default)]
    methods: Vec<MethodEntry>,
    #[serde(default)]
    constructors: Vec<ConstructorEntry>,
    #[serde(default)]
    fields: Vec<FieldEntry>,
    #[serde(default)]
    types: Vec<TypeEntry>,
}

impl TypeEntry {
    fn default_kind() -> ElementKind {
        ElementKind::Class
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodEntry {
    name: Spanned<String>,
    #[serde(default)]
    returns: Option<Spanned<String>>,
    #[serde(default)]
    annotations: Vec<AnnotationEntry>,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    #[serde(default)]
    type_parameters: Vec<String>,
    #[serde(default)]
    parameters: Vec<ParameterEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstructorEntry {
    #[serde(default)]
    annotations: Vec<AnnotationEntry>,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    #[serde(default)]
    parameters: Vec<ParameterEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterEntry {
    name: Spanned<String>,
    #[serde(rename = "type")]
    ty: Spanned<String>,
    #[serde(default)]
    annotations: Vec<AnnotationEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldEntry {
    name: Spanned<String>,
    #[serde(rename = "type")]
    ty: Spanned<String>,
    #[serde(default)]
    annotations: Vec<AnnotationEntry>,
    #[serde(default)]
    modifiers: Vec<Modifier>,
}

/// An annotation: its name plus any number of named arguments.
#[derive(Debug, Deserialize)]
struct AnnotationEntry {
    name: String,
    #[serde(flatten)]
    arguments: IndexMap<String, AnnotationValue>,
}

impl AnnotationEntry {
    fn to_annotation(&self) -> Annotation {
        Annotation::with_arguments(Id::new(&self.name), self.arguments.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModuleEntry {
    name: Spanned<String>,
    #[serde(default)]
    install_in: Vec<String>,
    #[serde(default)]
    replaces: Vec<String>,
    #[serde(default)]
    test_only: bool,
}

impl ModuleEntry {
    fn to_declaration(&self) -> ModuleDeclaration {
        let module = self
            .install_in
            .iter()
            .map(|component| ComponentId::new(component.as_str()))
            .fold(
                ModuleDeclaration::new(self.name.get_ref().as_str()),
                ModuleDeclaration::installed_in,
            );
        let module = self
            .replaces
            .iter()
            .fold(module, |module, replaced| module.replacing(replaced.as_str()));
        if self.test_only {
            module.test_only()
        } else {
            module
        }
    }
}

/// Load a round from manifest text.
///
/// # Errors
///
/// Returns [`ManifestError`] if the TOML is malformed, a type expression does
/// not parse, or the described nesting is impossible.
pub fn load_round(source: &str) -> Result<Round, ManifestError> {
    let manifest: RoundManifest = toml::from_str(source).map_err(|err| ManifestError::Syntax {
        message: err.message().to_string(),
        span: err.span(),
    })?;

    let mut loader = Loader::default();
    for entry in &manifest.types {
        loader.add_type(entry, None, &[])?;
    }
    let modules: Vec<ModuleDeclaration> = manifest
        .modules
        .iter()
        .map(ModuleEntry::to_declaration)
        .collect();

    let model = loader.builder.build();
    info!(elements = model.len(), modules = modules.len(); "Manifest loaded");

    Ok(Round {
        model,
        modules,
        spans: loader.spans,
    })
}

#[derive(Default)]
struct Loader {
    builder: ElementModelBuilder,
    spans: SourceMap,
}

impl Loader {
    fn add(
        &mut self,
        draft: ElementDraft,
        name: &str,
        span: Range<usize>,
    ) -> Result<ElementId, ManifestError> {
        let id = self
            .builder
            .add(draft)
            .map_err(|error| ManifestError::Model {
                name: name.to_string(),
                error,
                span: span.clone(),
            })?;
        self.spans.insert(id, span);
        Ok(id)
    }

    fn add_type(
        &mut self,
        entry: &TypeEntry,
        enclosing: Option<ElementId>,
        outer_scope: &[Id],
    ) -> Result<ElementId, ManifestError> {
        let name = entry.name.get_ref();
        let scope = extend_scope(outer_scope, &entry.type_parameters);

        let mut draft = ElementDraft::new(entry.kind, name.as_str()).returning(TypeRef::declared(name.as_str()));
        if let Some(enclosing) = enclosing {
            draft = draft.enclosed_by(enclosing);
        }
        let draft = decorate(draft, &entry.annotations, &entry.modifiers);
        let id = self.add(draft, name, entry.name.span())?;
        debug!(name = name.as_str(), kind:% = entry.kind; "Type loaded");

        for method in &entry.methods {
            self.add_method(method, id, &scope)?;
        }
        for constructor in &entry.constructors {
            self.add_constructor(constructor, id, entry.name.span(), &scope)?;
        }
        for field in &entry.fields {
            let ty = resolve_type(&field.ty, &scope)?;
            let draft = decorate(
                ElementDraft::new(ElementKind::Field, field.name.get_ref().as_str())
                    .enclosed_by(id)
                    .of_type(ty),
                &field.annotations,
                &field.modifiers,
            );
            self.add(draft, field.name.get_ref(), field.name.span())?;
        }
        for nested in &entry.types {
            self.add_type(nested, Some(id), &scope)?;
        }

        Ok(id)
    }

    fn add_method(
        &mut self,
        entry: &MethodEntry,
        owner: ElementId,
        outer_scope: &[Id],
    ) -> Result<ElementId, ManifestError> {
        let scope = extend_scope(outer_scope, &entry.type_parameters);
        let returns = match &entry.returns {
            Some(returns) => resolve_type(returns, &scope)?,
            None => TypeRef::Void,
        };

        let name = entry.name.get_ref();
        let draft = decorate(
            ElementDraft::new(ElementKind::Method, name.as_str())
                .enclosed_by(owner)
                .returning(returns),
            &entry.annotations,
            &entry.modifiers,
        );
        let id = self.add(draft, name, entry.name.span())?;

        for parameter in &entry.parameters {
            self.add_parameter(parameter, id, &scope)?;
        }
        Ok(id)
    }

    fn add_constructor(
        &mut self,
        entry: &ConstructorEntry,
        owner: ElementId,
        owner_span: Range<usize>,
        scope: &[Id],
    ) -> Result<ElementId, ManifestError> {
        let draft = decorate(
            ElementDraft::new(ElementKind::Constructor, CONSTRUCTOR_NAME).enclosed_by(owner),
            &entry.annotations,
            &entry.modifiers,
        );
        let id = self.add(draft, CONSTRUCTOR_NAME, owner_span)?;

        for parameter in &entry.parameters {
            self.add_parameter(parameter, id, scope)?;
        }
        Ok(id)
    }

    fn add_parameter(
        &mut self,
        entry: &ParameterEntry,
        executable: ElementId,
        scope: &[Id],
    ) -> Result<ElementId, ManifestError> {
        let ty = resolve_type(&entry.ty, scope)?;
        let name = entry.name.get_ref();
        let draft = decorate(
            ElementDraft::new(ElementKind::Parameter, name.as_str())
                .enclosed_by(executable)
                .of_type(ty),
            &entry.annotations,
            &[],
        );
        self.add(draft, name, entry.name.span())
    }
}

fn decorate(
    draft: ElementDraft,
    annotations: &[AnnotationEntry],
    modifiers: &[Modifier],
) -> ElementDraft {
    let draft = annotations
        .iter()
        .fold(draft, |draft, annotation| draft.with_annotation(annotation.to_annotation()));
    modifiers
        .iter()
        .fold(draft, |draft, modifier| draft.with_modifier(*modifier))
}

fn extend_scope(outer: &[Id], type_parameters: &[String]) -> Vec<Id> {
    outer
        .iter()
        .copied()
        .chain(type_parameters.iter().map(|name| Id::new(name)))
        .collect()
}

fn resolve_type(expr: &Spanned<String>, scope: &[Id]) -> Result<TypeRef, ManifestError> {
    type_expr::parse_type(expr.get_ref(), scope).map_err(|error| ManifestError::Type {
        error,
        span: expr.span(),
    })
}

#[cfg(test)]
mod tests {
    use bindery_core::marker::AnnotationMarker;

    use super::*;

    const BUILDER: &str = r#"
[[types]]
name = "com.example.AppComponent.Builder"
kind = "interface"
annotations = [{ name = "dagger.Component.Builder" }]

[[types.methods]]
name = "application"
returns = "com.example.AppComponent.Builder"
modifiers = ["abstract"]

[[types.methods.parameters]]
name = "app"
type = "com.example.Application"
annotations = [{ name = "dagger.BindsInstance" }]
"#;

    #[test]
    fn test_load_builder() {
        let round = load_round(BUILDER).unwrap();
        let model = round.model();

        assert_eq!(model.len(), 3);
        let marker = AnnotationMarker::new("dagger.BindsInstance");
        let annotated: Vec<_> = model.annotated_with(&marker).collect();
        assert_eq!(annotated.len(), 1);

        let param = model.get(annotated[0]).unwrap();
        assert_eq!(param.kind(), ElementKind::Parameter);
        assert_eq!(param.declared_type(), &TypeRef::declared("com.example.Application"));

        let method = model.enclosing(param).unwrap();
        assert!(method.is_abstract());
    }

    #[test]
    fn test_spans_point_at_names() {
        let round = load_round(BUILDER).unwrap();
        let param = round
            .model()
            .iter()
            .find(|element| element.kind() == ElementKind::Parameter)
            .unwrap();

        let span = round.spans().span(param.id()).unwrap();
        assert!(BUILDER[span].contains("app"));
    }

    #[test]
    fn test_annotation_arguments_and_modules() {
        let round = load_round(
            r#"
[[types]]
name = "FakeClockModule"
annotations = [
    { name = "dagger.Module" },
    { name = "dagger.hilt.testing.TestInstallIn", components = ["SingletonComponent"], replaces = ["ClockModule"] },
]

[[modules]]
name = "ClockModule"
install_in = ["SingletonComponent"]
"#,
        )
        .unwrap();

        let module_type = round.model().iter().next().unwrap();
        let annotation = module_type
            .annotation(&AnnotationMarker::new("dagger.hilt.testing.TestInstallIn"))
            .unwrap();
        assert_eq!(annotation.id_list("replaces"), vec![Id::new("ClockModule")]);

        assert_eq!(round.modules().len(), 1);
        assert_eq!(round.modules()[0].name(), "ClockModule");
        assert!(round.modules()[0].is_installed());
    }

    #[test]
    fn test_type_parameters_resolve_to_variables() {
        let round = load_round(
            r#"
[[types]]
name = "Holder"
type_parameters = ["T"]

[[types.constructors]]

[[types.constructors.parameters]]
name = "value"
type = "T"
"#,
        )
        .unwrap();

        let param = round
            .model()
            .iter()
            .find(|element| element.kind() == ElementKind::Parameter)
            .unwrap();
        assert_eq!(param.declared_type(), &TypeRef::Variable(Id::new("T")));
        assert_eq!(
            round.model().enclosing(param).map(|e| e.kind()),
            Some(ElementKind::Constructor)
        );
    }

    #[test]
    fn test_bad_type_expression_has_span() {
        let source = r#"
[[types]]
name = "Service"

[[types.fields]]
name = "clock"
type = "Provider<"
"#;
        let err = load_round(source).unwrap_err();
        assert!(matches!(err, ManifestError::Type { .. }));
        assert!(source[err.span().unwrap()].contains("Provider<"));
    }

    #[test]
    fn test_illegal_kind_is_model_error() {
        let err = load_round(
            r#"
[[types]]
name = "notAType"
kind = "method"
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Model {
                error: ModelError::MissingEnclosing(ElementKind::Method),
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = load_round("[[types]\nname = ").unwrap_err();
        assert!(matches!(err, ManifestError::Syntax { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = load_round("[[types]]\nname = \"A\"\nflavour = \"sweet\"\n").unwrap_err();
        assert!(matches!(err, ManifestError::Syntax { .. }));
    }
}
