//! Program elements as exposed by the host compiler's structural model.
//!
//! A [`ProgramElement`] is an immutable snapshot of one declaration (a type,
//! a method, a parameter, ...) together with its annotations and declared
//! type. Elements refer to their enclosing element by [`ElementId`]; the
//! owning [`ElementModel`](crate::model::ElementModel) resolves those ids.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{identifier::Id, marker::AnnotationMarker};

/// The structural category of a program element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Method,
    Constructor,
    Parameter,
    Field,
}

impl ElementKind {
    /// Returns `true` for kinds that declare a type.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            ElementKind::Class | ElementKind::Interface | ElementKind::Enum | ElementKind::Annotation
        )
    }

    /// Returns `true` for methods and constructors.
    pub fn is_executable(&self) -> bool {
        matches!(self, ElementKind::Method | ElementKind::Constructor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Class => "class",
            ElementKind::Interface => "interface",
            ElementKind::Enum => "enum",
            ElementKind::Annotation => "annotation type",
            ElementKind::Method => "method",
            ElementKind::Constructor => "constructor",
            ElementKind::Parameter => "parameter",
            ElementKind::Field => "field",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration modifiers relevant to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Abstract,
    Static,
    Private,
    Final,
}

/// Index of an element inside its [`ElementModel`](crate::model::ElementModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single annotation argument value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Str(String),
    List(Vec<String>),
}

impl AnnotationValue {
    /// Returns the string values carried by this argument.
    ///
    /// A single string is treated as a one-element list, mirroring how
    /// annotation array arguments accept a lone value.
    pub fn strings(&self) -> Vec<&str> {
        match self {
            AnnotationValue::Bool(_) => Vec::new(),
            AnnotationValue::Str(value) => vec![value.as_str()],
            AnnotationValue::List(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// An annotation instance: a name plus an ordered argument mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    name: Id,
    arguments: IndexMap<String, AnnotationValue>,
}

impl Annotation {
    /// Create an annotation without arguments.
    pub fn new(name: impl Into<Id>) -> Self {
        Self {
            name: name.into(),
            arguments: IndexMap::new(),
        }
    }

    /// Create an annotation from a name and a prepared argument map.
    pub fn with_arguments(name: Id, arguments: IndexMap<String, AnnotationValue>) -> Self {
        Self { name, arguments }
    }

    /// Add an argument, replacing any previous value under the same key.
    pub fn with_argument(mut self, key: impl Into<String>, value: AnnotationValue) -> Self {
        self.arguments.insert(key.into(), value);
        self
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn argument(&self, key: &str) -> Option<&AnnotationValue> {
        self.arguments.get(key)
    }

    pub fn arguments(&self) -> &IndexMap<String, AnnotationValue> {
        &self.arguments
    }

    /// Read an argument as a list of identifiers. Missing arguments yield an empty list.
    pub fn id_list(&self, key: &str) -> Vec<Id> {
        self.argument(key)
            .map(|value| value.strings().into_iter().map(Id::new).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if this annotation is an instance of `marker`.
    pub fn is(&self, marker: &AnnotationMarker) -> bool {
        self.name == marker.name()
    }
}

/// Statically known type information of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// The absence of a value (`void`).
    Void,
    /// A primitive such as `int` or `boolean`.
    Primitive(Id),
    /// A reference to a type variable in scope, e.g. `T`.
    Variable(Id),
    /// A declared class or interface type with optional type arguments.
    Declared { name: Id, arguments: Vec<TypeRef> },
}

impl TypeRef {
    /// A declared type without type arguments.
    pub fn declared(name: impl Into<Id>) -> Self {
        TypeRef::Declared {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// A declared type with type arguments.
    pub fn generic(name: impl Into<Id>, arguments: Vec<TypeRef>) -> Self {
        TypeRef::Declared {
            name: name.into(),
            arguments,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, TypeRef::Variable(_))
    }

    /// The name of the declared type with type arguments erased.
    pub fn erasure(&self) -> Option<Id> {
        match self {
            TypeRef::Declared { name, .. } => Some(*name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "void"),
            TypeRef::Primitive(name) | TypeRef::Variable(name) => write!(f, "{name}"),
            TypeRef::Declared { name, arguments } => {
                write!(f, "{name}")?;
                if !arguments.is_empty() {
                    write!(f, "<")?;
                    for (i, argument) in arguments.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{argument}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

/// An immutable program element.
#[derive(Debug, Clone)]
pub struct ProgramElement {
    id: ElementId,
    kind: ElementKind,
    name: Id,
    enclosing: Option<ElementId>,
    annotations: Vec<Annotation>,
    modifiers: Vec<Modifier>,
    declared_type: TypeRef,
}

impl ProgramElement {
    pub(crate) fn new(id: ElementId, draft: ElementDraft) -> Self {
        Self {
            id,
            kind: draft.kind,
            name: draft.name,
            enclosing: draft.enclosing,
            annotations: draft.annotations,
            modifiers: draft.modifiers,
            declared_type: draft.declared_type,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn name(&self) -> Id {
        self.name
    }

    /// The enclosing element, if any. This is a back-reference, not ownership.
    pub fn enclosing(&self) -> Option<ElementId> {
        self.enclosing
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn declared_type(&self) -> &TypeRef {
        &self.declared_type
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_abstract(&self) -> bool {
        self.has_modifier(Modifier::Abstract)
    }

    /// Returns the first annotation matching `marker`.
    pub fn annotation(&self, marker: &AnnotationMarker) -> Option<&Annotation> {
        self.annotations.iter().find(|annotation| annotation.is(marker))
    }

    pub fn has_annotation(&self, marker: &AnnotationMarker) -> bool {
        self.annotation(marker).is_some()
    }
}

/// Description of an element before it is placed into a model.
///
/// ```
/// use bindery_core::element::{Annotation, ElementDraft, ElementKind, TypeRef};
///
/// let draft = ElementDraft::new(ElementKind::Method, "provideClock")
///     .returning(TypeRef::declared("java.time.Clock"))
///     .with_annotation(Annotation::new("dagger.Provides"));
/// ```
#[derive(Debug, Clone)]
pub struct ElementDraft {
    kind: ElementKind,
    name: Id,
    enclosing: Option<ElementId>,
    annotations: Vec<Annotation>,
    modifiers: Vec<Modifier>,
    declared_type: TypeRef,
}

impl ElementDraft {
    pub fn new(kind: ElementKind, name: impl Into<Id>) -> Self {
        Self {
            kind,
            name: name.into(),
            enclosing: None,
            annotations: Vec::new(),
            modifiers: Vec::new(),
            declared_type: TypeRef::Void,
        }
    }

    pub fn enclosed_by(mut self, enclosing: ElementId) -> Self {
        self.enclosing = Some(enclosing);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        if !self.modifiers.contains(&modifier) {
            self.modifiers.push(modifier);
        }
        self
    }

    /// Set the declared type (the return type for methods).
    pub fn returning(mut self, declared_type: TypeRef) -> Self {
        self.declared_type = declared_type;
        self
    }

    /// Alias of [`ElementDraft::returning`] that reads better for parameters and fields.
    pub fn of_type(self, declared_type: TypeRef) -> Self {
        self.returning(declared_type)
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn enclosing(&self) -> Option<ElementId> {
        self.enclosing
    }
}
