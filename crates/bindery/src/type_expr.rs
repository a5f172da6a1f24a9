//! Parser for the type expressions used in round manifests.
//!
//! Grammar:
//!
//! ```text
//! type      := name arguments?
//! arguments := '<' type (',' type)* '>'
//! name      := segment ('.' segment)*
//! ```
//!
//! `void` and the primitive names map to their [`TypeRef`] variants. A bare
//! name listed among the type variables in scope becomes
//! [`TypeRef::Variable`]; everything else is a declared type.

use thiserror::Error;
use winnow::{
    Parser as _,
    ascii::multispace0,
    combinator::{delimited, opt, preceded, repeat, separated},
    error::{ContextError, ErrMode},
    token::take_while,
};

use bindery_core::{element::TypeRef, identifier::Id};

type Input<'src> = &'src str;
type IResult<O> = Result<O, ErrMode<ContextError>>;

const PRIMITIVES: [&str; 8] = [
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

/// A type expression that could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid type expression `{expr}` at offset {offset}")]
pub struct TypeExprError {
    expr: String,
    offset: usize,
}

impl TypeExprError {
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Byte offset into the expression where parsing stopped.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Parse `source` into a [`TypeRef`], resolving `type_variables` by name.
///
/// ```
/// # use bindery::type_expr::parse_type;
/// # use bindery_core::{element::TypeRef, identifier::Id};
/// let ty = parse_type("dagger.Lazy<T>", &[Id::new("T")]).unwrap();
/// assert_eq!(
///     ty,
///     TypeRef::generic("dagger.Lazy", vec![TypeRef::Variable(Id::new("T"))])
/// );
/// ```
///
/// # Errors
///
/// Returns [`TypeExprError`] if `source` is not a complete type expression.
pub fn parse_type(source: &str, type_variables: &[Id]) -> Result<TypeRef, TypeExprError> {
    (|input: &mut Input<'_>| type_expr(input, type_variables))
        .parse(source)
        .map_err(|err| TypeExprError {
            expr: source.to_string(),
            offset: err.offset(),
        })
}

fn ws<'src>(input: &mut Input<'src>) -> IResult<()> {
    multispace0.void().parse_next(input)
}

fn segment<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    (
        take_while(1, |c: char| c.is_alphabetic() || c == '_' || c == '$'),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_' || c == '$'),
    )
        .take()
        .parse_next(input)
}

fn qualified_name<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    (segment, repeat(0.., preceded('.', segment)).map(|()| ()))
        .take()
        .parse_next(input)
}

fn type_expr<'src>(input: &mut Input<'src>, type_variables: &[Id]) -> IResult<TypeRef> {
    let name = preceded(ws, qualified_name).parse_next(input)?;
    let arguments: Option<Vec<TypeRef>> = opt(delimited(
        preceded(ws, '<'),
        separated(1.., |input: &mut Input<'src>| type_expr(input, type_variables), ','),
        preceded(ws, '>'),
    ))
    .parse_next(input)?;
    ws.parse_next(input)?;

    let id = Id::new(name);
    match arguments {
        None if name == "void" => Ok(TypeRef::Void),
        None if PRIMITIVES.contains(&name) => Ok(TypeRef::Primitive(id)),
        None if type_variables.contains(&id) => Ok(TypeRef::Variable(id)),
        None => Ok(TypeRef::declared(id)),
        Some(_) if name == "void" || PRIMITIVES.contains(&name) || type_variables.contains(&id) => {
            Err(ErrMode::Cut(ContextError::new()))
        }
        Some(arguments) => Ok(TypeRef::generic(id, arguments)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<TypeRef, TypeExprError> {
        parse_type(source, &[Id::new("T"), Id::new("U")])
    }

    #[test]
    fn test_declared_type() {
        assert_eq!(
            parse("com.example.Application").unwrap(),
            TypeRef::declared("com.example.Application")
        );
    }

    #[test]
    fn test_void_and_primitives() {
        assert_eq!(parse("void").unwrap(), TypeRef::Void);
        assert_eq!(parse("int").unwrap(), TypeRef::Primitive(Id::new("int")));
    }

    #[test]
    fn test_type_variable_in_scope() {
        assert_eq!(parse("T").unwrap(), TypeRef::Variable(Id::new("T")));
        assert_eq!(parse("V").unwrap(), TypeRef::declared("V"));
    }

    #[test]
    fn test_nested_generics_with_whitespace() {
        let ty = parse(" javax.inject.Provider< java.util.Map<T , U> > ").unwrap();
        assert_eq!(
            ty,
            TypeRef::generic(
                "javax.inject.Provider",
                vec![TypeRef::generic(
                    "java.util.Map",
                    vec![TypeRef::Variable(Id::new("T")), TypeRef::Variable(Id::new("U"))]
                )]
            )
        );
        assert_eq!(ty.to_string(), "javax.inject.Provider<java.util.Map<T, U>>");
    }

    #[test]
    fn test_invalid_expressions() {
        for source in ["", "a.", "Foo<", "Foo<>", "Foo<Bar", "Foo Bar", "1abc", "int<Foo>"] {
            assert!(parse(source).is_err(), "{source:?} should not parse");
        }
    }

    #[test]
    fn test_error_reports_expression() {
        let err = parse("Foo<").unwrap_err();
        assert_eq!(err.expr(), "Foo<");
        assert!(err.offset() <= 4);
    }
}
