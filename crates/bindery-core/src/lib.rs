//! Bindery Core Types and Definitions
//!
//! This crate provides the read-only structural model the Bindery validators
//! operate on. It includes:
//!
//! - **Identifiers**: String-interned identifiers ([`identifier::Id`])
//! - **Elements**: Program elements, their kinds, annotations and types ([`element`] module)
//! - **Model**: The per-round element arena and its builder ([`model`] module)
//! - **Markers**: Annotation names used as lookup keys ([`marker::AnnotationMarker`])
//! - **Modules**: Module declarations and installation edges ([`module`] module)

pub mod element;
pub mod identifier;
pub mod marker;
pub mod model;
pub mod module;
