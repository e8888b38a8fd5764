//! Error types for schema compilation and field resolution.

use displaydoc::Display;
use thiserror::Error;

/// Errors raised while compiling field groups into the schema.
///
/// Every variant except [`CompileError::ExtensionContract`] is contained to the field group
/// that produced it: [`crate::TypeCompiler::compile_all`] rolls the registry back and moves on
/// to the next group.
#[derive(Error, Debug, Display, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompileError {
    /// '{raw}' does not produce a valid GraphQL name
    InvalidName { raw: String },

    /// type '{name}' is already declared by {existing} and cannot be declared again by {origin}
    TypeNameCollision {
        name: String,
        existing: String,
        origin: String,
    },

    /// field group '{0}' has no target kinds
    NoTargetKinds(String),

    /// extension returned an invalid mapping for field '{field}': {reason}
    ExtensionContract { field: String, reason: String },

    /// the composed schema is invalid: {0}
    Validation(String),

    /// could not parse the base schema: {0}
    BaseSchema(String),
}

impl CompileError {
    /// Fatal errors abort the whole compilation instead of skipping one field group.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompileError::ExtensionContract { .. })
    }
}

/// Errors surfaced to the query layer for a single field.
///
/// Missing data never produces one of these; it resolves to `null` or `[]` instead.
#[derive(Error, Debug, Display, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldError {
    /// no resolver is registered for '{type_name}.{field_name}'
    UnknownField {
        type_name: String,
        field_name: String,
    },

    /// cannot discriminate a value of kind '{kind}' for abstract type '{abstract_type}'
    UndiscriminatedEntity {
        abstract_type: String,
        kind: String,
    },

    /// '{0}' is not a discriminable abstract type
    UnknownAbstractType(String),
}
