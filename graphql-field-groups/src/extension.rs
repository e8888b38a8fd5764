//! Typed extension points.
//!
//! Each hook has a pass-through default, so an [`Extension`] overrides only what it needs.
//! Hooks run in a fixed place of compilation or resolution:
//!
//! | Hook | Runs |
//! |---|---|
//! | [`Extension::should_expose_group`] | before a group passes the exposure gate |
//! | [`Extension::map_field`] | before the built-in mapping of a field |
//! | [`Extension::prepared_field`] | after a field mapping is final |
//! | [`Extension::root_id`] | after the storage identifier of a root is computed |
//! | [`Extension::field_value`] | last step of value resolution |

use std::fmt;

use crate::JsonValue;
use crate::descriptor::FieldDescriptor;
use crate::descriptor::FieldGroupDescriptor;
use crate::entity::Source;
use crate::schema::FieldResolver;
use crate::schema::OutputType;

/// The declared shape of one output field.
#[derive(Clone)]
pub struct FieldMapping {
    pub ty: OutputType,
    pub description: Option<String>,
    pub resolve: FieldResolver,
}

impl fmt::Debug for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapping")
            .field("ty", &self.ty)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A replacement mapping supplied by [`Extension::map_field`].
///
/// Unset parts fall back to a `String` type, the derived description and the standard
/// value resolver.
#[derive(Clone, Default)]
pub struct PartialMapping {
    pub ty: Option<OutputType>,
    pub description: Option<String>,
    pub resolve: Option<FieldResolver>,
}

impl fmt::Debug for PartialMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialMapping")
            .field("ty", &self.ty)
            .field("description", &self.description)
            .field("resolve", &self.resolve.is_some())
            .finish()
    }
}

pub trait Extension: Send + Sync {
    /// Replaces the built-in mapping of a field when it returns `Some`.
    fn map_field(
        &self,
        _field: &FieldDescriptor,
        _group: &FieldGroupDescriptor,
    ) -> Option<PartialMapping> {
        None
    }

    /// Post-processes every final field mapping.
    fn prepared_field(
        &self,
        mapping: FieldMapping,
        _field: &FieldDescriptor,
        _group: &FieldGroupDescriptor,
    ) -> FieldMapping {
        mapping
    }

    /// Supplies or overrides the identifier values of `source` are stored under.
    fn root_id(&self, _source: &Source, computed: Option<String>) -> Option<String> {
        computed
    }

    /// Overrides a resolved value.
    fn field_value(
        &self,
        value: Option<JsonValue>,
        _source: &Source,
        _field: &FieldDescriptor,
    ) -> Option<JsonValue> {
        value
    }

    /// Overrides the exposure flag of a top-level group.
    fn should_expose_group(&self, _group: &FieldGroupDescriptor, exposed: bool) -> bool {
        exposed
    }
}

/// Changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtension;

impl Extension for NoExtension {}
