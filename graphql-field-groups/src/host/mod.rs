//! Collaborators provided by the host application.
//!
//! The compiler only reads through these traits: the configuration store, the entity store,
//! the content filter pipeline and the admin check. [`memory`] has read-only in-memory
//! implementations.

pub mod memory;

use serde::Deserialize;
use serde::Serialize;

use crate::JsonValue;
use crate::descriptor::FieldDescriptor;
use crate::descriptor::FieldGroupDescriptor;
use crate::entity::Entity;
use crate::format;

/// The field configuration store.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigProvider: Send + Sync {
    /// All configured field groups.
    fn field_groups(&self) -> Vec<FieldGroupDescriptor>;

    /// The fields of a group, including the sub-fields of nested kinds.
    fn fields(&self, group: &FieldGroupDescriptor) -> Vec<FieldDescriptor> {
        group.fields.clone()
    }

    /// The stored value of `storage_key` for the entity identified by `identifier`.
    ///
    /// `format` asks for the store's formatted output instead of the raw value.
    fn value(&self, identifier: &str, storage_key: &str, format: bool) -> Option<JsonValue>;
}

/// Which entity provider an id is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Content,
    Media,
    Term,
    User,
    Comment,
    Menu,
    MenuItem,
}

/// The entity store.
#[cfg_attr(test, mockall::automock)]
pub trait EntityStore: Send + Sync {
    /// Loads an entity, `None` when it does not exist.
    fn resolve_by_id(&self, kind: LookupKind, id: i64) -> Option<Entity>;
}

/// The host's text filters.
pub trait ContentFilters: Send + Sync {
    /// The filter pipeline applied to rich text content.
    fn the_content(&self, html: &str) -> String {
        format::autop(html)
    }

    fn autop(&self, text: &str) -> String {
        format::autop(text)
    }

    fn nl2br(&self, text: &str) -> String {
        format::nl2br(text)
    }
}

/// Built-in paragraph and line break formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContentFilters;

impl ContentFilters for DefaultContentFilters {}

/// The admin check guarding field group metadata.
pub trait AccessPolicy: Send + Sync {
    fn can_view_field_group_config(&self) -> bool {
        false
    }
}

/// Denies access to field group metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl AccessPolicy for DenyAll {}

/// Grants access to field group metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn can_view_field_group_config(&self) -> bool {
        true
    }
}
