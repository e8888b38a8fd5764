//! In-memory host collaborators.

use std::collections::HashMap;

use serde::Deserialize;

use super::ConfigProvider;
use super::EntityStore;
use super::LookupKind;
use crate::JsonValue;
use crate::descriptor::FieldGroupDescriptor;
use crate::entity::Entity;

/// A configuration store holding field groups and values in memory.
///
/// Values are keyed by entity identifier and storage key. The store has no formatting of its
/// own, so formatted and raw reads return the same value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryConfigProvider {
    field_groups: Vec<FieldGroupDescriptor>,
    values: HashMap<String, HashMap<String, JsonValue>>,
}

impl MemoryConfigProvider {
    pub fn new(field_groups: Vec<FieldGroupDescriptor>) -> Self {
        Self {
            field_groups,
            values: HashMap::new(),
        }
    }

    /// Reads either a list of field groups or an object with `field_groups` and `values`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Stored {
            Groups(Vec<FieldGroupDescriptor>),
            Full(MemoryConfigProvider),
        }

        Ok(match serde_json::from_str(json)? {
            Stored::Groups(groups) => Self::new(groups),
            Stored::Full(provider) => provider,
        })
    }

    pub fn with_group(mut self, group: FieldGroupDescriptor) -> Self {
        self.field_groups.push(group);
        self
    }

    pub fn with_value(
        mut self,
        identifier: impl Into<String>,
        storage_key: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Self {
        self.values
            .entry(identifier.into())
            .or_default()
            .insert(storage_key.into(), value.into());
        self
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn field_groups(&self) -> Vec<FieldGroupDescriptor> {
        self.field_groups.clone()
    }

    fn value(&self, identifier: &str, storage_key: &str, _format: bool) -> Option<JsonValue> {
        self.values.get(identifier)?.get(storage_key).cloned()
    }
}

/// An entity store holding entities in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntityStore {
    entities: HashMap<(LookupKind, i64), Entity>,
}

impl MemoryEntityStore {
    pub fn with_entity(mut self, kind: LookupKind, entity: Entity) -> Self {
        self.insert(kind, entity);
        self
    }

    pub fn insert(&mut self, kind: LookupKind, entity: Entity) {
        self.entities.insert((kind, entity.id), entity);
    }
}

impl EntityStore for MemoryEntityStore {
    fn resolve_by_id(&self, kind: LookupKind, id: i64) -> Option<Entity> {
        self.entities.get(&(kind, id)).cloned()
    }
}
