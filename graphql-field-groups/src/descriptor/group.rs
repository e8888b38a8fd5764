use serde::Deserialize;
use serde::Serialize;

use super::field::FieldDescriptor;
use super::lenient;
use crate::entity::EntityKind;
use crate::naming::format_field_name;
use crate::naming::format_type_name;
use crate::naming::nested_type_name;

/// A location rule of the configuration store, e.g. `post_type == post`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationRule {
    pub param: String,
    pub operator: String,
    pub value: String,
}

/// Points a nested group back at the type and field that own it.
///
/// Only used to derive the nested type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    /// The owning type
    pub type_name: String,
    /// The output field name of the owning field (or the layout name)
    pub field_name: String,
}

/// One configured field group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldGroupDescriptor {
    pub key: String,
    /// Store id of the group
    #[serde(rename = "ID", alias = "id", deserialize_with = "lenient::optional_number")]
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    /// Kind tags (or schema type names) of the entities this group is attached to
    #[serde(rename = "graphql_types", deserialize_with = "lenient::string_list")]
    pub target_kinds: Vec<String>,
    #[serde(deserialize_with = "lenient::optional_string")]
    pub graphql_field_name: Option<String>,
    #[serde(
        default = "lenient::default_true",
        deserialize_with = "lenient::flag_or_true"
    )]
    pub active: bool,
    #[serde(deserialize_with = "lenient::flag_or_false")]
    pub show_in_graphql: bool,
    pub fields: Vec<FieldDescriptor>,
    #[serde(skip)]
    pub parent: Option<ParentLink>,

    /// OR-ed groups of AND-ed rules
    pub location: Vec<Vec<LocationRule>>,
    #[serde(deserialize_with = "lenient::number_or_zero")]
    pub menu_order: i64,
    pub position: String,
    pub style: String,
    pub label_placement: String,
    pub instruction_placement: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub hide_on_screen: Vec<String>,
}

impl Default for FieldGroupDescriptor {
    fn default() -> Self {
        Self {
            key: String::new(),
            id: None,
            title: String::new(),
            description: String::new(),
            target_kinds: Vec::new(),
            graphql_field_name: None,
            active: true,
            show_in_graphql: false,
            fields: Vec::new(),
            parent: None,
            location: Vec::new(),
            menu_order: 0,
            position: String::new(),
            style: String::new(),
            label_placement: String::new(),
            instruction_placement: String::new(),
            hide_on_screen: Vec::new(),
        }
    }
}

impl FieldGroupDescriptor {
    /// Whether the group takes part in compilation at all.
    ///
    /// Nested groups only need to be exposed; top-level groups must also be active and
    /// target at least one kind.
    pub fn is_compilable(&self) -> bool {
        self.show_in_graphql
            && (self.parent.is_some() || (self.active && !self.target_kinds.is_empty()))
    }

    pub fn is_nested(&self) -> bool {
        self.parent.is_some()
    }

    fn raw_graphql_name(&self) -> &str {
        self.graphql_field_name.as_deref().unwrap_or(&self.title)
    }

    /// The unformatted type name of the group.
    pub fn raw_type_name(&self) -> String {
        match &self.parent {
            Some(parent) => nested_type_name(&parent.type_name, &parent.field_name),
            None => format_type_name(self.raw_graphql_name()),
        }
    }

    /// The field that exposes the group on its target types.
    pub fn graphql_name(&self) -> String {
        format_field_name(self.raw_graphql_name())
    }

    pub fn target_entity_kinds(&self) -> Vec<EntityKind> {
        self.target_kinds
            .iter()
            .map(|tag| EntityKind::parse(tag))
            .collect()
    }

    /// The value of the `fieldGroupName` field of the group type.
    pub fn field_group_name(&self) -> String {
        match &self.parent {
            Some(_) => self.raw_type_name(),
            None => self.graphql_name(),
        }
    }
}
