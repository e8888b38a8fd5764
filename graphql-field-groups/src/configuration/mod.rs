//! Compiler configuration.

use std::collections::BTreeMap;
use std::str::FromStr;

use displaydoc::Display;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use schemars::schema::RootSchema;
use schemars::schema::Schema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

mod type_names;

pub use type_names::TypeNames;

use crate::entity::EntityKind;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not parse yaml configuration: {0}
    InvalidYaml(#[from] serde_yaml::Error),
    /// could not deserialize configuration: {0}
    DeserializeConfigError(#[from] serde_json::Error),
}

fn default_interface_prefix() -> String {
    "Has".to_string()
}

fn default_field_group_name() -> bool {
    true
}

fn default_entity_kinds() -> BTreeMap<String, String> {
    [
        ("content:post", "Post"),
        ("content:page", "Page"),
        ("content:attachment", "MediaItem"),
        ("taxonomy:category", "Category"),
        ("taxonomy:post_tag", "Tag"),
        ("taxonomy:post_format", "PostFormat"),
        ("user", "User"),
        ("comment", "Comment"),
        ("menu", "Menu"),
        ("menu-item", "MenuItem"),
    ]
    .into_iter()
    .map(|(tag, type_name)| (tag.to_string(), type_name.to_string()))
    .collect()
}

/// The configuration of the field group compiler.
///
/// Can be created through `serde::Deserialize` from YAML or JSON, or with the builder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Names of the support types
    pub type_names: TypeNames,

    /// Prefix of the interface synthesized for each field group
    #[serde(default = "default_interface_prefix")]
    pub interface_prefix: String,

    /// Schema type of each entity kind tag, e.g. `content:post: Post`.
    /// Entries given here are added to the built-in WordPress kinds.
    #[serde(default = "default_entity_kinds")]
    pub entity_kinds: BTreeMap<String, String>,

    /// Expose a `fieldGroupName` field on every field group type
    #[serde(default = "default_field_group_name")]
    pub field_group_name: bool,
}

#[buildstructor::buildstructor]
impl Configuration {
    #[builder]
    pub fn new(
        type_names: Option<TypeNames>,
        interface_prefix: Option<String>,
        entity_kinds: BTreeMap<String, String>,
        field_group_name: Option<bool>,
    ) -> Self {
        let mut kinds = default_entity_kinds();
        kinds.extend(entity_kinds);
        Self {
            type_names: type_names.unwrap_or_default(),
            interface_prefix: interface_prefix.unwrap_or_else(default_interface_prefix),
            entity_kinds: kinds,
            field_group_name: field_group_name.unwrap_or_else(default_field_group_name),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Configuration::from_yaml(s)
    }
}

impl Configuration {
    /// Parses YAML configuration. An empty document is the default configuration.
    pub fn from_yaml(raw_yaml: &str) -> Result<Self, ConfigurationError> {
        if raw_yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut configuration: Configuration = serde_yaml::from_str(raw_yaml)?;
        configuration.merge_default_kinds();
        Ok(configuration)
    }

    pub fn from_json(raw_json: &str) -> Result<Self, ConfigurationError> {
        let mut configuration: Configuration = serde_json::from_str(raw_json)?;
        configuration.merge_default_kinds();
        Ok(configuration)
    }

    fn merge_default_kinds(&mut self) {
        for (tag, type_name) in default_entity_kinds() {
            self.entity_kinds.entry(tag).or_insert(type_name);
        }
    }

    /// The schema type configured for an entity kind.
    pub fn type_for_kind(&self, kind: &EntityKind) -> Option<&str> {
        self.entity_kinds.get(&kind.tag()).map(String::as_str)
    }

    /// The interface name of a field group type.
    pub fn interface_name(&self, type_name: &str) -> String {
        format!("{}{type_name}", self.interface_prefix)
    }
}

/// Generate a JSON schema for the configuration.
pub fn generate_config_schema() -> RootSchema {
    let settings = SchemaSettings::draft07().with(|s| {
        s.option_nullable = true;
        s.option_add_null_type = false;
        s.inline_subschemas = true;
    });

    let generator = settings.into_generator();
    let mut schema = generator.into_root_schema_for::<Configuration>();
    schema.schema.object().additional_properties = Some(Box::new(Schema::Bool(false)));
    schema
}
