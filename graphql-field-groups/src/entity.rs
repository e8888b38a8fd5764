//! Entities and the root values that flow through resolvers.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::JsonMap;
use crate::descriptor::FieldGroupDescriptor;

/// The kind of a backing entity.
///
/// Every entity carries its kind, so value lookup and union discrimination dispatch on it
/// instead of inspecting the entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    /// A content item of the given content type (`content:post`)
    Content(String),
    /// A taxonomy term of the given taxonomy (`taxonomy:category`)
    Term(String),
    User,
    Comment,
    Menu,
    MenuItem,
    /// A site settings page identified by its page key (`site-settings:<key>`)
    SettingsPage(String),
    /// Anything else; the tag is kept verbatim
    Other(String),
}

impl EntityKind {
    /// Parses a kind tag. Unknown tags become [`EntityKind::Other`].
    pub fn parse(tag: &str) -> Self {
        match tag.split_once(':') {
            Some(("content", name)) if !name.is_empty() => EntityKind::Content(name.to_string()),
            Some(("taxonomy", name)) if !name.is_empty() => EntityKind::Term(name.to_string()),
            Some(("site-settings", key)) if !key.is_empty() => {
                EntityKind::SettingsPage(key.to_string())
            }
            _ => match tag {
                "user" => EntityKind::User,
                "comment" => EntityKind::Comment,
                "menu" => EntityKind::Menu,
                "menu-item" => EntityKind::MenuItem,
                _ => EntityKind::Other(tag.to_string()),
            },
        }
    }

    pub fn tag(&self) -> String {
        match self {
            EntityKind::Content(name) => format!("content:{name}"),
            EntityKind::Term(name) => format!("taxonomy:{name}"),
            EntityKind::User => "user".to_string(),
            EntityKind::Comment => "comment".to_string(),
            EntityKind::Menu => "menu".to_string(),
            EntityKind::MenuItem => "menu-item".to_string(),
            EntityKind::SettingsPage(key) => format!("site-settings:{key}"),
            EntityKind::Other(tag) => tag.clone(),
        }
    }
}

impl FromStr for EntityKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(EntityKind::parse(s))
    }
}

impl From<String> for EntityKind {
    fn from(tag: String) -> Self {
        EntityKind::parse(&tag)
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.tag()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Publication state of an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Draft,
    Private,
}

/// A reference to a backing entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub id: i64,
    #[serde(default)]
    pub visibility: Visibility,
}

impl Entity {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self {
            kind,
            id,
            visibility: Visibility::Public,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// The identifier values of this entity are stored under.
    ///
    /// Terms (and menus, which are terms) are prefixed with `term_`, users with `user_` and
    /// comments with `comment_`. [`EntityKind::Other`] has no built-in identifier.
    pub fn storage_id(&self) -> Option<String> {
        match &self.kind {
            EntityKind::Content(_) | EntityKind::MenuItem => Some(self.id.to_string()),
            EntityKind::Term(_) | EntityKind::Menu => Some(format!("term_{}", self.id)),
            EntityKind::User => Some(format!("user_{}", self.id)),
            EntityKind::Comment => Some(format!("comment_{}", self.id)),
            EntityKind::SettingsPage(key) => Some(key.clone()),
            EntityKind::Other(_) => None,
        }
    }
}

/// The root value a field resolver runs against.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A top-level entity
    Entity(Entity),
    /// One row of a group, repeater or flexible content field
    Row(JsonMap),
    /// The metadata of a field group
    FieldGroup(Arc<FieldGroupDescriptor>),
    /// A plain structured value, such as a link
    Value(JsonMap),
}

impl Source {
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Source::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// A short description of the runtime kind of this value, used in errors.
    pub fn kind_tag(&self) -> String {
        match self {
            Source::Entity(entity) => entity.kind.tag(),
            Source::Row(row) => match row.get("acf_fc_layout").and_then(|v| v.as_str()) {
                Some(layout) => format!("row:{layout}"),
                None => "row".to_string(),
            },
            Source::FieldGroup(_) => "field-group".to_string(),
            Source::Value(_) => "value".to_string(),
        }
    }
}

impl From<Entity> for Source {
    fn from(entity: Entity) -> Self {
        Source::Entity(entity)
    }
}
