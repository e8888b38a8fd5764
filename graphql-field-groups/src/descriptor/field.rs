use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use super::group::FieldGroupDescriptor;
use super::group::ParentLink;
use super::lenient;
use crate::entity::EntityKind;
use crate::naming::format_field_name;

/// The kind of a configured field.
///
/// The set is closed: any tag not listed here deserializes to [`FieldKind::Unsupported`] and
/// the field is omitted from the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Number,
    Range,
    Email,
    Url,
    Password,
    Oembed,
    Wysiwyg,
    ButtonGroup,
    Radio,
    ColorPicker,
    Message,
    TrueFalse,
    Select,
    Checkbox,
    DatePicker,
    TimePicker,
    DateTimePicker,
    Link,
    Image,
    File,
    Gallery,
    User,
    Taxonomy,
    PostObject,
    PageLink,
    Relationship,
    Group,
    Repeater,
    FlexibleContent,
    Accordion,
    Unsupported(String),
}

impl FieldKind {
    pub fn tag(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Range => "range",
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Password => "password",
            FieldKind::Oembed => "oembed",
            FieldKind::Wysiwyg => "wysiwyg",
            FieldKind::ButtonGroup => "button_group",
            FieldKind::Radio => "radio",
            FieldKind::ColorPicker => "color_picker",
            FieldKind::Message => "message",
            FieldKind::TrueFalse => "true_false",
            FieldKind::Select => "select",
            FieldKind::Checkbox => "checkbox",
            FieldKind::DatePicker => "date_picker",
            FieldKind::TimePicker => "time_picker",
            FieldKind::DateTimePicker => "date_time_picker",
            FieldKind::Link => "link",
            FieldKind::Image => "image",
            FieldKind::File => "file",
            FieldKind::Gallery => "gallery",
            FieldKind::User => "user",
            FieldKind::Taxonomy => "taxonomy",
            FieldKind::PostObject => "post_object",
            FieldKind::PageLink => "page_link",
            FieldKind::Relationship => "relationship",
            FieldKind::Group => "group",
            FieldKind::Repeater => "repeater",
            FieldKind::FlexibleContent => "flexible_content",
            FieldKind::Accordion => "accordion",
            FieldKind::Unsupported(tag) => tag,
        }
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => FieldKind::Text,
            "textarea" => FieldKind::Textarea,
            "number" => FieldKind::Number,
            "range" => FieldKind::Range,
            "email" => FieldKind::Email,
            "url" => FieldKind::Url,
            "password" => FieldKind::Password,
            "oembed" => FieldKind::Oembed,
            "wysiwyg" => FieldKind::Wysiwyg,
            "button_group" => FieldKind::ButtonGroup,
            "radio" => FieldKind::Radio,
            "color_picker" => FieldKind::ColorPicker,
            "message" => FieldKind::Message,
            "true_false" => FieldKind::TrueFalse,
            "select" => FieldKind::Select,
            "checkbox" => FieldKind::Checkbox,
            "date_picker" => FieldKind::DatePicker,
            "time_picker" => FieldKind::TimePicker,
            "date_time_picker" => FieldKind::DateTimePicker,
            "link" => FieldKind::Link,
            "image" => FieldKind::Image,
            "file" => FieldKind::File,
            "gallery" => FieldKind::Gallery,
            "user" => FieldKind::User,
            "taxonomy" => FieldKind::Taxonomy,
            "post_object" => FieldKind::PostObject,
            "page_link" => FieldKind::PageLink,
            "relationship" => FieldKind::Relationship,
            "group" => FieldKind::Group,
            "repeater" => FieldKind::Repeater,
            "flexible_content" => FieldKind::FlexibleContent,
            "accordion" => FieldKind::Accordion,
            _ => FieldKind::Unsupported(tag),
        }
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.tag().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Newline handling of textarea fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NewLines {
    /// Wrap paragraphs in `<p>`.
    Wpautop,
    /// Insert `<br />` before newlines.
    Br,
}

fn new_lines<'de, D>(deserializer: D) -> Result<Option<NewLines>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match lenient::optional_string(deserializer)?.as_deref() {
            Some("wpautop") => Some(NewLines::Wpautop),
            Some("br") => Some(NewLines::Br),
            _ => None,
        },
    )
}

/// One layout of a flexible content field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub key: String,
    pub name: String,
    pub label: String,
    pub sub_fields: Vec<FieldDescriptor>,
}

/// One configured field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDescriptor {
    /// Storage key of the field
    pub key: String,
    pub name: String,
    pub label: String,
    pub instructions: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Cardinality hint. Unset means single-valued.
    #[serde(deserialize_with = "lenient::optional_flag")]
    pub multiple: Option<bool>,
    /// Target restriction of relational fields. Bare names are content kinds.
    #[serde(rename = "post_type", deserialize_with = "lenient::string_list")]
    pub target_kinds: Vec<String>,
    #[serde(deserialize_with = "lenient::optional_string")]
    pub taxonomy: Option<String>,
    #[serde(deserialize_with = "lenient::optional_string")]
    pub return_format: Option<String>,
    #[serde(deserialize_with = "new_lines")]
    pub new_lines: Option<NewLines>,
    #[serde(
        default = "lenient::default_true",
        deserialize_with = "lenient::flag_or_true"
    )]
    pub show_in_graphql: bool,
    #[serde(deserialize_with = "lenient::optional_string")]
    pub graphql_field_name: Option<String>,
    /// Key of the original field when this field is a clone
    #[serde(rename = "__key", deserialize_with = "lenient::optional_string")]
    pub clone_of: Option<String>,
    pub sub_fields: Vec<FieldDescriptor>,
    pub layouts: Vec<Layout>,
}

impl Default for FieldDescriptor {
    fn default() -> Self {
        Self {
            key: String::new(),
            name: String::new(),
            label: String::new(),
            instructions: String::new(),
            kind: FieldKind::default(),
            multiple: None,
            target_kinds: Vec::new(),
            taxonomy: None,
            return_format: None,
            new_lines: None,
            show_in_graphql: true,
            graphql_field_name: None,
            clone_of: None,
            sub_fields: Vec::new(),
            layouts: Vec::new(),
        }
    }
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// The key values are stored under; clones use the key of the field they copy.
    pub fn storage_key(&self) -> &str {
        self.clone_of.as_deref().unwrap_or(&self.key)
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple.unwrap_or(false)
    }

    /// The unformatted output field name.
    pub fn raw_graphql_name(&self) -> &str {
        self.graphql_field_name.as_deref().unwrap_or(&self.name)
    }

    /// The output field name.
    pub fn graphql_name(&self) -> String {
        format_field_name(self.raw_graphql_name())
    }

    /// The entity kinds a relational field is restricted to.
    pub fn target_entity_kinds(&self) -> Vec<EntityKind> {
        self.target_kinds
            .iter()
            .map(|tag| {
                if tag.contains(':') {
                    EntityKind::parse(tag)
                } else {
                    EntityKind::Content(tag.clone())
                }
            })
            .collect()
    }

    /// The nested group of a group or repeater field, owned by the type `owner_type`.
    pub fn child_group(&self, owner_type: &str) -> FieldGroupDescriptor {
        FieldGroupDescriptor {
            key: self.key.clone(),
            title: self.label.clone(),
            description: self.instructions.clone(),
            graphql_field_name: Some(self.graphql_name()),
            show_in_graphql: true,
            fields: self.sub_fields.clone(),
            parent: Some(ParentLink {
                type_name: owner_type.to_string(),
                field_name: self.graphql_name(),
            }),
            ..Default::default()
        }
    }

    /// The nested group of one flexible content layout, owned by the field type `field_type`.
    pub fn layout_group(&self, layout: &Layout, field_type: &str) -> FieldGroupDescriptor {
        FieldGroupDescriptor {
            key: format!("{}:{}", self.key, layout.key),
            title: layout.label.clone(),
            graphql_field_name: Some(layout.name.clone()),
            show_in_graphql: true,
            fields: layout.sub_fields.clone(),
            parent: Some(ParentLink {
                type_name: field_type.to_string(),
                field_name: layout.name.clone(),
            }),
            ..Default::default()
        }
    }
}
