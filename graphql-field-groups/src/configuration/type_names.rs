use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

fn default_link() -> String {
    "AcfLink".to_string()
}

fn default_field_group_config() -> String {
    "AcfFieldGroupConfig".to_string()
}

fn default_location_rule() -> String {
    "AcfLocationRule".to_string()
}

fn default_media_item() -> String {
    "MediaItem".to_string()
}

fn default_user() -> String {
    "User".to_string()
}

fn default_term_fallback() -> String {
    "TermObjectUnion".to_string()
}

fn default_content_fallback() -> String {
    "PostObjectUnion".to_string()
}

/// Names of the support types the compiler declares or references
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct TypeNames {
    /// Structured link values (`url`, `title`, `target`); declared by the compiler
    #[serde(default = "default_link")]
    pub link: String,

    /// Field group metadata; declared by the compiler
    #[serde(default = "default_field_group_config")]
    pub field_group_config: String,

    /// One location rule of the field group metadata; declared by the compiler
    #[serde(default = "default_location_rule")]
    pub location_rule: String,

    /// The host's media type, used by image, file and gallery fields
    #[serde(default = "default_media_item")]
    pub media_item: String,

    /// The host's user type, used by user fields
    #[serde(default = "default_user")]
    pub user: String,

    /// The host's union of all term types, used by taxonomy fields without a known taxonomy
    #[serde(default = "default_term_fallback")]
    pub term_fallback: String,

    /// The host's union of all content types, used by unrestricted relationship fields
    #[serde(default = "default_content_fallback")]
    pub content_fallback: String,
}

#[buildstructor::buildstructor]
impl TypeNames {
    #[builder]
    pub fn new(
        link: Option<String>,
        field_group_config: Option<String>,
        location_rule: Option<String>,
        media_item: Option<String>,
        user: Option<String>,
        term_fallback: Option<String>,
        content_fallback: Option<String>,
    ) -> Self {
        Self {
            link: link.unwrap_or_else(default_link),
            field_group_config: field_group_config.unwrap_or_else(default_field_group_config),
            location_rule: location_rule.unwrap_or_else(default_location_rule),
            media_item: media_item.unwrap_or_else(default_media_item),
            user: user.unwrap_or_else(default_user),
            term_fallback: term_fallback.unwrap_or_else(default_term_fallback),
            content_fallback: content_fallback.unwrap_or_else(default_content_fallback),
        }
    }
}

impl Default for TypeNames {
    fn default() -> Self {
        Self::builder().build()
    }
}
