//! Value lookup for configured fields.
//!
//! A value is looked up differently depending on the root it is resolved against:
//!
//! * a row (of a group, repeater or flexible content field) holds its values directly, keyed
//!   by field key or field name;
//! * an entity's values live in the configuration store under an identifier derived from the
//!   entity kind (see [`Entity::storage_id`](crate::Entity::storage_id)), which the
//!   [`Extension::root_id`](crate::Extension::root_id) hook may supply or override.
//!
//! Empty values (`null`, `""`, `[]`, `{}`) are treated as unset.

use tracing::trace;

use crate::JsonMap;
use crate::JsonValue;
use crate::descriptor::FieldDescriptor;
use crate::descriptor::FieldKind;
use crate::entity::Source;
use crate::schema::ResolveContext;

/// The identifier values of `source` are stored under, if any.
pub fn root_id(source: &Source, context: &ResolveContext) -> Option<String> {
    let computed = match source {
        Source::Entity(entity) => entity.storage_id(),
        Source::Row(_) | Source::FieldGroup(_) | Source::Value(_) => None,
    };
    context.extension().root_id(source, computed)
}

/// Resolves the stored value of `field` for `source`.
///
/// Wysiwyg fields always request formatted output; other kinds only when `format` is set.
pub fn resolve(
    source: &Source,
    field: &FieldDescriptor,
    format: bool,
    context: &ResolveContext,
) -> Option<JsonValue> {
    let format = format || field.kind == FieldKind::Wysiwyg;
    let value = match source {
        Source::Row(row) => row_value(row, field).map(|value| match value {
            JsonValue::String(html) if field.kind == FieldKind::Wysiwyg => {
                JsonValue::from(context.filters().the_content(html.as_str()))
            }
            value => value,
        }),
        _ => match root_id(source, context) {
            Some(id) => {
                trace!(id = %id, key = field.storage_key(), format, "fetching field value");
                context.provider().value(&id, field.storage_key(), format)
            }
            None => {
                trace!(field = %field.key, "no storage identifier for the root, resolving to null");
                return None;
            }
        },
    };
    context
        .extension()
        .field_value(value, source, field)
        .filter(|value| !is_empty(value))
}

fn row_value(row: &JsonMap, field: &FieldDescriptor) -> Option<JsonValue> {
    [field.key.as_str(), field.storage_key(), field.name.as_str()]
        .into_iter()
        .filter(|key| !key.is_empty())
        .find_map(|key| row.get(key).filter(|value| !is_empty(value)))
        .cloned()
}

/// Whether a stored value counts as unset.
pub fn is_empty(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.as_str().is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        JsonValue::Bool(_) | JsonValue::Number(_) => false,
    }
}

/// Reads an entity id from a stored scalar or object (`ID`, `id` or `term_id`).
pub fn as_id(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.as_str().trim().parse().ok(),
        JsonValue::Object(map) => ["ID", "id", "term_id"]
            .into_iter()
            .find_map(|key| map.get(key).and_then(as_id)),
        _ => None,
    }
}

/// Reads a list of entity ids, in stored order. A single stored id is a list of one.
pub fn as_ids(value: &JsonValue) -> Vec<i64> {
    match value {
        JsonValue::Array(items) => items.iter().filter_map(as_id).collect(),
        value => as_id(value).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;
    use tracing_test::traced_test;

    use super::*;
    use crate::entity::Entity;
    use crate::entity::EntityKind;
    use crate::extension::Extension;
    use crate::host::MockConfigProvider;
    use crate::host::memory::MemoryConfigProvider;
    use crate::host::memory::MemoryEntityStore;

    fn context(provider: MemoryConfigProvider) -> ResolveContext {
        ResolveContext::new(Arc::new(provider), Arc::new(MemoryEntityStore::default()))
    }

    fn row(value: JsonValue) -> Source {
        match value {
            JsonValue::Object(map) => Source::Row(map),
            _ => panic!("rows are objects"),
        }
    }

    fn text(key: &str, name: &str) -> FieldDescriptor {
        FieldDescriptor::new(key, name, FieldKind::Text)
    }

    #[test]
    fn entity_values_are_fetched_by_storage_id() {
        let context = context(
            MemoryConfigProvider::default()
                .with_value("12", "field_text", "post value")
                .with_value("term_3", "field_text", "term value")
                .with_value("user_4", "field_text", "user value")
                .with_value("comment_5", "field_text", "comment value")
                .with_value("options", "field_text", "options value"),
        );
        let field = text("field_text", "text");
        let cases = [
            (EntityKind::Content("post".into()), 12, "post value"),
            (EntityKind::Term("category".into()), 3, "term value"),
            (EntityKind::User, 4, "user value"),
            (EntityKind::Comment, 5, "comment value"),
            (EntityKind::SettingsPage("options".into()), 0, "options value"),
        ];
        for (kind, id, expected) in cases {
            let source = Source::Entity(Entity::new(kind, id));
            assert_eq!(resolve(&source, &field, false, &context), Some(json!(expected)));
        }
    }

    #[test]
    fn clones_fetch_with_the_original_key() {
        let context = context(
            MemoryConfigProvider::default()
                .with_value("12", "field_original", "original")
                .with_value("12", "field_clone", "clone"),
        );
        let mut field = text("field_clone", "text");
        field.clone_of = Some("field_original".to_string());
        let source = Source::Entity(Entity::new(EntityKind::Content("post".into()), 12));
        assert_eq!(resolve(&source, &field, false, &context), Some(json!("original")));
    }

    #[traced_test]
    #[test]
    fn roots_without_identifier_resolve_to_null() {
        let context = context(MemoryConfigProvider::default().with_value("7", "field_text", "x"));
        let source = Source::Entity(Entity::new(EntityKind::Other("product".into()), 7));
        assert_eq!(resolve(&source, &text("field_text", "text"), false, &context), None);
        assert!(logs_contain("no storage identifier"));
    }

    #[test]
    fn root_id_hook_supplies_identifiers() {
        struct ProductIds;
        impl Extension for ProductIds {
            fn root_id(&self, source: &Source, computed: Option<String>) -> Option<String> {
                match source.as_entity() {
                    Some(entity) if entity.kind == EntityKind::Other("product".into()) => {
                        Some(format!("product_{}", entity.id))
                    }
                    _ => computed,
                }
            }
        }

        let context = context(MemoryConfigProvider::default().with_value("product_7", "field_text", "x"))
            .with_extension(Arc::new(ProductIds));
        let source = Source::Entity(Entity::new(EntityKind::Other("product".into()), 7));
        assert_eq!(
            resolve(&source, &text("field_text", "text"), false, &context),
            Some(json!("x"))
        );
    }

    #[test]
    fn field_value_hook_runs_last() {
        struct Shout;
        impl Extension for Shout {
            fn field_value(
                &self,
                value: Option<JsonValue>,
                _source: &Source,
                _field: &FieldDescriptor,
            ) -> Option<JsonValue> {
                value.and_then(|v| v.as_str().map(|s| JsonValue::from(s.to_uppercase())))
            }
        }

        let context = context(MemoryConfigProvider::default())
            .with_extension(Arc::new(Shout));
        let source = row(json!({ "field_text": "quiet" }));
        assert_eq!(
            resolve(&source, &text("field_text", "text"), false, &context),
            Some(json!("QUIET"))
        );
    }

    #[test]
    fn rows_are_read_by_key_then_name() {
        let context = context(MemoryConfigProvider::default());
        let field = text("field_title", "title");
        assert_eq!(
            resolve(&row(json!({ "field_title": "by key", "title": "by name" })), &field, false, &context),
            Some(json!("by key"))
        );
        assert_eq!(
            resolve(&row(json!({ "title": "by name" })), &field, false, &context),
            Some(json!("by name"))
        );
        assert_eq!(resolve(&row(json!({ "title": "" })), &field, false, &context), None);
    }

    #[test]
    fn wysiwyg_rows_go_through_the_content_filters() {
        let context = context(MemoryConfigProvider::default());
        let field = FieldDescriptor::new("field_body", "body", FieldKind::Wysiwyg);
        assert_eq!(
            resolve(&row(json!({ "body": "a\n\nb" })), &field, false, &context),
            Some(json!("<p>a</p>\n<p>b</p>\n"))
        );
    }

    #[test]
    fn wysiwyg_requests_formatted_values() {
        let mut provider = MockConfigProvider::new();
        provider
            .expect_value()
            .withf(|id, key, format| id == "12" && key == "field_body" && *format)
            .times(1)
            .returning(|_, _, _| Some(json!("<p>formatted</p>")));
        provider
            .expect_value()
            .withf(|id, key, format| id == "12" && key == "field_text" && !*format)
            .times(1)
            .returning(|_, _, _| Some(json!("raw")));
        let context = ResolveContext::new(Arc::new(provider), Arc::new(MemoryEntityStore::default()));
        let source = Source::Entity(Entity::new(EntityKind::Content("post".into()), 12));

        let body = FieldDescriptor::new("field_body", "body", FieldKind::Wysiwyg);
        assert_eq!(resolve(&source, &body, false, &context), Some(json!("<p>formatted</p>")));
        assert_eq!(
            resolve(&source, &text("field_text", "text"), false, &context),
            Some(json!("raw"))
        );
    }

    #[test]
    fn empty_values_are_unset() {
        assert!(is_empty(&json!(null)));
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!(0)));
    }

    #[test]
    fn reads_ids() {
        assert_eq!(as_ids(&json!([5, "7", { "ID": 9 }, "x"])), vec![5, 7, 9]);
        assert_eq!(as_ids(&json!({ "term_id": 3 })), vec![3]);
        assert_eq!(as_ids(&json!("12")), vec![12]);
        assert!(as_ids(&json!(null)).is_empty());
    }
}
