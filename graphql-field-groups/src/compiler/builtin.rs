//! Support types declared by the compiler itself: the link type, the field group metadata
//! type and its location rule type.

use apollo_compiler::Name;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::JsonValue;
use crate::configuration::Configuration;
use crate::descriptor::FieldGroupDescriptor;
use crate::entity::Source;
use crate::error::CompileError;
use crate::naming;
use crate::schema::DeclaredField;
use crate::schema::FieldResolver;
use crate::schema::OutputType;
use crate::schema::ResolvedValue;
use crate::schema::TypeRegistry;
use crate::schema::resolver;

pub(crate) const ORIGIN: &str = "builtin";

/// Declares the support types once. Types the base schema already declares are reused.
pub(crate) fn declare(
    registry: &mut TypeRegistry,
    configuration: &Configuration,
) -> Result<(), CompileError> {
    let names = &configuration.type_names;
    let link = naming::exact_name(&names.link)?;
    let location_rule = naming::exact_name(&names.location_rule)?;
    let field_group_config = naming::exact_name(&names.field_group_config)?;

    if available(registry, &link) {
        registry.declare_object_type(
            link,
            ORIGIN,
            Some("A link with its url, title and target"),
            properties(&["url", "title", "target"]),
        )?;
    }
    if available(registry, &location_rule) {
        registry.declare_object_type(
            location_rule.clone(),
            ORIGIN,
            Some("A rule deciding where a field group is shown"),
            properties(&["param", "operator", "value"]),
        )?;
    }
    if available(registry, &field_group_config) {
        registry.declare_object_type(
            field_group_config,
            ORIGIN,
            Some("The configuration of a field group"),
            field_group_config_fields(&location_rule),
        )?;
    }
    Ok(())
}

fn available(registry: &TypeRegistry, name: &Name) -> bool {
    match registry.origin_of(name) {
        Some(_) => true,
        None if registry.has_type(name) => {
            debug!(type_name = %name, "support type is provided by the base schema");
            false
        }
        None => true,
    }
}

/// String fields read from the keys of a structured value.
fn properties(keys: &[&'static str]) -> Vec<DeclaredField> {
    keys.iter()
        .map(|&key| DeclaredField {
            name: Name::new_static_unchecked(key),
            description: None,
            ty: OutputType::String,
            resolve: resolver(move |source, _| {
                Ok(match source {
                    Source::Value(map) | Source::Row(map) => {
                        ResolvedValue::opt_leaf(map.get(key).cloned())
                    }
                    _ => ResolvedValue::null(),
                })
            }),
        })
        .collect()
}

fn group_field(
    name: &'static str,
    ty: OutputType,
    description: &str,
    read: impl Fn(&FieldGroupDescriptor) -> ResolvedValue + Send + Sync + 'static,
) -> DeclaredField {
    DeclaredField {
        name: Name::new_static_unchecked(name),
        description: Some(description.to_string()),
        ty,
        resolve: group_resolver(read),
    }
}

fn group_resolver(
    read: impl Fn(&FieldGroupDescriptor) -> ResolvedValue + Send + Sync + 'static,
) -> FieldResolver {
    resolver(move |source, _| {
        Ok(match source {
            Source::FieldGroup(group) => read(group),
            _ => ResolvedValue::null(),
        })
    })
}

fn strings<'a>(values: impl IntoIterator<Item = &'a String>) -> ResolvedValue {
    ResolvedValue::list(values.into_iter().map(|v| ResolvedValue::leaf(v.as_str())))
}

fn non_empty(value: &str) -> ResolvedValue {
    if value.is_empty() {
        ResolvedValue::null()
    } else {
        ResolvedValue::leaf(value)
    }
}

/// The global id of a field group.
fn field_group_id(group: &FieldGroupDescriptor) -> String {
    let local = match group.id {
        Some(id) => id.to_string(),
        None => group.key.clone(),
    };
    STANDARD.encode(format!("field_group:{local}"))
}

fn field_group_config_fields(location_rule: &Name) -> Vec<DeclaredField> {
    let rules = OutputType::list_of(OutputType::Named(location_rule.clone()));
    let strings_type = || OutputType::list_of(OutputType::String);
    vec![
        group_field("id", OutputType::Id.non_null(), "The global id of the field group", |g| {
            ResolvedValue::leaf(field_group_id(g))
        }),
        group_field("databaseId", OutputType::Int, "The store id of the field group", |g| {
            ResolvedValue::opt_leaf(g.id.map(JsonValue::from))
        }),
        group_field("key", OutputType::String, "The unique key of the field group", |g| {
            non_empty(&g.key)
        }),
        group_field("title", OutputType::String, "The title of the field group", |g| {
            non_empty(&g.title)
        }),
        group_field("description", OutputType::String, "The description of the field group", |g| {
            non_empty(&g.description)
        }),
        group_field(
            "fieldNames",
            strings_type(),
            "Output names of the fields of the field group",
            |g| {
                ResolvedValue::list(
                    g.fields
                        .iter()
                        .filter(|field| field.show_in_graphql)
                        .map(|field| ResolvedValue::leaf(field.graphql_name())),
                )
            },
        ),
        group_field("locationRules", rules, "Where the field group is shown", |g| {
            ResolvedValue::list(g.location.iter().flatten().map(|rule| {
                let mut map = crate::JsonMap::new();
                map.insert("param", rule.param.as_str().into());
                map.insert("operator", rule.operator.as_str().into());
                map.insert("value", rule.value.as_str().into());
                ResolvedValue::object(Source::Value(map))
            }))
        }),
        group_field("menuOrder", OutputType::Int, "Ordering among field groups", |g| {
            ResolvedValue::leaf(g.menu_order)
        }),
        group_field("position", OutputType::String, "Where the field group is placed in the editor", |g| {
            non_empty(&g.position)
        }),
        group_field("style", OutputType::String, "The editor box style", |g| non_empty(&g.style)),
        group_field("labelPlacement", OutputType::String, "Where field labels are placed", |g| {
            non_empty(&g.label_placement)
        }),
        group_field(
            "instructionPlacement",
            OutputType::String,
            "Where field instructions are placed",
            |g| non_empty(&g.instruction_placement),
        ),
        group_field(
            "shouldHideOnScreen",
            strings_type(),
            "Editor elements hidden while the field group is shown",
            |g| strings(&g.hide_on_screen),
        ),
        group_field("active", OutputType::Boolean, "Whether the field group is active", |g| {
            ResolvedValue::leaf(g.active)
        }),
        group_field(
            "showInGraphQL",
            OutputType::Boolean,
            "Whether the field group is exposed in the schema",
            |g| ResolvedValue::leaf(g.show_in_graphql),
        ),
        group_field(
            "graphqlFieldName",
            OutputType::String,
            "The field exposing the field group on its target types",
            |g| ResolvedValue::leaf(g.graphql_name()),
        ),
        group_field(
            "graphqlTypeNames",
            strings_type(),
            "The entity kinds the field group is attached to",
            |g| strings(&g.target_kinds),
        ),
    ]
}
