use std::sync::Arc;

use graphql_field_groups::Configuration;
use graphql_field_groups::Entity;
use graphql_field_groups::EntityKind;
use graphql_field_groups::FieldDescriptor;
use graphql_field_groups::FieldGroupDescriptor;
use graphql_field_groups::FieldKind;
use graphql_field_groups::ResolveContext;
use graphql_field_groups::ResolvedValue;
use graphql_field_groups::Source;
use graphql_field_groups::TypeCompiler;
use graphql_field_groups::TypeRegistry;
use graphql_field_groups::host::memory::MemoryConfigProvider;
use graphql_field_groups::host::memory::MemoryEntityStore;

pub(crate) const BASE_SCHEMA: &str = include_str!("fixtures/base.graphql");

pub(crate) fn registry() -> TypeRegistry {
    TypeRegistry::from_sdl(BASE_SCHEMA).unwrap()
}

pub(crate) fn field(key: &str, name: &str, kind: FieldKind) -> FieldDescriptor {
    FieldDescriptor {
        label: name.to_string(),
        ..FieldDescriptor::new(key, name, kind)
    }
}

pub(crate) fn group(
    key: &str,
    title: &str,
    targets: &[&str],
    fields: Vec<FieldDescriptor>,
) -> FieldGroupDescriptor {
    FieldGroupDescriptor {
        key: key.to_string(),
        title: title.to_string(),
        target_kinds: targets.iter().map(|t| t.to_string()).collect(),
        show_in_graphql: true,
        fields,
        ..Default::default()
    }
}

pub(crate) fn post_fields(fields: Vec<FieldDescriptor>) -> FieldGroupDescriptor {
    group("group_post", "Post Fields", &["content:post"], fields)
}

pub(crate) fn content(kind: &str, id: i64) -> Entity {
    Entity::new(EntityKind::Content(kind.to_string()), id)
}

pub(crate) fn term(taxonomy: &str, id: i64) -> Entity {
    Entity::new(EntityKind::Term(taxonomy.to_string()), id)
}

/// Compiles `groups` from `provider` into the base schema.
pub(crate) fn compile_groups(provider: MemoryConfigProvider) -> (TypeRegistry, Arc<MemoryConfigProvider>) {
    let provider = Arc::new(provider);
    let compiler = TypeCompiler::new(Configuration::default(), provider.clone());
    let mut registry = registry();
    compiler.compile_all(&mut registry).unwrap();
    (registry, provider)
}

pub(crate) fn context(
    provider: Arc<MemoryConfigProvider>,
    entities: MemoryEntityStore,
) -> ResolveContext {
    ResolveContext::new(provider, Arc::new(entities))
}

/// Resolves `group_field` on the entity, then `field` on the group value.
pub(crate) fn resolve_group_field(
    registry: &TypeRegistry,
    context: &ResolveContext,
    entity: Entity,
    (entity_type, group_field, group_type): (&str, &str, &str),
    field: &str,
) -> ResolvedValue {
    let group = registry
        .resolve_field(entity_type, group_field, &Source::Entity(entity), context)
        .unwrap();
    let source = group.as_object().unwrap().clone();
    registry
        .resolve_field(group_type, field, &source, context)
        .unwrap()
}

/// Resolves a field of the "Post Fields" group of a post.
pub(crate) fn resolve_post_field(
    registry: &TypeRegistry,
    context: &ResolveContext,
    post: Entity,
    field: &str,
) -> ResolvedValue {
    resolve_group_field(
        registry,
        context,
        post,
        ("Post", "postFields", "PostFields"),
        field,
    )
}

/// The ids of a list of resolved entities.
pub(crate) fn entity_ids(value: &ResolvedValue) -> Vec<i64> {
    value
        .as_list()
        .unwrap()
        .iter()
        .map(|item| item.as_object().unwrap().as_entity().unwrap().id)
        .collect()
}
