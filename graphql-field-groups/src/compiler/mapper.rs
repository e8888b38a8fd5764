//! Maps one configured field to its output type and resolver.
//!
//! | Kind | Output type | Value |
//! |---|---|---|
//! | text, email, url, password, oembed, wysiwyg, radio, button group, color picker, message | `String` | stored value |
//! | textarea | `String` | stored value, new lines formatted as configured |
//! | number | `Float` | stored value |
//! | range | `Int` | stored value |
//! | true/false | `Boolean` | stored value |
//! | select | `String`, or `[String]` when multiple | first entry, or all entries (`[]` when unset) |
//! | checkbox | `[String]` | stored list, `null` for anything else |
//! | date, time, date-time picker | `String` | raw value rendered with the return format |
//! | link | link type | `{ url, title, target }` |
//! | image, file | media type | loaded attachment |
//! | gallery | `[media type]` | loaded attachments, in stored order |
//! | user | user type, or a list when multiple | loaded users, private users excluded |
//! | taxonomy | `[term type]` | loaded terms, `[]` when unset |
//! | post object, page link | union, or a list when multiple | published entities of a candidate kind |
//! | relationship | `[union]` | published entities of a candidate kind |
//! | group | nested type | the same root |
//! | repeater | `[nested type]` | one row per entry, `[]` when unset |
//! | flexible content | `[layout union]` | one row per entry, `[]` when unset |
//!
//! Accordion fields and unknown kinds are not exposed.

use std::collections::HashMap;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::schema::ExtendedType;
use tracing::debug;
use tracing::warn;

use super::TypeCompiler;
use super::union::catalog_discriminator;
use crate::JsonValue;
use crate::descriptor::FieldDescriptor;
use crate::descriptor::FieldGroupDescriptor;
use crate::descriptor::FieldKind;
use crate::descriptor::NewLines;
use crate::entity::Entity;
use crate::entity::EntityKind;
use crate::entity::Source;
use crate::entity::Visibility;
use crate::error::CompileError;
use crate::extension::FieldMapping;
use crate::format;
use crate::host::LookupKind;
use crate::naming;
use crate::schema::FieldResolver;
use crate::schema::OutputType;
use crate::schema::ResolvedValue;
use crate::schema::TypeDiscriminator;
use crate::schema::TypeRegistry;
use crate::schema::discriminator;
use crate::schema::resolver;
use crate::value;

type Builtin = Option<(OutputType, FieldResolver)>;

/// How a list of loaded entities becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cardinality {
    /// Always a list, possibly empty
    List,
    /// A list, with an empty list collapsed to null
    NonEmptyList,
    /// The first entity, or null
    Single,
}

impl Cardinality {
    fn of(field: &FieldDescriptor) -> Self {
        if field.is_multiple() {
            Cardinality::NonEmptyList
        } else {
            Cardinality::Single
        }
    }

    fn output_type(self, inner: Name) -> OutputType {
        match self {
            Cardinality::Single => OutputType::Named(inner),
            Cardinality::List | Cardinality::NonEmptyList => {
                OutputType::list_of(OutputType::Named(inner))
            }
        }
    }

    fn collapse(self, items: Vec<ResolvedValue>) -> ResolvedValue {
        match self {
            Cardinality::List => ResolvedValue::List(items),
            Cardinality::NonEmptyList if items.is_empty() => ResolvedValue::null(),
            Cardinality::NonEmptyList => ResolvedValue::List(items),
            Cardinality::Single => items.into_iter().next().unwrap_or_else(ResolvedValue::null),
        }
    }

    fn empty(self) -> ResolvedValue {
        self.collapse(Vec::new())
    }
}

/// The description of a field without an explicit one.
pub(crate) fn default_description(field: &FieldDescriptor, group: &FieldGroupDescriptor) -> String {
    format!(
        "The \"{}\" field registered to the \"{}\" field group. {}",
        field.label, group.title, field.instructions
    )
    .trim()
    .to_string()
}

pub(crate) fn map_field(
    compiler: &TypeCompiler,
    registry: &mut TypeRegistry,
    field: &FieldDescriptor,
    group: &FieldGroupDescriptor,
    group_type: &Name,
) -> Result<Option<FieldMapping>, CompileError> {
    if !field.show_in_graphql {
        return Ok(None);
    }
    let shared = Arc::new(field.clone());
    let description = default_description(field, group);

    let mapping = match compiler.extension.map_field(field, group) {
        Some(partial) => {
            debug!(field = %field.key, "field mapping supplied by extension");
            Some(FieldMapping {
                ty: partial.ty.unwrap_or(OutputType::String),
                description: partial.description.or(Some(description)),
                resolve: partial.resolve.unwrap_or_else(|| stored(&shared)),
            })
        }
        None => builtin(compiler, registry, &shared, group_type)?.map(|(ty, resolve)| {
            FieldMapping {
                ty,
                description: Some(description),
                resolve,
            }
        }),
    };
    let Some(mapping) = mapping else {
        return Ok(None);
    };
    let mapping = compiler.extension.prepared_field(mapping, field, group);
    check_output_type(registry, field, &mapping.ty)?;
    Ok(Some(mapping))
}

/// Extension supplied types must name an output type of the schema.
fn check_output_type(
    registry: &TypeRegistry,
    field: &FieldDescriptor,
    ty: &OutputType,
) -> Result<(), CompileError> {
    if ty.is_builtin_scalar() {
        return Ok(());
    }
    let inner = ty.inner_name();
    let reason = match registry.lookup_type(&inner) {
        None => format!("type '{inner}' is not declared"),
        Some(ExtendedType::InputObject(_)) => format!("type '{inner}' is an input type"),
        Some(_) => return Ok(()),
    };
    Err(CompileError::ExtensionContract {
        field: field.key.clone(),
        reason,
    })
}

fn builtin(
    compiler: &TypeCompiler,
    registry: &mut TypeRegistry,
    field: &Arc<FieldDescriptor>,
    group_type: &Name,
) -> Result<Builtin, CompileError> {
    let names = &compiler.configuration.type_names;
    Ok(match &field.kind {
        FieldKind::Text
        | FieldKind::Email
        | FieldKind::Url
        | FieldKind::Password
        | FieldKind::Oembed
        | FieldKind::Wysiwyg
        | FieldKind::Radio
        | FieldKind::ButtonGroup
        | FieldKind::ColorPicker
        | FieldKind::Message => Some((OutputType::String, stored(field))),
        FieldKind::Textarea => Some((OutputType::String, textarea(field))),
        FieldKind::Number => Some((OutputType::Float, stored(field))),
        FieldKind::Range => Some((OutputType::Int, stored(field))),
        FieldKind::TrueFalse => Some((OutputType::Boolean, stored(field))),
        FieldKind::Select => Some(select(field)),
        FieldKind::Checkbox => Some((OutputType::list_of(OutputType::String), checkbox(field))),
        FieldKind::DatePicker | FieldKind::TimePicker | FieldKind::DateTimePicker => {
            Some((OutputType::String, date(field)))
        }
        FieldKind::Link => {
            let link = naming::exact_name(&names.link)?;
            Some((OutputType::Named(link), link_value(field)))
        }
        FieldKind::Image | FieldKind::File => host_type(registry, &names.media_item, field)
            .map(|media| (OutputType::Named(media), media_item(field))),
        FieldKind::Gallery => host_type(registry, &names.media_item, field)
            .map(|media| (OutputType::list_of(OutputType::Named(media)), gallery(field))),
        FieldKind::User => host_type(registry, &names.user, field).map(|user| {
            let cardinality = Cardinality::of(field);
            (cardinality.output_type(user), users(field, cardinality))
        }),
        FieldKind::Taxonomy => taxonomy(compiler, registry, field),
        FieldKind::PostObject | FieldKind::PageLink | FieldKind::Relationship => {
            relational(compiler, registry, field, group_type)?
        }
        FieldKind::Group => group(compiler, registry, field, group_type)?,
        FieldKind::Repeater => repeater(compiler, registry, field, group_type)?,
        FieldKind::FlexibleContent => flexible_content(compiler, registry, field, group_type)?,
        FieldKind::Accordion => None,
        FieldKind::Unsupported(kind) => {
            debug!(field = %field.key, kind = %kind, "unsupported field kind, not exposing");
            None
        }
    })
}

/// A type the host schema must provide; warns and returns `None` when it does not.
fn host_type(registry: &TypeRegistry, name: &str, field: &FieldDescriptor) -> Option<Name> {
    if registry.has_type(name) {
        Name::new(name).ok()
    } else {
        warn!(field = %field.key, type_name = name, "the schema has no such type, not exposing the field");
        None
    }
}

/// A host abstract type used when a relational field has no usable restriction, with the
/// discriminator of the concrete types it can resolve to.
fn fallback_type(
    compiler: &TypeCompiler,
    registry: &mut TypeRegistry,
    name: &str,
    field: &FieldDescriptor,
) -> Option<(Name, TypeDiscriminator)> {
    let name = host_type(registry, name, field)?;
    let members = match registry.lookup_type(&name) {
        Some(ExtendedType::Union(_)) => registry.union_members(&name),
        Some(ExtendedType::Interface(_)) => registry
            .schema()
            .types
            .iter()
            .filter(|(_, ty)| match ty {
                ExtendedType::Object(object) => object.implements_interfaces.contains(&name),
                _ => false,
            })
            .map(|(type_name, _)| type_name.clone())
            .collect(),
        _ => {
            let accepts = catalog_discriminator(&compiler.configuration, vec![name.clone()]);
            return Some((name, accepts));
        }
    };
    let accepts = catalog_discriminator(&compiler.configuration, members);
    registry.ensure_discriminator(&name, accepts.clone());
    Some((name, accepts))
}

fn stored(field: &Arc<FieldDescriptor>) -> FieldResolver {
    let field = field.clone();
    resolver(move |source, context| {
        Ok(ResolvedValue::opt_leaf(value::resolve(
            source, &field, false, context,
        )))
    })
}

fn textarea(field: &Arc<FieldDescriptor>) -> FieldResolver {
    let field = field.clone();
    resolver(move |source, context| {
        let value = value::resolve(source, &field, false, context);
        Ok(ResolvedValue::opt_leaf(value.map(|value| {
            match (value.as_str(), field.new_lines) {
                (Some(text), Some(NewLines::Wpautop)) => context.filters().autop(text).into(),
                (Some(text), Some(NewLines::Br)) => context.filters().nl2br(text).into(),
                _ => value,
            }
        })))
    })
}

fn select(field: &Arc<FieldDescriptor>) -> (OutputType, FieldResolver) {
    let multiple = field.is_multiple();
    let ty = if multiple {
        OutputType::list_of(OutputType::String)
    } else {
        OutputType::String
    };
    let field = field.clone();
    let resolve = resolver(move |source, context| {
        let value = value::resolve(source, &field, false, context);
        Ok(match (multiple, value) {
            (true, None) => ResolvedValue::List(Vec::new()),
            (true, Some(JsonValue::Array(items))) => {
                ResolvedValue::list(items.into_iter().map(ResolvedValue::Leaf))
            }
            (true, Some(value)) => ResolvedValue::list([ResolvedValue::Leaf(value)]),
            (false, Some(JsonValue::Array(items))) => {
                ResolvedValue::opt_leaf(items.into_iter().next())
            }
            (false, value) => ResolvedValue::opt_leaf(value),
        })
    });
    (ty, resolve)
}

fn checkbox(field: &Arc<FieldDescriptor>) -> FieldResolver {
    let field = field.clone();
    resolver(move |source, context| {
        Ok(match value::resolve(source, &field, false, context) {
            Some(JsonValue::Array(items)) => {
                ResolvedValue::list(items.into_iter().map(ResolvedValue::Leaf))
            }
            _ => ResolvedValue::null(),
        })
    })
}

fn date(field: &Arc<FieldDescriptor>) -> FieldResolver {
    let field = field.clone();
    resolver(move |source, context| {
        let value = value::resolve(source, &field, false, context);
        Ok(ResolvedValue::opt_leaf(value.map(|value| {
            match (value.as_str(), field.return_format.as_deref()) {
                (Some(raw), Some(return_format)) => format::render_date(raw, return_format)
                    .map(JsonValue::from)
                    .unwrap_or(value),
                _ => value,
            }
        })))
    })
}

fn link_value(field: &Arc<FieldDescriptor>) -> FieldResolver {
    let field = field.clone();
    resolver(move |source, context| {
        Ok(match value::resolve(source, &field, false, context) {
            Some(JsonValue::Object(link)) => ResolvedValue::object(Source::Value(link)),
            Some(JsonValue::String(url)) => {
                let mut link = crate::JsonMap::new();
                link.insert("url", JsonValue::String(url));
                ResolvedValue::object(Source::Value(link))
            }
            _ => ResolvedValue::null(),
        })
    })
}

fn load(
    context: &crate::schema::ResolveContext,
    kind: LookupKind,
    value: &JsonValue,
) -> impl Iterator<Item = Entity> {
    value::as_ids(value)
        .into_iter()
        .filter_map(move |id| context.entities().resolve_by_id(kind, id))
}

fn media_item(field: &Arc<FieldDescriptor>) -> FieldResolver {
    let field = field.clone();
    resolver(move |source, context| {
        let value = value::resolve(source, &field, false, context);
        let media = value
            .as_ref()
            .and_then(value::as_id)
            .and_then(|id| context.entities().resolve_by_id(LookupKind::Media, id));
        Ok(ResolvedValue::opt_object(media))
    })
}

fn gallery(field: &Arc<FieldDescriptor>) -> FieldResolver {
    let field = field.clone();
    resolver(move |source, context| {
        let Some(value) = value::resolve(source, &field, false, context) else {
            return Ok(ResolvedValue::null());
        };
        Ok(ResolvedValue::list(
            load(context, LookupKind::Media, &value).map(ResolvedValue::object),
        ))
    })
}

fn users(field: &Arc<FieldDescriptor>, cardinality: Cardinality) -> FieldResolver {
    let field = field.clone();
    resolver(move |source, context| {
        let Some(value) = value::resolve(source, &field, false, context) else {
            return Ok(ResolvedValue::null());
        };
        let users = load(context, LookupKind::User, &value)
            .filter(|user| user.visibility != Visibility::Private)
            .map(ResolvedValue::object)
            .collect();
        Ok(cardinality.collapse(users))
    })
}

fn taxonomy(
    compiler: &TypeCompiler,
    registry: &mut TypeRegistry,
    field: &Arc<FieldDescriptor>,
) -> Builtin {
    let term_kind = field
        .taxonomy
        .as_ref()
        .map(|taxonomy| EntityKind::Term(taxonomy.clone()));
    let specific = term_kind
        .as_ref()
        .and_then(|kind| compiler.type_for_kind(registry, kind));
    let (term_type, only) = match specific {
        Some(term_type) => (term_type, term_kind),
        None => (
            fallback_type(
                compiler,
                registry,
                &compiler.configuration.type_names.term_fallback,
                field,
            )?
            .0,
            None,
        ),
    };

    let field = field.clone();
    let resolve = resolver(move |source, context| {
        let Some(value) = value::resolve(source, &field, false, context) else {
            return Ok(ResolvedValue::List(Vec::new()));
        };
        Ok(ResolvedValue::list(
            load(context, LookupKind::Term, &value)
                .filter(|term| only.as_ref().is_none_or(|kind| term.kind == *kind))
                .map(ResolvedValue::object),
        ))
    });
    Some((OutputType::list_of(OutputType::Named(term_type)), resolve))
}

fn relational(
    compiler: &TypeCompiler,
    registry: &mut TypeRegistry,
    field: &Arc<FieldDescriptor>,
    group_type: &Name,
) -> Result<Builtin, CompileError> {
    let cardinality = if field.kind == FieldKind::Relationship {
        Cardinality::List
    } else {
        Cardinality::of(field)
    };
    let fallback = &compiler.configuration.type_names.content_fallback;

    // Entities the abstract type cannot discriminate are left out of the result.
    let (abstract_type, accepts) = if field.target_kinds.is_empty() {
        let Some(fallback) = fallback_type(compiler, registry, fallback, field) else {
            return Ok(None);
        };
        fallback
    } else {
        let union_name = naming::type_name(&naming::nested_type_name(
            group_type,
            &field.graphql_name(),
        ))?;
        match compiler.build_union(
            registry,
            union_name,
            &field.key,
            &field.target_entity_kinds(),
        )? {
            Some(union) => {
                let name = union.name.clone();
                (name, discriminator(move |source| union.discriminate(source)))
            }
            None => {
                let Some((fallback, _)) = fallback_type(compiler, registry, fallback, field) else {
                    return Ok(None);
                };
                debug!(field = %field.key, "no target kind is in the schema, the field always resolves empty");
                let empty = resolver(move |_, _| Ok(cardinality.empty()));
                return Ok(Some((cardinality.output_type(fallback), empty)));
            }
        }
    };

    let field = field.clone();
    let resolve = resolver(move |source, context| {
        let Some(value) = value::resolve(source, &field, false, context) else {
            return Ok(ResolvedValue::null());
        };
        let entities = load(context, LookupKind::Content, &value)
            .filter(Entity::is_public)
            .map(Source::Entity)
            .filter(|source| accepts(source).is_some())
            .map(ResolvedValue::object)
            .collect();
        Ok(cardinality.collapse(entities))
    });
    Ok(Some((cardinality.output_type(abstract_type), resolve)))
}

fn group(
    compiler: &TypeCompiler,
    registry: &mut TypeRegistry,
    field: &Arc<FieldDescriptor>,
    group_type: &Name,
) -> Result<Builtin, CompileError> {
    let Some(nested) = compiler.compile(registry, &field.child_group(group_type))? else {
        return Ok(None);
    };
    let field = field.clone();
    let resolve = resolver(move |source, context| {
        let narrowed = match source {
            Source::Row(_) => match value::resolve(source, &field, false, context) {
                Some(JsonValue::Object(row)) => Some(Source::Row(row)),
                _ => None,
            },
            _ => None,
        };
        Ok(ResolvedValue::object(
            narrowed.unwrap_or_else(|| source.clone()),
        ))
    });
    Ok(Some((OutputType::Named(nested), resolve)))
}

fn rows(value: Option<JsonValue>) -> ResolvedValue {
    let rows = match value {
        Some(JsonValue::Array(rows)) => rows,
        _ => Vec::new(),
    };
    ResolvedValue::list(rows.into_iter().filter_map(|row| match row {
        JsonValue::Object(row) => Some(ResolvedValue::object(Source::Row(row))),
        _ => None,
    }))
}

fn repeater(
    compiler: &TypeCompiler,
    registry: &mut TypeRegistry,
    field: &Arc<FieldDescriptor>,
    group_type: &Name,
) -> Result<Builtin, CompileError> {
    let Some(row_type) = compiler.compile(registry, &field.child_group(group_type))? else {
        return Ok(None);
    };
    let field = field.clone();
    let resolve = resolver(move |source, context| {
        Ok(rows(value::resolve(source, &field, false, context)))
    });
    Ok(Some((OutputType::list_of(OutputType::Named(row_type)), resolve)))
}

fn flexible_content(
    compiler: &TypeCompiler,
    registry: &mut TypeRegistry,
    field: &Arc<FieldDescriptor>,
    group_type: &Name,
) -> Result<Builtin, CompileError> {
    let field_type = naming::nested_type_name(group_type, &field.graphql_name());
    let mut layouts = HashMap::new();
    let mut members = Vec::new();
    for layout in &field.layouts {
        if let Some(layout_type) = compiler.compile(registry, &field.layout_group(layout, &field_type))? {
            layouts.insert(layout.name.clone(), layout_type.clone());
            if !members.contains(&layout_type) {
                members.push(layout_type);
            }
        }
    }
    if members.is_empty() {
        debug!(field = %field.key, "no layout has exposed fields, not exposing");
        return Ok(None);
    }

    let union_name = naming::type_name(&naming::nested_type_name(&field_type, "Layout"))?;
    registry.declare_union_type(
        union_name.clone(),
        &field.key,
        Some("Union of the layouts of a flexible content field"),
        members,
        crate::schema::discriminator(move |source| match source {
            Source::Row(row) => row
                .get("acf_fc_layout")
                .and_then(|layout| layout.as_str())
                .and_then(|layout| layouts.get(layout))
                .cloned(),
            _ => None,
        }),
    )?;

    let field = field.clone();
    let resolve = resolver(move |source, context| {
        Ok(rows(value::resolve(source, &field, false, context)))
    });
    Ok(Some((OutputType::list_of(OutputType::Named(union_name)), resolve)))
}
