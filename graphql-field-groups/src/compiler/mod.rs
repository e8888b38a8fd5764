//! Compiles field group descriptors into schema types.
//!
//! Each exposed group becomes an object type named after the group, with one field per
//! exposed field of the group. A top-level group also gets a `Has…` interface holding a
//! single field that returns the group type, and that interface is attached to every
//! entity type the group targets.
//!
//! Compilation is idempotent: every type remembers the group or field that declared it, and
//! compiling the same group again returns the type declared the first time.

use std::sync::Arc;

use apollo_compiler::Name;
use indexmap::IndexMap;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

mod builtin;
mod mapper;
mod union;

pub use union::UnionCandidate;
pub use union::UnionDescriptor;

use crate::configuration::Configuration;
use crate::descriptor::FieldDescriptor;
use crate::descriptor::FieldGroupDescriptor;
use crate::entity::EntityKind;
use crate::entity::Source;
use crate::error::CompileError;
use crate::extension::Extension;
use crate::extension::FieldMapping;
use crate::extension::NoExtension;
use crate::host::ConfigProvider;
use crate::naming;
use crate::schema::DeclaredField;
use crate::schema::OutputType;
use crate::schema::ResolvedValue;
use crate::schema::TypeRegistry;
use crate::schema::resolver;

const FIELD_GROUP_CONFIG: &str = "fieldGroupConfig";
const FIELD_GROUP_NAME: &str = "fieldGroupName";

/// A field group that was left out of the schema, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGroup {
    pub key: String,
    pub error: CompileError,
}

/// The outcome of [`TypeCompiler::compile_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Types of the compiled groups, in provider order
    pub compiled: Vec<Name>,
    /// Groups not exposed to the schema, or inactive
    pub hidden: Vec<String>,
    /// Groups without any exposed field
    pub empty: Vec<String>,
    /// Groups that failed to compile; the registry was rolled back for each of them
    pub skipped: Vec<SkippedGroup>,
}

impl CompileReport {
    /// Logs one warning per group left out of the schema by an error.
    pub fn warn_skipped(&self) {
        for skipped in &self.skipped {
            warn!(
                field_group = %skipped.key,
                error = %skipped.error,
                "field group is missing from the schema"
            );
        }
    }
}

/// Compiles the field groups of a [`ConfigProvider`] into a [`TypeRegistry`].
#[derive(Clone)]
pub struct TypeCompiler {
    configuration: Arc<Configuration>,
    provider: Arc<dyn ConfigProvider>,
    extension: Arc<dyn Extension>,
}

impl std::fmt::Debug for TypeCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCompiler")
            .field("configuration", &self.configuration)
            .finish_non_exhaustive()
    }
}

impl TypeCompiler {
    pub fn new(configuration: Configuration, provider: Arc<dyn ConfigProvider>) -> Self {
        Self {
            configuration: Arc::new(configuration),
            provider,
            extension: Arc::new(NoExtension),
        }
    }

    pub fn with_extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.extension = extension;
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Compiles every group of the provider.
    ///
    /// A group that fails to compile is rolled back and reported in
    /// [`CompileReport::skipped`]; only fatal errors (see [`CompileError::is_fatal`]) abort.
    pub fn compile_all(&self, registry: &mut TypeRegistry) -> Result<CompileReport, CompileError> {
        let mut report = CompileReport::default();
        for group in self.provider.field_groups() {
            let exposed = self
                .extension
                .should_expose_group(&group, group.show_in_graphql);
            if !exposed || !group.active {
                trace!(field_group = %group.key, exposed, active = group.active, "field group is hidden");
                report.hidden.push(group.key);
                continue;
            }
            if group.target_kinds.is_empty() {
                let error = CompileError::NoTargetKinds(group.key.clone());
                warn!(field_group = %group.key, "{error}, skipping");
                report.skipped.push(SkippedGroup {
                    key: group.key,
                    error,
                });
                continue;
            }

            let group = FieldGroupDescriptor {
                show_in_graphql: true,
                ..group
            };
            match self.compile(registry, &group) {
                Ok(Some(type_name)) => report.compiled.push(type_name),
                Ok(None) => report.empty.push(group.key),
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    warn!(field_group = %group.key, %error, "could not compile field group, skipping");
                    report.skipped.push(SkippedGroup {
                        key: group.key,
                        error,
                    });
                }
            }
        }
        info!(
            compiled = report.compiled.len(),
            empty = report.empty.len(),
            skipped = report.skipped.len(),
            "compiled field groups"
        );
        Ok(report)
    }

    /// Compiles one group and returns its type name.
    ///
    /// Returns `None` when the group is not exposed, or when none of its fields is. A top-level
    /// group that fails leaves the registry as it was.
    pub fn compile(
        &self,
        registry: &mut TypeRegistry,
        group: &FieldGroupDescriptor,
    ) -> Result<Option<Name>, CompileError> {
        if !group.is_compilable() {
            debug!(field_group = %group.key, "field group is not compilable");
            return Ok(None);
        }
        let type_name = naming::type_name(&group.raw_type_name())?;
        if registry.origin_of(&type_name) == Some(group.key.as_str()) {
            trace!(field_group = %group.key, type_name = %type_name, "field group already compiled");
            return Ok(Some(type_name));
        }
        if group.is_nested() {
            return self.declare_group(registry, group, type_name);
        }

        let checkpoint = registry.checkpoint();
        let result = self.declare_group(registry, group, type_name);
        if !matches!(result, Ok(Some(_))) {
            registry.restore(checkpoint);
        }
        result
    }

    /// Maps one field of `group`, which compiles to `group_type`. `None` means the field is
    /// not exposed.
    pub fn map_field(
        &self,
        registry: &mut TypeRegistry,
        field: &FieldDescriptor,
        group: &FieldGroupDescriptor,
        group_type: &Name,
    ) -> Result<Option<FieldMapping>, CompileError> {
        mapper::map_field(self, registry, field, group, group_type)
    }

    /// Declares a union over the exposed types of `kinds`, see [`UnionDescriptor`].
    pub fn build_union(
        &self,
        registry: &mut TypeRegistry,
        name: Name,
        origin: &str,
        kinds: &[EntityKind],
    ) -> Result<Option<UnionDescriptor>, CompileError> {
        union::build_union(self, registry, name, origin, kinds)
    }

    /// The object type of the schema representing an entity kind.
    ///
    /// The configured catalog is consulted first; a kind tag that is itself the name of an
    /// object type also resolves to that type.
    pub fn type_for_kind(&self, registry: &TypeRegistry, kind: &EntityKind) -> Option<Name> {
        let configured = self
            .configuration
            .type_for_kind(kind)
            .filter(|type_name| registry.is_object_type(type_name));
        let type_name = match (configured, kind) {
            (Some(type_name), _) => type_name,
            (None, EntityKind::Other(tag)) if registry.is_object_type(tag) => tag.as_str(),
            _ => return None,
        };
        Name::new(type_name).ok()
    }

    fn declare_group(
        &self,
        registry: &mut TypeRegistry,
        group: &FieldGroupDescriptor,
        type_name: Name,
    ) -> Result<Option<Name>, CompileError> {
        builtin::declare(registry, &self.configuration)?;

        let group = if group.is_nested() {
            Arc::new(group.clone())
        } else {
            Arc::new(FieldGroupDescriptor {
                fields: self.provider.fields(group),
                ..group.clone()
            })
        };

        // Nested types are named after the output field, so only the surviving field of a
        // name may map.
        let mut exposed: IndexMap<Name, &FieldDescriptor> = IndexMap::new();
        for field in group.fields.iter().filter(|field| field.show_in_graphql) {
            let name = match naming::field_name(field.raw_graphql_name()) {
                Ok(name) => name,
                // Unnamed layout fields, such as accordions, map to nothing.
                Err(error) => {
                    if self.map_field(registry, field, &group, &type_name)?.is_some() {
                        return Err(error);
                    }
                    continue;
                }
            };
            if let Some(replaced) = exposed.insert(name.clone(), field) {
                warn!(
                    field_group = %group.key,
                    field = %name,
                    replaced = %replaced.key,
                    kept = %field.key,
                    "duplicate field name, the last field wins"
                );
            }
        }

        let mut fields: IndexMap<Name, DeclaredField> = IndexMap::new();
        for (name, field) in exposed {
            let Some(mapping) = self.map_field(registry, field, &group, &type_name)? else {
                continue;
            };
            fields.insert(
                name.clone(),
                DeclaredField {
                    name,
                    description: mapping.description,
                    ty: mapping.ty,
                    resolve: mapping.resolve,
                },
            );
        }
        if fields.is_empty() {
            debug!(field_group = %group.key, "no exposed fields, not declaring a type");
            return Ok(None);
        }
        self.add_reserved_fields(&mut fields, &group)?;

        let description = Some(group.description.as_str()).filter(|d| !d.is_empty());
        registry.declare_object_type(
            type_name.clone(),
            &group.key,
            description,
            fields.into_values().collect(),
        )?;
        if !group.is_nested() {
            self.attach_to_targets(registry, &group, &type_name)?;
        }
        Ok(Some(type_name))
    }

    fn add_reserved_fields(
        &self,
        fields: &mut IndexMap<Name, DeclaredField>,
        group: &Arc<FieldGroupDescriptor>,
    ) -> Result<(), CompileError> {
        if !group.is_nested() {
            let name = Name::new_static_unchecked(FIELD_GROUP_CONFIG);
            let config_type = naming::exact_name(&self.configuration.type_names.field_group_config)?;
            let source = Arc::clone(group);
            fields.entry(name.clone()).or_insert_with(|| DeclaredField {
                name,
                description: Some("The configuration of the field group".to_string()),
                ty: OutputType::Named(config_type),
                resolve: resolver(move |_, context| {
                    Ok(if context.access().can_view_field_group_config() {
                        ResolvedValue::object(Source::FieldGroup(source.clone()))
                    } else {
                        ResolvedValue::null()
                    })
                }),
            });
        }
        if self.configuration.field_group_name {
            let name = Name::new_static_unchecked(FIELD_GROUP_NAME);
            let value = group.field_group_name();
            fields.entry(name.clone()).or_insert_with(|| DeclaredField {
                name,
                description: Some("The name of the field group".to_string()),
                ty: OutputType::String,
                resolve: resolver(move |_, _| Ok(ResolvedValue::leaf(value.as_str()))),
            });
        }
        Ok(())
    }

    fn attach_to_targets(
        &self,
        registry: &mut TypeRegistry,
        group: &FieldGroupDescriptor,
        type_name: &Name,
    ) -> Result<(), CompileError> {
        let interface = naming::exact_name(&self.configuration.interface_name(type_name))?;
        let field = naming::field_name(&group.graphql_name())?;
        registry.declare_interface_type(
            interface.clone(),
            &group.key,
            Some(format!("Entities with the \"{}\" field group", group.title).as_str()),
            vec![DeclaredField {
                name: field,
                description: Some(format!("Fields of the \"{}\" field group", group.title)),
                ty: OutputType::Named(type_name.clone()),
                resolve: resolver(|source, _| Ok(ResolvedValue::object(source.clone()))),
            }],
        )?;

        let mut targets = Vec::new();
        for kind in group.target_entity_kinds() {
            match self.type_for_kind(registry, &kind) {
                Some(target) if !targets.contains(&target) => targets.push(target),
                Some(_) => {}
                None => {
                    warn!(field_group = %group.key, kind = %kind, "no object type for target kind, skipping")
                }
            }
        }
        let attached = registry.attach_interfaces(std::slice::from_ref(&interface), &targets);
        debug!(field_group = %group.key, interface = %interface, targets = attached.len(), "attached field group interface");
        registry.ensure_discriminator(
            &interface,
            union::catalog_discriminator(&self.configuration, attached),
        );
        Ok(())
    }
}
