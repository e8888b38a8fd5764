use apollo_compiler::Name;
use itertools::Itertools;
use tracing::debug;

use super::TypeCompiler;
use crate::configuration::Configuration;
use crate::entity::EntityKind;
use crate::entity::Source;
use crate::error::CompileError;
use crate::schema::Declaration;
use crate::schema::TypeDiscriminator;
use crate::schema::TypeRegistry;
use crate::schema::discriminator;

/// One member of a synthesized union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionCandidate {
    pub kind: EntityKind,
    pub type_name: Name,
}

/// A union synthesized for a polymorphic relational field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionDescriptor {
    pub name: Name,
    pub candidates: Vec<UnionCandidate>,
}

impl UnionDescriptor {
    /// The concrete type of `source`, `None` when its kind is not a candidate.
    pub fn discriminate(&self, source: &Source) -> Option<Name> {
        let entity = source.as_entity()?;
        self.candidates
            .iter()
            .find(|candidate| candidate.kind == entity.kind)
            .map(|candidate| candidate.type_name.clone())
    }
}

/// Declares the union `name` over the candidate kinds the schema exposes.
///
/// Returns `None`, without declaring anything, when no candidate kind is exposed.
pub(crate) fn build_union(
    compiler: &TypeCompiler,
    registry: &mut TypeRegistry,
    name: Name,
    origin: &str,
    kinds: &[EntityKind],
) -> Result<Option<UnionDescriptor>, CompileError> {
    let candidates: Vec<UnionCandidate> = kinds
        .iter()
        .unique()
        .filter_map(|kind| {
            compiler
                .type_for_kind(registry, kind)
                .map(|type_name| UnionCandidate {
                    kind: kind.clone(),
                    type_name,
                })
        })
        .collect();
    if candidates.is_empty() {
        debug!(union = %name, ?kinds, "no candidate kind is exposed in the schema, not declaring a union");
        return Ok(None);
    }

    let descriptor = UnionDescriptor { name, candidates };
    let members = descriptor
        .candidates
        .iter()
        .map(|candidate| candidate.type_name.clone())
        .unique()
        .collect();
    let discriminate = descriptor.clone();
    let declaration = registry.declare_union_type(
        descriptor.name.clone(),
        origin,
        Some("Union of the entity types a relational field can point to"),
        members,
        discriminator(move |source| discriminate.discriminate(source)),
    )?;
    if declaration == Declaration::Existing {
        debug!(union = %descriptor.name, "reusing union");
    }
    Ok(Some(descriptor))
}

/// Discriminates entities through the configured kind catalog, restricted to `members`.
///
/// Used for host-declared abstract types, such as the fallback unions, and for the
/// interfaces of field groups.
pub(crate) fn catalog_discriminator(
    configuration: &Configuration,
    members: Vec<Name>,
) -> TypeDiscriminator {
    let catalog = configuration.entity_kinds.clone();
    discriminator(move |source| {
        let entity = source.as_entity()?;
        let type_name = match catalog.get(&entity.kind.tag()) {
            Some(type_name) => type_name.as_str(),
            None => match &entity.kind {
                EntityKind::Other(tag) => tag.as_str(),
                _ => return None,
            },
        };
        members
            .iter()
            .find(|member| member.as_str() == type_name)
            .cloned()
    })
}
