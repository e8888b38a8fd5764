use std::collections::HashMap;
use std::fmt;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::ComponentName;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::FieldDefinition;
use apollo_compiler::schema::InterfaceType;
use apollo_compiler::schema::ObjectType;
use apollo_compiler::schema::Type;
use apollo_compiler::schema::UnionType;
use apollo_compiler::validation::Valid;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::coercion::coerce_result;
use super::output_type::OutputType;
use super::resolver::FieldResolver;
use super::resolver::ResolveContext;
use super::resolver::ResolvedValue;
use super::resolver::TypeDiscriminator;
use crate::entity::Source;
use crate::error::CompileError;
use crate::error::FieldError;

/// A field to declare on an object or interface type.
#[derive(Clone)]
pub struct DeclaredField {
    pub name: Name,
    pub description: Option<String>,
    pub ty: OutputType,
    pub resolve: FieldResolver,
}

impl fmt::Debug for DeclaredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredField")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// Outcome of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    Created,
    /// The same origin declared this name before; nothing was changed.
    Existing,
}

/// A saved registry state, see [`TypeRegistry::checkpoint`].
pub struct Checkpoint(TypeRegistry);

/// The schema under construction, together with the resolvers of its synthesized fields.
///
/// The registry is seeded from the host's base schema. Every synthesized type records the
/// origin that declared it, which makes declarations idempotent per origin and turns a
/// declaration by any other origin into a [`CompileError::TypeNameCollision`].
#[derive(Clone)]
pub struct TypeRegistry {
    schema: Schema,
    resolvers: HashMap<Name, HashMap<Name, FieldResolver>>,
    discriminators: HashMap<Name, TypeDiscriminator>,
    origins: HashMap<Name, String>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.schema.types.len())
            .field("origins", &self.origins)
            .finish_non_exhaustive()
    }
}

impl TypeRegistry {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            resolvers: HashMap::new(),
            discriminators: HashMap::new(),
            origins: HashMap::new(),
        }
    }

    /// Parses the host's base schema.
    pub fn from_sdl(sdl: &str) -> Result<Self, CompileError> {
        let schema = Schema::parse(sdl, "base.graphql")
            .map_err(|invalid| CompileError::BaseSchema(invalid.errors.to_string()))?;
        Ok(Self::new(schema))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn to_sdl(&self) -> String {
        self.schema.to_string()
    }

    pub fn validate(&self) -> Result<Valid<Schema>, CompileError> {
        self.schema
            .clone()
            .validate()
            .map_err(|invalid| CompileError::Validation(invalid.errors.to_string()))
    }

    pub fn lookup_type(&self, name: &str) -> Option<&ExtendedType> {
        self.schema.types.get(name)
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.schema.types.contains_key(name)
    }

    pub fn is_object_type(&self, name: &str) -> bool {
        matches!(self.lookup_type(name), Some(ExtendedType::Object(_)))
    }

    /// The origin that declared `name`, `None` for host types and unknown names.
    pub fn origin_of(&self, name: &str) -> Option<&str> {
        self.origins.get(name).map(String::as_str)
    }

    /// The field names of an object or interface type, in declaration order.
    pub fn field_names(&self, type_name: &str) -> Vec<Name> {
        match self.lookup_type(type_name) {
            Some(ExtendedType::Object(object)) => object.fields.keys().cloned().collect(),
            Some(ExtendedType::Interface(interface)) => {
                interface.fields.keys().cloned().collect()
            }
            _ => Vec::new(),
        }
    }

    /// The declared type of a field of an object or interface type.
    pub fn field_type(&self, type_name: &str, field_name: &str) -> Option<&Type> {
        match self.lookup_type(type_name)? {
            ExtendedType::Object(object) => object.fields.get(field_name).map(|f| &f.ty),
            ExtendedType::Interface(interface) => {
                interface.fields.get(field_name).map(|f| &f.ty)
            }
            _ => None,
        }
    }

    /// The member names of a union type.
    pub fn union_members(&self, name: &str) -> Vec<Name> {
        match self.lookup_type(name) {
            Some(ExtendedType::Union(union)) => {
                union.members.iter().map(|member| member.name.clone()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// The interfaces implemented by an object type.
    pub fn implemented_interfaces(&self, name: &str) -> Vec<Name> {
        match self.lookup_type(name) {
            Some(ExtendedType::Object(object)) => object
                .implements_interfaces
                .iter()
                .map(|interface| interface.name.clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn claim(&mut self, name: &Name, origin: &str) -> Result<Declaration, CompileError> {
        match self.origins.get(name) {
            Some(existing) if existing == origin => {
                trace!(type_name = %name, origin, "type already declared");
                Ok(Declaration::Existing)
            }
            Some(existing) => Err(CompileError::TypeNameCollision {
                name: name.to_string(),
                existing: existing.clone(),
                origin: origin.to_string(),
            }),
            None if self.schema.types.contains_key(name) => Err(CompileError::TypeNameCollision {
                name: name.to_string(),
                existing: "the base schema".to_string(),
                origin: origin.to_string(),
            }),
            None => {
                self.origins.insert(name.clone(), origin.to_string());
                Ok(Declaration::Created)
            }
        }
    }

    fn component(&mut self, owner: &Name, field: DeclaredField) -> Component<FieldDefinition> {
        self.resolvers
            .entry(owner.clone())
            .or_default()
            .insert(field.name.clone(), field.resolve);
        Component::new(FieldDefinition {
            description: field.description.as_deref().map(Into::into),
            name: field.name,
            arguments: vec![],
            ty: field.ty.to_type(),
            directives: Default::default(),
        })
    }

    pub fn declare_object_type(
        &mut self,
        name: Name,
        origin: &str,
        description: Option<&str>,
        fields: Vec<DeclaredField>,
    ) -> Result<Declaration, CompileError> {
        if self.claim(&name, origin)? == Declaration::Existing {
            return Ok(Declaration::Existing);
        }
        let mut object = ObjectType {
            description: description.map(Into::into),
            name: name.clone(),
            implements_interfaces: Default::default(),
            directives: Default::default(),
            fields: Default::default(),
        };
        for field in fields {
            let component = self.component(&name, field);
            object.fields.insert(component.name.clone(), component);
        }
        debug!(type_name = %name, origin, fields = object.fields.len(), "declared object type");
        self.schema
            .types
            .insert(name, ExtendedType::Object(Node::new(object)));
        Ok(Declaration::Created)
    }

    pub fn declare_interface_type(
        &mut self,
        name: Name,
        origin: &str,
        description: Option<&str>,
        fields: Vec<DeclaredField>,
    ) -> Result<Declaration, CompileError> {
        if self.claim(&name, origin)? == Declaration::Existing {
            return Ok(Declaration::Existing);
        }
        let mut interface = InterfaceType {
            description: description.map(Into::into),
            name: name.clone(),
            implements_interfaces: Default::default(),
            directives: Default::default(),
            fields: Default::default(),
        };
        for field in fields {
            let component = self.component(&name, field);
            interface.fields.insert(component.name.clone(), component);
        }
        debug!(type_name = %name, origin, "declared interface type");
        self.schema
            .types
            .insert(name, ExtendedType::Interface(Node::new(interface)));
        Ok(Declaration::Created)
    }

    /// Declares a union of existing object types.
    pub fn declare_union_type(
        &mut self,
        name: Name,
        origin: &str,
        description: Option<&str>,
        members: Vec<Name>,
        discriminator: TypeDiscriminator,
    ) -> Result<Declaration, CompileError> {
        if self.claim(&name, origin)? == Declaration::Existing {
            return Ok(Declaration::Existing);
        }
        let union = UnionType {
            description: description.map(Into::into),
            name: name.clone(),
            directives: Default::default(),
            members: members.into_iter().map(ComponentName::from).collect(),
        };
        debug!(type_name = %name, origin, members = union.members.len(), "declared union type");
        self.schema
            .types
            .insert(name.clone(), ExtendedType::Union(Node::new(union)));
        self.discriminators.insert(name, discriminator);
        Ok(Declaration::Created)
    }

    /// Installs a discriminator for an abstract type that has none yet, such as a host union.
    pub fn ensure_discriminator(&mut self, name: &Name, discriminator: TypeDiscriminator) {
        self.discriminators
            .entry(name.clone())
            .or_insert(discriminator);
    }

    /// Makes every target object type implement every interface.
    ///
    /// Interface fields (and their resolvers) are copied onto targets that lack them.
    /// Attaching twice is a no-op. Unknown or non-object targets, and targets whose own
    /// field of the same name has a different type, are skipped with a warning.
    pub fn attach_interfaces(&mut self, interfaces: &[Name], targets: &[Name]) -> Vec<Name> {
        let mut attached = Vec::new();
        for target in targets {
            if !self.is_object_type(target) {
                warn!(type_name = %target, "cannot attach interfaces to a type that is not an object type, skipping");
                continue;
            }
            for interface in interfaces {
                if self.attach_interface(interface, target) && !attached.contains(target) {
                    attached.push(target.clone());
                }
            }
        }
        attached
    }

    fn attach_interface(&mut self, interface: &Name, target: &Name) -> bool {
        let Some(ExtendedType::Interface(interface_type)) = self.schema.types.get(interface)
        else {
            warn!(interface = %interface, "unknown interface, skipping");
            return false;
        };
        let interface_fields: Vec<Component<FieldDefinition>> =
            interface_type.fields.values().cloned().collect();
        let Some(ExtendedType::Object(object)) = self.schema.types.get_mut(target) else {
            return false;
        };
        if object.implements_interfaces.contains(interface) {
            return true;
        }
        if let Some(conflict) = interface_fields.iter().find(|field| {
            object
                .fields
                .get(&field.name)
                .is_some_and(|existing| existing.ty != field.ty)
        }) {
            warn!(
                interface = %interface,
                type_name = %target,
                field = %conflict.name,
                "target already has a field of that name with another type, skipping"
            );
            return false;
        }

        let object = object.make_mut();
        let mut copied = Vec::new();
        for field in interface_fields {
            if !object.fields.contains_key(&field.name) {
                copied.push(field.name.clone());
                object.fields.insert(field.name.clone(), field);
            }
        }
        object
            .implements_interfaces
            .insert(ComponentName::from(interface.clone()));

        if let Some(interface_resolvers) = self.resolvers.get(interface).cloned() {
            let target_resolvers = self.resolvers.entry(target.clone()).or_default();
            for field in copied {
                if let Some(resolver) = interface_resolvers.get(&field) {
                    target_resolvers.insert(field, resolver.clone());
                }
            }
        }
        debug!(interface = %interface, type_name = %target, "attached interface");
        true
    }

    pub fn has_resolver(&self, type_name: &str, field_name: &str) -> bool {
        self.resolvers
            .get(type_name)
            .is_some_and(|fields| fields.contains_key(field_name))
    }

    /// Resolves one field against `source` and coerces built-in scalar leaves to the
    /// declared type.
    pub fn resolve_field(
        &self,
        type_name: &str,
        field_name: &str,
        source: &Source,
        context: &ResolveContext,
    ) -> Result<ResolvedValue, FieldError> {
        let unknown = || FieldError::UnknownField {
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
        };
        let resolver = self
            .resolvers
            .get(type_name)
            .and_then(|fields| fields.get(field_name))
            .ok_or_else(unknown)?;
        let ty = self.field_type(type_name, field_name).ok_or_else(unknown)?;
        let resolved = resolver(source, context)?;
        Ok(coerce_result(ty, resolved))
    }

    /// Determines the concrete object type of a value of an abstract type.
    pub fn resolve_type(&self, abstract_type: &str, source: &Source) -> Result<Name, FieldError> {
        let discriminator = self
            .discriminators
            .get(abstract_type)
            .ok_or_else(|| FieldError::UnknownAbstractType(abstract_type.to_string()))?;
        discriminator(source).ok_or_else(|| FieldError::UndiscriminatedEntity {
            abstract_type: abstract_type.to_string(),
            kind: source.kind_tag(),
        })
    }

    /// Saves the current state so a failed compilation can be undone.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.clone())
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        *self = checkpoint.0;
    }
}
