use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;

use crate::JsonValue;
use crate::entity::Source;
use crate::error::FieldError;
use crate::extension::Extension;
use crate::extension::NoExtension;
use crate::host::AccessPolicy;
use crate::host::ConfigProvider;
use crate::host::ContentFilters;
use crate::host::DefaultContentFilters;
use crate::host::DenyAll;
use crate::host::EntityStore;

/// Resolves one field of an object or interface type against the current root value.
///
/// Resolvers capture only immutable descriptors and may run concurrently.
pub type FieldResolver =
    Arc<dyn Fn(&Source, &ResolveContext) -> Result<ResolvedValue, FieldError> + Send + Sync>;

/// Returns the concrete object type of a value of an abstract type, or `None` when the value
/// matches none of the candidates.
pub type TypeDiscriminator = Arc<dyn Fn(&Source) -> Option<Name> + Send + Sync>;

/// Boxes a resolver closure.
pub fn resolver<F>(resolve: F) -> FieldResolver
where
    F: Fn(&Source, &ResolveContext) -> Result<ResolvedValue, FieldError> + Send + Sync + 'static,
{
    Arc::new(resolve)
}

/// Boxes a discriminator closure.
pub fn discriminator<F>(discriminate: F) -> TypeDiscriminator
where
    F: Fn(&Source) -> Option<Name> + Send + Sync + 'static,
{
    Arc::new(discriminate)
}

/// The value of a resolved field
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// * JSON null represents GraphQL null
    /// * GraphQL built-in scalars are coerced leniently after resolution
    /// * For custom scalars, any JSON value is passed through as-is
    Leaf(JsonValue),

    /// Expected where the GraphQL type is an object, interface, or union type
    Object(Source),

    /// Expected for GraphQL list types
    List(Vec<ResolvedValue>),
}

impl ResolvedValue {
    /// Construct a null leaf resolved value
    pub fn null() -> Self {
        Self::Leaf(JsonValue::Null)
    }

    /// Construct a leaf resolved value from something that is convertible to JSON
    pub fn leaf(json: impl Into<JsonValue>) -> Self {
        Self::Leaf(json.into())
    }

    /// Construct a leaf resolved value or null
    pub fn opt_leaf(json: Option<JsonValue>) -> Self {
        Self::Leaf(json.unwrap_or(JsonValue::Null))
    }

    /// Construct an object resolved value from its root
    pub fn object(source: impl Into<Source>) -> Self {
        Self::Object(source.into())
    }

    /// Construct an object resolved value or null
    pub fn opt_object(source: Option<impl Into<Source>>) -> Self {
        match source {
            Some(source) => Self::object(source),
            None => Self::null(),
        }
    }

    /// Construct a list resolved value from an iterator
    pub fn list<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::List(iter.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Leaf(JsonValue::Null))
    }

    pub fn as_list(&self) -> Option<&[ResolvedValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Source> {
        match self {
            Self::Object(source) => Some(source),
            _ => None,
        }
    }
}

/// Host collaborators available to resolvers.
#[derive(Clone)]
pub struct ResolveContext {
    pub(crate) provider: Arc<dyn ConfigProvider>,
    pub(crate) entities: Arc<dyn EntityStore>,
    pub(crate) filters: Arc<dyn ContentFilters>,
    pub(crate) access: Arc<dyn AccessPolicy>,
    pub(crate) extension: Arc<dyn Extension>,
}

impl ResolveContext {
    /// Uses the default content filters, denies access to field group metadata and installs
    /// no extension.
    pub fn new(provider: Arc<dyn ConfigProvider>, entities: Arc<dyn EntityStore>) -> Self {
        Self {
            provider,
            entities,
            filters: Arc::new(DefaultContentFilters),
            access: Arc::new(DenyAll),
            extension: Arc::new(NoExtension),
        }
    }

    pub fn with_filters(mut self, filters: Arc<dyn ContentFilters>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_access(mut self, access: Arc<dyn AccessPolicy>) -> Self {
        self.access = access;
        self
    }

    pub fn with_extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.extension = extension;
        self
    }

    pub fn provider(&self) -> &dyn ConfigProvider {
        self.provider.as_ref()
    }

    pub fn entities(&self) -> &dyn EntityStore {
        self.entities.as_ref()
    }

    pub fn filters(&self) -> &dyn ContentFilters {
        self.filters.as_ref()
    }

    pub fn access(&self) -> &dyn AccessPolicy {
        self.access.as_ref()
    }

    pub fn extension(&self) -> &dyn Extension {
        self.extension.as_ref()
    }
}

impl fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext").finish_non_exhaustive()
    }
}
