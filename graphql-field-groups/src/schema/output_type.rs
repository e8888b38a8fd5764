use std::fmt;

use apollo_compiler::Name;
use apollo_compiler::name;
use apollo_compiler::schema::Type;

/// The type of a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputType {
    /// A schema type referenced by name
    Named(Name),
    List(Box<OutputType>),
    NonNull(Box<OutputType>),
    String,
    Int,
    Float,
    Id,
    Boolean,
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Named(ty) => write!(f, "{ty}"),
            OutputType::List(ty) => write!(f, "[{ty}]"),
            OutputType::NonNull(ty) => write!(f, "{ty}!"),
            OutputType::String => write!(f, "String"),
            OutputType::Int => write!(f, "Int"),
            OutputType::Float => write!(f, "Float"),
            OutputType::Id => write!(f, "ID"),
            OutputType::Boolean => write!(f, "Boolean"),
        }
    }
}

impl OutputType {
    pub fn list_of(inner: OutputType) -> Self {
        OutputType::List(Box::new(inner))
    }

    pub fn non_null(self) -> Self {
        match self {
            OutputType::NonNull(_) => self,
            ty => OutputType::NonNull(Box::new(ty)),
        }
    }

    pub fn is_list(&self) -> bool {
        match self {
            OutputType::List(_) => true,
            OutputType::NonNull(inner) => inner.is_list(),
            _ => false,
        }
    }

    /// The innermost named type.
    pub fn inner_name(&self) -> Name {
        match self {
            OutputType::Named(name) => name.clone(),
            OutputType::List(inner) | OutputType::NonNull(inner) => inner.inner_name(),
            OutputType::String => name!("String"),
            OutputType::Int => name!("Int"),
            OutputType::Float => name!("Float"),
            OutputType::Id => name!("ID"),
            OutputType::Boolean => name!("Boolean"),
        }
    }

    /// Whether the innermost type is one of the built-in scalars.
    pub fn is_builtin_scalar(&self) -> bool {
        match self {
            OutputType::Named(_) => false,
            OutputType::List(inner) | OutputType::NonNull(inner) => inner.is_builtin_scalar(),
            _ => true,
        }
    }

    /// Converts to the type reference of the schema model.
    pub fn to_type(&self) -> Type {
        match self {
            OutputType::List(inner) => Type::List(Box::new(inner.to_type())),
            OutputType::NonNull(inner) => match inner.to_type() {
                Type::Named(name) | Type::NonNullNamed(name) => Type::NonNullNamed(name),
                Type::List(item) | Type::NonNullList(item) => Type::NonNullList(item),
            },
            named => Type::Named(named.inner_name()),
        }
    }
}

impl From<Name> for OutputType {
    fn from(name: Name) -> Self {
        OutputType::Named(name)
    }
}
