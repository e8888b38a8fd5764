//! The in-memory schema model the compiler declares into, and the resolver model of the
//! declared fields.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

mod coercion;
mod output_type;
mod registry;
mod resolver;

pub use output_type::OutputType;
pub use registry::Checkpoint;
pub use registry::Declaration;
pub use registry::DeclaredField;
pub use registry::TypeRegistry;
pub use resolver::FieldResolver;
pub use resolver::ResolveContext;
pub use resolver::ResolvedValue;
pub use resolver::TypeDiscriminator;
pub use resolver::discriminator;
pub use resolver::resolver;

pub use crate::error::FieldError;
