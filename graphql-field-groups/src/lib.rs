//! Compiles user-defined field groups into a typed GraphQL schema.
//!
//! ## Usage
//!
//! A [`TypeCompiler`] reads field group descriptors from a [`host::ConfigProvider`] and
//! declares one object type per group into a [`TypeRegistry`], together with a `Has…`
//! interface attached to every entity type the group targets. Nested groups, repeaters
//! and flexible content layouts become nested object types; polymorphic relationships
//! become unions.
//!
//! Every declared field carries a resolver. At query time the surrounding executor calls
//! [`TypeRegistry::resolve_field`] with the current [`Source`] and a [`ResolveContext`]
//! holding the host collaborators, and [`TypeRegistry::resolve_type`] to discriminate
//! union members.
//!
//! ```ignore
//! let mut registry = TypeRegistry::from_sdl(base_sdl)?;
//! let compiler = TypeCompiler::new(Configuration::default(), provider.clone());
//! let report = compiler.compile_all(&mut registry)?;
//! println!("{}", registry.to_sdl());
//! ```

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod compiler;
pub mod configuration;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod extension;
pub mod format;
pub mod host;
pub mod naming;
pub mod schema;
pub mod value;

pub use compiler::CompileReport;
pub use compiler::TypeCompiler;
pub use configuration::Configuration;
pub use descriptor::FieldDescriptor;
pub use descriptor::FieldGroupDescriptor;
pub use descriptor::FieldKind;
pub use entity::Entity;
pub use entity::EntityKind;
pub use entity::Source;
pub use entity::Visibility;
pub use error::CompileError;
pub use error::FieldError;
pub use extension::Extension;
pub use schema::ResolveContext;
pub use schema::ResolvedValue;
pub use schema::TypeRegistry;

/// JSON values as stored by the configuration store and produced by resolvers.
pub type JsonValue = serde_json_bytes::Value;
/// A JSON object, e.g. one repeater row.
pub type JsonMap = serde_json_bytes::Map<serde_json_bytes::ByteString, JsonValue>;
