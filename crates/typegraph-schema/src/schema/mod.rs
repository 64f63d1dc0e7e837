//! Schema generation and lazy loading.
//!
//! Generation runs in two phases. Every registered type is first turned into
//! a stub carrying its name and presentation data. Once all stubs exist, the
//! linking phase resolves their bodies: fields, implemented interfaces and
//! union members. This lets declarations reference each other in any order,
//! cycles through field types included.
//!
//! ## Components
//!
//! - [`TypeDefinitionsGenerator`] - Runs the factories and the linking phase
//! - [`TypeDefinitionsStorage`] - Built types, queryable by handle
//! - [`SchemaFactory`] - Assembles the executable `async_graphql` schema
//! - [`LazySchema`] - Builds on first access and rebuilds on metadata change

mod builder;
mod definitions;
pub mod factories;
mod generator;
mod lazy;
mod linker;
mod orphans;
mod storage;
mod type_ref;

pub use builder::{BuiltSchema, SchemaFactory};
pub use definitions::{
    ArgumentMap, CompositeBody, CompositeType, DirectiveNode, EnumDefinition, EnumType,
    EnumValueDefinition, FieldDefinition, FieldMap, InputFieldMap, InputObjectType,
    InputTypeDefinition, InputValueDefinition, InterfaceDefinition, ObjectTypeDefinition,
    TypeLink, UnionDefinition, UnionType,
};
pub use generator::TypeDefinitionsGenerator;
pub use lazy::{LazySchema, SchemaState};
pub use orphans::OrphanedReferenceRegistry;
pub use storage::{TypeDefinitionsStorage, TypeKind};
pub use type_ref::TypeReference;
