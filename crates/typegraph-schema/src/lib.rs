//! # typegraph-schema
//!
//! Code-first GraphQL schema generation.
//!
//! Types, fields, arguments, enums and unions are declared as metadata and
//! registered into a [`TypeMetadataStorage`]. A [`SchemaFactory`] turns the
//! registered metadata into an executable `async_graphql` dynamic schema:
//!
//! - Object, interface and input types with `extends` inheritance
//! - Field middleware chains around every resolver
//! - Union and interface values resolved to their concrete object type
//! - Types referenced only through field thunks (orphans) are still built
//! - Directives and extensions kept on the built definitions
//!
//! ## Configuration
//!
//! Build options can be loaded from TOML:
//!
//! ```toml
//! query = "Query"
//! mutation = "Mutation"
//! date_scalar_mode = "timestamp"
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Build options
//! - [`metadata`] - Declarative type metadata and its registry
//! - [`middleware`] - Field middleware and resolver chains
//! - [`schema`] - Type generation, schema assembly and lazy loading
//! - [`error`] - Error types for generation and resolution

pub mod config;
pub mod error;
pub mod metadata;
pub mod middleware;
pub mod schema;

// Re-export main types
pub use config::{BuildSchemaOptions, DateScalarMode, NumberScalarMode};
pub use error::{ResolveError, SchemaBuildError, SchemaError};
pub use metadata::{
    ArgMetadata, ClassMetadata, EnumMetadata, EnumValueMetadata, MethodArg, Nullability,
    PropertyMetadata, ScalarKind, TypeHandle, TypeMetadataStorage, TypeOptions, TypeTarget,
    TypeThunk, UnionMetadata,
};
pub use middleware::{
    ExecutionContext, FieldContext, FieldInfo, FieldMiddleware, FieldResolver, Next,
    middleware_fn,
};
pub use schema::{
    BuiltSchema, LazySchema, SchemaFactory, SchemaState, TypeDefinitionsGenerator,
    TypeDefinitionsStorage,
};

/// Result type for schema generation.
pub type Result<T> = std::result::Result<T, SchemaBuildError>;
