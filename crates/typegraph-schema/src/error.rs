//! Error types for schema generation and field resolution.
//!
//! Generation errors abort the whole build: no partially registered schema is
//! ever returned. Resolution errors surface through the GraphQL response of
//! the field that raised them.

use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::metadata::TypeHandle;

/// Errors raised while generating type definitions or assembling the schema.
#[derive(Debug, Error)]
pub enum SchemaBuildError {
    /// A field references a handle that is not a known output type.
    #[error(
        "Cannot determine a GraphQL output type for the \"{field}\" field (type: {target}). \
         Make sure the type is registered as an object, interface, enum or union."
    )]
    UnknownOutputType { field: String, target: String },

    /// An input field or argument references a handle that is not an input type.
    #[error(
        "Cannot determine a GraphQL input type for \"{field}\" (type: {target}). \
         Make sure the type is registered as an input type or enum."
    )]
    UnknownInputType { field: String, target: String },

    /// A type declares an interface that was never registered.
    #[error("Type \"{type_name}\" implements \"{interface}\", which is not a registered interface")]
    MissingInterface { type_name: String, interface: TypeHandle },

    /// A union member is not a registered object type.
    #[error("Union \"{union}\" references \"{member}\", which is not a registered object type")]
    InvalidUnionMember { union: String, member: TypeHandle },

    /// An args reference points at a handle that is not a registered args type.
    #[error("Field \"{field}\" uses args type \"{target}\", which is not registered")]
    UnknownArgsType { field: String, target: TypeHandle },

    /// The `extends` chain of a type loops back on itself.
    #[error("Inheritance cycle detected at \"{0}\"")]
    InheritanceCycle(TypeHandle),

    /// The same handle was registered twice within one category.
    #[error("Type handle \"{0}\" is registered more than once")]
    DuplicateHandle(TypeHandle),

    /// Two different handles produce the same schema type name.
    #[error("Schema type name \"{0}\" is used by more than one type")]
    DuplicateTypeName(String),

    /// A directive could not be parsed from its SDL.
    #[error("Invalid directive \"{sdl}\": {reason}")]
    InvalidDirective { sdl: String, reason: String },

    /// The configured query root is not a registered object type.
    #[error("Query root type \"{0}\" is not a registered object type")]
    MissingQueryRoot(TypeHandle),

    /// Options failed validation.
    #[error("Invalid build options: {0}")]
    InvalidOptions(String),

    /// A type body was requested before the linking phase ran.
    #[error("Type \"{0}\" has not been linked yet")]
    NotLinked(String),

    /// The execution engine rejected the assembled schema.
    #[error("GraphQL engine rejected the schema: {0}")]
    Engine(String),
}

/// Errors raised while resolving a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A middleware advanced the chain more than once.
    #[error("next() called multiple times")]
    NextCalledMultipleTimes,

    /// A middleware or computed field failed.
    #[error("{0}")]
    Middleware(String),
}

impl ResolveError {
    /// Convenience constructor for middleware failures.
    pub fn middleware(msg: impl Into<String>) -> Self {
        Self::Middleware(msg.into())
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NextCalledMultipleTimes => "NEXT_CALLED_MULTIPLE_TIMES",
            Self::Middleware(_) => "FIELD_RESOLUTION_FAILED",
        }
    }

    /// Converts into a GraphQL error carrying the error code as extension.
    pub fn to_graphql_error(&self) -> async_graphql::Error {
        let code = self.error_code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", code))
    }
}

/// Errors surfaced by [`crate::schema::LazySchema`].
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// Schema is still being built - caller should retry.
    #[error("GraphQL schema is initializing, please retry")]
    SchemaInitializing,

    /// Schema build failed.
    #[error("Failed to build GraphQL schema: {0}")]
    SchemaBuildFailed(String),
}

impl SchemaError {
    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaInitializing => "SCHEMA_INITIALIZING",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
        }
    }

    /// Returns the retry delay in seconds, if applicable.
    #[must_use]
    pub fn retry_after(&self) -> Option<u32> {
        match self {
            Self::SchemaInitializing => Some(5),
            Self::SchemaBuildFailed(_) => None,
        }
    }
}

impl From<SchemaBuildError> for SchemaError {
    fn from(err: SchemaBuildError) -> Self {
        Self::SchemaBuildFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_called_twice_message() {
        assert_eq!(
            ResolveError::NextCalledMultipleTimes.to_string(),
            "next() called multiple times"
        );
    }

    #[test]
    fn test_resolve_error_extension_code() {
        let err = ResolveError::NextCalledMultipleTimes.to_graphql_error();
        assert_eq!(err.message, "next() called multiple times");
        let code = err.extensions.as_ref().and_then(|ext| ext.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("NEXT_CALLED_MULTIPLE_TIMES")));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SchemaError::SchemaInitializing.error_code(),
            "SCHEMA_INITIALIZING"
        );
        assert_eq!(
            SchemaError::SchemaBuildFailed("boom".into()).error_code(),
            "SCHEMA_BUILD_FAILED"
        );
    }

    #[test]
    fn test_retry_after() {
        assert_eq!(SchemaError::SchemaInitializing.retry_after(), Some(5));
        assert_eq!(SchemaError::SchemaBuildFailed("x".into()).retry_after(), None);
    }

    #[test]
    fn test_build_error_converts_to_schema_error() {
        let err: SchemaError =
            SchemaBuildError::InheritanceCycle(TypeHandle::new("Recipe")).into();
        assert!(err.to_string().contains("Inheritance cycle"));
        assert!(err.to_string().contains("Recipe"));
    }
}
