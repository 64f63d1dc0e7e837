//! Built schema types.
//!
//! A built type is created as a stub carrying its name and presentation data.
//! Its body (fields, implemented interfaces, union members) is resolved once
//! in the linking phase, after every stub exists, and cached afterwards.

use std::fmt;
use std::sync::{Arc, OnceLock};

use async_graphql::Value;
use indexmap::IndexMap;

use super::type_ref::TypeReference;
use crate::error::SchemaBuildError;
use crate::metadata::{ClassMetadata, Extensions, MembersThunk, ResolveTypeFn, TypeHandle};
use crate::middleware::FieldResolver;

/// A directive attached to a type or field.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveNode {
    pub name: String,
    pub arguments: IndexMap<String, Value>,
}

/// Reference from one built type to another, by handle and schema name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeLink {
    pub handle: TypeHandle,
    pub name: String,
}

/// An argument or input field.
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub name: String,
    pub property_name: String,
    pub ty: TypeReference,
    pub default_value: Option<Value>,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<DirectiveNode>,
}

pub type ArgumentMap = IndexMap<String, InputValueDefinition>;

/// A field of an object or interface type.
#[derive(Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub property_name: String,
    pub ty: TypeReference,
    pub args: ArgumentMap,
    pub resolver: FieldResolver,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<DirectiveNode>,
    /// Declared extensions plus `complexity` when set.
    pub extensions: Extensions,
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("ty", &self.ty.to_string())
            .field("args", &self.args.keys().collect::<Vec<_>>())
            .field("middleware", &self.resolver.middleware_count())
            .finish_non_exhaustive()
    }
}

pub type FieldMap = IndexMap<String, Arc<FieldDefinition>>;

/// Resolved body of an object or interface type.
#[derive(Debug, Default)]
pub struct CompositeBody {
    pub interfaces: Vec<TypeLink>,
    pub fields: FieldMap,
}

/// Object or interface type.
#[derive(Debug)]
pub struct CompositeType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<DirectiveNode>,
    pub extensions: Extensions,
    pub(crate) body: OnceLock<CompositeBody>,
}

impl CompositeType {
    pub(crate) fn stub(
        name: String,
        description: Option<String>,
        directives: Vec<DirectiveNode>,
        extensions: Extensions,
    ) -> Self {
        Self {
            name,
            description,
            directives,
            extensions,
            body: OnceLock::new(),
        }
    }

    pub fn is_linked(&self) -> bool {
        self.body.get().is_some()
    }

    /// Resolved body.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError::NotLinked`] before the linking phase ran.
    pub fn body(&self) -> Result<&CompositeBody, SchemaBuildError> {
        self.body
            .get()
            .ok_or_else(|| SchemaBuildError::NotLinked(self.name.clone()))
    }

    pub fn fields(&self) -> Result<&FieldMap, SchemaBuildError> {
        self.body().map(|body| &body.fields)
    }

    pub fn interfaces(&self) -> Result<&[TypeLink], SchemaBuildError> {
        self.body().map(|body| body.interfaces.as_slice())
    }

    pub fn field(&self, name: &str) -> Option<&Arc<FieldDefinition>> {
        self.body.get().and_then(|body| body.fields.get(name))
    }
}

#[derive(Debug)]
pub struct ObjectTypeDefinition {
    pub target: TypeHandle,
    pub is_abstract: bool,
    pub interfaces: Vec<TypeHandle>,
    pub ty: CompositeType,
    pub(crate) metadata: Arc<ClassMetadata>,
}

pub struct InterfaceDefinition {
    pub target: TypeHandle,
    pub is_abstract: bool,
    pub interfaces: Vec<TypeHandle>,
    pub ty: CompositeType,
    pub resolve_type: Option<ResolveTypeFn>,
    pub(crate) metadata: Arc<ClassMetadata>,
}

impl fmt::Debug for InterfaceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceDefinition")
            .field("target", &self.target)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

pub type InputFieldMap = IndexMap<String, Arc<InputValueDefinition>>;

#[derive(Debug)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<DirectiveNode>,
    pub extensions: Extensions,
    pub(crate) fields: OnceLock<InputFieldMap>,
}

impl InputObjectType {
    pub fn fields(&self) -> Result<&InputFieldMap, SchemaBuildError> {
        self.fields
            .get()
            .ok_or_else(|| SchemaBuildError::NotLinked(self.name.clone()))
    }
}

#[derive(Debug)]
pub struct InputTypeDefinition {
    pub target: TypeHandle,
    pub is_abstract: bool,
    pub ty: InputObjectType,
    pub(crate) metadata: Arc<ClassMetadata>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDefinition {
    pub name: String,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValueDefinition>,
}

#[derive(Debug)]
pub struct EnumDefinition {
    pub target: TypeHandle,
    pub ty: EnumType,
}

#[derive(Debug)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub(crate) members: OnceLock<Vec<TypeLink>>,
}

impl UnionType {
    pub fn members(&self) -> Result<&[TypeLink], SchemaBuildError> {
        self.members
            .get()
            .map(Vec::as_slice)
            .ok_or_else(|| SchemaBuildError::NotLinked(self.name.clone()))
    }
}

pub struct UnionDefinition {
    pub target: TypeHandle,
    pub ty: UnionType,
    pub resolve_type: Option<ResolveTypeFn>,
    pub(crate) types: MembersThunk,
}

impl fmt::Debug for UnionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionDefinition")
            .field("target", &self.target)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}
