//! Declarative descriptors registered by declaration sites.

use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use indexmap::IndexMap;

use super::handle::{Nullability, TypeHandle, TypeOptions, TypeThunk};
use crate::error::ResolveError;
use crate::middleware::{FieldContext, FieldMiddleware};

/// Free-form extension values attached to types and fields.
pub type Extensions = IndexMap<String, Value>;

/// Picks the concrete object type for a value of an abstract type.
pub type ResolveTypeFn = Arc<dyn Fn(&Value) -> Option<TypeHandle> + Send + Sync>;

/// Resolver computing a field from its invocation context instead of reading
/// a property of the source object.
pub type ComputeFn = Arc<dyn Fn(&FieldContext) -> Result<Value, ResolveError> + Send + Sync>;

/// Lazily evaluated list of union members.
pub type MembersThunk = Arc<dyn Fn() -> Vec<TypeHandle> + Send + Sync>;

/// Raw SDL of one directive, e.g. `@key(fields: "id")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMetadata {
    pub sdl: String,
}

impl DirectiveMetadata {
    pub fn new(sdl: impl Into<String>) -> Self {
        Self { sdl: sdl.into() }
    }
}

/// One argument of a field.
#[derive(Debug, Clone)]
pub struct ArgMetadata {
    pub name: String,
    pub type_fn: TypeThunk,
    pub options: TypeOptions,
    pub description: Option<String>,
}

impl ArgMetadata {
    pub fn new(name: impl Into<String>, type_fn: impl Into<TypeThunk>) -> Self {
        Self {
            name: name.into(),
            type_fn: type_fn.into(),
            options: TypeOptions::default(),
            description: None,
        }
    }

    pub fn nullable(self) -> Self {
        self.nullability(Nullability::Nullable)
    }

    pub fn nullability(mut self, nullable: Nullability) -> Self {
        self.options.nullable = nullable;
        self
    }

    pub fn list(mut self) -> Self {
        self.options.list_depth += 1;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.options.default_value = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Source of a field's arguments.
#[derive(Debug, Clone)]
pub enum MethodArg {
    /// A single named argument.
    Single(ArgMetadata),
    /// Every property of a registered args type becomes an argument.
    Flatten(TypeHandle),
}

/// One declared field.
#[derive(Clone)]
pub struct PropertyMetadata {
    /// Property name on the source object.
    pub name: String,
    /// Field name exposed in the schema.
    pub schema_name: String,
    pub type_fn: TypeThunk,
    pub options: TypeOptions,
    pub args: Vec<MethodArg>,
    pub middleware: Vec<Arc<dyn FieldMiddleware>>,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub complexity: Option<usize>,
    pub directives: Vec<DirectiveMetadata>,
    pub extensions: Extensions,
    pub compute: Option<ComputeFn>,
}

impl PropertyMetadata {
    pub fn new(name: impl Into<String>, type_fn: impl Into<TypeThunk>) -> Self {
        let name = name.into();
        Self {
            schema_name: name.clone(),
            name,
            type_fn: type_fn.into(),
            options: TypeOptions::default(),
            args: Vec::new(),
            middleware: Vec::new(),
            description: None,
            deprecation_reason: None,
            complexity: None,
            directives: Vec::new(),
            extensions: Extensions::new(),
            compute: None,
        }
    }

    /// Exposes the property under a different field name.
    pub fn schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = schema_name.into();
        self
    }

    pub fn nullable(self) -> Self {
        self.nullability(Nullability::Nullable)
    }

    pub fn nullability(mut self, nullable: Nullability) -> Self {
        self.options.nullable = nullable;
        self
    }

    /// Wraps the type in one more list level.
    pub fn list(mut self) -> Self {
        self.options.list_depth += 1;
        self
    }

    /// Value returned when the source object lacks the property.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.options.default_value = Some(value.into());
        self
    }

    pub fn arg(mut self, arg: ArgMetadata) -> Self {
        self.args.push(MethodArg::Single(arg));
        self
    }

    pub fn args_type(mut self, handle: impl Into<TypeHandle>) -> Self {
        self.args.push(MethodArg::Flatten(handle.into()));
        self
    }

    /// Appends a middleware to the field's chain.
    pub fn use_middleware(mut self, middleware: impl FieldMiddleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn use_shared_middleware(mut self, middleware: Arc<dyn FieldMiddleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecation_reason(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    pub fn complexity(mut self, complexity: usize) -> Self {
        self.complexity = Some(complexity);
        self
    }

    pub fn directive(mut self, sdl: impl Into<String>) -> Self {
        self.directives.push(DirectiveMetadata::new(sdl));
        self
    }

    pub fn extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Computes the field instead of reading a property of the source object.
    pub fn computed(
        mut self,
        f: impl Fn(&FieldContext) -> Result<Value, ResolveError> + Send + Sync + 'static,
    ) -> Self {
        self.compute = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for PropertyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("name", &self.name)
            .field("schema_name", &self.schema_name)
            .field("options", &self.options)
            .field("args", &self.args)
            .field("middleware", &self.middleware.len())
            .field("computed", &self.compute.is_some())
            .finish_non_exhaustive()
    }
}

/// Descriptor of an object type, interface, input type or args type.
#[derive(Clone)]
pub struct ClassMetadata {
    pub target: TypeHandle,
    pub name: String,
    pub description: Option<String>,
    pub properties: Vec<PropertyMetadata>,
    pub interfaces: Vec<TypeHandle>,
    /// Declared parent type.
    pub extends: Option<TypeHandle>,
    /// Abstract types lend their fields to subtypes but stay out of the schema.
    pub is_abstract: bool,
    pub directives: Vec<DirectiveMetadata>,
    pub extensions: Extensions,
    pub resolve_type: Option<ResolveTypeFn>,
}

impl ClassMetadata {
    /// Creates a descriptor whose schema name equals the handle key.
    pub fn new(target: impl Into<TypeHandle>) -> Self {
        let target = target.into();
        Self {
            name: target.as_str().to_string(),
            target,
            description: None,
            properties: Vec::new(),
            interfaces: Vec::new(),
            extends: None,
            is_abstract: false,
            directives: Vec::new(),
            extensions: Extensions::new(),
            resolve_type: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, property: PropertyMetadata) -> Self {
        self.properties.push(property);
        self
    }

    pub fn implements(mut self, interface: impl Into<TypeHandle>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn extends(mut self, parent: impl Into<TypeHandle>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn directive(mut self, sdl: impl Into<String>) -> Self {
        self.directives.push(DirectiveMetadata::new(sdl));
        self
    }

    pub fn extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    pub fn resolve_type(
        mut self,
        f: impl Fn(&Value) -> Option<TypeHandle> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for ClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMetadata")
            .field("target", &self.target)
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("interfaces", &self.interfaces)
            .field("extends", &self.extends)
            .field("is_abstract", &self.is_abstract)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueMetadata {
    pub name: String,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

impl EnumValueMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation_reason: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecation_reason(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct EnumMetadata {
    pub target: TypeHandle,
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValueMetadata>,
}

impl EnumMetadata {
    pub fn new(target: impl Into<TypeHandle>) -> Self {
        let target = target.into();
        Self {
            name: target.as_str().to_string(),
            target,
            description: None,
            values: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn value(mut self, value: impl Into<EnumValueMetadata>) -> Self {
        self.values.push(value.into());
        self
    }
}

impl From<&str> for EnumValueMetadata {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Clone)]
pub struct UnionMetadata {
    pub target: TypeHandle,
    pub name: String,
    pub description: Option<String>,
    pub types: MembersThunk,
    pub resolve_type: Option<ResolveTypeFn>,
}

impl UnionMetadata {
    pub fn new(target: impl Into<TypeHandle>, types: impl Fn() -> Vec<TypeHandle> + Send + Sync + 'static) -> Self {
        let target = target.into();
        Self {
            name: target.as_str().to_string(),
            target,
            description: None,
            types: Arc::new(types),
            resolve_type: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn resolve_type(
        mut self,
        f: impl Fn(&Value) -> Option<TypeHandle> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for UnionMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionMetadata")
            .field("target", &self.target)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
