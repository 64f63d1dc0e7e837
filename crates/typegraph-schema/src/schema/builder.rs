//! Assembly of the executable schema.
//!
//! [`SchemaFactory`] runs the generator and converts the built definitions
//! into `async_graphql` dynamic types. Only types reachable from the root
//! operation types, orphaned references and their implementers are
//! registered; abstract types never are.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Interface,
    InterfaceField, Object, ResolverContext, Scalar, Schema, SchemaBuilder, Subscription,
    SubscriptionField, SubscriptionFieldFuture, Union,
};
use async_graphql::{Name, Value};
use futures_util::{future, stream};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use super::definitions::{
    EnumDefinition, FieldDefinition, FieldMap, InputTypeDefinition, InputValueDefinition,
    InterfaceDefinition, ObjectTypeDefinition, TypeLink, UnionDefinition,
};
use super::generator::TypeDefinitionsGenerator;
use super::storage::TypeDefinitionsStorage;
use super::type_ref::TypeReference;
use crate::config::BuildSchemaOptions;
use crate::error::SchemaBuildError;
use crate::metadata::{ResolveTypeFn, TypeHandle, TypeMetadataStorage};
use crate::middleware::{ExecutionContext, FieldContext, FieldInfo, FieldResolver};

const BUILT_IN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Result of a schema build.
pub struct BuiltSchema {
    /// Executable schema.
    pub schema: Schema,
    /// Every built type definition, queryable by handle.
    pub definitions: Arc<TypeDefinitionsStorage>,
    /// Handles discovered through field thunks before they were built.
    pub orphans: Vec<TypeHandle>,
    /// Metadata version the schema was built from.
    pub metadata_version: u64,
}

impl std::fmt::Debug for BuiltSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltSchema")
            .field("types", &self.definitions.len())
            .field("orphans", &self.orphans)
            .field("metadata_version", &self.metadata_version)
            .finish_non_exhaustive()
    }
}

/// Builds executable schemas from registered metadata.
///
/// # Example
///
/// ```ignore
/// let factory = SchemaFactory::new(BuildSchemaOptions::default());
/// let built = factory.build(TypeMetadataStorage::global())?;
/// let response = built.schema.execute("{ recipes { title } }").await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaFactory {
    options: BuildSchemaOptions,
}

impl SchemaFactory {
    #[must_use]
    pub fn new(options: BuildSchemaOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildSchemaOptions {
        &self.options
    }

    /// Generates all type definitions from `metadata` and assembles them.
    ///
    /// # Errors
    ///
    /// Returns any generation error, [`SchemaBuildError::MissingQueryRoot`]
    /// when the query root is not an object type, and
    /// [`SchemaBuildError::Engine`] when `async_graphql` rejects the result.
    pub fn build(&self, metadata: &TypeMetadataStorage) -> Result<BuiltSchema, SchemaBuildError> {
        debug!("Starting GraphQL schema build");
        self.options.validate()?;

        let metadata_version = metadata.version();
        let mut generator = TypeDefinitionsGenerator::new();
        generator.generate(metadata, &self.options)?;
        let (storage, orphans) = generator.into_parts();

        let roots = self.resolve_roots(&storage)?;
        let index = TypeIndex::new(&storage)?;

        let mut seeds: Vec<&str> = roots.names().collect();
        for handle in orphans.get_all().chain(self.options.orphaned_types.iter()) {
            match index.name_of(handle) {
                Some(name) => seeds.push(name),
                None => debug!(handle = %handle, "Orphaned type is not a built type, skipping"),
            }
        }
        let reachable = index.reachable(seeds)?;

        let mut builder = Schema::build(
            roots.query.as_str(),
            roots.mutation.as_deref(),
            roots.subscription.as_deref(),
        );
        builder = self.register_types(builder, &index, &reachable, &roots)?;

        builder = builder
            .limit_depth(self.options.max_depth)
            .limit_complexity(self.options.max_complexity);
        if !self.options.introspection {
            builder = builder.disable_introspection();
        }

        let schema = builder
            .finish()
            .map_err(|e| SchemaBuildError::Engine(e.to_string()))?;

        debug!(
            types = reachable.types.len(),
            scalars = reachable.scalars.len(),
            "GraphQL schema build complete"
        );
        let orphans = orphans.get_all().cloned().collect();
        Ok(BuiltSchema {
            schema,
            definitions: Arc::new(storage),
            orphans,
            metadata_version,
        })
    }

    fn resolve_roots(&self, storage: &TypeDefinitionsStorage) -> Result<Roots, SchemaBuildError> {
        let root_name = |handle: &TypeHandle| {
            storage
                .get_object_type_by_target(handle)
                .filter(|def| !def.is_abstract)
                .map(|def| def.ty.name.clone())
        };
        let optional_root = |handle: &Option<TypeHandle>, kind: &str| {
            handle
                .as_ref()
                .map(|handle| {
                    root_name(handle).ok_or_else(|| {
                        SchemaBuildError::InvalidOptions(format!(
                            "{kind} root type \"{handle}\" is not a registered object type"
                        ))
                    })
                })
                .transpose()
        };

        Ok(Roots {
            query: root_name(&self.options.query)
                .ok_or_else(|| SchemaBuildError::MissingQueryRoot(self.options.query.clone()))?,
            mutation: optional_root(&self.options.mutation, "mutation")?,
            subscription: optional_root(&self.options.subscription, "subscription")?,
        })
    }

    fn register_types(
        &self,
        mut builder: SchemaBuilder,
        index: &TypeIndex<'_>,
        reachable: &Reachable<'_>,
        roots: &Roots,
    ) -> Result<SchemaBuilder, SchemaBuildError> {
        for name in &reachable.types {
            let Some(entry) = index.entries.get(name) else {
                continue;
            };
            trace!(type_name = %name, "Registering type");
            builder = match entry {
                Entry::Object(def) if roots.subscription.as_deref() == Some(*name) => {
                    builder.register(subscription_type(def, index)?)
                }
                Entry::Object(def) => builder.register(object_type(def, index)?),
                Entry::Interface(def) => builder.register(interface_type(def)?),
                Entry::Input(def) => builder.register(input_object_type(def)?),
                Entry::Enum(def) => builder.register(enum_type(def)),
                Entry::Union(def) => builder.register(union_type(def)?),
            };
        }

        for name in &reachable.scalars {
            builder = builder.register(scalar_type(name));
        }
        Ok(builder)
    }
}

struct Roots {
    query: String,
    mutation: Option<String>,
    subscription: Option<String>,
}

impl Roots {
    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.query.as_str())
            .chain(self.mutation.as_deref())
            .chain(self.subscription.as_deref())
    }
}

#[derive(Clone, Copy)]
enum Entry<'a> {
    Object(&'a ObjectTypeDefinition),
    Interface(&'a InterfaceDefinition),
    Input(&'a InputTypeDefinition),
    Enum(&'a EnumDefinition),
    Union(&'a UnionDefinition),
}

/// Registrable types by schema name.
struct TypeIndex<'a> {
    entries: IndexMap<&'a str, Entry<'a>>,
    names: HashMap<&'a TypeHandle, &'a str>,
    /// Interface name to the names of the types implementing it.
    implementers: HashMap<&'a str, Vec<&'a str>>,
    /// Concrete object names by handle, for resolving abstract values.
    object_names: Arc<HashMap<TypeHandle, String>>,
}

impl<'a> TypeIndex<'a> {
    fn new(storage: &'a TypeDefinitionsStorage) -> Result<Self, SchemaBuildError> {
        let mut index = Self {
            entries: IndexMap::new(),
            names: HashMap::new(),
            implementers: HashMap::new(),
            object_names: Arc::default(),
        };

        for def in storage.get_all_enum_definitions() {
            index.insert(&def.target, &def.ty.name, Entry::Enum(def));
        }
        for def in storage.get_all_union_definitions() {
            index.insert(&def.target, &def.ty.name, Entry::Union(def));
        }
        for def in storage.get_all_interface_definitions() {
            index.insert(&def.target, &def.ty.name, Entry::Interface(def));
            for link in def.ty.interfaces()? {
                index.add_implementer(&link.name, &def.ty.name);
            }
        }
        let mut object_names = HashMap::new();
        for def in storage.get_all_object_type_definitions() {
            if def.is_abstract {
                continue;
            }
            index.insert(&def.target, &def.ty.name, Entry::Object(def));
            object_names.insert(def.target.clone(), def.ty.name.clone());
            for link in def.ty.interfaces()? {
                index.add_implementer(&link.name, &def.ty.name);
            }
        }
        for def in storage.get_all_input_type_definitions() {
            if !def.is_abstract {
                index.insert(&def.target, &def.ty.name, Entry::Input(def));
            }
        }

        index.object_names = Arc::new(object_names);
        Ok(index)
    }

    fn insert(&mut self, handle: &'a TypeHandle, name: &'a str, entry: Entry<'a>) {
        self.entries.insert(name, entry);
        self.names.insert(handle, name);
    }

    fn add_implementer(&mut self, interface: &'a str, implementer: &'a str) {
        self.implementers.entry(interface).or_default().push(implementer);
    }

    fn name_of(&self, handle: &TypeHandle) -> Option<&'a str> {
        self.names.get(handle).copied()
    }

    /// Walks every type reachable from `seeds`.
    ///
    /// Interfaces pull in their implementers so abstract results always have
    /// a registered concrete type.
    fn reachable(&self, seeds: Vec<&'a str>) -> Result<Reachable<'a>, SchemaBuildError> {
        let mut reachable = Reachable::default();
        let mut queue: VecDeque<&'a str> = seeds.into();

        while let Some(name) = queue.pop_front() {
            let Some(entry) = self.entries.get(name) else {
                if !BUILT_IN_SCALARS.contains(&name) {
                    reachable.scalars.insert(name);
                }
                continue;
            };
            if !reachable.types.insert(name) {
                continue;
            }

            match *entry {
                Entry::Object(def) => {
                    queue_composite(&mut queue, def.ty.fields()?, def.ty.interfaces()?);
                }
                Entry::Interface(def) => {
                    queue_composite(&mut queue, def.ty.fields()?, def.ty.interfaces()?);
                    if let Some(implementers) = self.implementers.get(name) {
                        queue.extend(implementers.iter().copied());
                    }
                }
                Entry::Input(def) => {
                    queue.extend(def.ty.fields()?.values().map(|field| field.ty.named_type()));
                }
                Entry::Union(def) => {
                    queue.extend(def.ty.members()?.iter().map(|member| member.name.as_str()));
                }
                Entry::Enum(_) => {}
            }
        }
        Ok(reachable)
    }

    fn output_shape(&self, ty: &TypeReference) -> Arc<OutputShape> {
        let named = ty.named_type();
        let kind = match self.entries.get(named) {
            Some(Entry::Enum(_)) => NamedKind::Enum,
            Some(Entry::Object(_)) => NamedKind::Object,
            Some(Entry::Interface(def)) => NamedKind::Abstract(ConcreteTypeResolver {
                abstract_name: def.ty.name.clone(),
                hook: def.resolve_type.clone(),
                object_names: Arc::clone(&self.object_names),
            }),
            Some(Entry::Union(def)) => NamedKind::Abstract(ConcreteTypeResolver {
                abstract_name: def.ty.name.clone(),
                hook: def.resolve_type.clone(),
                object_names: Arc::clone(&self.object_names),
            }),
            Some(Entry::Input(_)) | None => NamedKind::Leaf,
        };
        Arc::new(OutputShape {
            ty: ty.clone(),
            kind,
        })
    }
}

fn queue_composite<'a>(
    queue: &mut VecDeque<&'a str>,
    fields: &'a FieldMap,
    interfaces: &'a [TypeLink],
) {
    for field in fields.values() {
        queue.push_back(field.ty.named_type());
        queue.extend(field.args.values().map(|arg| arg.ty.named_type()));
    }
    queue.extend(interfaces.iter().map(|link| link.name.as_str()));
}

#[derive(Default)]
struct Reachable<'a> {
    types: IndexSet<&'a str>,
    scalars: IndexSet<&'a str>,
}

/// Names the concrete object type of a value of an abstract type.
struct ConcreteTypeResolver {
    abstract_name: String,
    hook: Option<ResolveTypeFn>,
    object_names: Arc<HashMap<TypeHandle, String>>,
}

impl ConcreteTypeResolver {
    /// Uses the `resolve_type` hook when present, else the value's
    /// `__typename`.
    fn resolve(&self, value: &Value) -> async_graphql::Result<String> {
        let from_hook = self
            .hook
            .as_ref()
            .and_then(|hook| hook(value))
            .and_then(|handle| self.object_names.get(&handle).cloned());
        if let Some(name) = from_hook {
            return Ok(name);
        }

        if let Value::Object(map) = value
            && let Some(Value::String(name)) = map.get("__typename")
        {
            return Ok(name.clone());
        }

        Err(async_graphql::Error::new(format!(
            "Cannot resolve the concrete type of a value of abstract type \"{}\"",
            self.abstract_name
        )))
    }
}

enum NamedKind {
    Leaf,
    Enum,
    Object,
    Abstract(ConcreteTypeResolver),
}

/// Output type of a field, used to shape resolved values for the engine.
struct OutputShape {
    ty: TypeReference,
    kind: NamedKind,
}

impl OutputShape {
    fn to_field_value<'a>(&self, value: Value) -> async_graphql::Result<Option<FieldValue<'a>>> {
        self.convert(&self.ty, value)
    }

    fn convert<'a>(
        &self,
        ty: &TypeReference,
        value: Value,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        match ty {
            TypeReference::NonNull(inner) => self.convert(inner, value),
            _ if value == Value::Null => Ok(None),
            TypeReference::List(inner) => {
                let Value::List(items) = value else {
                    return Err(async_graphql::Error::new(format!(
                        "Expected a list value for type \"{ty}\""
                    )));
                };
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(
                        self.convert(inner, item)?
                            .unwrap_or_else(|| FieldValue::value(Value::Null)),
                    );
                }
                Ok(Some(FieldValue::list(values)))
            }
            TypeReference::Named(_) => self.named(value).map(Some),
        }
    }

    fn named<'a>(&self, value: Value) -> async_graphql::Result<FieldValue<'a>> {
        match &self.kind {
            NamedKind::Leaf | NamedKind::Object => Ok(FieldValue::value(value)),
            NamedKind::Enum => Ok(FieldValue::value(match value {
                Value::String(name) => Value::Enum(Name::new(name)),
                other => other,
            })),
            NamedKind::Abstract(resolver) => {
                let concrete = resolver.resolve(&value)?;
                Ok(FieldValue::value(value).with_type(concrete))
            }
        }
    }
}

/// Adapts the engine's resolver context into a [`FieldContext`].
fn field_context(ctx: &ResolverContext<'_>, info: Arc<FieldInfo>) -> FieldContext {
    let source = match ctx.parent_value.as_value() {
        Some(Value::Null) | None => Value::Object(Default::default()),
        Some(value) => value.clone(),
    };
    let args: IndexMap<String, Value> = ctx
        .args
        .iter()
        .map(|(name, value)| (name.to_string(), value.as_value().clone()))
        .collect();
    let context = ctx
        .data_opt::<ExecutionContext>()
        .cloned()
        .unwrap_or_default();

    FieldContext {
        source: Arc::new(source),
        args: Arc::new(args),
        context,
        info,
    }
}

struct FieldParts {
    resolver: FieldResolver,
    info: Arc<FieldInfo>,
    shape: Arc<OutputShape>,
}

fn field_parts(parent: &str, field: &FieldDefinition, index: &TypeIndex<'_>) -> FieldParts {
    FieldParts {
        resolver: field.resolver.clone(),
        info: Arc::new(FieldInfo::new(parent, &field.name, field.ty.to_string())),
        shape: index.output_shape(&field.ty),
    }
}

fn output_field(parent: &str, field: &FieldDefinition, index: &TypeIndex<'_>) -> Field {
    let FieldParts {
        resolver,
        info,
        shape,
    } = field_parts(parent, field, index);

    let mut dynamic = Field::new(field.name.as_str(), field.ty.to_type_ref(), move |ctx| {
        let resolver = resolver.clone();
        let info = Arc::clone(&info);
        let shape = Arc::clone(&shape);
        FieldFuture::new(async move {
            let value = resolver
                .resolve(field_context(&ctx, info))
                .await
                .map_err(|e| e.to_graphql_error())?;
            shape.to_field_value(value)
        })
    });

    if let Some(description) = &field.description {
        dynamic = dynamic.description(description);
    }
    if let Some(reason) = &field.deprecation_reason {
        dynamic = dynamic.deprecation(Some(reason.as_str()));
    }
    for arg in field.args.values() {
        dynamic = dynamic.argument(input_value(arg));
    }
    dynamic
}

fn subscription_field(parent: &str, field: &FieldDefinition, index: &TypeIndex<'_>) -> SubscriptionField {
    let FieldParts { resolver, info, .. } = field_parts(parent, field, index);

    let mut dynamic =
        SubscriptionField::new(field.name.as_str(), field.ty.to_type_ref(), move |ctx| {
            let resolver = resolver.clone();
            let info = Arc::clone(&info);
            SubscriptionFieldFuture::new(async move {
                let value = resolver
                    .resolve(field_context(&ctx, info))
                    .await
                    .map_err(|e| e.to_graphql_error())?;
                Ok(stream::once(future::ready(Ok::<_, async_graphql::Error>(value))))
            })
        });

    if let Some(description) = &field.description {
        dynamic = dynamic.description(description);
    }
    if let Some(reason) = &field.deprecation_reason {
        dynamic = dynamic.deprecation(Some(reason.as_str()));
    }
    for arg in field.args.values() {
        dynamic = dynamic.argument(input_value(arg));
    }
    dynamic
}

fn input_value(def: &InputValueDefinition) -> InputValue {
    let mut value = InputValue::new(def.name.as_str(), def.ty.to_type_ref());
    if let Some(description) = &def.description {
        value = value.description(description);
    }
    if let Some(default) = &def.default_value {
        value = value.default_value(default.clone());
    }
    value
}

fn object_type(def: &ObjectTypeDefinition, index: &TypeIndex<'_>) -> Result<Object, SchemaBuildError> {
    let mut object = Object::new(def.ty.name.as_str());
    if let Some(description) = &def.ty.description {
        object = object.description(description);
    }
    for link in def.ty.interfaces()? {
        object = object.implement(link.name.as_str());
    }
    for field in def.ty.fields()?.values() {
        object = object.field(output_field(&def.ty.name, field, index));
    }
    Ok(object)
}

fn subscription_type(
    def: &ObjectTypeDefinition,
    index: &TypeIndex<'_>,
) -> Result<Subscription, SchemaBuildError> {
    let mut subscription = Subscription::new(def.ty.name.as_str());
    if let Some(description) = &def.ty.description {
        subscription = subscription.description(description);
    }
    for field in def.ty.fields()?.values() {
        subscription = subscription.field(subscription_field(&def.ty.name, field, index));
    }
    Ok(subscription)
}

fn interface_type(def: &InterfaceDefinition) -> Result<Interface, SchemaBuildError> {
    let mut interface = Interface::new(def.ty.name.as_str());
    if let Some(description) = &def.ty.description {
        interface = interface.description(description);
    }
    for link in def.ty.interfaces()? {
        interface = interface.implement(link.name.as_str());
    }
    for field in def.ty.fields()?.values() {
        let mut dynamic = InterfaceField::new(field.name.as_str(), field.ty.to_type_ref());
        if let Some(description) = &field.description {
            dynamic = dynamic.description(description);
        }
        if let Some(reason) = &field.deprecation_reason {
            dynamic = dynamic.deprecation(Some(reason.as_str()));
        }
        for arg in field.args.values() {
            dynamic = dynamic.argument(input_value(arg));
        }
        interface = interface.field(dynamic);
    }
    Ok(interface)
}

fn input_object_type(def: &InputTypeDefinition) -> Result<InputObject, SchemaBuildError> {
    let mut input = InputObject::new(def.ty.name.as_str());
    if let Some(description) = &def.ty.description {
        input = input.description(description);
    }
    for field in def.ty.fields()?.values() {
        input = input.field(input_value(field));
    }
    Ok(input)
}

fn enum_type(def: &EnumDefinition) -> Enum {
    let mut dynamic = Enum::new(def.ty.name.as_str());
    if let Some(description) = &def.ty.description {
        dynamic = dynamic.description(description);
    }
    for value in &def.ty.values {
        let mut item = EnumItem::new(value.name.as_str());
        if let Some(description) = &value.description {
            item = item.description(description);
        }
        if let Some(reason) = &value.deprecation_reason {
            item = item.deprecation(Some(reason.as_str()));
        }
        dynamic = dynamic.item(item);
    }
    dynamic
}

fn union_type(def: &UnionDefinition) -> Result<Union, SchemaBuildError> {
    let mut union = Union::new(def.ty.name.as_str());
    if let Some(description) = &def.ty.description {
        union = union.description(description);
    }
    for member in def.ty.members()? {
        union = union.possible_type(member.name.as_str());
    }
    Ok(union)
}

fn scalar_type(name: &str) -> Scalar {
    let description = match name {
        "DateTime" => "A date-time string in ISO 8601 format",
        "Timestamp" => "A point in time as milliseconds since the Unix epoch",
        _ => "A custom scalar",
    };
    Scalar::new(name).description(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(pairs: &[(&str, Value)]) -> Value {
        Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (Name::new(k), v.clone()))
                .collect(),
        )
    }

    fn resolver(hook: Option<ResolveTypeFn>) -> ConcreteTypeResolver {
        let mut names = HashMap::new();
        names.insert(TypeHandle::new("Recipe"), "RecipeType".to_string());
        ConcreteTypeResolver {
            abstract_name: "IRecipe".to_string(),
            hook,
            object_names: Arc::new(names),
        }
    }

    #[test]
    fn test_concrete_type_from_hook() {
        let hook: ResolveTypeFn = Arc::new(|_| Some(TypeHandle::new("Recipe")));
        let name = resolver(Some(hook)).resolve(&object(&[])).unwrap();
        assert_eq!(name, "RecipeType");
    }

    #[test]
    fn test_concrete_type_from_typename() {
        let value = object(&[("__typename", Value::from("Ingredient"))]);
        assert_eq!(resolver(None).resolve(&value).unwrap(), "Ingredient");
    }

    #[test]
    fn test_unresolvable_concrete_type() {
        let err = resolver(None).resolve(&object(&[])).unwrap_err();
        assert!(err.message.contains("IRecipe"));
    }

    #[test]
    fn test_list_shape_requires_list() {
        let shape = OutputShape {
            ty: TypeReference::named("String").non_null().list(),
            kind: NamedKind::Leaf,
        };
        assert!(shape.to_field_value(Value::from("x")).is_err());
        assert!(shape.to_field_value(Value::Null).unwrap().is_none());
        assert!(
            shape
                .to_field_value(Value::List(vec![Value::from("a")]))
                .unwrap()
                .is_some()
        );
    }
}
