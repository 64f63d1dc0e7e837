//! Executing queries against assembled schemas.

use std::sync::Arc;

use async_graphql::{Request, Value};
use futures_util::StreamExt;
use parking_lot::Mutex;
use serde_json::json;
use typegraph_schema::{
    ArgMetadata, BuildSchemaOptions, BuiltSchema, ClassMetadata, DateScalarMode, EnumMetadata,
    ExecutionContext, FieldContext, FieldMiddleware, Next, PropertyMetadata, ResolveError, ScalarKind,
    SchemaBuildError, SchemaFactory, TypeHandle, TypeMetadataStorage, UnionMetadata,
    middleware_fn,
};

fn value(json: serde_json::Value) -> Value {
    Value::from_json(json).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn build(metadata: &TypeMetadataStorage) -> BuiltSchema {
    init_tracing();
    SchemaFactory::default().build(metadata).unwrap()
}

async fn execute(built: &BuiltSchema, request: impl Into<Request>) -> serde_json::Value {
    let response = built.schema.execute(request).await;
    assert!(response.errors.is_empty(), "errors: {:?}", response.errors);
    response.data.into_json().unwrap()
}

fn register_recipes(metadata: &TypeMetadataStorage) {
    metadata.register_interface(
        ClassMetadata::new("IRecipe")
            .field(PropertyMetadata::new("id", ScalarKind::Id))
            .field(PropertyMetadata::new("title", ScalarKind::String)),
    );
    metadata.register_object_type(
        ClassMetadata::new("Recipe")
            .implements("IRecipe")
            .field(PropertyMetadata::new("description", ScalarKind::String).nullable())
            .field(PropertyMetadata::new("difficulty", "Difficulty"))
            .field(
                PropertyMetadata::new("summary", ScalarKind::String).computed(|ctx: &FieldContext| {
                    let title = match ctx.source.as_ref() {
                        Value::Object(map) => map.get("title").cloned(),
                        _ => None,
                    };
                    match title {
                        Some(Value::String(title)) => Ok(Value::from(format!("{title}!"))),
                        _ => Err(ResolveError::middleware("recipe has no title")),
                    }
                }),
            ),
    );
    metadata.register_object_type(
        ClassMetadata::new("Ingredient")
            .field(PropertyMetadata::new("name", ScalarKind::String))
            .field(PropertyMetadata::new("amount", ScalarKind::Float)),
    );
    metadata.register_enum(EnumMetadata::new("Difficulty").value("EASY").value("HARD"));
}

fn sample_recipes() -> Value {
    value(json!([
        { "id": "1", "title": "Pancakes", "difficulty": "EASY" },
        { "id": "2", "title": "Souffle", "description": "Tricky", "difficulty": "HARD" }
    ]))
}

#[tokio::test]
async fn test_query_objects_and_enums() {
    let metadata = TypeMetadataStorage::new();
    register_recipes(&metadata);
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("recipes", "Recipe")
                .list()
                .computed(|_| Ok(sample_recipes())),
        ),
    );
    let built = build(&metadata);

    let data = execute(&built, "{ recipes { id title description difficulty summary } }").await;
    assert_eq!(
        data,
        json!({
            "recipes": [
                {
                    "id": "1",
                    "title": "Pancakes",
                    "description": null,
                    "difficulty": "EASY",
                    "summary": "Pancakes!"
                },
                {
                    "id": "2",
                    "title": "Souffle",
                    "description": "Tricky",
                    "difficulty": "HARD",
                    "summary": "Souffle!"
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_missing_property_uses_default_value() {
    let metadata = TypeMetadataStorage::new();
    metadata.register_object_type(
        ClassMetadata::new("Query")
            .field(PropertyMetadata::new("motd", ScalarKind::String).default_value("N/A"))
            .field(PropertyMetadata::new("banner", ScalarKind::String).nullable()),
    );
    let built = build(&metadata);

    let data = execute(&built, "{ motd banner }").await;
    assert_eq!(data, json!({ "motd": "N/A", "banner": null }));
}

#[tokio::test]
async fn test_interface_values_resolve_concrete_type() {
    let metadata = TypeMetadataStorage::new();
    metadata.register_interface(
        ClassMetadata::new("IRecipe")
            .field(PropertyMetadata::new("title", ScalarKind::String))
            .resolve_type(|value| match value {
                Value::Object(map) if map.contains_key("minutes") => {
                    Some(TypeHandle::new("QuickRecipe"))
                }
                _ => Some(TypeHandle::new("Recipe")),
            }),
    );
    metadata.register_object_type(ClassMetadata::new("Recipe").implements("IRecipe"));
    metadata.register_object_type(
        ClassMetadata::new("QuickRecipe")
            .implements("IRecipe")
            .field(PropertyMetadata::new("minutes", ScalarKind::Int)),
    );
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("recipes", "IRecipe").list().computed(|_| {
                Ok(value(json!([
                    { "title": "Stew" },
                    { "title": "Toast", "minutes": 3 }
                ])))
            }),
        ),
    );
    let built = build(&metadata);

    let data = execute(
        &built,
        "{ recipes { __typename title ... on QuickRecipe { minutes } } }",
    )
    .await;
    assert_eq!(
        data,
        json!({
            "recipes": [
                { "__typename": "Recipe", "title": "Stew" },
                { "__typename": "QuickRecipe", "title": "Toast", "minutes": 3 }
            ]
        })
    );
}

#[tokio::test]
async fn test_union_values_resolve_by_typename() {
    let metadata = TypeMetadataStorage::new();
    register_recipes(&metadata);
    metadata.register_union(UnionMetadata::new("SearchResult", || {
        vec![TypeHandle::new("Recipe"), TypeHandle::new("Ingredient")]
    }));
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("search", "SearchResult")
                .list()
                .arg(ArgMetadata::new("phrase", ScalarKind::String))
                .computed(|ctx| {
                    let phrase = ctx.args.get("phrase").cloned().unwrap_or(Value::Null);
                    Ok(value(json!([
                        { "__typename": "Ingredient", "name": phrase.into_json().unwrap(), "amount": 1.5 },
                        { "__typename": "Recipe", "id": "1", "title": "Pancakes", "difficulty": "EASY" }
                    ])))
                }),
        ),
    );
    let built = build(&metadata);

    let query = r#"{
        search(phrase: "egg") {
            ... on Ingredient { name amount }
            ... on Recipe { title }
        }
    }"#;
    let data = execute(&built, query).await;
    assert_eq!(
        data,
        json!({ "search": [{ "name": "egg", "amount": 1.5 }, { "title": "Pancakes" }] })
    );
}

#[tokio::test]
async fn test_unresolvable_abstract_value_is_field_error() {
    let metadata = TypeMetadataStorage::new();
    register_recipes(&metadata);
    metadata.register_union(UnionMetadata::new("SearchResult", || {
        vec![TypeHandle::new("Recipe"), TypeHandle::new("Ingredient")]
    }));
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("lucky", "SearchResult")
                .nullable()
                .computed(|_| Ok(value(json!({ "name": "salt" })))),
        ),
    );
    let built = build(&metadata);

    let response = built
        .schema
        .execute("{ lucky { ... on Ingredient { name } } }")
        .await;
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].message.contains("SearchResult"));
}

#[tokio::test]
async fn test_input_type_arguments() {
    let metadata = TypeMetadataStorage::new();
    register_recipes(&metadata);
    metadata.register_input_type(
        ClassMetadata::new("RecipeInput")
            .field(PropertyMetadata::new("title", ScalarKind::String))
            .field(PropertyMetadata::new("difficulty", "Difficulty")),
    );
    metadata.register_object_type(
        ClassMetadata::new("Query").field(PropertyMetadata::new("ping", ScalarKind::Boolean).default_value(true)),
    );
    metadata.register_object_type(
        ClassMetadata::new("Mutation").field(
            PropertyMetadata::new("addRecipe", "Recipe")
                .arg(ArgMetadata::new("input", "RecipeInput"))
                .computed(|ctx| {
                    let Some(Value::Object(input)) = ctx.args.get("input") else {
                        return Err(ResolveError::middleware("input is required"));
                    };
                    let mut recipe = input.clone();
                    recipe.insert(async_graphql::Name::new("id"), Value::from("42"));
                    Ok(Value::Object(recipe))
                }),
        ),
    );
    let factory = SchemaFactory::new(BuildSchemaOptions::default().with_mutation("Mutation"));
    let built = factory.build(&metadata).unwrap();

    let data = execute(
        &built,
        r#"mutation { addRecipe(input: { title: "Curry", difficulty: HARD }) { id title difficulty } }"#,
    )
    .await;
    assert_eq!(
        data,
        json!({ "addRecipe": { "id": "42", "title": "Curry", "difficulty": "HARD" } })
    );
}

fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &'static str) -> impl FieldMiddleware + 'static {
    let log = Arc::clone(log);
    middleware_fn(move |_ctx: FieldContext, next: Next| {
        let log = Arc::clone(&log);
        async move {
            log.lock().push(format!("{label}:before"));
            next.run().await?;
            log.lock().push(format!("{label}:after"));
            Ok::<_, ResolveError>(None)
        }
    })
}

#[tokio::test]
async fn test_middleware_runs_in_declaration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let base_log = Arc::clone(&log);

    let metadata = TypeMetadataStorage::new();
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("greeting", ScalarKind::String)
                .use_middleware(recorder(&log, "m1"))
                .use_middleware(recorder(&log, "m2"))
                .computed(move |_| {
                    base_log.lock().push("resolver".to_string());
                    Ok(Value::from("hello"))
                }),
        ),
    );
    let built = build(&metadata);

    let data = execute(&built, "{ greeting }").await;
    assert_eq!(data, json!({ "greeting": "hello" }));
    assert_eq!(
        *log.lock(),
        ["m1:before", "m2:before", "resolver", "m2:after", "m1:after"]
    );
}

#[tokio::test]
async fn test_middleware_short_circuit_skips_rest_of_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let base_log = Arc::clone(&log);

    let metadata = TypeMetadataStorage::new();
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("secret", ScalarKind::String)
                .nullable()
                .use_middleware(middleware_fn(|_ctx, _next| async {
                    Ok::<_, ResolveError>(Some(Value::from("redacted")))
                }))
                .use_middleware(recorder(&log, "m2"))
                .computed(move |_| {
                    base_log.lock().push("resolver".to_string());
                    Ok(Value::from("classified"))
                }),
        ),
    );
    let built = build(&metadata);

    let data = execute(&built, "{ secret }").await;
    assert_eq!(data, json!({ "secret": "redacted" }));
    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn test_next_called_twice_is_reported() {
    let metadata = TypeMetadataStorage::new();
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("greeting", ScalarKind::String)
                .nullable()
                .use_middleware(middleware_fn(|_ctx, next: Next| async move {
                    next.run().await?;
                    next.run().await?;
                    Ok::<_, ResolveError>(None)
                }))
                .default_value("hello"),
        ),
    );
    let built = build(&metadata);

    let response = built.schema.execute("{ greeting }").await;
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "next() called multiple times");
    let code = response.errors[0]
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .cloned();
    assert_eq!(code, Some(Value::from("NEXT_CALLED_MULTIPLE_TIMES")));
}

#[derive(Debug)]
struct Viewer {
    name: String,
}

#[tokio::test]
async fn test_middleware_reads_execution_context() {
    let metadata = TypeMetadataStorage::new();
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("me", ScalarKind::String)
                .nullable()
                .use_middleware(middleware_fn(|ctx: FieldContext, _next| async move {
                    let viewer = ctx.context.get::<Viewer>().map(|v| v.name.clone());
                    Ok::<_, ResolveError>(Some(viewer.map(Value::from).unwrap_or(Value::Null)))
                })),
        ),
    );
    let built = build(&metadata);

    let request = Request::new("{ me }").data(ExecutionContext::new(Viewer {
        name: "alice".to_string(),
    }));
    assert_eq!(execute(&built, request).await, json!({ "me": "alice" }));
    assert_eq!(execute(&built, "{ me }").await, json!({ "me": null }));
}

#[tokio::test]
async fn test_orphaned_types_are_registered() {
    let metadata = TypeMetadataStorage::new();
    metadata.register_interface(
        ClassMetadata::new("INamed").field(PropertyMetadata::new("name", ScalarKind::String)),
    );
    metadata.register_object_type(ClassMetadata::new("Chef").implements("INamed"));
    metadata.register_object_type(
        ClassMetadata::new("Unused").field(PropertyMetadata::new("id", ScalarKind::Id)),
    );
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("someone", "INamed")
                .computed(|_| Ok(value(json!({ "__typename": "Chef", "name": "Remy" })))),
        ),
    );

    let built = build(&metadata);
    let sdl = built.schema.sdl();
    assert!(sdl.contains("type Chef"));
    assert!(sdl.contains("interface INamed"));
    assert!(!sdl.contains("type Unused"));

    let factory = SchemaFactory::new(BuildSchemaOptions::default().with_orphaned_type("Unused"));
    let sdl = factory.build(&metadata).unwrap().schema.sdl();
    assert!(sdl.contains("type Unused"));

    let data = execute(&built, "{ someone { __typename name } }").await;
    assert_eq!(data, json!({ "someone": { "__typename": "Chef", "name": "Remy" } }));
}

#[tokio::test]
async fn test_abstract_types_stay_out_of_schema() {
    let metadata = TypeMetadataStorage::new();
    metadata.register_object_type(
        ClassMetadata::new("Entity")
            .abstract_type()
            .field(PropertyMetadata::new("id", ScalarKind::Id)),
    );
    metadata.register_object_type(
        ClassMetadata::new("Recipe")
            .extends("Entity")
            .field(PropertyMetadata::new("title", ScalarKind::String)),
    );
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("recipe", "Recipe")
                .computed(|_| Ok(value(json!({ "id": "7", "title": "Soup" })))),
        ),
    );
    let built = build(&metadata);

    assert!(!built.schema.sdl().contains("type Entity"));
    let data = execute(&built, "{ recipe { id title } }").await;
    assert_eq!(data, json!({ "recipe": { "id": "7", "title": "Soup" } }));
}

#[tokio::test]
async fn test_date_scalar_modes() {
    let metadata = TypeMetadataStorage::new();
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("now", ScalarKind::Date)
                .computed(|_| Ok(Value::from("2024-05-01T12:00:00Z"))),
        ),
    );

    let built = build(&metadata);
    assert!(built.schema.sdl().contains("scalar DateTime"));
    assert_eq!(
        execute(&built, "{ now }").await,
        json!({ "now": "2024-05-01T12:00:00Z" })
    );

    let factory = SchemaFactory::new(
        BuildSchemaOptions::default().with_date_scalar_mode(DateScalarMode::Timestamp),
    );
    let sdl = factory.build(&metadata).unwrap().schema.sdl();
    assert!(sdl.contains("scalar Timestamp"));
    assert!(!sdl.contains("scalar DateTime"));
}

#[tokio::test]
async fn test_subscription_root_emits_resolved_value() {
    let metadata = TypeMetadataStorage::new();
    metadata.register_object_type(
        ClassMetadata::new("Query").field(PropertyMetadata::new("ping", ScalarKind::Boolean).default_value(true)),
    );
    metadata.register_object_type(
        ClassMetadata::new("Subscription").field(
            PropertyMetadata::new("recipeAdded", ScalarKind::String)
                .computed(|_| Ok(Value::from("Pancakes"))),
        ),
    );
    let factory =
        SchemaFactory::new(BuildSchemaOptions::default().with_subscription("Subscription"));
    let built = factory.build(&metadata).unwrap();

    let mut stream = Box::pin(built.schema.execute_stream("subscription { recipeAdded }"));
    let response = stream.next().await.unwrap();
    assert!(response.errors.is_empty(), "errors: {:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "recipeAdded": "Pancakes" })
    );
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_depth_limit_and_introspection_options() {
    let metadata = TypeMetadataStorage::new();
    register_recipes(&metadata);
    metadata.register_object_type(
        ClassMetadata::new("Query").field(
            PropertyMetadata::new("recipes", "Recipe")
                .list()
                .computed(|_| Ok(sample_recipes())),
        ),
    );

    let mut options = BuildSchemaOptions::default().with_introspection(false);
    options.max_depth = 1;
    let built = SchemaFactory::new(options).build(&metadata).unwrap();

    let response = built.schema.execute("{ recipes { title } }").await;
    assert!(!response.errors.is_empty());

    let response = built.schema.execute("{ __schema { queryType { name } } }").await;
    assert!(!response.errors.is_empty());
}

#[test]
fn test_missing_query_root_is_rejected() {
    let metadata = TypeMetadataStorage::new();
    register_recipes(&metadata);

    let err = SchemaFactory::default().build(&metadata).unwrap_err();
    assert!(matches!(err, SchemaBuildError::MissingQueryRoot(handle) if handle == TypeHandle::new("Query")));
}

#[test]
fn test_options_from_toml() {
    let metadata = TypeMetadataStorage::new();
    metadata.register_object_type(
        ClassMetadata::new("RootQuery").field(PropertyMetadata::new("ping", ScalarKind::Boolean).default_value(true)),
    );

    let options = BuildSchemaOptions::from_toml_str(
        r#"
        query = "RootQuery"
        max_depth = 5
        "#,
    )
    .unwrap();
    let built = SchemaFactory::new(options).build(&metadata).unwrap();
    assert!(built.schema.sdl().contains("type RootQuery"));
}
