//! Field middleware.
//!
//! A middleware intercepts the resolution of one field. It receives the
//! [`FieldContext`] of the invocation and a [`Next`] continuation; it may run
//! code before and after the rest of the chain, replace its result, or skip
//! it entirely.
//!
//! ## Result precedence
//!
//! - `Ok(None)`: the middleware defers; the chain yields whatever `next`
//!   produced (or `null` when `next` was never called).
//! - `Ok(Some(value))`: `value` wins, including an explicit `Value::Null`.

mod chain;
mod storage;

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use async_graphql::Value;
use async_trait::async_trait;
use indexmap::IndexMap;

pub use chain::{FieldResolver, Next};
pub use storage::MiddlewareStorage;

use crate::error::ResolveError;

/// Request-scoped data made available to middleware.
#[derive(Clone, Default)]
pub struct ExecutionContext(Option<Arc<dyn Any + Send + Sync>>);

impl ExecutionContext {
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self(Some(Arc::new(data)))
    }

    /// Returns the data if it has type `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|data| data.downcast_ref::<T>())
    }
}

/// Static description of the field being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub parent_type: String,
    pub field_name: String,
    pub return_type: String,
}

impl FieldInfo {
    pub fn new(
        parent_type: impl Into<String>,
        field_name: impl Into<String>,
        return_type: impl Into<String>,
    ) -> Self {
        Self {
            parent_type: parent_type.into(),
            field_name: field_name.into(),
            return_type: return_type.into(),
        }
    }
}

/// Parameters of one field invocation.
#[derive(Clone)]
pub struct FieldContext {
    pub source: Arc<Value>,
    pub args: Arc<IndexMap<String, Value>>,
    pub context: ExecutionContext,
    pub info: Arc<FieldInfo>,
}

impl FieldContext {
    pub fn new(source: Value, info: FieldInfo) -> Self {
        Self {
            source: Arc::new(source),
            args: Arc::default(),
            context: ExecutionContext::default(),
            info: Arc::new(info),
        }
    }

    pub fn with_args(mut self, args: IndexMap<String, Value>) -> Self {
        self.args = Arc::new(args);
        self
    }

    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }
}

/// Interceptor wrapping a field resolver.
#[async_trait]
pub trait FieldMiddleware: Send + Sync {
    /// Handles one invocation.
    ///
    /// Return `Ok(None)` to defer to the result of `next`, or
    /// `Ok(Some(value))` to replace it.
    async fn handle(&self, ctx: FieldContext, next: Next) -> Result<Option<Value>, ResolveError>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Middleware backed by an async closure.
pub struct FnMiddleware<F>(F);

/// Wraps an async closure as a [`FieldMiddleware`].
pub fn middleware_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(FieldContext, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Value>, ResolveError>> + Send,
{
    FnMiddleware(f)
}

#[async_trait]
impl<F, Fut> FieldMiddleware for FnMiddleware<F>
where
    F: Fn(FieldContext, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Value>, ResolveError>> + Send,
{
    async fn handle(&self, ctx: FieldContext, next: Next) -> Result<Option<Value>, ResolveError> {
        (self.0)(ctx, next).await
    }
}
