//! Onion-style composition of field middleware around a base resolver.
//!
//! Every invocation of a composed resolver creates its own [`ChainCursor`]:
//! the ordered middleware list plus the position reached so far. A
//! continuation may only move the cursor forward; asking it to run a step
//! that already ran fails with [`ResolveError::NextCalledMultipleTimes`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_graphql::Value;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tracing::trace;

use super::{FieldContext, FieldMiddleware};
use crate::error::ResolveError;
use crate::metadata::ComputeFn;

/// Innermost resolver of a field.
#[derive(Clone)]
pub(crate) enum BaseResolver {
    /// Reads `property` from the source object, falling back to `default`.
    Property {
        property: String,
        default: Option<Value>,
    },
    Computed(ComputeFn),
}

impl BaseResolver {
    fn resolve(&self, ctx: &FieldContext) -> Result<Value, ResolveError> {
        match self {
            Self::Property { property, default } => {
                let found = match ctx.source.as_ref() {
                    Value::Object(map) => map.get(property.as_str()).cloned(),
                    _ => None,
                };
                Ok(found.or_else(|| default.clone()).unwrap_or(Value::Null))
            }
            Self::Computed(compute) => compute(ctx),
        }
    }
}

/// Per-invocation state of a middleware chain.
struct ChainCursor {
    chain: Arc<[Arc<dyn FieldMiddleware>]>,
    base: BaseResolver,
    ctx: FieldContext,
    /// Number of steps entered so far.
    position: AtomicUsize,
}

impl ChainCursor {
    /// Moves the cursor onto step `index`.
    fn advance(&self, index: usize) -> Result<(), ResolveError> {
        let previous = self.position.fetch_max(index + 1, Ordering::AcqRel);
        if previous > index {
            return Err(ResolveError::NextCalledMultipleTimes);
        }
        Ok(())
    }
}

/// Continuation handed to a middleware.
///
/// Calling [`Next::run`] executes the rest of the chain and returns its
/// result. It may be called at most once.
pub struct Next {
    cursor: Arc<ChainCursor>,
    index: usize,
    produced: Arc<Mutex<Option<Value>>>,
}

impl Next {
    /// Runs the remaining middleware and the base resolver.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NextCalledMultipleTimes`] when called a second
    /// time, or any error raised further down the chain.
    pub async fn run(&self) -> Result<Value, ResolveError> {
        let value = run_step(Arc::clone(&self.cursor), self.index).await?;
        *self.produced.lock() = Some(value.clone());
        Ok(value)
    }
}

fn run_step(cursor: Arc<ChainCursor>, index: usize) -> BoxFuture<'static, Result<Value, ResolveError>> {
    Box::pin(async move {
        cursor.advance(index)?;

        let Some(middleware) = cursor.chain.get(index).cloned() else {
            return cursor.base.resolve(&cursor.ctx);
        };

        trace!(
            field = %cursor.ctx.info.field_name,
            step = index,
            middleware = middleware.name(),
            "Running field middleware"
        );

        let produced = Arc::new(Mutex::new(None));
        let next = Next {
            cursor: Arc::clone(&cursor),
            index: index + 1,
            produced: Arc::clone(&produced),
        };

        match middleware.handle(cursor.ctx.clone(), next).await? {
            Some(explicit) => Ok(explicit),
            None => Ok(produced.lock().take().unwrap_or(Value::Null)),
        }
    })
}

/// Resolver of one field: a base resolver wrapped in its middleware.
#[derive(Clone)]
pub struct FieldResolver {
    base: BaseResolver,
    chain: Arc<[Arc<dyn FieldMiddleware>]>,
}

impl FieldResolver {
    /// Reads `property` from the source, substituting `default` when absent.
    pub fn property(property: impl Into<String>, default: Option<Value>) -> Self {
        Self {
            base: BaseResolver::Property {
                property: property.into(),
                default,
            },
            chain: Arc::from(Vec::new()),
        }
    }

    pub fn computed(compute: ComputeFn) -> Self {
        Self {
            base: BaseResolver::Computed(compute),
            chain: Arc::from(Vec::new()),
        }
    }

    pub fn with_middleware(mut self, middleware: Vec<Arc<dyn FieldMiddleware>>) -> Self {
        self.chain = Arc::from(middleware);
        self
    }

    pub fn middleware_count(&self) -> usize {
        self.chain.len()
    }

    /// Resolves the field for one invocation.
    ///
    /// # Errors
    ///
    /// Propagates middleware failures and chain misuse.
    pub async fn resolve(&self, ctx: FieldContext) -> Result<Value, ResolveError> {
        if self.chain.is_empty() {
            return self.base.resolve(&ctx);
        }

        let cursor = Arc::new(ChainCursor {
            chain: Arc::clone(&self.chain),
            base: self.base.clone(),
            ctx,
            position: AtomicUsize::new(0),
        });
        run_step(cursor, 0).await
    }
}
