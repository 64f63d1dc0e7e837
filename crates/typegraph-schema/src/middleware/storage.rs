//! Collection of every middleware declared on a field.

use std::sync::Arc;

use parking_lot::RwLock;

use super::FieldMiddleware;

/// Deduplicated set of field middleware, in first-seen order.
#[derive(Default)]
pub struct MiddlewareStorage {
    middleware: RwLock<Vec<Arc<dyn FieldMiddleware>>>,
}

fn same_instance(a: &Arc<dyn FieldMiddleware>, b: &Arc<dyn FieldMiddleware>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl MiddlewareStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `middleware` unless the same instance is already stored.
    ///
    /// Returns whether it was added.
    pub fn add_middleware(&self, middleware: Arc<dyn FieldMiddleware>) -> bool {
        let mut stored = self.middleware.write();
        if stored.iter().any(|m| same_instance(m, &middleware)) {
            return false;
        }
        stored.push(middleware);
        true
    }

    pub fn get_all(&self) -> Vec<Arc<dyn FieldMiddleware>> {
        self.middleware.read().clone()
    }

    pub fn len(&self) -> usize {
        self.middleware.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.read().is_empty()
    }

    pub fn clear(&self) {
        self.middleware.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::middleware_fn;

    #[test]
    fn test_deduplicates_by_instance() {
        let storage = MiddlewareStorage::new();
        let log: Arc<dyn FieldMiddleware> =
            Arc::new(middleware_fn(|_ctx, next| async move { next.run().await.map(Some) }));
        let auth: Arc<dyn FieldMiddleware> =
            Arc::new(middleware_fn(|_ctx, _next| async { Ok::<_, crate::error::ResolveError>(None) }));

        assert!(storage.add_middleware(Arc::clone(&log)));
        assert!(storage.add_middleware(Arc::clone(&auth)));
        assert!(!storage.add_middleware(Arc::clone(&log)));
        assert_eq!(storage.len(), 2);

        storage.clear();
        assert!(storage.is_empty());
    }
}
