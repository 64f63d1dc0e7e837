//! Lazy schema holder.
//!
//! `LazySchema` defers the schema build until first access, so declaration
//! sites can keep registering metadata while the application starts. A built
//! schema is cached until it is invalidated or the metadata it was built from
//! changes.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::builder::{BuiltSchema, SchemaFactory};
use crate::error::SchemaError;
use crate::metadata::TypeMetadataStorage;

/// State of the lazy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Schema has not been built yet.
    Uninitialized,
    /// Schema is currently being built.
    Building,
    /// Schema is ready for use.
    Ready,
    /// Schema build failed.
    Failed,
}

/// Thread-safe lazy schema holder.
///
/// # Example
///
/// ```ignore
/// let lazy = LazySchema::new(SchemaFactory::default(), metadata);
///
/// // First access triggers the build
/// let built = lazy.get_or_build().await?;
///
/// // Force a rebuild on next access
/// lazy.invalidate().await;
/// ```
pub struct LazySchema {
    /// The cached build (None if not built yet or invalidated).
    schema: RwLock<Option<Arc<BuiltSchema>>>,

    /// Build lock to ensure only one build at a time.
    build_lock: Mutex<()>,

    state: RwLock<SchemaState>,

    factory: SchemaFactory,

    metadata: Arc<TypeMetadataStorage>,

    /// Last build error message (for diagnostics).
    last_error: RwLock<Option<String>>,

    /// Metadata version the last failed build ran against.
    failed_version: RwLock<Option<u64>>,
}

impl LazySchema {
    #[must_use]
    pub fn new(factory: SchemaFactory, metadata: Arc<TypeMetadataStorage>) -> Self {
        Self {
            schema: RwLock::new(None),
            build_lock: Mutex::new(()),
            state: RwLock::new(SchemaState::Uninitialized),
            factory,
            metadata,
            last_error: RwLock::new(None),
            failed_version: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> SchemaState {
        *self.state.read().await
    }

    /// Returns the cached build if it matches the current metadata version.
    async fn cached(&self) -> Option<Arc<BuiltSchema>> {
        let schema = self.schema.read().await;
        schema
            .as_ref()
            .filter(|built| built.metadata_version == self.metadata.version())
            .map(Arc::clone)
    }

    /// Gets the schema, building it if necessary.
    ///
    /// Concurrent callers receive an error while a build is in progress; use
    /// [`Self::get_or_build_wait`] to wait instead.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::SchemaInitializing` if another build is in progress.
    /// Returns `SchemaError::SchemaBuildFailed` if the build fails.
    pub async fn get_or_build(&self) -> Result<Arc<BuiltSchema>, SchemaError> {
        if let Some(built) = self.cached().await {
            return Ok(built);
        }

        if *self.state.read().await == SchemaState::Building {
            return Err(SchemaError::SchemaInitializing);
        }

        let Ok(_guard) = self.build_lock.try_lock() else {
            return Err(SchemaError::SchemaInitializing);
        };

        // Double-check after acquiring lock
        if let Some(built) = self.cached().await {
            return Ok(built);
        }

        self.build("Building GraphQL schema...").await
    }

    /// Gets the schema, waiting for an in-progress build instead of failing.
    ///
    /// A previous failure is returned as is until the schema is invalidated
    /// or the metadata changes.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::SchemaBuildFailed` if the build fails.
    pub async fn get_or_build_wait(&self) -> Result<Arc<BuiltSchema>, SchemaError> {
        if let Some(built) = self.cached().await {
            return Ok(built);
        }

        let _guard = self.build_lock.lock().await;

        if let Some(built) = self.cached().await {
            return Ok(built);
        }

        let failed_version = *self.failed_version.read().await;
        if failed_version == Some(self.metadata.version())
            && let Some(err) = self.last_error.read().await.as_ref()
        {
            return Err(SchemaError::SchemaBuildFailed(err.clone()));
        }

        self.build("Building GraphQL schema (wait mode)...").await
    }

    /// Runs the build. The caller holds the build lock.
    async fn build(&self, message: &str) -> Result<Arc<BuiltSchema>, SchemaError> {
        *self.state.write().await = SchemaState::Building;
        info!("{message}");

        let version = self.metadata.version();
        match self.factory.build(&self.metadata) {
            Ok(built) => {
                let built = Arc::new(built);
                *self.schema.write().await = Some(Arc::clone(&built));
                *self.state.write().await = SchemaState::Ready;
                *self.last_error.write().await = None;
                *self.failed_version.write().await = None;
                info!(
                    metadata_version = built.metadata_version,
                    "GraphQL schema built successfully"
                );
                Ok(built)
            }
            Err(e) => {
                let error_msg = e.to_string();
                warn!(error = %error_msg, "Failed to build GraphQL schema");
                *self.state.write().await = SchemaState::Failed;
                *self.last_error.write().await = Some(error_msg.clone());
                *self.failed_version.write().await = Some(version);
                Err(SchemaError::SchemaBuildFailed(error_msg))
            }
        }
    }

    /// Gets the schema if it's already built, without triggering a build.
    pub async fn get(&self) -> Option<Arc<BuiltSchema>> {
        self.schema.read().await.clone()
    }

    /// Drops the cached schema; the next access rebuilds it.
    pub async fn invalidate(&self) {
        let _guard = self.build_lock.lock().await;

        *self.schema.write().await = None;
        *self.state.write().await = SchemaState::Uninitialized;
        *self.last_error.write().await = None;
        *self.failed_version.write().await = None;

        info!("GraphQL schema invalidated - will rebuild on next request");
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Whether a schema matching the current metadata is ready.
    pub async fn is_ready(&self) -> bool {
        *self.state.read().await == SchemaState::Ready && self.cached().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ClassMetadata, PropertyMetadata, ScalarKind};

    fn metadata_with_query() -> Arc<TypeMetadataStorage> {
        let metadata = Arc::new(TypeMetadataStorage::new());
        metadata.register_object_type(
            ClassMetadata::new("Query")
                .field(PropertyMetadata::new("version", ScalarKind::String).default_value("1")),
        );
        metadata
    }

    #[test]
    fn test_schema_state_enum() {
        assert_ne!(SchemaState::Uninitialized, SchemaState::Building);
        assert_ne!(SchemaState::Building, SchemaState::Ready);
        assert_ne!(SchemaState::Ready, SchemaState::Failed);
    }

    #[tokio::test]
    async fn test_builds_once_and_caches() {
        let lazy = LazySchema::new(SchemaFactory::default(), metadata_with_query());
        assert_eq!(lazy.state().await, SchemaState::Uninitialized);
        assert!(lazy.get().await.is_none());

        let first = lazy.get_or_build().await.unwrap();
        let second = lazy.get_or_build().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(lazy.is_ready().await);
    }

    #[tokio::test]
    async fn test_rebuilds_after_metadata_change() {
        let metadata = metadata_with_query();
        let lazy = LazySchema::new(SchemaFactory::default(), Arc::clone(&metadata));
        let first = lazy.get_or_build().await.unwrap();

        metadata.register_object_type(ClassMetadata::new("Ingredient"));
        assert!(!lazy.is_ready().await);

        let second = lazy.get_or_build().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.metadata_version > first.metadata_version);
    }

    #[tokio::test]
    async fn test_failure_is_recorded() {
        let lazy = LazySchema::new(SchemaFactory::default(), Arc::new(TypeMetadataStorage::new()));

        let err = lazy.get_or_build().await.unwrap_err();
        assert!(matches!(err, SchemaError::SchemaBuildFailed(_)));
        assert_eq!(lazy.state().await, SchemaState::Failed);
        assert!(lazy.last_error().await.unwrap().contains("Query"));

        let err = lazy.get_or_build_wait().await.unwrap_err();
        assert!(matches!(err, SchemaError::SchemaBuildFailed(_)));

        lazy.invalidate().await;
        assert_eq!(lazy.state().await, SchemaState::Uninitialized);
        assert!(lazy.last_error().await.is_none());
    }

    #[tokio::test]
    async fn test_wait_mode_retries_after_metadata_change() {
        let metadata = Arc::new(TypeMetadataStorage::new());
        let lazy = LazySchema::new(SchemaFactory::default(), Arc::clone(&metadata));
        assert!(lazy.get_or_build_wait().await.is_err());

        metadata.register_object_type(
            ClassMetadata::new("Query")
                .field(PropertyMetadata::new("version", ScalarKind::String).default_value("1")),
        );
        let built = lazy.get_or_build_wait().await.unwrap();
        assert_eq!(built.metadata_version, metadata.version());
        assert!(lazy.last_error().await.is_none());
    }
}
