//! Types discovered only through field type thunks.

use indexmap::IndexSet;
use tracing::trace;

use super::storage::TypeDefinitionsStorage;
use crate::metadata::{TypeHandle, TypeTarget};

/// Set of handles reached through a thunk before they were built.
///
/// Every handle in the registry ends up in the assembled schema, even when no
/// root operation reaches it.
#[derive(Debug, Default)]
pub struct OrphanedReferenceRegistry {
    registry: IndexSet<TypeHandle>,
}

impl OrphanedReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the handle `target` points at, unless it is a scalar or an
    /// already built type.
    pub fn add_to_registry_if_orphaned(
        &mut self,
        target: &TypeTarget,
        storage: &TypeDefinitionsStorage,
    ) {
        let Some(handle) = target.handle() else {
            return;
        };
        if storage.contains(handle) {
            return;
        }
        if self.registry.insert(handle.clone()) {
            trace!(handle = %handle, "Registered orphaned type reference");
        }
    }

    pub fn contains(&self, handle: &TypeHandle) -> bool {
        self.registry.contains(handle)
    }

    pub fn get_all(&self) -> impl Iterator<Item = &TypeHandle> {
        self.registry.iter()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ScalarKind;

    #[test]
    fn test_scalars_are_ignored() {
        let mut registry = OrphanedReferenceRegistry::new();
        let storage = TypeDefinitionsStorage::new();
        registry.add_to_registry_if_orphaned(&TypeTarget::Scalar(ScalarKind::String), &storage);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unbuilt_handles_registered_once() {
        let mut registry = OrphanedReferenceRegistry::new();
        let storage = TypeDefinitionsStorage::new();
        let target = TypeTarget::from("Ingredient");

        registry.add_to_registry_if_orphaned(&target, &storage);
        registry.add_to_registry_if_orphaned(&target, &storage);

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&TypeHandle::new("Ingredient")));
    }
}
