//! Process-wide registry of declared type metadata.
//!
//! Declaration sites call the `register_*` methods; the generator reads the
//! registered descriptors once per schema build. The registry is append-only
//! until [`TypeMetadataStorage::reset`] is called. Every mutation bumps a
//! version counter so cached schemas can detect that they are stale.

use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::handle::TypeHandle;
use super::types::{ClassMetadata, EnumMetadata, PropertyMetadata, UnionMetadata};

static GLOBAL: LazyLock<TypeMetadataStorage> = LazyLock::new(TypeMetadataStorage::new);

#[derive(Default)]
struct Inner {
    objects: Vec<Arc<ClassMetadata>>,
    interfaces: Vec<Arc<ClassMetadata>>,
    inputs: Vec<Arc<ClassMetadata>>,
    args: Vec<Arc<ClassMetadata>>,
    enums: Vec<Arc<EnumMetadata>>,
    unions: Vec<Arc<UnionMetadata>>,
    /// Properties registered before their owning type.
    pending: Vec<(TypeHandle, PropertyMetadata)>,
}

impl Inner {
    fn class_lists_mut(&mut self) -> [&mut Vec<Arc<ClassMetadata>>; 4] {
        [
            &mut self.objects,
            &mut self.interfaces,
            &mut self.inputs,
            &mut self.args,
        ]
    }

    fn take_pending(&mut self, owner: &TypeHandle) -> Vec<PropertyMetadata> {
        let (matching, rest) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(handle, _)| handle == owner);
        self.pending = rest;
        matching.into_iter().map(|(_, prop)| prop).collect()
    }
}

/// Registry of all declared type metadata.
#[derive(Default)]
pub struct TypeMetadataStorage {
    inner: RwLock<Inner>,
    version: AtomicU64,
}

/// Registers `meta` into `list`, replacing an earlier entry with the same handle.
fn upsert<T>(list: &mut Vec<Arc<T>>, meta: T, target: impl Fn(&T) -> &TypeHandle) {
    let handle = target(&meta).clone();
    match list.iter_mut().find(|existing| target(existing) == &handle) {
        Some(existing) => {
            debug!(handle = %handle, "Replacing previously registered metadata");
            *existing = Arc::new(meta);
        }
        None => list.push(Arc::new(meta)),
    }
}

impl TypeMetadataStorage {
    /// Creates an isolated, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static TypeMetadataStorage {
        &GLOBAL
    }

    /// Monotonic counter bumped by every registration and reset.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    fn register_class(
        &self,
        mut meta: ClassMetadata,
        select: impl FnOnce(&mut Inner) -> &mut Vec<Arc<ClassMetadata>>,
    ) {
        let mut inner = self.inner.write();
        meta.properties.extend(inner.take_pending(&meta.target));
        trace!(handle = %meta.target, fields = meta.properties.len(), "Registering type metadata");
        upsert(select(&mut inner), meta, |m| &m.target);
        drop(inner);
        self.bump();
    }

    pub fn register_object_type(&self, meta: ClassMetadata) {
        self.register_class(meta, |inner| &mut inner.objects);
    }

    pub fn register_interface(&self, meta: ClassMetadata) {
        self.register_class(meta, |inner| &mut inner.interfaces);
    }

    pub fn register_input_type(&self, meta: ClassMetadata) {
        self.register_class(meta, |inner| &mut inner.inputs);
    }

    pub fn register_args_type(&self, meta: ClassMetadata) {
        self.register_class(meta, |inner| &mut inner.args);
    }

    pub fn register_enum(&self, meta: EnumMetadata) {
        upsert(&mut self.inner.write().enums, meta, |m| &m.target);
        self.bump();
    }

    pub fn register_union(&self, meta: UnionMetadata) {
        upsert(&mut self.inner.write().unions, meta, |m| &m.target);
        self.bump();
    }

    /// Adds a property to `owner`.
    ///
    /// The owner does not have to be registered yet; the property is attached
    /// when it is.
    pub fn register_property(&self, owner: impl Into<TypeHandle>, property: PropertyMetadata) {
        let owner = owner.into();
        let mut inner = self.inner.write();
        let mut attached = false;
        for list in inner.class_lists_mut() {
            for meta in list.iter_mut().filter(|m| m.target == owner) {
                Arc::make_mut(meta).properties.push(property.clone());
                attached = true;
            }
        }
        if !attached {
            trace!(owner = %owner, property = %property.name, "Deferring property until owner is registered");
            inner.pending.push((owner, property));
        }
        drop(inner);
        self.bump();
    }

    /// Drops every registration.
    pub fn reset(&self) {
        *self.inner.write() = Inner::default();
        self.bump();
    }

    pub fn get_object_types_metadata(&self) -> Vec<Arc<ClassMetadata>> {
        self.inner.read().objects.clone()
    }

    pub fn get_interfaces_metadata(&self) -> Vec<Arc<ClassMetadata>> {
        self.inner.read().interfaces.clone()
    }

    pub fn get_input_types_metadata(&self) -> Vec<Arc<ClassMetadata>> {
        self.inner.read().inputs.clone()
    }

    pub fn get_enums_metadata(&self) -> Vec<Arc<EnumMetadata>> {
        self.inner.read().enums.clone()
    }

    pub fn get_unions_metadata(&self) -> Vec<Arc<UnionMetadata>> {
        self.inner.read().unions.clone()
    }

    pub fn get_args_type_metadata(&self, handle: &TypeHandle) -> Option<Arc<ClassMetadata>> {
        self.inner
            .read()
            .args
            .iter()
            .find(|m| &m.target == handle)
            .cloned()
    }

    /// Every property, across all class-like types, that declares middleware.
    pub fn get_middleware_property_metadata(&self) -> Vec<PropertyMetadata> {
        let inner = self.inner.read();
        [&inner.objects, &inner.interfaces, &inner.inputs, &inner.args]
            .into_iter()
            .flatten()
            .flat_map(|meta| meta.properties.iter())
            .filter(|prop| !prop.middleware.is_empty())
            .cloned()
            .collect()
    }
}
