//! Registry of built type definitions, keyed by declaration handle.
//!
//! Lookups for types that are not built yet return `None`; callers treat
//! that as "not yet built", not as an error.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use super::definitions::{
    EnumDefinition, InputTypeDefinition, InterfaceDefinition, ObjectTypeDefinition,
    UnionDefinition,
};
use crate::error::SchemaBuildError;
use crate::metadata::TypeHandle;

/// Category of a built type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Object,
    Interface,
    Input,
    Enum,
    Union,
}

/// Built type definitions of one generation pass.
#[derive(Debug, Default)]
pub struct TypeDefinitionsStorage {
    objects: IndexMap<TypeHandle, Arc<ObjectTypeDefinition>>,
    interfaces: IndexMap<TypeHandle, Arc<InterfaceDefinition>>,
    inputs: IndexMap<TypeHandle, Arc<InputTypeDefinition>>,
    enums: IndexMap<TypeHandle, Arc<EnumDefinition>>,
    unions: IndexMap<TypeHandle, Arc<UnionDefinition>>,
    names: HashSet<String>,
}

fn insert_unique<T>(
    map: &mut IndexMap<TypeHandle, Arc<T>>,
    names: &mut HashSet<String>,
    handle: TypeHandle,
    name: &str,
    def: T,
) -> Result<(), SchemaBuildError> {
    if map.contains_key(&handle) {
        return Err(SchemaBuildError::DuplicateHandle(handle));
    }
    if !names.insert(name.to_string()) {
        return Err(SchemaBuildError::DuplicateTypeName(name.to_string()));
    }
    trace!(handle = %handle, name = %name, "Storing type definition");
    map.insert(handle, Arc::new(def));
    Ok(())
}

impl TypeDefinitionsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object_types(
        &mut self,
        defs: impl IntoIterator<Item = ObjectTypeDefinition>,
    ) -> Result<(), SchemaBuildError> {
        for def in defs {
            let (handle, name) = (def.target.clone(), def.ty.name.clone());
            insert_unique(&mut self.objects, &mut self.names, handle, &name, def)?;
        }
        Ok(())
    }

    pub fn add_interfaces(
        &mut self,
        defs: impl IntoIterator<Item = InterfaceDefinition>,
    ) -> Result<(), SchemaBuildError> {
        for def in defs {
            let (handle, name) = (def.target.clone(), def.ty.name.clone());
            insert_unique(&mut self.interfaces, &mut self.names, handle, &name, def)?;
        }
        Ok(())
    }

    pub fn add_input_types(
        &mut self,
        defs: impl IntoIterator<Item = InputTypeDefinition>,
    ) -> Result<(), SchemaBuildError> {
        for def in defs {
            let (handle, name) = (def.target.clone(), def.ty.name.clone());
            insert_unique(&mut self.inputs, &mut self.names, handle, &name, def)?;
        }
        Ok(())
    }

    pub fn add_enums(
        &mut self,
        defs: impl IntoIterator<Item = EnumDefinition>,
    ) -> Result<(), SchemaBuildError> {
        for def in defs {
            let (handle, name) = (def.target.clone(), def.ty.name.clone());
            insert_unique(&mut self.enums, &mut self.names, handle, &name, def)?;
        }
        Ok(())
    }

    pub fn add_unions(
        &mut self,
        defs: impl IntoIterator<Item = UnionDefinition>,
    ) -> Result<(), SchemaBuildError> {
        for def in defs {
            let (handle, name) = (def.target.clone(), def.ty.name.clone());
            insert_unique(&mut self.unions, &mut self.names, handle, &name, def)?;
        }
        Ok(())
    }

    pub fn get_object_type_by_target(&self, handle: &TypeHandle) -> Option<&Arc<ObjectTypeDefinition>> {
        self.objects.get(handle)
    }

    pub fn get_interface_by_target(&self, handle: &TypeHandle) -> Option<&Arc<InterfaceDefinition>> {
        self.interfaces.get(handle)
    }

    pub fn get_input_type_by_target(&self, handle: &TypeHandle) -> Option<&Arc<InputTypeDefinition>> {
        self.inputs.get(handle)
    }

    pub fn get_enum_by_target(&self, handle: &TypeHandle) -> Option<&Arc<EnumDefinition>> {
        self.enums.get(handle)
    }

    pub fn get_union_by_target(&self, handle: &TypeHandle) -> Option<&Arc<UnionDefinition>> {
        self.unions.get(handle)
    }

    pub fn get_all_object_type_definitions(&self) -> impl Iterator<Item = &Arc<ObjectTypeDefinition>> {
        self.objects.values()
    }

    pub fn get_all_interface_definitions(&self) -> impl Iterator<Item = &Arc<InterfaceDefinition>> {
        self.interfaces.values()
    }

    pub fn get_all_input_type_definitions(&self) -> impl Iterator<Item = &Arc<InputTypeDefinition>> {
        self.inputs.values()
    }

    pub fn get_all_enum_definitions(&self) -> impl Iterator<Item = &Arc<EnumDefinition>> {
        self.enums.values()
    }

    pub fn get_all_union_definitions(&self) -> impl Iterator<Item = &Arc<UnionDefinition>> {
        self.unions.values()
    }

    /// Returns the schema name and kind of a type usable in output position.
    pub fn output_type(&self, handle: &TypeHandle) -> Option<(&str, TypeKind)> {
        if let Some(def) = self.objects.get(handle) {
            return Some((&def.ty.name, TypeKind::Object));
        }
        if let Some(def) = self.interfaces.get(handle) {
            return Some((&def.ty.name, TypeKind::Interface));
        }
        if let Some(def) = self.enums.get(handle) {
            return Some((&def.ty.name, TypeKind::Enum));
        }
        self.unions
            .get(handle)
            .map(|def| (def.ty.name.as_str(), TypeKind::Union))
    }

    /// Returns the schema name and kind of a type usable in input position.
    pub fn input_type(&self, handle: &TypeHandle) -> Option<(&str, TypeKind)> {
        if let Some(def) = self.inputs.get(handle) {
            return Some((&def.ty.name, TypeKind::Input));
        }
        self.enums
            .get(handle)
            .map(|def| (def.ty.name.as_str(), TypeKind::Enum))
    }

    /// Whether `handle` has been built in any category.
    pub fn contains(&self, handle: &TypeHandle) -> bool {
        self.objects.contains_key(handle)
            || self.interfaces.contains_key(handle)
            || self.inputs.contains_key(handle)
            || self.enums.contains_key(handle)
            || self.unions.contains_key(handle)
    }

    /// Total number of built types.
    pub fn len(&self) -> usize {
        self.objects.len()
            + self.interfaces.len()
            + self.inputs.len()
            + self.enums.len()
            + self.unions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
