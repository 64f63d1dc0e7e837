//! Linking phase: resolves the bodies of every stub once all stubs exist.
//!
//! A type is linked after its parent and the interfaces it implements, so
//! inherited fields and interfaces can be copied from already resolved bodies.
//! The chain of types being linked is tracked to report inheritance cycles.

use tracing::debug;

use super::definitions::{CompositeType, InputTypeDefinition, InterfaceDefinition, ObjectTypeDefinition};
use super::factories::{
    FactoryContext, InputTypeDefinitionFactory, InterfaceDefinitionFactory,
    ObjectTypeDefinitionFactory, UnionDefinitionFactory,
};
use crate::error::SchemaBuildError;
use crate::metadata::TypeHandle;

pub(crate) struct Linker<'a> {
    ctx: FactoryContext<'a>,
    visiting: Vec<TypeHandle>,
}

impl<'a> Linker<'a> {
    pub(crate) fn new(ctx: FactoryContext<'a>) -> Self {
        Self {
            ctx,
            visiting: Vec::new(),
        }
    }

    /// Links unions, interfaces, objects and inputs, in that order.
    pub(crate) fn link_all(mut self) -> Result<(), SchemaBuildError> {
        let storage = self.ctx.storage;

        for def in storage.get_all_union_definitions() {
            UnionDefinitionFactory::link(def, storage)?;
        }
        for def in storage.get_all_interface_definitions() {
            self.link_interface(def)?;
        }
        for def in storage.get_all_object_type_definitions() {
            self.link_object(def)?;
        }
        for def in storage.get_all_input_type_definitions() {
            self.link_input(def)?;
        }

        debug!(types = storage.len(), "Linked type definitions");
        Ok(())
    }

    fn enter(&mut self, handle: &TypeHandle) -> Result<(), SchemaBuildError> {
        if self.visiting.contains(handle) {
            return Err(SchemaBuildError::InheritanceCycle(handle.clone()));
        }
        self.visiting.push(handle.clone());
        Ok(())
    }

    fn leave(&mut self) {
        self.visiting.pop();
    }

    /// Links the declared interfaces of a type.
    fn link_declared_interfaces(
        &mut self,
        type_name: &str,
        interfaces: &[TypeHandle],
    ) -> Result<(), SchemaBuildError> {
        let storage = self.ctx.storage;
        for handle in interfaces {
            let interface = storage.get_interface_by_target(handle).ok_or_else(|| {
                SchemaBuildError::MissingInterface {
                    type_name: type_name.to_string(),
                    interface: handle.clone(),
                }
            })?;
            self.link_interface(interface)?;
        }
        Ok(())
    }

    fn link_interface(&mut self, def: &'a InterfaceDefinition) -> Result<(), SchemaBuildError> {
        if def.ty.is_linked() {
            return Ok(());
        }
        self.enter(&def.target)?;

        let storage = self.ctx.storage;
        let parent = def
            .metadata
            .extends
            .as_ref()
            .and_then(|handle| storage.get_interface_by_target(handle));
        if let Some(parent) = parent {
            self.link_interface(parent)?;
        }
        self.link_declared_interfaces(&def.ty.name, &def.interfaces)?;

        InterfaceDefinitionFactory::link(self.ctx, def, parent.map(|p| &p.ty))?;
        self.leave();
        Ok(())
    }

    fn link_object(&mut self, def: &'a ObjectTypeDefinition) -> Result<(), SchemaBuildError> {
        if def.ty.is_linked() {
            return Ok(());
        }
        self.enter(&def.target)?;

        let parent = self.object_parent(def)?;
        self.link_declared_interfaces(&def.ty.name, &def.interfaces)?;

        ObjectTypeDefinitionFactory::link(self.ctx, def, parent)?;
        self.leave();
        Ok(())
    }

    /// Links and returns the object or interface `def` extends.
    fn object_parent(
        &mut self,
        def: &'a ObjectTypeDefinition,
    ) -> Result<Option<&'a CompositeType>, SchemaBuildError> {
        let Some(handle) = def.metadata.extends.as_ref() else {
            return Ok(None);
        };
        let storage = self.ctx.storage;

        if let Some(parent) = storage.get_object_type_by_target(handle) {
            self.link_object(parent)?;
            return Ok(Some(&parent.ty));
        }
        if let Some(parent) = storage.get_interface_by_target(handle) {
            self.link_interface(parent)?;
            return Ok(Some(&parent.ty));
        }
        Ok(None)
    }

    fn link_input(&mut self, def: &'a InputTypeDefinition) -> Result<(), SchemaBuildError> {
        if def.ty.fields.get().is_some() {
            return Ok(());
        }
        self.enter(&def.target)?;

        let storage = self.ctx.storage;
        let parent = def
            .metadata
            .extends
            .as_ref()
            .and_then(|handle| storage.get_input_type_by_target(handle));
        if let Some(parent) = parent {
            self.link_input(parent)?;
        }

        InputTypeDefinitionFactory::link(self.ctx, def, parent.map(|p| &p.ty))?;
        self.leave();
        Ok(())
    }
}
