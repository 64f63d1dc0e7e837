//! Turns registered metadata into linked type definitions.

use tracing::debug;

use super::factories::{
    EnumDefinitionFactory, FactoryContext, InputTypeDefinitionFactory, InterfaceDefinitionFactory,
    ObjectTypeDefinitionFactory, UnionDefinitionFactory,
};
use super::linker::Linker;
use super::orphans::OrphanedReferenceRegistry;
use super::storage::TypeDefinitionsStorage;
use crate::config::BuildSchemaOptions;
use crate::error::SchemaBuildError;
use crate::metadata::TypeMetadataStorage;
use crate::middleware::MiddlewareStorage;

/// Orchestrates the factories for one schema build.
///
/// Stubs are created in a fixed order (unions, enums, interfaces, objects,
/// inputs) after the declared middleware has been collected. Bodies are
/// linked only once every stub exists, so declarations may reference each
/// other in any order.
#[derive(Default)]
pub struct TypeDefinitionsGenerator {
    storage: TypeDefinitionsStorage,
    orphans: OrphanedReferenceRegistry,
    middleware: MiddlewareStorage,
    generated: bool,
}

impl TypeDefinitionsGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates and links every type definition.
    ///
    /// A generator only generates once; later calls return without touching
    /// the stored definitions.
    ///
    /// # Errors
    ///
    /// Returns the first factory or linking error. Definitions stored before
    /// the error stay in place.
    pub fn generate(
        &mut self,
        metadata: &TypeMetadataStorage,
        options: &BuildSchemaOptions,
    ) -> Result<(), SchemaBuildError> {
        if self.generated {
            debug!("Type definitions already generated, skipping");
            return Ok(());
        }
        self.generated = true;

        self.collect_middleware(metadata);
        self.generate_union_defs(metadata)?;
        self.generate_enum_defs(metadata)?;
        self.generate_interface_defs(metadata)?;
        self.generate_object_type_defs(metadata)?;
        self.generate_input_type_defs(metadata)?;

        let ctx = FactoryContext {
            metadata,
            storage: &self.storage,
            options,
        };
        Linker::new(ctx).link_all()?;

        debug!(
            types = self.storage.len(),
            orphans = self.orphans.len(),
            middleware = self.middleware.len(),
            "Generated type definitions"
        );
        Ok(())
    }

    fn collect_middleware(&mut self, metadata: &TypeMetadataStorage) {
        for property in metadata.get_middleware_property_metadata() {
            for middleware in property.middleware {
                self.middleware.add_middleware(middleware);
            }
        }
    }

    fn generate_union_defs(&mut self, metadata: &TypeMetadataStorage) -> Result<(), SchemaBuildError> {
        let defs = metadata
            .get_unions_metadata()
            .iter()
            .map(|meta| UnionDefinitionFactory::create(meta))
            .collect::<Vec<_>>();
        debug!(count = defs.len(), "Generated union definitions");
        self.storage.add_unions(defs)
    }

    fn generate_enum_defs(&mut self, metadata: &TypeMetadataStorage) -> Result<(), SchemaBuildError> {
        let defs = metadata
            .get_enums_metadata()
            .iter()
            .map(|meta| EnumDefinitionFactory::create(meta))
            .collect::<Vec<_>>();
        debug!(count = defs.len(), "Generated enum definitions");
        self.storage.add_enums(defs)
    }

    fn generate_interface_defs(
        &mut self,
        metadata: &TypeMetadataStorage,
    ) -> Result<(), SchemaBuildError> {
        let defs = metadata
            .get_interfaces_metadata()
            .iter()
            .map(|meta| InterfaceDefinitionFactory::create(meta, &self.storage, &mut self.orphans))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = defs.len(), "Generated interface definitions");
        self.storage.add_interfaces(defs)
    }

    fn generate_object_type_defs(
        &mut self,
        metadata: &TypeMetadataStorage,
    ) -> Result<(), SchemaBuildError> {
        let defs = metadata
            .get_object_types_metadata()
            .iter()
            .map(|meta| ObjectTypeDefinitionFactory::create(meta, &self.storage, &mut self.orphans))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = defs.len(), "Generated object type definitions");
        self.storage.add_object_types(defs)
    }

    fn generate_input_type_defs(
        &mut self,
        metadata: &TypeMetadataStorage,
    ) -> Result<(), SchemaBuildError> {
        let defs = metadata
            .get_input_types_metadata()
            .iter()
            .map(InputTypeDefinitionFactory::create)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = defs.len(), "Generated input type definitions");
        self.storage.add_input_types(defs)
    }

    pub fn storage(&self) -> &TypeDefinitionsStorage {
        &self.storage
    }

    pub fn orphans(&self) -> &OrphanedReferenceRegistry {
        &self.orphans
    }

    pub fn middleware(&self) -> &MiddlewareStorage {
        &self.middleware
    }

    /// Hands out the generated definitions and orphan registry.
    pub fn into_parts(self) -> (TypeDefinitionsStorage, OrphanedReferenceRegistry) {
        (self.storage, self.orphans)
    }
}
