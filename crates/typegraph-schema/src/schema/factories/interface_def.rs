use std::sync::Arc;

use tracing::trace;

use super::composite::link_body;
use super::{AstDefinitionNodeFactory, FactoryContext};
use crate::error::SchemaBuildError;
use crate::metadata::ClassMetadata;
use crate::schema::definitions::{CompositeType, InterfaceDefinition};
use crate::schema::orphans::OrphanedReferenceRegistry;
use crate::schema::storage::TypeDefinitionsStorage;

pub struct InterfaceDefinitionFactory;

impl InterfaceDefinitionFactory {
    /// Creates the interface stub, carrying its `resolve_type` hook.
    ///
    /// Property thunks are evaluated once, like for object types, so field
    /// types that are only reachable through the interface are recorded as
    /// orphaned references.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError::InvalidDirective`] for unparsable type
    /// directives.
    pub fn create(
        metadata: &Arc<ClassMetadata>,
        storage: &TypeDefinitionsStorage,
        orphans: &mut OrphanedReferenceRegistry,
    ) -> Result<InterfaceDefinition, SchemaBuildError> {
        for property in &metadata.properties {
            orphans.add_to_registry_if_orphaned(&property.type_fn.resolve(), storage);
        }

        trace!(type_name = %metadata.name, "Creating interface type");
        Ok(InterfaceDefinition {
            target: metadata.target.clone(),
            is_abstract: metadata.is_abstract,
            interfaces: metadata.interfaces.clone(),
            ty: CompositeType::stub(
                metadata.name.clone(),
                metadata.description.clone(),
                AstDefinitionNodeFactory::create_directive_nodes(&metadata.directives)?,
                metadata.extensions.clone(),
            ),
            resolve_type: metadata.resolve_type.clone(),
            metadata: Arc::clone(metadata),
        })
    }

    /// Resolves interfaces and fields of `def`. `parent` is the linked
    /// interface named by `extends`.
    ///
    /// # Errors
    ///
    /// Fails on a missing interface or any field error.
    pub fn link(
        ctx: FactoryContext<'_>,
        def: &InterfaceDefinition,
        parent: Option<&CompositeType>,
    ) -> Result<(), SchemaBuildError> {
        if def.ty.is_linked() {
            return Ok(());
        }
        let body = link_body(ctx, &def.metadata, parent)?;
        let _ = def.ty.body.set(body);
        Ok(())
    }
}
