use std::sync::Arc;

use tracing::trace;

use super::composite::link_body;
use super::{AstDefinitionNodeFactory, FactoryContext};
use crate::error::SchemaBuildError;
use crate::metadata::ClassMetadata;
use crate::schema::definitions::{CompositeType, ObjectTypeDefinition};
use crate::schema::orphans::OrphanedReferenceRegistry;
use crate::schema::storage::TypeDefinitionsStorage;

pub struct ObjectTypeDefinitionFactory;

impl ObjectTypeDefinitionFactory {
    /// Creates the object type stub.
    ///
    /// Every property thunk is evaluated once here; handles that are not
    /// built yet are recorded as orphaned references so the types they point
    /// at end up in the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError::InvalidDirective`] for unparsable type
    /// directives.
    pub fn create(
        metadata: &Arc<ClassMetadata>,
        storage: &TypeDefinitionsStorage,
        orphans: &mut OrphanedReferenceRegistry,
    ) -> Result<ObjectTypeDefinition, SchemaBuildError> {
        for property in &metadata.properties {
            orphans.add_to_registry_if_orphaned(&property.type_fn.resolve(), storage);
        }

        trace!(type_name = %metadata.name, abstract_type = metadata.is_abstract, "Creating object type");
        Ok(ObjectTypeDefinition {
            target: metadata.target.clone(),
            is_abstract: metadata.is_abstract,
            interfaces: metadata.interfaces.clone(),
            ty: CompositeType::stub(
                metadata.name.clone(),
                metadata.description.clone(),
                AstDefinitionNodeFactory::create_directive_nodes(&metadata.directives)?,
                metadata.extensions.clone(),
            ),
            metadata: Arc::clone(metadata),
        })
    }

    /// Resolves interfaces and fields of `def`.
    ///
    /// `parent` is the linked object or interface named by `extends`.
    ///
    /// # Errors
    ///
    /// Fails on a missing interface or any field error.
    pub fn link(
        ctx: FactoryContext<'_>,
        def: &ObjectTypeDefinition,
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
