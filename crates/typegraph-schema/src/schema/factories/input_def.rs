use std::sync::{Arc, OnceLock};

use tracing::trace;

use super::{AstDefinitionNodeFactory, FactoryContext, FieldFactory};
use crate::error::SchemaBuildError;
use crate::metadata::ClassMetadata;
use crate::schema::definitions::{InputFieldMap, InputObjectType, InputTypeDefinition};

pub struct InputTypeDefinitionFactory;

impl InputTypeDefinitionFactory {
    /// Creates the input type stub.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError::InvalidDirective`] for unparsable type
    /// directives.
    pub fn create(metadata: &Arc<ClassMetadata>) -> Result<InputTypeDefinition, SchemaBuildError> {
        trace!(type_name = %metadata.name, "Creating input type");
        Ok(InputTypeDefinition {
            target: metadata.target.clone(),
            is_abstract: metadata.is_abstract,
            ty: InputObjectType {
                name: metadata.name.clone(),
                description: metadata.description.clone(),
                directives: AstDefinitionNodeFactory::create_directive_nodes(&metadata.directives)?,
                extensions: metadata.extensions.clone(),
                fields: OnceLock::new(),
            },
            metadata: Arc::clone(metadata),
        })
    }

    /// Resolves the input fields: the parent's fields with the own properties
    /// merged over them.
    ///
    /// # Errors
    ///
    /// Fails when a field type is not a scalar, enum or input type.
    pub fn link(
        ctx: FactoryContext<'_>,
        def: &InputTypeDefinition,
        parent: Option<&InputObjectType>,
    ) -> Result<(), SchemaBuildError> {
        if def.ty.fields.get().is_some() {
            return Ok(());
        }

        let mut fields = match parent {
            Some(parent) => parent.fields()?.clone(),
            None => InputFieldMap::new(),
        };
        for property in &def.metadata.properties {
            let value = FieldFactory::create_input_value(ctx, property)?;
            fields.insert(value.name.clone(), Arc::new(value));
        }

        trace!(type_name = %def.ty.name, fields = fields.len(), "Linked input type");
        let _ = def.ty.fields.set(fields);
        Ok(())
    }
}
