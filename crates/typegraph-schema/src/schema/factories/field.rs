//! Fields of object, interface and input types.

use async_graphql::Value;
use tracing::trace;

use super::{ArgsFactory, AstDefinitionNodeFactory, FactoryContext, InputTypeFactory, OutputTypeFactory};
use crate::error::SchemaBuildError;
use crate::metadata::{Extensions, PropertyMetadata};
use crate::middleware::FieldResolver;
use crate::schema::definitions::{FieldDefinition, InputValueDefinition};

/// Builds a single field from its property metadata.
pub struct FieldFactory;

impl FieldFactory {
    /// Builds an output field: type, arguments, composed resolver, directives
    /// and extensions.
    ///
    /// # Errors
    ///
    /// Fails when the field type, an argument type or a directive cannot be
    /// resolved.
    pub fn create_output_field(
        ctx: FactoryContext<'_>,
        property: &PropertyMetadata,
    ) -> Result<FieldDefinition, SchemaBuildError> {
        let ty = OutputTypeFactory::create(
            &property.name,
            &property.type_fn.resolve(),
            &property.options,
            ctx.storage,
            ctx.options,
        )?;
        let args = ArgsFactory::create(ctx, &property.name, &property.args)?;
        let directives = AstDefinitionNodeFactory::create_directive_nodes(&property.directives)?;

        let resolver = match &property.compute {
            Some(compute) => FieldResolver::computed(compute.clone()),
            None => FieldResolver::property(&property.name, property.options.default_value.clone()),
        }
        .with_middleware(property.middleware.clone());

        trace!(
            field = %property.schema_name,
            ty = %ty,
            middleware = property.middleware.len(),
            "Built output field"
        );

        Ok(FieldDefinition {
            name: property.schema_name.clone(),
            property_name: property.name.clone(),
            ty,
            args,
            resolver,
            description: property.description.clone(),
            deprecation_reason: property.deprecation_reason.clone(),
            directives,
            extensions: field_extensions(property),
        })
    }

    /// Builds an argument or input field.
    ///
    /// # Errors
    ///
    /// Fails when the type is not an input type or a directive is invalid.
    pub fn create_input_value(
        ctx: FactoryContext<'_>,
        property: &PropertyMetadata,
    ) -> Result<InputValueDefinition, SchemaBuildError> {
        let ty = InputTypeFactory::create(
            &property.name,
            &property.type_fn.resolve(),
            &property.options,
            ctx.storage,
            ctx.options,
        )?;

        Ok(InputValueDefinition {
            name: property.schema_name.clone(),
            property_name: property.name.clone(),
            ty,
            default_value: property.options.default_value.clone(),
            description: property.description.clone(),
            deprecation_reason: property.deprecation_reason.clone(),
            directives: AstDefinitionNodeFactory::create_directive_nodes(&property.directives)?,
        })
    }
}

/// `complexity` first, declared extensions merged over it.
fn field_extensions(property: &PropertyMetadata) -> Extensions {
    let mut extensions = Extensions::new();
    if let Some(complexity) = property.complexity {
        extensions.insert("complexity".to_string(), Value::from(complexity as u64));
    }
    extensions.extend(
        property
            .extensions
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    extensions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ScalarKind;

    #[test]
    fn test_extensions_merge_over_complexity() {
        let property = PropertyMetadata::new("title", ScalarKind::String)
            .complexity(5)
            .extension("owner", "kitchen");
        let extensions = field_extensions(&property);
        assert_eq!(extensions["complexity"], Value::from(5u64));
        assert_eq!(extensions["owner"], Value::from("kitchen"));

        let overridden = PropertyMetadata::new("title", ScalarKind::String)
            .complexity(5)
            .extension("complexity", 9);
        assert_eq!(field_extensions(&overridden)["complexity"], Value::from(9));
    }
}
