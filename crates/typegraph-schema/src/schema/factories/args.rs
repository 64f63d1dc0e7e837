use std::collections::HashSet;

use indexmap::IndexMap;

use super::{FactoryContext, FieldFactory, InputTypeFactory};
use crate::error::SchemaBuildError;
use crate::metadata::{ArgMetadata, MethodArg, PropertyMetadata, TypeHandle};
use crate::schema::definitions::{ArgumentMap, InputValueDefinition};

/// Builds the argument map of a field.
pub struct ArgsFactory;

impl ArgsFactory {
    /// Maps single arguments directly and flattens args-type references into
    /// one argument per property, inherited properties included.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError::UnknownArgsType`] for an args reference
    /// that is not registered, or any argument type error.
    pub fn create(
        ctx: FactoryContext<'_>,
        field_name: &str,
        args: &[MethodArg],
    ) -> Result<ArgumentMap, SchemaBuildError> {
        let mut map = ArgumentMap::new();
        for arg in args {
            match arg {
                MethodArg::Single(arg) => {
                    let value = Self::create_single(ctx, arg)?;
                    map.insert(value.name.clone(), value);
                }
                MethodArg::Flatten(handle) => {
                    let properties =
                        collect_args_properties(ctx, field_name, handle, &mut HashSet::new())?;
                    for property in properties.values() {
                        let value = FieldFactory::create_input_value(ctx, property)?;
                        map.insert(value.name.clone(), value);
                    }
                }
            }
        }
        Ok(map)
    }

    fn create_single(
        ctx: FactoryContext<'_>,
        arg: &ArgMetadata,
    ) -> Result<InputValueDefinition, SchemaBuildError> {
        let ty = InputTypeFactory::create(
            &arg.name,
            &arg.type_fn.resolve(),
            &arg.options,
            ctx.storage,
            ctx.options,
        )?;
        Ok(InputValueDefinition {
            name: arg.name.clone(),
            property_name: arg.name.clone(),
            ty,
            default_value: arg.options.default_value.clone(),
            description: arg.description.clone(),
            deprecation_reason: None,
            directives: Vec::new(),
        })
    }
}

/// Properties of an args type keyed by schema name, parent properties first
/// and overridden by the subtype's own.
fn collect_args_properties(
    ctx: FactoryContext<'_>,
    field_name: &str,
    handle: &TypeHandle,
    visiting: &mut HashSet<TypeHandle>,
) -> Result<IndexMap<String, PropertyMetadata>, SchemaBuildError> {
    if !visiting.insert(handle.clone()) {
        return Err(SchemaBuildError::InheritanceCycle(handle.clone()));
    }

    let meta = ctx
        .metadata
        .get_args_type_metadata(handle)
        .ok_or_else(|| SchemaBuildError::UnknownArgsType {
            field: field_name.to_string(),
            target: handle.clone(),
        })?;

    let mut properties = match &meta.extends {
        Some(parent) if ctx.metadata.get_args_type_metadata(parent).is_some() => {
            collect_args_properties(ctx, field_name, parent, visiting)?
        }
        _ => IndexMap::new(),
    };
    for property in &meta.properties {
        properties.insert(property.schema_name.clone(), property.clone());
    }
    Ok(properties)
}
