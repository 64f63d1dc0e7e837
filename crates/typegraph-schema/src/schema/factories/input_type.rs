use super::{scalar_type_name, wrap_type};
use crate::config::BuildSchemaOptions;
use crate::error::SchemaBuildError;
use crate::metadata::{TypeOptions, TypeTarget};
use crate::schema::storage::{TypeDefinitionsStorage, TypeKind};
use crate::schema::type_ref::TypeReference;

/// Resolves the type of an argument or input field.
pub struct InputTypeFactory;

impl InputTypeFactory {
    /// Maps `target` to a wrapped input type reference.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError::UnknownInputType`] when `target` is a
    /// handle that is not a built input type or enum.
    pub fn create(
        field_name: &str,
        target: &TypeTarget,
        options: &TypeOptions,
        storage: &TypeDefinitionsStorage,
        build_options: &BuildSchemaOptions,
    ) -> Result<TypeReference, SchemaBuildError> {
        let name = match target {
            TypeTarget::Scalar(kind) => scalar_type_name(kind, build_options),
            TypeTarget::Type(handle) => {
                let unknown = || SchemaBuildError::UnknownInputType {
                    field: field_name.to_string(),
                    target: handle.to_string(),
                };
                match storage.input_type(handle) {
                    Some((_, TypeKind::Input))
                        if storage
                            .get_input_type_by_target(handle)
                            .is_some_and(|def| def.is_abstract) =>
                    {
                        return Err(unknown());
                    }
                    Some((name, _)) => name.to_string(),
                    None => return Err(unknown()),
                }
            }
        };
        Ok(wrap_type(name, options))
    }
}
