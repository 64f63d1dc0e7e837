use super::{scalar_type_name, wrap_type};
use crate::config::BuildSchemaOptions;
use crate::error::SchemaBuildError;
use crate::metadata::{TypeOptions, TypeTarget};
use crate::schema::storage::{TypeDefinitionsStorage, TypeKind};
use crate::schema::type_ref::TypeReference;

/// Resolves the output type of a field.
pub struct OutputTypeFactory;

impl OutputTypeFactory {
    /// Maps `target` to a wrapped output type reference.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError::UnknownOutputType`] when `target` is a
    /// handle that is not a built object, interface, enum or union, or names
    /// an abstract object type.
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
                let unknown = || SchemaBuildError::UnknownOutputType {
                    field: field_name.to_string(),
                    target: handle.to_string(),
                };
                match storage.output_type(handle) {
                    Some((_, TypeKind::Object))
                        if storage
                            .get_object_type_by_target(handle)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Nullability, ScalarKind};

    #[test]
    fn test_scalar_output() {
        let storage = TypeDefinitionsStorage::new();
        let options = TypeOptions {
            nullable: Nullability::Nullable,
            ..TypeOptions::default()
        };
        let ty = OutputTypeFactory::create(
            "creationDate",
            &TypeTarget::Scalar(ScalarKind::Date),
            &options,
            &storage,
            &BuildSchemaOptions::default(),
        )
        .unwrap();
        assert_eq!(ty.to_string(), "DateTime");
    }

    #[test]
    fn test_unknown_handle_names_field() {
        let storage = TypeDefinitionsStorage::new();
        let err = OutputTypeFactory::create(
            "ingredients",
            &TypeTarget::from("Ingredient"),
            &TypeOptions::default(),
            &storage,
            &BuildSchemaOptions::default(),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("\"ingredients\""));
        assert!(message.contains("Ingredient"));
    }
}
