//! Factories turning one piece of metadata into one schema construct.
//!
//! Stub factories (`create`) only read metadata. Body factories run in the
//! linking phase and consult the [`TypeDefinitionsStorage`] for the types a
//! field, argument or member refers to.

mod args;
mod ast_node;
mod composite;
mod enum_def;
mod field;
mod input_def;
mod input_type;
mod interface_def;
mod object_def;
mod output_type;
mod union_def;

pub use args::ArgsFactory;
pub use ast_node::AstDefinitionNodeFactory;
pub use enum_def::EnumDefinitionFactory;
pub use field::FieldFactory;
pub use input_def::InputTypeDefinitionFactory;
pub use input_type::InputTypeFactory;
pub use interface_def::InterfaceDefinitionFactory;
pub use object_def::ObjectTypeDefinitionFactory;
pub use output_type::OutputTypeFactory;
pub use union_def::UnionDefinitionFactory;

use super::storage::TypeDefinitionsStorage;
use super::type_ref::TypeReference;
use crate::config::{BuildSchemaOptions, DateScalarMode, NumberScalarMode};
use crate::metadata::{Nullability, ScalarKind, TypeMetadataStorage, TypeOptions};

/// Everything a body factory reads while linking.
#[derive(Clone, Copy)]
pub struct FactoryContext<'a> {
    pub metadata: &'a TypeMetadataStorage,
    pub storage: &'a TypeDefinitionsStorage,
    pub options: &'a BuildSchemaOptions,
}

/// Name of the built-in or custom scalar `kind` maps to.
pub(crate) fn scalar_type_name(kind: &ScalarKind, options: &BuildSchemaOptions) -> String {
    match kind {
        ScalarKind::String => "String".to_string(),
        ScalarKind::Boolean => "Boolean".to_string(),
        ScalarKind::Int => "Int".to_string(),
        ScalarKind::Float => "Float".to_string(),
        ScalarKind::Id => "ID".to_string(),
        ScalarKind::Number => match options.number_scalar_mode {
            NumberScalarMode::Float => "Float".to_string(),
            NumberScalarMode::Integer => "Int".to_string(),
        },
        ScalarKind::Date => match options.date_scalar_mode {
            DateScalarMode::IsoDate => "DateTime".to_string(),
            DateScalarMode::Timestamp => "Timestamp".to_string(),
        },
        ScalarKind::Custom(name) => name.clone(),
    }
}

/// Wraps a named type in the list and non-null layers `options` ask for.
///
/// A plain type is non-null unless declared nullable in any way. For lists,
/// the outer list is nullable for `Nullable` and `ItemsAndList`; items (and
/// nested lists) are nullable for `Items` and `ItemsAndList`.
pub(crate) fn wrap_type(name: String, options: &TypeOptions) -> TypeReference {
    let named = TypeReference::named(name);
    let nullable = options.nullable;

    if options.list_depth == 0 {
        return match nullable {
            Nullability::NonNull => named.non_null(),
            _ => named,
        };
    }

    let wrap_item = |ty: TypeReference| {
        if nullable.items_nullable() {
            ty
        } else {
            ty.non_null()
        }
    };

    let mut ty = wrap_item(named);
    for _ in 1..options.list_depth {
        ty = wrap_item(ty.list());
    }
    let list = ty.list();
    if nullable.list_nullable() {
        list
    } else {
        list.non_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(nullable: Nullability, list_depth: usize) -> TypeOptions {
        TypeOptions {
            nullable,
            default_value: None,
            list_depth,
        }
    }

    fn wrapped(nullable: Nullability, list_depth: usize) -> String {
        wrap_type("Recipe".to_string(), &options(nullable, list_depth)).to_string()
    }

    #[test]
    fn test_plain_types() {
        assert_eq!(wrapped(Nullability::NonNull, 0), "Recipe!");
        assert_eq!(wrapped(Nullability::Nullable, 0), "Recipe");
        assert_eq!(wrapped(Nullability::Items, 0), "Recipe");
        assert_eq!(wrapped(Nullability::ItemsAndList, 0), "Recipe");
    }

    #[test]
    fn test_list_types() {
        assert_eq!(wrapped(Nullability::NonNull, 1), "[Recipe!]!");
        assert_eq!(wrapped(Nullability::Nullable, 1), "[Recipe!]");
        assert_eq!(wrapped(Nullability::Items, 1), "[Recipe]!");
        assert_eq!(wrapped(Nullability::ItemsAndList, 1), "[Recipe]");
    }

    #[test]
    fn test_nested_lists_follow_items() {
        assert_eq!(wrapped(Nullability::NonNull, 2), "[[Recipe!]!]!");
        assert_eq!(wrapped(Nullability::Items, 2), "[[Recipe]]!");
        assert_eq!(wrapped(Nullability::ItemsAndList, 2), "[[Recipe]]");
    }

    #[test]
    fn test_scalar_modes() {
        let default = BuildSchemaOptions::default();
        assert_eq!(scalar_type_name(&ScalarKind::Date, &default), "DateTime");
        assert_eq!(scalar_type_name(&ScalarKind::Number, &default), "Float");
        assert_eq!(scalar_type_name(&ScalarKind::Id, &default), "ID");

        let custom = BuildSchemaOptions::default()
            .with_date_scalar_mode(DateScalarMode::Timestamp)
            .with_number_scalar_mode(NumberScalarMode::Integer);
        assert_eq!(scalar_type_name(&ScalarKind::Date, &custom), "Timestamp");
        assert_eq!(scalar_type_name(&ScalarKind::Number, &custom), "Int");
        assert_eq!(
            scalar_type_name(&ScalarKind::Custom("Upload".to_string()), &custom),
            "Upload"
        );
    }
}
