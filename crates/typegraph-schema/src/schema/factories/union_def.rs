use std::sync::OnceLock;

use crate::error::SchemaBuildError;
use crate::metadata::UnionMetadata;
use crate::schema::definitions::{TypeLink, UnionDefinition, UnionType};
use crate::schema::storage::TypeDefinitionsStorage;

pub struct UnionDefinitionFactory;

impl UnionDefinitionFactory {
    /// Creates the union stub. Members stay unresolved until [`Self::link`].
    pub fn create(metadata: &UnionMetadata) -> UnionDefinition {
        UnionDefinition {
            target: metadata.target.clone(),
            ty: UnionType {
                name: metadata.name.clone(),
                description: metadata.description.clone(),
                members: OnceLock::new(),
            },
            resolve_type: metadata.resolve_type.clone(),
            types: metadata.types.clone(),
        }
    }

    /// Resolves the member thunk against the built object types.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError::InvalidUnionMember`] when a member is not
    /// a concrete object type.
    pub fn link(
        def: &UnionDefinition,
        storage: &TypeDefinitionsStorage,
    ) -> Result<(), SchemaBuildError> {
        if def.ty.members.get().is_some() {
            return Ok(());
        }

        let mut members: Vec<TypeLink> = Vec::new();
        for handle in (def.types)() {
            let object = storage
                .get_object_type_by_target(&handle)
                .filter(|object| !object.is_abstract)
                .ok_or_else(|| SchemaBuildError::InvalidUnionMember {
                    union: def.ty.name.clone(),
                    member: handle.clone(),
                })?;
            let link = TypeLink {
                handle,
                name: object.ty.name.clone(),
            };
            if !members.contains(&link) {
                members.push(link);
            }
        }

        let _ = def.ty.members.set(members);
        Ok(())
    }
}
