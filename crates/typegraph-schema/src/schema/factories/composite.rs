//! Body resolution shared by object and interface types.

use std::sync::Arc;

use tracing::trace;

use super::{FactoryContext, FieldFactory};
use crate::error::SchemaBuildError;
use crate::metadata::{ClassMetadata, TypeHandle};
use crate::schema::definitions::{CompositeBody, CompositeType, FieldMap, TypeLink};

/// Resolves the implemented interfaces and the field map of a type.
///
/// Interfaces are the declared ones followed by the parent's, deduplicated by
/// handle. Fields are built in three layers, each overriding the previous by
/// schema name: the parent's fields, the declared interfaces' fields, then the
/// type's own properties.
///
/// Declared interfaces and the parent must already be linked.
pub(crate) fn link_body(
    ctx: FactoryContext<'_>,
    metadata: &ClassMetadata,
    parent: Option<&CompositeType>,
) -> Result<CompositeBody, SchemaBuildError> {
    let mut interfaces: Vec<TypeLink> = Vec::new();
    let mut fields = FieldMap::new();

    for handle in &metadata.interfaces {
        let interface = ctx
            .storage
            .get_interface_by_target(handle)
            .ok_or_else(|| missing_interface(metadata, handle))?;
        let link = TypeLink {
            handle: handle.clone(),
            name: interface.ty.name.clone(),
        };
        if !interfaces.contains(&link) {
            interfaces.push(link);
        }
        for (name, field) in interface.ty.fields()? {
            fields.insert(name.clone(), Arc::clone(field));
        }
    }

    for property in &metadata.properties {
        let field = FieldFactory::create_output_field(ctx, property)?;
        fields.insert(field.name.clone(), Arc::new(field));
    }

    if let Some(parent) = parent {
        for link in parent.interfaces()? {
            if !interfaces.contains(link) {
                interfaces.push(link.clone());
            }
        }
        let mut merged = parent.fields()?.clone();
        merged.extend(fields);
        fields = merged;
    }

    trace!(
        type_name = %metadata.name,
        interfaces = interfaces.len(),
        fields = fields.len(),
        "Linked type body"
    );
    Ok(CompositeBody { interfaces, fields })
}

fn missing_interface(metadata: &ClassMetadata, handle: &TypeHandle) -> SchemaBuildError {
    SchemaBuildError::MissingInterface {
        type_name: metadata.name.clone(),
        interface: handle.clone(),
    }
}
