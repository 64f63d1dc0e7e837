//! Type metadata: the declarative input of schema generation.
//!
//! Declaration sites describe their types with the builders in this module
//! and register them into a [`TypeMetadataStorage`]. Field types are given as
//! [`TypeThunk`]s so a declaration can point at a type that is declared later.

mod handle;
mod storage;
mod types;

pub use handle::{Nullability, ScalarKind, TypeHandle, TypeOptions, TypeTarget, TypeThunk};
pub use storage::TypeMetadataStorage;
pub use types::{
    ArgMetadata, ClassMetadata, ComputeFn, DirectiveMetadata, EnumMetadata, EnumValueMetadata,
    Extensions, MembersThunk, MethodArg, PropertyMetadata, ResolveTypeFn, UnionMetadata,
};
