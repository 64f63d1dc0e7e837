//! Type identities and deferred type references.

use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use serde::{Deserialize, Serialize};

/// Identity of a declared type.
///
/// Handles are compared by value, so two registrations that use the same key
/// refer to the same type. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct TypeHandle(Arc<str>);

impl TypeHandle {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeHandle {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for TypeHandle {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl From<TypeHandle> for String {
    fn from(handle: TypeHandle) -> Self {
        handle.0.to_string()
    }
}

impl From<&TypeHandle> for TypeHandle {
    fn from(handle: &TypeHandle) -> Self {
        handle.clone()
    }
}

/// Built-in scalar kinds a field can point at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Boolean,
    Int,
    Float,
    Id,
    /// Mapped to `Float` or `Int` depending on the number scalar mode.
    Number,
    /// Mapped to `DateTime` or `Timestamp` depending on the date scalar mode.
    Date,
    /// A custom scalar registered under the given name.
    Custom(String),
}

/// What a type thunk yields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTarget {
    Scalar(ScalarKind),
    Type(TypeHandle),
}

impl TypeTarget {
    /// Returns the handle if this target is a declared type.
    pub fn handle(&self) -> Option<&TypeHandle> {
        match self {
            Self::Type(handle) => Some(handle),
            Self::Scalar(_) => None,
        }
    }
}

impl fmt::Display for TypeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(ScalarKind::Custom(name)) => f.write_str(name),
            Self::Scalar(kind) => write!(f, "{kind:?}"),
            Self::Type(handle) => write!(f, "{handle}"),
        }
    }
}

impl From<ScalarKind> for TypeTarget {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl From<TypeHandle> for TypeTarget {
    fn from(handle: TypeHandle) -> Self {
        Self::Type(handle)
    }
}

impl From<&str> for TypeTarget {
    fn from(key: &str) -> Self {
        Self::Type(TypeHandle::new(key))
    }
}

/// Deferred reference to a field's type.
///
/// Thunks let a declaration point at a type that has not been declared yet.
#[derive(Clone)]
pub struct TypeThunk(Arc<dyn Fn() -> TypeTarget + Send + Sync>);

impl TypeThunk {
    pub fn new(f: impl Fn() -> TypeTarget + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A thunk that always yields `target`.
    pub fn of(target: impl Into<TypeTarget>) -> Self {
        let target = target.into();
        Self::new(move || target.clone())
    }

    pub fn scalar(kind: ScalarKind) -> Self {
        Self::of(kind)
    }

    pub fn resolve(&self) -> TypeTarget {
        (self.0)()
    }
}

impl fmt::Debug for TypeThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeThunk").finish()
    }
}

impl From<TypeTarget> for TypeThunk {
    fn from(target: TypeTarget) -> Self {
        Self::of(target)
    }
}

impl From<ScalarKind> for TypeThunk {
    fn from(kind: ScalarKind) -> Self {
        Self::of(kind)
    }
}

impl From<TypeHandle> for TypeThunk {
    fn from(handle: TypeHandle) -> Self {
        Self::of(handle)
    }
}

impl From<&str> for TypeThunk {
    fn from(key: &str) -> Self {
        Self::of(key)
    }
}

/// Nullability of a field, argument or input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nullability {
    #[default]
    NonNull,
    /// The value (or the list itself) may be null.
    Nullable,
    /// List items may be null, the list may not.
    Items,
    /// Both the list and its items may be null.
    ItemsAndList,
}

impl Nullability {
    pub(crate) fn list_nullable(self) -> bool {
        matches!(self, Self::Nullable | Self::ItemsAndList)
    }

    pub(crate) fn items_nullable(self) -> bool {
        matches!(self, Self::Items | Self::ItemsAndList)
    }
}

/// Type modifiers declared alongside a thunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeOptions {
    pub nullable: Nullability,
    pub default_value: Option<Value>,
    pub list_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_identity() {
        assert_eq!(TypeHandle::new("Recipe"), TypeHandle::from("Recipe"));
        assert_ne!(TypeHandle::new("Recipe"), TypeHandle::new("IRecipe"));
        assert_eq!(TypeHandle::new("Recipe").to_string(), "Recipe");
    }

    #[test]
    fn test_handle_serializes_as_plain_string() {
        let json = serde_json::to_value(TypeHandle::new("Recipe")).unwrap();
        assert_eq!(json, serde_json::json!("Recipe"));

        let handles: Vec<TypeHandle> = serde_json::from_str(r#"["Query", "Mutation"]"#).unwrap();
        assert_eq!(handles, vec![TypeHandle::new("Query"), TypeHandle::new("Mutation")]);
    }

    #[test]
    fn test_thunk_is_deferred() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let thunk = TypeThunk::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            TypeTarget::from("Ingredient")
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(thunk.resolve().handle(), Some(&TypeHandle::new("Ingredient")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_nullability_flags() {
        assert!(Nullability::Nullable.list_nullable());
        assert!(!Nullability::Nullable.items_nullable());
        assert!(Nullability::Items.items_nullable());
        assert!(!Nullability::Items.list_nullable());
        assert!(Nullability::ItemsAndList.list_nullable());
        assert!(Nullability::ItemsAndList.items_nullable());
        assert!(!Nullability::NonNull.list_nullable());
    }
}
