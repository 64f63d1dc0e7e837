//! Schema build options.
//!
//! Options can be constructed in code or loaded from TOML.
//!
//! # Example Configuration
//!
//! ```toml
//! query = "Query"
//! mutation = "Mutation"
//! date_scalar_mode = "timestamp"
//! number_scalar_mode = "integer"
//! orphaned_types = ["Ingredient"]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SchemaBuildError;
use crate::metadata::TypeHandle;

/// How `Date` fields are exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateScalarMode {
    /// ISO-8601 strings through the `DateTime` scalar.
    #[default]
    IsoDate,
    /// Epoch milliseconds through the `Timestamp` scalar.
    Timestamp,
}

/// How `Number` fields are exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberScalarMode {
    #[default]
    Float,
    Integer,
}

/// Options for one schema build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSchemaOptions {
    /// Handle of the query root object type.
    #[serde(default = "default_query")]
    pub query: TypeHandle,

    /// Handle of the mutation root object type, if any.
    #[serde(default)]
    pub mutation: Option<TypeHandle>,

    /// Handle of the subscription root object type, if any.
    #[serde(default)]
    pub subscription: Option<TypeHandle>,

    /// Scalar used for `Date` fields.
    /// Default: iso_date
    #[serde(default)]
    pub date_scalar_mode: DateScalarMode,

    /// Scalar used for `Number` fields.
    /// Default: float
    #[serde(default)]
    pub number_scalar_mode: NumberScalarMode,

    /// Types to include even if nothing reaches them.
    #[serde(default)]
    pub orphaned_types: Vec<TypeHandle>,

    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,
}

fn default_query() -> TypeHandle {
    TypeHandle::new("Query")
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

impl Default for BuildSchemaOptions {
    fn default() -> Self {
        Self {
            query: default_query(),
            mutation: None,
            subscription: None,
            date_scalar_mode: DateScalarMode::default(),
            number_scalar_mode: NumberScalarMode::default(),
            orphaned_types: Vec::new(),
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
        }
    }
}

impl BuildSchemaOptions {
    /// Parses options from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_toml_str(input: &str) -> Result<Self, SchemaBuildError> {
        let options: Self =
            toml::from_str(input).map_err(|e| SchemaBuildError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns an error if option values are invalid.
    pub fn validate(&self) -> Result<(), SchemaBuildError> {
        if self.max_depth == 0 {
            return Err(SchemaBuildError::InvalidOptions(
                "max_depth must be > 0".into(),
            ));
        }
        if self.max_complexity == 0 {
            return Err(SchemaBuildError::InvalidOptions(
                "max_complexity must be > 0".into(),
            ));
        }
        let roots = [Some(&self.query), self.mutation.as_ref(), self.subscription.as_ref()];
        for (i, a) in roots.iter().enumerate() {
            for b in roots.iter().skip(i + 1) {
                if let (Some(a), Some(b)) = (a, b)
                    && a == b
                {
                    return Err(SchemaBuildError::InvalidOptions(format!(
                        "\"{a}\" is used as more than one root operation type"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Sets the query root handle.
    pub fn with_query(mut self, handle: impl Into<TypeHandle>) -> Self {
        self.query = handle.into();
        self
    }

    /// Sets the mutation root handle.
    pub fn with_mutation(mut self, handle: impl Into<TypeHandle>) -> Self {
        self.mutation = Some(handle.into());
        self
    }

    /// Sets the subscription root handle.
    pub fn with_subscription(mut self, handle: impl Into<TypeHandle>) -> Self {
        self.subscription = Some(handle.into());
        self
    }

    pub fn with_date_scalar_mode(mut self, mode: DateScalarMode) -> Self {
        self.date_scalar_mode = mode;
        self
    }

    pub fn with_number_scalar_mode(mut self, mode: NumberScalarMode) -> Self {
        self.number_scalar_mode = mode;
        self
    }

    /// Adds a type that must be part of the schema even when unreachable.
    pub fn with_orphaned_type(mut self, handle: impl Into<TypeHandle>) -> Self {
        self.orphaned_types.push(handle.into());
        self
    }

    pub fn with_introspection(mut self, enable: bool) -> Self {
        self.introspection = enable;
        self
    }
}
