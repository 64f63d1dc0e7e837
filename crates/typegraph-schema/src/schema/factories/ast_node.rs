//! Directive parsing.
//!
//! Directives are declared as raw SDL (`@key(fields: "id")`). They are parsed
//! by wrapping them onto a throwaway scalar definition and reading the
//! directive list back from the parsed document.

use async_graphql_parser::types::{ConstDirective, TypeSystemDefinition};
use async_graphql_value::ConstValue;
use indexmap::IndexMap;
use tracing::trace;

use crate::error::SchemaBuildError;
use crate::metadata::DirectiveMetadata;
use crate::schema::definitions::DirectiveNode;

/// Builds directive nodes for types and fields.
pub struct AstDefinitionNodeFactory;

impl AstDefinitionNodeFactory {
    /// Parses every directive in `directives`, keeping declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError::InvalidDirective`] for SDL that does not
    /// parse as directives.
    pub fn create_directive_nodes(
        directives: &[DirectiveMetadata],
    ) -> Result<Vec<DirectiveNode>, SchemaBuildError> {
        let mut nodes = Vec::with_capacity(directives.len());
        for directive in directives {
            nodes.extend(Self::parse(&directive.sdl)?);
        }
        Ok(nodes)
    }

    fn parse(sdl: &str) -> Result<Vec<DirectiveNode>, SchemaBuildError> {
        let invalid = |reason: String| SchemaBuildError::InvalidDirective {
            sdl: sdl.to_string(),
            reason,
        };

        let trimmed = sdl.trim();
        if !trimmed.starts_with('@') {
            return Err(invalid("directive must start with '@'".to_string()));
        }

        let document = async_graphql_parser::parse_schema(format!("scalar Directives {trimmed}"))
            .map_err(|e| invalid(e.to_string()))?;

        let Some(TypeSystemDefinition::Type(definition)) = document.definitions.into_iter().next()
        else {
            return Err(invalid("unexpected document shape".to_string()));
        };

        let nodes: Vec<DirectiveNode> = definition
            .node
            .directives
            .into_iter()
            .map(|directive| to_node(directive.node))
            .collect();
        if nodes.is_empty() {
            return Err(invalid("no directive found".to_string()));
        }

        trace!(sdl = %trimmed, count = nodes.len(), "Parsed directive nodes");
        Ok(nodes)
    }
}

fn to_node(directive: ConstDirective) -> DirectiveNode {
    let arguments: IndexMap<String, ConstValue> = directive
        .arguments
        .into_iter()
        .map(|(name, value)| (name.node.to_string(), value.node))
        .collect();
    DirectiveNode {
        name: directive.name.node.to_string(),
        arguments,
    }
}
