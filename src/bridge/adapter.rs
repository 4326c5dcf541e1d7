//! Schema adapter: external tool → function declaration.

use std::sync::Arc;
use tracing::warn;

use crate::schema::StructuredSchema;
use crate::types::tool::{ExternalTool, FunctionDeclaration};
use crate::Result;

/// Convert one external tool into a function declaration.
///
/// A schema that cannot be read or parsed yields a declaration without
/// parameters; one malformed tool never blocks the rest of the catalog.
/// Unsupported nested nodes are dropped inside the schema instead.
pub fn adapt(tool: &dyn ExternalTool) -> FunctionDeclaration {
    let parameters = match input_parameters(tool) {
        Ok(schema) => Some(schema),
        Err(e) => {
            warn!(tool = tool.name(), error = %e, "declaring tool without parameters");
            None
        }
    };

    FunctionDeclaration {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        parameters,
    }
}

/// Read and parse a tool's schema. Parse failures surface as [`Error::Schema`].
fn input_parameters(tool: &dyn ExternalTool) -> Result<StructuredSchema> {
    let bytes = tool.input_schema()?;
    Ok(StructuredSchema::from_slice(&bytes)?)
}

/// Adapt a whole catalog, preserving order.
pub fn adapt_all(tools: &[Arc<dyn ExternalTool>]) -> Vec<FunctionDeclaration> {
    tools.iter().map(|t| adapt(t.as_ref())).collect()
}
