//! In-process tools backed by a Rust closure.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::types::tool::{ExternalTool, ToolInvocationResult};
use crate::Result;

type Handler = dyn Fn(&Map<String, Value>) -> Result<ToolInvocationResult> + Send + Sync;

/// A tool whose schema is given as JSON and whose body is a synchronous closure.
///
/// Useful for bridging local functions next to remote catalog tools, and as a
/// stand-in for remote tools in tests.
#[derive(Clone)]
pub struct LocalTool {
    name: String,
    description: String,
    schema: Value,
    handler: Arc<Handler>,
}

impl LocalTool {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(&Map<String, Value>) -> Result<ToolInvocationResult> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for LocalTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ExternalTool for LocalTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.schema)?)
    }

    async fn invoke(&self, arguments: &Map<String, Value>) -> Result<ToolInvocationResult> {
        (self.handler)(arguments)
    }
}
