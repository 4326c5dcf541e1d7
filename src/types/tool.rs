//! Function-calling types and the external tool seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::schema::StructuredSchema;

/// Model-facing description of a callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// `None` when the tool's schema could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<StructuredSchema>,
}

/// Function call emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            id: None,
            name: name.into(),
            args,
        }
    }
}

/// Result of a function call sent back to the model as a structured part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub response: Value,
}

/// Opaque value produced by invoking an external tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolInvocationResult(pub Value);

impl ToolInvocationResult {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Strings render verbatim, anything else as compact JSON.
impl fmt::Display for ToolInvocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<Value> for ToolInvocationResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<String> for ToolInvocationResult {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<&str> for ToolInvocationResult {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

/// An externally described callable: name, description, JSON Schema bytes and
/// an invocation entry point.
///
/// Implementations are immutable once loaded and shared behind `Arc`.
#[async_trait]
pub trait ExternalTool: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Raw JSON Schema describing the accepted arguments.
    fn input_schema(&self) -> crate::Result<Vec<u8>>;

    /// Invoke the tool with the model-supplied arguments.
    async fn invoke(&self, arguments: &Map<String, Value>) -> crate::Result<ToolInvocationResult>;
}
