use crate::schema::SchemaParseError;
use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "GEMINI_MODEL", "tools[0].parameters")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config", "toolbox_client")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the model client, the tool catalog and the bridge.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    /// The model API rejected or failed a request. Never retried.
    #[error("Model request failed{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    ModelRequest { status: Option<u16>, message: String },

    /// A matched tool was invoked and reported a failure.
    #[error("Tool '{tool}' invocation failed: {message}")]
    ToolInvocation { tool: String, message: String },

    /// The model emitted several function calls under `DispatchPolicy::RejectIfMultiple`.
    #[error("Model requested {count} function calls; only one is accepted")]
    MultipleFunctionCalls { count: usize },

    #[error("Tool catalog error: {message}")]
    Catalog { message: String },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaParseError),

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn tool_invocation(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ToolInvocation {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Error::Catalog {
            message: message.into(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_rendering() {
        let err = Error::configuration_with_context(
            "invalid dispatch policy",
            ErrorContext::new()
                .with_field_path("BRIDGE_DISPATCH_POLICY")
                .with_details("got 'sometimes'"),
        );
        let msg = err.to_string();
        assert!(msg.contains("invalid dispatch policy"));
        assert!(msg.contains("field: BRIDGE_DISPATCH_POLICY"));
        assert!(msg.contains("details: got 'sometimes'"));
        assert!(err.context().is_some());
    }

    #[test]
    fn test_model_request_status_rendering() {
        let err = Error::ModelRequest {
            status: Some(429),
            message: "quota exhausted".into(),
        };
        assert_eq!(
            err.to_string(),
            "Model request failed (HTTP 429): quota exhausted"
        );
        let err = Error::ModelRequest {
            status: None,
            message: "empty body".into(),
        };
        assert_eq!(err.to_string(), "Model request failed: empty body");
    }
}
