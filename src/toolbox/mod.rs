//! MCP Toolbox catalog client.
//!
//! Loads tool manifests over HTTP and exposes each entry as an
//! [`ExternalTool`](crate::types::ExternalTool) whose invocation posts back to
//! the server.

pub mod client;
pub mod manifest;

pub use client::{ToolboxClient, ToolboxTool};
pub use manifest::{ManifestSchema, ParameterSchema, ToolSchema};
