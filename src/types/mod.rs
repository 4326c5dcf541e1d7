//! Wire types for the Gemini `generateContent` API and the tool bridge.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`content`] | Conversation turns and their parts (text, media, function calls) |
//! | [`request`] | Request body, tool wrappers and function-calling configuration |
//! | [`response`] | Response body with text and function-call extraction |
//! | [`tool`] | Function declarations, calls, results and the [`ExternalTool`] seam |

pub mod content;
pub mod request;
pub mod response;
pub mod tool;

pub use content::{Blob, Content, FileData, Part, Role};
pub use request::{
    FunctionCallingConfig, FunctionCallingMode, GenerateContentRequest, GenerationConfig, Tool,
    ToolConfig,
};
pub use response::{Candidate, GenerateContentResponse, UsageMetadata};
pub use tool::{
    ExternalTool, FunctionCall, FunctionDeclaration, FunctionResponse, ToolInvocationResult,
};
