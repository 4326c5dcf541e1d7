//! Initial request builder.

use crate::types::content::Content;
use crate::types::request::{
    FunctionCallingConfig, FunctionCallingMode, GenerateContentRequest, Tool, ToolConfig,
};
use crate::types::tool::FunctionDeclaration;

/// Build the first request of a bridge run: one user turn plus the declarations.
///
/// With [`FunctionCallingMode::Any`] the model must answer with a call to one of
/// the declared functions. An empty declaration list produces a plain text request.
pub fn build_initial_request(
    prompt: &str,
    declarations: Vec<FunctionDeclaration>,
    mode: FunctionCallingMode,
) -> GenerateContentRequest {
    build_initial_request_restricted(prompt, declarations, mode, None)
}

/// Same as [`build_initial_request`], optionally restricting which functions
/// the model may pick.
pub fn build_initial_request_restricted(
    prompt: &str,
    declarations: Vec<FunctionDeclaration>,
    mode: FunctionCallingMode,
    allowed_function_names: Option<Vec<String>>,
) -> GenerateContentRequest {
    let mut request = GenerateContentRequest::new(vec![Content::user_text(prompt)]);
    if declarations.is_empty() {
        return request;
    }

    request.tools = vec![Tool {
        function_declarations: declarations,
    }];
    request.tool_config = Some(ToolConfig {
        function_calling_config: FunctionCallingConfig {
            mode,
            allowed_function_names: allowed_function_names.filter(|names| !names.is_empty()),
        },
    });
    request
}
