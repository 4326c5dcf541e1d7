//! Follow-up composer: embed tool output into a fresh user prompt.

use crate::types::content::Content;
use crate::types::request::GenerateContentRequest;
use crate::types::tool::ToolInvocationResult;

pub const DEFAULT_PREFIX: &str = "You are given the following tool output:\n";
pub const DEFAULT_SUFFIX: &str = "\nAnswer the original request using only this data.";

/// Builds the second request of a bridge run.
///
/// The request carries only the synthesized prompt: no history from the first
/// call, no function declarations and no function-calling mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpComposer {
    prefix: String,
    suffix: String,
}

impl Default for FollowUpComposer {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_SUFFIX)
    }
}

impl FollowUpComposer {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Prompt text: prefix, the stringified result verbatim, suffix.
    pub fn prompt(&self, result: &ToolInvocationResult) -> String {
        format!("{}{}{}", self.prefix, result, self.suffix)
    }

    pub fn compose(&self, result: &ToolInvocationResult) -> GenerateContentRequest {
        GenerateContentRequest::new(vec![Content::user_text(self.prompt(result))])
    }

    /// Compose over several results, one per line, between the same prefix and suffix.
    pub fn compose_many(&self, results: &[&ToolInvocationResult]) -> GenerateContentRequest {
        let body = results
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!("{}{}{}", self.prefix, body, self.suffix);
        GenerateContentRequest::new(vec![Content::user_text(prompt)])
    }
}
