//! `generateContent` response body.
//!
//! Shape: `{ candidates: [{ content: { parts: [...] }, finishReason }], usageMetadata }`.
//! Streaming responses use the same shape per chunk.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::content::Content;
use crate::types::tool::FunctionCall;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
    #[serde(default)]
    pub total_token_count: u64,
}

impl GenerateContentResponse {
    /// A text-only response with one candidate. Handy for fakes and tests.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_content(Content::model(vec![crate::types::Part::text(text)]))
    }

    pub fn from_content(content: Content) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(content),
                finish_reason: Some("STOP".into()),
                index: Some(0),
            }],
            ..Default::default()
        }
    }

    /// Text of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(Content::text)
            .unwrap_or_default()
    }

    /// Text of every candidate, in candidate order.
    pub fn texts(&self) -> Vec<String> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .map(Content::text)
            .collect()
    }

    /// Function calls of the first candidate, in the order the model emitted them.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.function_calls().collect())
            .unwrap_or_default()
    }

    /// Finish reason of the first candidate, normalized to lower-case names.
    pub fn finish_reason(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .map(|r| match r {
                "STOP" => "stop".to_string(),
                "MAX_TOKENS" => "length".to_string(),
                "SAFETY" | "RECITATION" => "content_filter".to_string(),
                other => other.to_lowercase(),
            })
    }
}
