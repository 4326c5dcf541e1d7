use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::client::builder::GeminiClientBuilder;
use crate::client::chat::ChatSession;
use crate::client::stream::response_stream;
use crate::client::ModelApi;
use crate::transport::http::read_text;
use crate::transport::HttpTransport;
use crate::types::{GenerateContentRequest, GenerateContentResponse};
use crate::{BoxStream, Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub(crate) const API_VERSION: &str = "v1beta";

/// HTTP client for one Gemini model.
///
/// Constructed once (see [`GeminiClientBuilder`]) and passed by reference to
/// whatever needs it; cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) model: String,
}

impl GeminiClient {
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Same connection pool and credentials, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            transport: self.transport.clone(),
            model: model.into(),
        }
    }

    /// Start a multi-turn chat with empty history.
    pub fn start_chat(&self) -> ChatSession<'_> {
        ChatSession::new(self)
    }

    fn model_path(&self, method: &str) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("/{}/models/{}:{}", API_VERSION, model, method)
    }

    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let started = Instant::now();
        info!(
            model = %self.model,
            turns = request.contents.len(),
            functions = request.function_declarations().count(),
            "generateContent"
        );
        let body = serde_json::to_value(request)?;
        let resp = self
            .transport
            .post_json(&self.model_path("generateContent"), &body)
            .await?;
        let resp = check_status(resp).await?;
        let text = read_text(resp).await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            finish_reason = ?parsed.finish_reason(),
            function_calls = parsed.function_calls().len(),
            "generateContent completed"
        );
        Ok(parsed)
    }

    /// Stream partial responses as they are produced (SSE).
    pub async fn generate_content_stream(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<BoxStream<'static, GenerateContentResponse>> {
        info!(model = %self.model, turns = request.contents.len(), "streamGenerateContent");
        let body = serde_json::to_value(request)?;
        let path = format!("{}?alt=sse", self.model_path("streamGenerateContent"));
        let req = self
            .transport
            .request(reqwest::Method::POST, &path)
            .header("accept", "text/event-stream")
            .json(&body);
        let resp = self.transport.send(req).await?;
        let resp = check_status(resp).await?;
        Ok(response_stream(HttpTransport::byte_stream(resp)))
    }
}

#[async_trait]
impl ModelApi for GeminiClient {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        self.generate_content(request).await
    }

    async fn generate_stream(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<BoxStream<'static, GenerateContentResponse>> {
        self.generate_content_stream(request).await
    }
}

/// Map a non-2xx response to [`Error::ModelRequest`], preferring the API's own message.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = read_text(resp).await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                trimmed.to_string()
            }
        });
    Err(Error::ModelRequest {
        status: Some(status.as_u16()),
        message,
    })
}
