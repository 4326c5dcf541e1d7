//! Mock HTTP server setup for integration tests
#![allow(dead_code)]

use genai_toolbridge::{GeminiClient, ToolboxClient};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const MODEL: &str = "gemini-2.0-flash";
pub const API_KEY: &str = "test-key";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Gemini client pointed at the mock server via `base_url_override`.
    pub fn gemini_client(&self) -> GeminiClient {
        GeminiClient::builder()
            .api_key(API_KEY)
            .model(MODEL)
            .base_url_override(&self.base_url)
            .timeout(Duration::from_secs(5))
            .build()
            .expect("client builds")
    }

    pub fn toolbox_client(&self) -> ToolboxClient {
        ToolboxClient::with_timeout(&self.base_url, Some(Duration::from_secs(5)))
            .expect("toolbox client builds")
    }

    /// `generateContent` returning `body` with `status`; requires the API key header.
    pub async fn mock_generate(&self, status: u16, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", format!("/v1beta/models/{}:generateContent", MODEL).as_str())
            .match_header("x-goog-api-key", API_KEY)
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Same as [`mock_generate`](Self::mock_generate) but only for requests whose body
    /// contains `fragment`. Lets one test script several model turns.
    pub async fn mock_generate_matching(&self, fragment: &str, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", format!("/v1beta/models/{}:generateContent", MODEL).as_str())
            .match_body(Matcher::Regex(regex::escape(fragment)))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a mock for a successful streaming response (SSE)
    pub async fn mock_sse_stream(&self, chunks: Vec<String>) -> Mock {
        let mut server = self.server.lock().await;
        let body = chunks
            .iter()
            .map(|chunk| format!("data: {}\r\n\r\n", chunk))
            .collect::<Vec<_>>()
            .join("");
        server
            .mock(
                "POST",
                format!("/v1beta/models/{}:streamGenerateContent", MODEL).as_str(),
            )
            .match_query(Matcher::UrlEncoded("alt".into(), "sse".into()))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await
    }

    pub async fn mock_get_json(&self, path: &str, status: u16, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("GET", path)
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// POST mock that only matches when the JSON body equals `expected`.
    pub async fn mock_post_json(&self, path: &str, expected: Value, status: u16, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .match_body(Matcher::Json(expected))
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}

/// A model turn holding only text.
pub fn text_response(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16 }
    })
    .to_string()
}

/// A model turn holding one function call.
pub fn call_response(name: &str, args: Value) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "functionCall": { "name": name, "args": args } }] },
            "finishReason": "STOP",
            "index": 0
        }]
    })
    .to_string()
}

/// Toolbox manifest with one `search-hotels-by-name` tool.
pub fn hotel_manifest() -> String {
    json!({
        "serverVersion": "0.7.0",
        "tools": {
            "search-hotels-by-name": {
                "description": "Search for hotels based on country.",
                "parameters": [
                    { "name": "country", "type": "string", "description": "Country to filter by." }
                ]
            }
        }
    })
    .to_string()
}
