use std::sync::Arc;
use std::time::Duration;

use crate::client::core::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::config::BridgeConfig;
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};

/// Builder for [`GeminiClient`].
///
/// Keep this surface area small and predictable.
#[derive(Debug, Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: Option<String>,
    /// Override base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder from an environment-derived configuration.
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            api_key: Some(config.api_key.clone()),
            model: Some(config.model.clone()),
            base_url_override: Some(config.base_url.clone()),
            timeout: config.http_timeout,
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the API base URL.
    ///
    /// This is primarily for testing with mock servers.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client. Fails when no API key was supplied.
    pub fn build(self) -> Result<GeminiClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "missing API key",
                    ErrorContext::new()
                        .with_field_path("GEMINI_API_KEY")
                        .with_source("gemini_client_builder"),
                )
            })?;
        let base_url = self
            .base_url_override
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let transport =
            HttpTransport::new(&base_url, self.timeout)?.with_header("x-goog-api-key", &api_key)?;

        Ok(GeminiClient {
            transport: Arc::new(transport),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}
