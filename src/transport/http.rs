use crate::{BoxStream, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Proxy, RequestBuilder};
use std::env;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout when neither the caller nor the environment sets one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Thin wrapper over a pooled `reqwest::Client` bound to one base URL.
///
/// Headers added with [`HttpTransport::with_header`] are sent on every request,
/// which is how API keys and toolbox auth tokens are attached.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let invalid = |details: String| {
            crate::Error::configuration_with_context(
                "invalid base URL",
                crate::ErrorContext::new()
                    .with_details(details)
                    .with_source("http_transport"),
            )
        };
        let parsed =
            url::Url::parse(base_url).map_err(|e| invalid(format!("'{}': {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("'{}': expected http or https", base_url)));
        }

        let timeout = timeout.unwrap_or_else(|| {
            Duration::from_secs(
                env::var("AI_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            )
        });

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("AI_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: HeaderMap::new(),
        })
    }

    /// Attach a header to every request made through this transport.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidHeader(format!("{}: {}", name, e)))?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidHeader(format!("{}: {}", name, e)))?;
        value.set_sensitive(true);
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a path against the base URL. Absolute URLs pass through untouched.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Absolute URL for `segments` appended to the base path, each one
    /// percent-encoded so names containing `/`, `?` or spaces stay one segment.
    pub fn segment_url(&self, segments: &[&str]) -> Result<String> {
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| TransportError::Other(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::Other(format!("{}: cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Start a request with the transport's default headers applied.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(%method, %url, "http request");
        self.client
            .request(method, url)
            .headers(self.headers.clone())
    }

    pub async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response> {
        req.send()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))
    }

    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// Turn a response body into a byte stream for incremental decoding.
    pub fn byte_stream(resp: reqwest::Response) -> BoxStream<'static, Bytes> {
        let stream = resp
            .bytes_stream()
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)));
        Box::pin(stream)
    }
}

/// Read a response body as text, mapping transport failures.
pub async fn read_text(resp: reqwest::Response) -> Result<String> {
    resp.text()
        .await
        .map_err(|e| crate::Error::Transport(TransportError::Http(e)))
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Transport error: {0}")]
    Other(String),
}
