use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::toolbox::manifest::{ManifestSchema, ParameterSchema, ToolSchema};
use crate::transport::http::read_text;
use crate::transport::HttpTransport;
use crate::types::tool::{ExternalTool, ToolInvocationResult};
use crate::{Error, Result};

/// Client for an MCP Toolbox server's HTTP API.
#[derive(Debug, Clone)]
pub struct ToolboxClient {
    transport: HttpTransport,
}

impl ToolboxClient {
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, None)
    }

    pub fn with_timeout(url: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(url, timeout)?,
        })
    }

    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        Self::with_timeout(&config.toolbox_url, config.http_timeout)
    }

    /// Header sent on every catalog and invocation request (e.g. an auth token).
    pub fn with_client_header(mut self, name: &str, value: &str) -> Result<Self> {
        self.transport = self.transport.with_header(name, value)?;
        Ok(self)
    }

    pub fn url(&self) -> &str {
        self.transport.base_url()
    }

    /// Load every tool in a toolset. An empty name loads the server's default toolset.
    pub async fn load_toolset(&self, name: &str) -> Result<Vec<ToolboxTool>> {
        let url = self.transport.segment_url(&["api", "toolset", name])?;
        let manifest = self.fetch_manifest(&url).await?;
        info!(
            toolset = %name,
            server_version = %manifest.server_version,
            tools = manifest.tools.len(),
            "toolset loaded"
        );
        let transport = Arc::new(self.transport.clone());
        Ok(manifest
            .tools
            .into_iter()
            .map(|(tool_name, schema)| ToolboxTool::new(tool_name, schema, transport.clone()))
            .collect())
    }

    pub async fn load_tool(&self, name: &str) -> Result<ToolboxTool> {
        let url = self.transport.segment_url(&["api", "tool", name])?;
        let mut manifest = self.fetch_manifest(&url).await?;
        let schema = manifest
            .tools
            .remove(name)
            .ok_or_else(|| Error::catalog(format!("tool '{}' not found in manifest", name)))?;
        Ok(ToolboxTool::new(
            name.to_string(),
            schema,
            Arc::new(self.transport.clone()),
        ))
    }

    async fn fetch_manifest(&self, url: &str) -> Result<ManifestSchema> {
        let resp = self.transport.get(url).await?;
        let status = resp.status();
        let body = read_text(resp).await?;
        if !status.is_success() {
            return Err(Error::catalog(format!(
                "GET {} returned HTTP {}: {}",
                url,
                status.as_u16(),
                error_message(&body)
            )));
        }
        serde_json::from_str(&body)
            .map_err(|e| Error::catalog(format!("invalid manifest from {}: {}", url, e)))
    }
}

/// Pull `error` out of a JSON body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| match v.get("error") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// A tool loaded from a Toolbox server; invoking it calls back into the server.
#[derive(Debug, Clone)]
pub struct ToolboxTool {
    name: String,
    description: String,
    schema: ToolSchema,
    transport: Arc<HttpTransport>,
}

impl ToolboxTool {
    fn new(name: String, schema: ToolSchema, transport: Arc<HttpTransport>) -> Self {
        Self {
            name,
            description: schema.description.clone(),
            schema,
            transport,
        }
    }

    pub fn parameters(&self) -> &[ParameterSchema] {
        &self.schema.parameters
    }
}

#[async_trait]
impl ExternalTool for ToolboxTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.schema.input_schema())?)
    }

    async fn invoke(&self, args: &Map<String, Value>) -> Result<ToolInvocationResult> {
        let url = self.transport.segment_url(&["api", "tool", self.name.as_str(), "invoke"])?;
        debug!(tool = %self.name, "invoking toolbox tool");
        let resp = self
            .transport
            .post_json(&url, &Value::Object(args.clone()))
            .await?;
        let status = resp.status();
        let body = read_text(resp).await?;
        if !status.is_success() {
            return Err(Error::tool_invocation(
                &self.name,
                format!("HTTP {}: {}", status.as_u16(), error_message(&body)),
            ));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| Error::tool_invocation(&self.name, format!("invalid response: {}", e)))?;
        if let Some(err) = value.get("error") {
            let message = match err {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(Error::tool_invocation(&self.name, message));
        }
        match value.get("result") {
            Some(result) => Ok(ToolInvocationResult::new(result.clone())),
            None => Err(Error::tool_invocation(
                &self.name,
                "response carries neither 'result' nor 'error'",
            )),
        }
    }
}
