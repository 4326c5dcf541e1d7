//! Environment-driven configuration shared by the binaries.

use std::time::Duration;

use crate::bridge::DispatchPolicy;
use crate::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::types::FunctionCallingMode;
use crate::{Error, ErrorContext, Result};

pub const DEFAULT_TOOLBOX_URL: &str = "http://localhost:5000";
pub const DEFAULT_TOOLSET: &str = "hotel";

/// Everything a bridge run needs from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub toolbox_url: String,
    pub toolset: String,
    pub function_calling_mode: FunctionCallingMode,
    pub dispatch_policy: DispatchPolicy,
    /// `None` leaves the transport default in place.
    pub http_timeout: Option<Duration>,
    /// Read by the transport itself; kept here for diagnostics.
    pub proxy_url: Option<String>,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let api_key = get("GEMINI_API_KEY").ok_or_else(|| {
            Error::configuration_with_context(
                "GEMINI_API_KEY is not set",
                ErrorContext::new()
                    .with_field_path("GEMINI_API_KEY")
                    .with_source("config"),
            )
        })?;

        let function_calling_mode = match get("BRIDGE_FUNCTION_CALLING_MODE") {
            Some(raw) => raw
                .parse::<FunctionCallingMode>()
                .map_err(|e| invalid("BRIDGE_FUNCTION_CALLING_MODE", e))?,
            None => FunctionCallingMode::Any,
        };

        let dispatch_policy = match get("BRIDGE_DISPATCH_POLICY") {
            Some(raw) => raw
                .parse::<DispatchPolicy>()
                .map_err(|e| invalid("BRIDGE_DISPATCH_POLICY", e))?,
            None => DispatchPolicy::default(),
        };

        let http_timeout = match get("AI_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    invalid(
                        "AI_HTTP_TIMEOUT_SECS",
                        format!("expected whole seconds, got '{}'", raw),
                    )
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key,
            base_url: or_default("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            model: or_default("GEMINI_MODEL", DEFAULT_MODEL),
            toolbox_url: or_default("TOOLBOX_URL", DEFAULT_TOOLBOX_URL),
            toolset: or_default("TOOLBOX_TOOLSET", DEFAULT_TOOLSET),
            function_calling_mode,
            dispatch_policy,
            http_timeout,
            proxy_url: get("AI_PROXY_URL"),
        })
    }
}

fn invalid(key: &str, details: String) -> Error {
    Error::configuration_with_context(
        format!("invalid value for {}", key),
        ErrorContext::new()
            .with_field_path(key)
            .with_details(details)
            .with_source("config"),
    )
}
