//! Dispatcher: match the model's function call to a registered tool and invoke it.

use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::types::response::GenerateContentResponse;
use crate::types::tool::{ExternalTool, FunctionCall, ToolInvocationResult};
use crate::{Error, Result};

/// Which of the model's function calls get processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Process the first call and ignore the rest.
    #[default]
    FirstOnly,
    /// Process every call, one after another, in emission order.
    All,
    /// Fail with [`Error::MultipleFunctionCalls`] when more than one call arrives.
    RejectIfMultiple,
}

impl FromStr for DispatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_only" | "first" => Ok(DispatchPolicy::FirstOnly),
            "all" => Ok(DispatchPolicy::All),
            "reject_if_multiple" | "reject" => Ok(DispatchPolicy::RejectIfMultiple),
            other => Err(format!(
                "unknown dispatch policy '{}' (expected first_only, all or reject_if_multiple)",
                other
            )),
        }
    }
}

/// Name-keyed lookup table over the loaded catalog. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ExternalTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from a catalog. Duplicate names: the later tool wins.
    pub fn from_tools<I>(tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ExternalTool>>,
    {
        let mut registry = Self::new();
        for tool in tools {
            registry.insert(tool);
        }
        registry
    }

    /// Register a tool, returning the entry it replaced.
    pub fn insert(&mut self, tool: Arc<dyn ExternalTool>) -> Option<Arc<dyn ExternalTool>> {
        let name = tool.name().to_string();
        let previous = self.tools.insert(name.clone(), tool);
        if previous.is_some() {
            warn!(tool = %name, "duplicate tool name in catalog, later entry replaces earlier one");
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ExternalTool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// One processed function call together with the tool's result.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub call: FunctionCall,
    pub result: ToolInvocationResult,
}

/// Terminal outcome of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The model answered in text; skip the follow-up call.
    NoCallMade { text: String },
    /// The model named a function nobody registered; nothing was invoked.
    UnknownTool { name: String },
    /// Every selected call was invoked, in order.
    Invoked(Vec<ToolInvocation>),
}

impl DispatchOutcome {
    pub fn results(&self) -> Vec<&ToolInvocationResult> {
        match self {
            DispatchOutcome::Invoked(invocations) => invocations.iter().map(|i| &i.result).collect(),
            _ => Vec::new(),
        }
    }
}

/// Dispatches model function calls against a [`ToolRegistry`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    policy: DispatchPolicy,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            policy: DispatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Inspect `response` for function calls and invoke the matching tools.
    ///
    /// All selected calls are resolved before any tool runs, so an unknown name
    /// never leaves a run half-invoked. Tool failures surface as
    /// [`Error::ToolInvocation`].
    pub async fn dispatch(&self, response: &GenerateContentResponse) -> Result<DispatchOutcome> {
        let calls = response.function_calls();
        if calls.is_empty() {
            info!("no function call returned, model answered directly");
            return Ok(DispatchOutcome::NoCallMade {
                text: response.text(),
            });
        }

        let selected: Vec<&FunctionCall> = match self.policy {
            DispatchPolicy::FirstOnly => {
                if calls.len() > 1 {
                    debug!(ignored = calls.len() - 1, "processing first function call only");
                }
                calls.into_iter().take(1).collect()
            }
            DispatchPolicy::All => calls,
            DispatchPolicy::RejectIfMultiple => {
                if calls.len() > 1 {
                    return Err(Error::MultipleFunctionCalls { count: calls.len() });
                }
                calls
            }
        };

        let mut resolved = Vec::with_capacity(selected.len());
        for call in selected {
            match self.registry.get(&call.name) {
                Some(tool) => resolved.push((call, tool)),
                None => {
                    warn!(function = %call.name, "model requested a function that is not registered");
                    return Ok(DispatchOutcome::UnknownTool {
                        name: call.name.clone(),
                    });
                }
            }
        }

        let mut invocations = Vec::with_capacity(resolved.len());
        for (call, tool) in resolved {
            let args = Value::Object(call.args.clone());
            info!(function = %call.name, args = %args, "invoking tool requested by model");
            let result = tool.invoke(&call.args).await.map_err(|e| match e {
                Error::ToolInvocation { .. } => e,
                other => Error::tool_invocation(call.name.clone(), other.to_string()),
            })?;
            debug!(function = %call.name, result = %result, "tool returned");
            invocations.push(ToolInvocation {
                call: call.clone(),
                result,
            });
        }

        Ok(DispatchOutcome::Invoked(invocations))
    }
}
