//! The two-call flow: declare tools, let the model pick one, invoke it, ask again.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::bridge::adapter::adapt_all;
use crate::bridge::dispatch::{DispatchOutcome, DispatchPolicy, Dispatcher, ToolInvocation, ToolRegistry};
use crate::bridge::follow_up::FollowUpComposer;
use crate::bridge::request::build_initial_request_restricted;
use crate::client::ModelApi;
use crate::types::request::FunctionCallingMode;
use crate::types::tool::{ExternalTool, FunctionDeclaration};
use crate::Result;

/// How a bridge run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No function call; the initial text is the answer.
    Answered,
    /// The model named an unregistered function. No tool ran and no follow-up was sent.
    UnknownTool { name: String },
    /// Tools ran and the follow-up call produced `final_text`.
    Completed {
        invocations: Vec<ToolInvocation>,
        final_text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeRun {
    /// Text of the first model response (often empty when a call was made).
    pub initial_text: String,
    pub outcome: RunOutcome,
}

impl BridgeRun {
    /// The answer to show the user, if the run produced one.
    pub fn final_text(&self) -> Option<&str> {
        match &self.outcome {
            RunOutcome::Answered => Some(&self.initial_text),
            RunOutcome::Completed { final_text, .. } => Some(final_text),
            RunOutcome::UnknownTool { .. } => None,
        }
    }
}

/// Ties a model, a tool catalog and the bridge steps together.
pub struct ToolBridge<'a, M: ModelApi + ?Sized> {
    model: &'a M,
    declarations: Vec<FunctionDeclaration>,
    dispatcher: Dispatcher,
    composer: FollowUpComposer,
    mode: FunctionCallingMode,
    allowed_function_names: Option<Vec<String>>,
}

impl<'a, M: ModelApi + ?Sized> ToolBridge<'a, M> {
    /// Adapt `tools` into declarations and index them by name.
    ///
    /// On duplicate names the later tool wins, both for dispatch and for the
    /// declaration sent to the model.
    pub fn from_tools(model: &'a M, tools: Vec<Arc<dyn ExternalTool>>) -> Self {
        let mut declarations = adapt_all(&tools);
        let mut seen = HashSet::new();
        let mut keep: Vec<bool> = declarations
            .iter()
            .rev()
            .map(|d| seen.insert(d.name.clone()))
            .collect();
        keep.reverse();
        let mut keep = keep.into_iter();
        declarations.retain(|_| keep.next().unwrap_or(true));

        let registry = ToolRegistry::from_tools(tools);
        info!(tools = registry.len(), "tool bridge ready");
        Self {
            model,
            declarations,
            dispatcher: Dispatcher::new(Arc::new(registry)),
            composer: FollowUpComposer::default(),
            mode: FunctionCallingMode::Any,
            allowed_function_names: None,
        }
    }

    pub fn with_mode(mut self, mode: FunctionCallingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.dispatcher = self.dispatcher.with_policy(policy);
        self
    }

    pub fn with_composer(mut self, composer: FollowUpComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_allowed_function_names(mut self, names: Vec<String>) -> Self {
        self.allowed_function_names = Some(names);
        self
    }

    pub fn declarations(&self) -> &[FunctionDeclaration] {
        &self.declarations
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.dispatcher.registry()
    }

    pub async fn run(&self, prompt: &str) -> Result<BridgeRun> {
        let request = build_initial_request_restricted(
            prompt,
            self.declarations.clone(),
            self.mode,
            self.allowed_function_names.clone(),
        );
        let response = self.model.generate(&request).await?;
        let initial_text = response.text();

        let outcome = match self.dispatcher.dispatch(&response).await? {
            DispatchOutcome::NoCallMade { .. } => RunOutcome::Answered,
            DispatchOutcome::UnknownTool { name } => {
                warn!(function = %name, "skipping follow-up, requested tool is not registered");
                RunOutcome::UnknownTool { name }
            }
            DispatchOutcome::Invoked(invocations) => {
                let results: Vec<_> = invocations.iter().map(|i| &i.result).collect();
                let follow_up = self.composer.compose_many(&results);
                let final_response = self.model.generate(&follow_up).await?;
                info!(invocations = invocations.len(), "follow-up answered");
                RunOutcome::Completed {
                    invocations,
                    final_text: final_response.text(),
                }
            }
        };

        Ok(BridgeRun {
            initial_text,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::local::LocalTool;
    use crate::types::{
        Content, FunctionCall, GenerateContentRequest, GenerateContentResponse, Part,
        ToolInvocationResult,
    };
    use crate::Error;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request it receives.
    #[derive(Default)]
    struct ScriptedModel {
        replies: Mutex<VecDeque<GenerateContentResponse>>,
        requests: Mutex<Vec<GenerateContentRequest>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<GenerateContentResponse>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::default(),
            }
        }

        fn requests(&self) -> Vec<GenerateContentRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelApi for ScriptedModel {
        async fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies.lock().unwrap().pop_front().ok_or(Error::ModelRequest {
                status: None,
                message: "script exhausted".into(),
            })
        }
    }

    fn hotel_tool() -> Arc<dyn ExternalTool> {
        Arc::new(LocalTool::new(
            "search-hotels-by-name",
            "Search for hotels based on name.",
            json!({
                "type": "object",
                "properties": { "country": { "type": "string" } },
                "required": ["country"]
            }),
            |args| {
                assert_eq!(args.get("country"), Some(&json!("USA")));
                Ok(ToolInvocationResult::from("[{name: Hotel A, country: USA}]"))
            },
        ))
    }

    fn call(name: &str, args: serde_json::Value) -> GenerateContentResponse {
        GenerateContentResponse::from_content(Content::model(vec![Part::function_call(
            FunctionCall::new(name, args.as_object().cloned().unwrap_or_default()),
        )]))
    }

    #[tokio::test]
    async fn test_end_to_end_hotel_run() {
        let model = ScriptedModel::new(vec![
            call("search-hotels-by-name", json!({ "country": "USA" })),
            GenerateContentResponse::from_text("Hotel A, 4.5, USA"),
        ]);
        let bridge = ToolBridge::from_tools(&model, vec![hotel_tool()]);
        let run = bridge.run("Find hotels in USA").await.unwrap();

        assert_eq!(run.final_text(), Some("Hotel A, 4.5, USA"));
        match &run.outcome {
            RunOutcome::Completed { invocations, .. } => assert_eq!(invocations.len(), 1),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let requests = model.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].function_declarations().count(), 1);
        assert_eq!(
            requests[0].tool_config.as_ref().unwrap().function_calling_config.mode,
            FunctionCallingMode::Any
        );
        assert!(requests[1].tools.is_empty());
        assert!(requests[1].contents[0]
            .text()
            .contains("[{name: Hotel A, country: USA}]"));
    }

    #[tokio::test]
    async fn test_direct_answer_skips_follow_up() {
        let model = ScriptedModel::new(vec![GenerateContentResponse::from_text("Hello")]);
        let bridge = ToolBridge::from_tools(&model, vec![hotel_tool()]).with_mode(FunctionCallingMode::Auto);
        let run = bridge.run("hi").await.unwrap();
        assert_eq!(run.outcome, RunOutcome::Answered);
        assert_eq!(run.final_text(), Some("Hello"));
        assert_eq!(model.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_skips_follow_up() {
        let model = ScriptedModel::new(vec![call("delete-hotel", json!({}))]);
        let bridge = ToolBridge::from_tools(&model, vec![hotel_tool()]);
        let run = bridge.run("delete everything").await.unwrap();
        assert_eq!(
            run.outcome,
            RunOutcome::UnknownTool {
                name: "delete-hotel".into()
            }
        );
        assert_eq!(run.final_text(), None);
        assert_eq!(model.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_names_declared_once() {
        let model = ScriptedModel::default();
        let replacement: Arc<dyn ExternalTool> = Arc::new(LocalTool::new(
            "search-hotels-by-name",
            "Replacement search.",
            json!({ "type": "object" }),
            |_| Ok(ToolInvocationResult::from("replacement")),
        ));
        let bridge = ToolBridge::from_tools(&model, vec![hotel_tool(), replacement]);
        assert_eq!(bridge.declarations().len(), 1);
        assert_eq!(bridge.declarations()[0].description, "Replacement search.");
        assert_eq!(bridge.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_names_run_later_tool() {
        let replacement: Arc<dyn ExternalTool> = Arc::new(LocalTool::new(
            "search-hotels-by-name",
            "Replacement search.",
            json!({ "type": "object" }),
            |_| Ok(ToolInvocationResult::from("replacement")),
        ));
        let model = ScriptedModel::new(vec![
            call("search-hotels-by-name", json!({ "country": "France" })),
            GenerateContentResponse::from_text("done"),
        ]);
        let bridge = ToolBridge::from_tools(&model, vec![hotel_tool(), replacement]);
        let run = bridge.run("Find hotels").await.unwrap();
        assert_eq!(run.final_text(), Some("done"));
        assert!(model.requests()[1].contents[0].text().contains("replacement"));
    }

    #[tokio::test]
    async fn test_no_tools_sends_plain_request() {
        let model = ScriptedModel::new(vec![GenerateContentResponse::from_text("plain")]);
        let bridge = ToolBridge::from_tools(&model, Vec::new());
        let run = bridge.run("hi").await.unwrap();
        assert_eq!(run.final_text(), Some("plain"));
        let requests = model.requests();
        assert!(requests[0].tools.is_empty());
        assert!(requests[0].tool_config.is_none());
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = ScriptedModel::default();
        let bridge = ToolBridge::from_tools(&model, vec![hotel_tool()]);
        assert!(matches!(
            bridge.run("hi").await,
            Err(Error::ModelRequest { .. })
        ));
    }
}
