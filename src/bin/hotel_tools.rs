//! hotel-tools: answer a hotel question with tools from an MCP Toolbox server.
//!
//! Usage:
//!   hotel-tools [PROMPT...]
//!
//! Configuration comes from the environment (GEMINI_API_KEY, TOOLBOX_URL,
//! TOOLBOX_TOOLSET, BRIDGE_FUNCTION_CALLING_MODE, BRIDGE_DISPATCH_POLICY, ...).

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use genai_toolbridge::bridge::{FollowUpComposer, RunOutcome, ToolBridge};
use genai_toolbridge::types::ExternalTool;
use genai_toolbridge::{BridgeConfig, GeminiClientBuilder, ToolboxClient};

const DEFAULT_PROMPT: &str = "You are a hotel expert:
You have been given a csv file containing hotel information.

Find from the list hotels that are in USA. Only return the hotel name, currency and country.";

const HOTEL_PREFIX: &str = "You are given the following hotel data in CSV format:";
const HOTEL_SUFFIX: &str = "Task: Answer questions by filtering this dataset based on the criteria provided. \
Find all hotels that are located in USA. \
Only return the hotel name, rating and country";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("genai_toolbridge=info,hotel_tools=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if matches!(args.first().map(String::as_str), Some("-h" | "--help")) {
        println!("usage: hotel-tools [PROMPT...]");
        return Ok(());
    }
    let prompt = if args.is_empty() {
        DEFAULT_PROMPT.to_string()
    } else {
        args.join(" ")
    };

    let config = BridgeConfig::from_env().context("loading configuration")?;
    let model = GeminiClientBuilder::from_config(&config)
        .build()
        .context("creating Gemini client")?;
    let toolbox = ToolboxClient::from_config(&config).context("creating Toolbox client")?;

    let tools: Vec<Arc<dyn ExternalTool>> = toolbox
        .load_toolset(&config.toolset)
        .await
        .with_context(|| format!("loading toolset '{}' from {}", config.toolset, toolbox.url()))?
        .into_iter()
        .map(|tool| Arc::new(tool) as Arc<dyn ExternalTool>)
        .collect();

    let bridge = ToolBridge::from_tools(&model, tools)
        .with_mode(config.function_calling_mode)
        .with_policy(config.dispatch_policy)
        .with_composer(FollowUpComposer::new(HOTEL_PREFIX, HOTEL_SUFFIX));

    let run = bridge.run(&prompt).await.context("running tool bridge")?;
    if !run.initial_text.is_empty() {
        println!("{}", run.initial_text);
    }

    match &run.outcome {
        RunOutcome::Answered => {
            println!("No function call returned by the model; it answered directly.");
        }
        RunOutcome::UnknownTool { name } => {
            println!("Model requested '{}', which is not in the toolset.", name);
        }
        RunOutcome::Completed {
            invocations,
            final_text,
        } => {
            for invocation in invocations {
                println!(
                    "--- Gemini requested function call: {} ---",
                    invocation.call.name
                );
                println!(
                    "--- Arguments: {} ---",
                    serde_json::Value::Object(invocation.call.args.clone())
                );
            }
            println!("=== Final response (after processing function result) ===");
            println!("{}", final_text);
        }
    }
    Ok(())
}
