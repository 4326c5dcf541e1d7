//! # genai-toolbridge
//!
//! Bridge between externally catalogued tools and Gemini function calling.
//!
//! ## Overview
//!
//! A tool catalog (an MCP Toolbox server, or closures registered in process)
//! describes callables by name, description and JSON Schema. This crate turns
//! those into Gemini function declarations, sends a prompt with a
//! function-calling mode, invokes whatever tool the model selects, and asks
//! the model again with the tool's output embedded in a fresh prompt.
//!
//! The same Gemini client also covers plain chat: multi-turn sessions,
//! SSE streaming and file uploads through the Files API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use genai_toolbridge::bridge::ToolBridge;
//! use genai_toolbridge::toolbox::ToolboxClient;
//! use genai_toolbridge::types::ExternalTool;
//! use genai_toolbridge::GeminiClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> genai_toolbridge::Result<()> {
//!     let model = GeminiClient::builder().api_key("your-api-key").build()?;
//!     let toolbox = ToolboxClient::new("http://localhost:5000")?;
//!     let tools: Vec<Arc<dyn ExternalTool>> = toolbox
//!         .load_toolset("hotel")
//!         .await?
//!         .into_iter()
//!         .map(|t| Arc::new(t) as Arc<dyn ExternalTool>)
//!         .collect();
//!
//!     let run = ToolBridge::from_tools(&model, tools)
//!         .run("Find hotels in the USA")
//!         .await?;
//!     println!("{}", run.final_text().unwrap_or("(no answer)"));
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | Schema adaptation, request building, dispatch and follow-up |
//! | [`client`] | Gemini client, chat sessions, streaming and file upload |
//! | [`toolbox`] | MCP Toolbox catalog client |
//! | [`schema`] | JSON Schema → Gemini schema conversion |
//! | [`types`] | Gemini wire types and the [`types::ExternalTool`] seam |
//! | [`config`] | Environment-driven configuration |
//! | [`transport`] | Shared HTTP transport |

pub mod bridge;
pub mod client;
pub mod config;
pub mod schema;
pub mod toolbox;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use bridge::{BridgeRun, DispatchOutcome, DispatchPolicy, RunOutcome, ToolBridge};
pub use client::{ChatSession, GeminiClient, GeminiClientBuilder, ModelApi};
pub use config::BridgeConfig;
pub use toolbox::{ToolboxClient, ToolboxTool};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
