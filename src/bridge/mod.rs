//! Tool-schema adaptation bridge.
//!
//! Turns externally described tools into function declarations, lets the model
//! pick one, invokes the matching tool and feeds its result into a follow-up
//! request:
//!
//! ```text
//! catalog ─► adapt ─► build_initial_request ─► model ─► dispatch ─► tool
//!                                                          │
//!                                 final answer ◄─ model ◄─ compose
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapter`] | `ExternalTool` → `FunctionDeclaration` (fail-soft on bad schemas) |
//! | [`request`] | Initial request with declarations and a function-calling mode |
//! | [`dispatch`] | Name-keyed registry, dispatch policy and tool invocation |
//! | [`follow_up`] | Prompt that embeds the tool result for the second call |
//! | [`local`] | In-process tools backed by a Rust closure |
//! | [`session`] | [`ToolBridge`], the two-call flow end to end |

pub mod adapter;
pub mod dispatch;
pub mod follow_up;
pub mod local;
pub mod request;
pub mod session;

pub use adapter::{adapt, adapt_all};
pub use dispatch::{DispatchOutcome, DispatchPolicy, Dispatcher, ToolInvocation, ToolRegistry};
pub use follow_up::FollowUpComposer;
pub use local::LocalTool;
pub use request::{build_initial_request, build_initial_request_restricted};
pub use session::{BridgeRun, RunOutcome, ToolBridge};
