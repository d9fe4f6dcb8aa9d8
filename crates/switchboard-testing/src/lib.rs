//! # Switchboard Testing
//!
//! Test doubles for exercising the orchestrator without processes or a
//! model endpoint.
//!
//! - **Mock Tools**: [`MockTool`] answers from a table and records its calls
//! - **Scripted Engine**: [`ScriptedEngine`] plays a fixed sequence of tool
//!   calls and an answer
//! - **Harness**: [`Harness`] serves registries in-process and wires them to
//!   a real registry, dispatcher and orchestrator
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use switchboard_agent::QueryOutcome;
//! use switchboard_core::Arguments;
//! use switchboard_testing::{Harness, MockTool, ScriptedEngine, Step, mock_registry};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let shout = MockTool::new("shout").with_default_response("HELLO");
//! let engine = ScriptedEngine::new(vec![
//!     Step::call("shout", Arguments::new().with("text", "hello")),
//!     Step::answer_with(|results| results[0].clone()),
//! ]);
//!
//! let mut harness = Harness::builder()
//!     .with_provider("loud", mock_registry(&[shout])?)
//!     .build(Arc::new(engine))
//!     .await?;
//!
//! let QueryOutcome::Answered(report) = harness.ask("say hello").await? else {
//!     unreachable!()
//! };
//! assert_eq!(report.answer, "HELLO");
//! # Ok(())
//! # }
//! ```

/// In-process providers and the orchestrator harness
pub mod harness;
/// Mock tools for predictable testing
pub mod mock_tools;
/// Reasoning engine driven by a script
pub mod scripted;

pub use harness::{Harness, HarnessBuilder, InMemoryProvider};
pub use mock_tools::{MockTool, mock_registry};
pub use scripted::{ScriptedEngine, Step};
