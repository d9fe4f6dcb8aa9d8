//! # Switchboard Agent
//!
//! The orchestrator side of Switchboard: it launches tool providers, merges
//! their declared operations into one registry, routes the reasoning
//! engine's tool calls to the owning provider and runs the interactive
//! query loop.
//!
//! - **Config**: [`SwitchboardConfig`] from TOML plus environment overrides
//! - **Providers**: [`ProviderHandle`] owns one provider process and its channel
//! - **Registry**: [`CapabilityRegistry`] maps operation names to providers
//! - **Dispatcher**: [`Dispatcher`] implements [`ToolInvoker`] over the registry
//! - **Engine**: [`ReasoningEngine`], with [`AzureOpenAiEngine`] as the
//!   production implementation
//! - **Loop**: [`Orchestrator`] keeps the conversation and prints reports
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use switchboard_agent::{
//!     AzureOpenAiEngine, CapabilityRegistry, Dispatcher, Orchestrator, OperationProvider,
//!     SwitchboardConfig, spawn_all,
//! };
//! use tokio::io::BufReader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SwitchboardConfig::load()?;
//!     let handles: Vec<Arc<_>> = spawn_all(&config.providers, &config.transport)
//!         .await?
//!         .into_iter()
//!         .map(Arc::new)
//!         .collect();
//!     let providers: Vec<Arc<dyn OperationProvider>> = handles
//!         .iter()
//!         .map(|handle| handle.clone() as Arc<dyn OperationProvider>)
//!         .collect();
//!
//!     let registry = Arc::new(CapabilityRegistry::register(providers)?);
//!     let engine = AzureOpenAiEngine::from_config(&config.engine)?;
//!     let mut orchestrator = Orchestrator::new(Arc::new(engine), Arc::new(Dispatcher::new(registry)));
//!
//!     let shutdown = async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     };
//!     orchestrator
//!         .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), shutdown)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod azure;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod registry;
pub mod report;

pub use azure::AzureOpenAiEngine;
pub use config::{
    ApiKey, ConfigError, EngineConfig, ProviderConfig, SwitchboardConfig, TransportConfig,
};
pub use dispatcher::{Dispatcher, ToolInvoker};
pub use engine::{ReasoningEngine, function_declarations};
pub use error::{AgentError, AgentResult};
pub use orchestrator::{LoopState, Orchestrator, QueryOutcome};
pub use provider::{OperationProvider, ProviderHandle, ProviderState, shutdown_all, spawn_all};
pub use registry::CapabilityRegistry;
pub use report::{NO_ANSWER, ToolUsage, TurnReport, final_answer};
