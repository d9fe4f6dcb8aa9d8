//! # Switchboard
//!
//! A tool orchestration runtime: a reasoning engine answers user queries by
//! calling operations served by independent provider processes over the
//! Model Context Protocol.
//!
//! This crate re-exports the workspace members:
//!
//! - [`types`]: names, operation declarations, arguments, messages, errors
//! - [`tools`]: the provider-side tool registry and the standard toolsets
//! - [`protocol`]: the MCP client, the provider server and tool mapping
//! - [`agent`]: configuration, provider lifecycle, registry, dispatcher,
//!   engines and the query loop

pub use switchboard_agent as agent;
pub use switchboard_core as types;
pub use switchboard_protocol as protocol;
pub use switchboard_tools as tools;

pub use switchboard_agent::{
    AgentError, AgentResult, AzureOpenAiEngine, CapabilityRegistry, Dispatcher, Orchestrator,
    ReasoningEngine, SwitchboardConfig, ToolInvoker,
};
pub use switchboard_core::{
    Arguments, Conversation, InvocationError, Message, OperationDescriptor, OperationName,
    ProviderId,
};
