//! # Switchboard Core
//!
//! Types shared by the orchestrator and the tool providers: validated
//! names, operation declarations, tool arguments and results, the engine
//! transcript, the conversation log and the error taxonomy.

pub mod conversation;
pub mod error;
pub mod identifiers;
pub mod invocation;
pub mod message;
pub mod schema;
pub mod tool;

pub use conversation::{Conversation, Role, Turn};
pub use error::{ConversationError, InvocationError, RegistryError};
pub use identifiers::{IdValidationError, OperationName, ProviderId, RequestId};
pub use invocation::InvocationRequest;
pub use message::{Message, MessageRole, ToolCallRequest};
pub use schema::{OperationDescriptor, OperationSpec, ParamSpec, ParamType};
pub use tool::{Arguments, ExecutionResult, FailureReason, Tool, render_value};

/// Result of a dispatched invocation
pub type InvocationResult = Result<serde_json::Value, InvocationError>;
