//! # Error Types
//!
//! The orchestration error taxonomy. Per-call failures ([`InvocationError`])
//! are recoverable and end up as text in front of the reasoning engine;
//! registration failures ([`RegistryError`]) abort startup.

use crate::conversation::Role;
use crate::identifiers::{OperationName, ProviderId};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single dispatched invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// No provider owns the requested name. No provider was contacted.
    #[error("unknown operation '{name}'")]
    UnknownOperation { name: String },

    /// The owning provider's channel is broken or its process has exited.
    #[error("provider '{provider}' is unavailable: {reason}")]
    ProviderUnavailable { provider: ProviderId, reason: String },

    /// The provider ran the operation and reported a failure.
    #[error("{message}")]
    ToolExecution {
        operation: OperationName,
        message: String,
    },

    /// No response arrived in time. The provider stays in service.
    #[error(
        "operation '{operation}' timed out after {}",
        humantime::format_duration(*.after)
    )]
    Timeout {
        operation: OperationName,
        after: Duration,
    },
}

impl InvocationError {
    /// Stable machine-readable category
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationError::UnknownOperation { .. } => "unknown_operation",
            InvocationError::ProviderUnavailable { .. } => "provider_unavailable",
            InvocationError::ToolExecution { .. } => "tool_execution_error",
            InvocationError::Timeout { .. } => "timeout",
        }
    }

    /// Whether repeating the same call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, InvocationError::Timeout { .. })
    }

    /// Text handed to the reasoning engine in place of a result
    pub fn to_engine_text(&self) -> String {
        format!("Error: {self}")
    }
}

/// Failure while merging provider declarations into one registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("operation '{operation}' is declared by both '{first}' and '{second}'")]
    DuplicateOperation {
        operation: OperationName,
        first: ProviderId,
        second: ProviderId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("expected a {expected} turn, got a {actual} turn")]
    OutOfOrder { expected: Role, actual: Role },
}
