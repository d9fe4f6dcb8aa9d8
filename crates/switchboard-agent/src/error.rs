//! Error types for the orchestrator.

use crate::config::ConfigError;
use switchboard_core::{ConversationError, Message, RegistryError};
use switchboard_protocol::ChannelError;
use thiserror::Error;

/// Errors raised while starting or running the orchestrator.
///
/// Per-call tool failures never show up here: they are
/// [`switchboard_core::InvocationError`]s and reach the engine as text.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A provider process could not be started.
    #[error("failed to start provider '{provider}': {source}")]
    Spawn {
        provider: String,
        #[source]
        source: std::io::Error,
    },

    /// A provider started but did not complete the handshake or discovery.
    #[error("handshake with provider '{provider}' failed: {source}")]
    Handshake {
        provider: String,
        #[source]
        source: ChannelError,
    },

    /// Two providers declared the same operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The reasoning engine failed to produce a transcript.
    #[error("{0}")]
    Engine(String),

    /// The engine failed partway through a turn, after it had already
    /// produced `produced` (tool requests and their results).
    #[error("{source}")]
    Interrupted {
        produced: Vec<Message>,
        #[source]
        source: Box<AgentError>,
    },

    /// A turn was appended out of order.
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    /// Reading the user's input or writing the transcript failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    pub fn engine(message: impl Into<String>) -> Self {
        AgentError::Engine(message.into())
    }

    /// Attach the part of the turn produced before this error
    pub fn interrupted(self, produced: Vec<Message>) -> Self {
        if produced.is_empty() {
            return self;
        }
        AgentError::Interrupted {
            produced,
            source: Box::new(self),
        }
    }

    /// Messages the engine produced before failing
    pub fn produced(&self) -> &[Message] {
        match self {
            AgentError::Interrupted { produced, .. } => produced,
            _ => &[],
        }
    }

    /// Whether the error happened before the first query could be served
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            AgentError::Config(_)
                | AgentError::Spawn { .. }
                | AgentError::Handshake { .. }
                | AgentError::Registry(_)
        )
    }

    /// Get the error code suitable for logging or reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::Config(_) => "CONFIG_ERROR",
            AgentError::Spawn { .. } => "SPAWN_FAILED",
            AgentError::Handshake { .. } => "HANDSHAKE_FAILED",
            AgentError::Registry(_) => "DUPLICATE_OPERATION",
            AgentError::Engine(_) => "ENGINE_ERROR",
            AgentError::Interrupted { source, .. } => source.error_code(),
            AgentError::Conversation(_) => "CONVERSATION_ORDER",
            AgentError::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type for orchestrator operations.
pub type AgentResult<T> = Result<T, AgentError>;
