//! Protocol error types

use rmcp::service::ServiceError;
use std::time::Duration;
use thiserror::Error;

/// Errors seen by a caller of [`crate::ProviderClient`].
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The provider process could not be started
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The MCP initialize exchange failed
    #[error("initialize failed: {0}")]
    Initialize(String),

    /// The provider closed its end (process exited or stdout closed)
    #[error("channel closed by provider")]
    Closed,

    /// A transport failure made the connection unusable
    #[error("channel broken: {0}")]
    Broken(String),

    /// No response arrived in time; the channel stays open
    #[error("no response within {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    /// The provider rejected the request with a JSON-RPC error
    #[error("provider error {code}: {message}")]
    Remote { code: i64, message: String },

    /// The operation ran and reported a failure
    #[error("{0}")]
    ToolFailed(String),

    /// The provider answered, but not with something we can use
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Channel result type
pub type ChannelResult<T> = Result<T, ChannelError>;

impl From<ServiceError> for ChannelError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::McpError(error) => ChannelError::Remote {
                code: i64::from(error.code.0),
                message: error.message.into_owned(),
            },
            ServiceError::TransportClosed => ChannelError::Closed,
            other => ChannelError::Broken(other.to_string()),
        }
    }
}

impl ChannelError {
    /// Whether the channel can no longer carry requests
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ChannelError::Io(_)
                | ChannelError::Initialize(_)
                | ChannelError::Closed
                | ChannelError::Broken(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ChannelError::Timeout(_))
    }

    /// JSON-RPC error code reported by the provider, if any
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            ChannelError::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Failure to serve a provider.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("initialize failed: {0}")]
    Initialize(String),

    #[error("provider task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
