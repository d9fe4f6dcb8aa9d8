//! Provider lifecycle: spawn, handshake, steady state and teardown.

use crate::config::{ProviderConfig, TransportConfig};
use crate::error::{AgentError, AgentResult};
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use switchboard_core::{InvocationRequest, OperationSpec, ProviderId};
use switchboard_protocol::{ChannelError, ProviderClient};
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderState {
    Starting,
    Ready,
    /// The channel failed; carries the reason
    Degraded(String),
    Stopped,
}

/// Something that owns a fixed set of operations and can run them.
///
/// [`ProviderHandle`] is the production implementation. Tests may supply
/// in-process fakes.
#[async_trait]
pub trait OperationProvider: Send + Sync {
    fn id(&self) -> &ProviderId;

    /// Operations discovered at startup, in declaration order
    fn operations(&self) -> &[OperationSpec];

    async fn call(&self, request: &InvocationRequest) -> Result<Value, ChannelError>;

    fn state(&self) -> ProviderState {
        ProviderState::Ready
    }

    /// Record an unrecoverable transport failure
    fn mark_degraded(&self, _reason: &str) {}
}

/// A running provider: its connection and declarations.
#[derive(Debug)]
pub struct ProviderHandle {
    id: ProviderId,
    client: ProviderClient,
    state: Mutex<ProviderState>,
    shutdown_grace: Duration,
}

impl ProviderHandle {
    /// Launch the configured process and complete the handshake.
    ///
    /// The process is killed if the handshake fails.
    pub async fn spawn(config: &ProviderConfig, transport: &TransportConfig) -> AgentResult<Self> {
        let id = ProviderId::parse(&config.name).map_err(|source| {
            crate::config::ConfigError::InvalidProviderName {
                name: config.name.clone(),
                source,
            }
        })?;

        debug!(provider = %id, command = %config.command, args = ?config.args, "spawning provider");
        let mut command = Command::new(&config.command);
        command
            .args(&config.args)
            .envs(&config.env)
            .stderr(Stdio::inherit());

        let client = ProviderClient::spawn(id.as_str(), command, transport.channel_config())
            .await
            .map_err(|err| match err {
                ChannelError::Io(source) => AgentError::Spawn {
                    provider: config.name.clone(),
                    source,
                },
                source => AgentError::Handshake {
                    provider: config.name.clone(),
                    source,
                },
            })?;
        Ok(Self::new(id, client, transport))
    }

    /// Adopt a client that has already completed its handshake
    pub fn new(id: ProviderId, client: ProviderClient, transport: &TransportConfig) -> Self {
        info!(
            provider = %id,
            server = %client.provider().name,
            version = %client.provider().version,
            operations = client.operations().len(),
            "provider ready"
        );
        Self {
            id,
            client,
            state: Mutex::new(ProviderState::Ready),
            shutdown_grace: transport.shutdown_grace(),
        }
    }

    fn set_state(&self, state: ProviderState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Number of calls sent to this provider
    pub fn requests_sent(&self) -> u64 {
        self.client.requests_sent()
    }

    /// Close the connection. A process that has not exited within the
    /// grace period is killed.
    pub async fn shutdown(&self) {
        self.client.close(self.shutdown_grace).await;
        self.set_state(ProviderState::Stopped);
    }
}

#[async_trait]
impl OperationProvider for ProviderHandle {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn operations(&self) -> &[OperationSpec] {
        self.client.operations()
    }

    async fn call(&self, request: &InvocationRequest) -> Result<Value, ChannelError> {
        self.client.call(request).await
    }

    fn state(&self) -> ProviderState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn mark_degraded(&self, reason: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == ProviderState::Ready {
            warn!(provider = %self.id, %reason, "provider degraded");
            *state = ProviderState::Degraded(reason.to_string());
        }
    }
}

/// Spawn every configured provider in order.
///
/// On failure the providers already started are shut down before the error
/// is returned.
pub async fn spawn_all(
    providers: &[ProviderConfig],
    transport: &TransportConfig,
) -> AgentResult<Vec<ProviderHandle>> {
    let mut started: Vec<ProviderHandle> = Vec::with_capacity(providers.len());
    for config in providers {
        match ProviderHandle::spawn(config, transport).await {
            Ok(handle) => started.push(handle),
            Err(err) => {
                shutdown_all(&started).await;
                return Err(err);
            }
        }
    }
    Ok(started)
}

/// Shut every provider down concurrently.
pub async fn shutdown_all<'a>(handles: impl IntoIterator<Item = &'a ProviderHandle>) {
    futures::future::join_all(handles.into_iter().map(|handle| handle.shutdown())).await;
}
