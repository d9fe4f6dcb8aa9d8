//! Orchestrator side of a provider connection.
//!
//! A [`ProviderClient`] runs the MCP handshake and tool discovery once, then
//! carries `tools/call` requests. Requests on one client never interleave:
//! the peer lock is held from the moment a request is sent until its result
//! (or timeout) arrives.

use crate::error::{ChannelError, ChannelResult};
use crate::mapping::{spec_from_tool, value_from_call_result};
use crate::server::PeerInfo;
use rmcp::model::{CallToolRequestParams, ClientInfo, Implementation};
use rmcp::service::{Peer, RunningService};
use rmcp::transport::IntoTransport;
use rmcp::transport::child_process::TokioChildProcess;
use rmcp::{RoleClient, serve_client};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use switchboard_core::{InvocationRequest, OperationSpec};
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// How long a call waits for its result
    pub request_timeout: Duration,
    /// Bound on initialize plus tool discovery
    pub handshake_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

impl ChannelConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    Open,
    /// A transport failure; carries the reason
    Broken(String),
    /// The provider went away or the client was closed locally
    Closed,
}

impl ChannelState {
    pub fn is_open(&self) -> bool {
        matches!(self, ChannelState::Open)
    }
}

/// The orchestrator's connection to one provider.
pub struct ProviderClient {
    label: String,
    provider: PeerInfo,
    operations: Vec<OperationSpec>,
    peer: tokio::sync::Mutex<Peer<RoleClient>>,
    service: tokio::sync::Mutex<Option<RunningService<RoleClient, ClientInfo>>>,
    config: ChannelConfig,
    state: Mutex<ChannelState>,
    requests_sent: AtomicU64,
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("label", &self.label)
            .field("provider", &self.provider)
            .field("operations", &self.operations.len())
            .field("state", &self.state())
            .finish()
    }
}

fn client_info() -> ClientInfo {
    ClientInfo {
        client_info: Implementation {
            name: "switchboard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

impl ProviderClient {
    /// Start `command` as a child process and connect to it over its stdio.
    ///
    /// The child is killed when the client is closed or dropped.
    pub async fn spawn(
        label: impl Into<String>,
        mut command: Command,
        config: ChannelConfig,
    ) -> ChannelResult<Self> {
        command.kill_on_drop(true);
        let transport = TokioChildProcess::new(command)?;
        Self::connect(label, transport, config).await
    }

    /// Initialize over `transport` and discover the provider's operations.
    ///
    /// Tools whose schemas cannot be expressed as operations are skipped
    /// with a warning.
    pub async fn connect<T, E, A>(
        label: impl Into<String>,
        transport: T,
        config: ChannelConfig,
    ) -> ChannelResult<Self>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let label = label.into();
        let handshake = async {
            let service = serve_client(client_info(), transport)
                .await
                .map_err(|err| ChannelError::Initialize(err.to_string()))?;
            let tools = service.peer().list_all_tools().await?;
            Ok::<_, ChannelError>((service, tools))
        };
        let (service, tools) = tokio::time::timeout(config.handshake_timeout, handshake)
            .await
            .map_err(|_| ChannelError::Timeout(config.handshake_timeout))??;

        let peer = service.peer().clone();
        let provider = peer
            .peer_info()
            .map(|info| PeerInfo {
                name: info.server_info.name.clone(),
                version: info.server_info.version.clone(),
            })
            .unwrap_or_else(|| PeerInfo::new(label.clone()));

        let mut operations = Vec::with_capacity(tools.len());
        for tool in &tools {
            match spec_from_tool(tool) {
                Ok(spec) => operations.push(spec),
                Err(err) => warn!(channel = %label, error = %err, "skipping tool"),
            }
        }
        info!(
            channel = %label,
            provider = %provider.name,
            version = %provider.version,
            operations = operations.len(),
            "provider connected"
        );

        Ok(Self {
            label,
            provider,
            operations,
            peer: tokio::sync::Mutex::new(peer),
            service: tokio::sync::Mutex::new(Some(service)),
            config,
            state: Mutex::new(ChannelState::Open),
            requests_sent: AtomicU64::new(0),
        })
    }

    /// Identity the provider reported during initialize
    pub fn provider(&self) -> &PeerInfo {
        &self.provider
    }

    /// The provider's operations, in declaration order
    pub fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }

    /// Run one invocation and return the provider's payload
    pub async fn call(&self, invocation: &InvocationRequest) -> ChannelResult<Value> {
        let peer = self.peer.lock().await;
        self.ensure_open()?;

        let params = CallToolRequestParams {
            meta: None,
            name: invocation.operation.to_string().into(),
            arguments: Some(invocation.arguments.as_map().clone()),
            task: None,
        };
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
        debug!(
            channel = %self.label,
            request_id = %invocation.id,
            operation = %invocation.operation,
            "sending tools/call"
        );

        match tokio::time::timeout(self.config.request_timeout, peer.call_tool(params)).await {
            Err(_) => {
                warn!(
                    channel = %self.label,
                    request_id = %invocation.id,
                    timeout = ?self.config.request_timeout,
                    "no result before timeout"
                );
                Err(ChannelError::Timeout(self.config.request_timeout))
            }
            Ok(Err(err)) => Err(self.observe(err.into())),
            Ok(Ok(result)) => value_from_call_result(result),
        }
    }

    /// Stop the connection, waiting up to `grace` for the transport to close
    pub async fn close(&self, grace: Duration) {
        self.terminate(ChannelState::Closed);
        let Some(service) = self.service.lock().await.take() else {
            return;
        };
        match tokio::time::timeout(grace, service.cancel()).await {
            Ok(Ok(reason)) => debug!(channel = %self.label, ?reason, "connection closed"),
            Ok(Err(err)) => warn!(channel = %self.label, error = %err, "connection task failed"),
            Err(_) => warn!(channel = %self.label, "connection did not close in time, dropping"),
        }
    }

    pub fn state(&self) -> ChannelState {
        self.lock_state().clone()
    }

    /// Number of `tools/call` requests sent
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent.load(Ordering::Relaxed)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn lock_state(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_open(&self) -> ChannelResult<()> {
        match &*self.lock_state() {
            ChannelState::Open => Ok(()),
            ChannelState::Closed => Err(ChannelError::Closed),
            ChannelState::Broken(reason) => Err(ChannelError::Broken(reason.clone())),
        }
    }

    /// Record a fatal error as the channel's terminal state
    fn observe(&self, err: ChannelError) -> ChannelError {
        match &err {
            ChannelError::Closed => self.terminate(ChannelState::Closed),
            ChannelError::Broken(reason) => self.terminate(ChannelState::Broken(reason.clone())),
            _ => {}
        }
        err
    }

    /// The first terminal state wins
    fn terminate(&self, state: ChannelState) {
        let mut current = self.lock_state();
        if current.is_open() {
            if let ChannelState::Broken(reason) = &state {
                warn!(channel = %self.label, %reason, "channel broken");
            }
            *current = state;
        }
    }
}
