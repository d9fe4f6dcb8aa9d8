//! # Orchestrator Test Harness
//!
//! Runs MCP providers in-process over `tokio::io::duplex` pipes and wires them to
//! a real registry, dispatcher and orchestrator.

use std::sync::Arc;
use switchboard_agent::{
    AgentError, AgentResult, CapabilityRegistry, Dispatcher, OperationProvider, Orchestrator,
    ProviderHandle, QueryOutcome, ReasoningEngine, TransportConfig, shutdown_all,
};
use switchboard_core::{Arguments, ExecutionResult, IdValidationError, OperationSpec, ProviderId};
use switchboard_protocol::{PeerInfo, ProviderClient, ProviderServer};
use switchboard_tools::ToolRegistry;
use tokio::task::JoinHandle;

const PIPE_CAPACITY: usize = 64 * 1024;

/// A provider served from a background task instead of a process.
pub struct InMemoryProvider {
    pub handle: Arc<ProviderHandle>,
    server: JoinHandle<()>,
}

impl InMemoryProvider {
    /// Serve `registry` and complete the handshake with it.
    pub async fn start(
        name: &str,
        registry: impl ToolRegistry + 'static,
        transport: &TransportConfig,
    ) -> AgentResult<Self> {
        let id = ProviderId::parse(name).map_err(|source| invalid_name(name, source))?;
        let server = ProviderServer::new(PeerInfo::new(name), registry);

        let (client_read, server_write) = tokio::io::duplex(PIPE_CAPACITY);
        let (server_read, client_write) = tokio::io::duplex(PIPE_CAPACITY);
        let label = name.to_string();
        let server = tokio::spawn(async move {
            if let Err(err) = server.serve((server_read, server_write)).await {
                tracing::warn!(provider = %label, error = %err, "in-memory provider stopped");
            }
        });

        let client =
            ProviderClient::connect(name, (client_read, client_write), transport.channel_config())
                .await
                .map_err(|source| AgentError::Handshake {
                    provider: name.to_string(),
                    source,
                })?;
        let handle = ProviderHandle::new(id, client, transport);
        Ok(Self {
            handle: Arc::new(handle),
            server,
        })
    }

    /// Stop serving without telling the client, as if the process died.
    pub fn kill(&self) {
        self.server.abort();
    }
}

impl Drop for InMemoryProvider {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn invalid_name(name: &str, source: IdValidationError) -> AgentError {
    AgentError::Config(switchboard_agent::ConfigError::InvalidProviderName {
        name: name.to_string(),
        source,
    })
}

/// Builder for a [`Harness`].
pub struct HarnessBuilder {
    transport: TransportConfig,
    providers: Vec<(String, Box<dyn ToolRegistry>)>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            transport: TransportConfig::default(),
            providers: Vec::new(),
        }
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_provider(
        mut self,
        name: impl Into<String>,
        registry: impl ToolRegistry + 'static,
    ) -> Self {
        self.providers.push((name.into(), Box::new(registry)));
        self
    }

    /// Start every provider, build the registry and hand `engine` the
    /// resulting dispatcher.
    pub async fn build(self, engine: Arc<dyn ReasoningEngine>) -> AgentResult<Harness> {
        let mut providers = Vec::with_capacity(self.providers.len());
        for (name, registry) in self.providers {
            let provider =
                InMemoryProvider::start(&name, BoxedRegistry(registry), &self.transport).await?;
            providers.push(provider);
        }

        let registry = CapabilityRegistry::register(
            providers
                .iter()
                .map(|provider| provider.handle.clone() as Arc<dyn OperationProvider>)
                .collect(),
        )?;
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry)));
        let orchestrator = Orchestrator::new(engine, dispatcher.clone());

        Ok(Harness {
            orchestrator,
            dispatcher,
            providers,
        })
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards to a boxed registry so builders can hold mixed registry types.
struct BoxedRegistry(Box<dyn ToolRegistry>);

#[async_trait::async_trait]
impl ToolRegistry for BoxedRegistry {
    async fn dispatch(&self, name: &str, arguments: Arguments) -> Option<ExecutionResult> {
        self.0.dispatch(name, arguments).await
    }

    fn specs(&self) -> Vec<OperationSpec> {
        self.0.specs()
    }
}

/// Orchestrator wired to in-memory providers.
pub struct Harness {
    pub orchestrator: Orchestrator,
    pub dispatcher: Arc<Dispatcher>,
    providers: Vec<InMemoryProvider>,
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::new()
    }

    /// Run one query through the orchestrator
    pub async fn ask(&mut self, query: &str) -> AgentResult<QueryOutcome> {
        self.orchestrator.handle_query(query).await
    }

    pub fn provider(&self, name: &str) -> Option<&InMemoryProvider> {
        self.providers
            .iter()
            .find(|provider| provider.handle.id().as_str() == name)
    }

    pub async fn shutdown(&self) {
        shutdown_all(self.providers.iter().map(|provider| provider.handle.as_ref())).await;
    }
}
