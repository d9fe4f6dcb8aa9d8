//! Provider side: serve a tool registry as an MCP server.

use crate::error::ServeError;
use crate::mapping::{call_result_from, tool_from_spec};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer, ServerInitializeError};
use rmcp::transport::IntoTransport;
use rmcp::{ErrorData, ServerHandler};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use switchboard_core::{Arguments, OperationSpec};
use switchboard_tools::ToolRegistry;
use tracing::{debug, info};

/// Name and version a provider reports during initialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub name: String,
    pub version: String,
}

impl PeerInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Serves one provider's fixed operation set.
#[derive(Clone)]
pub struct ProviderServer {
    info: PeerInfo,
    registry: Arc<dyn ToolRegistry>,
    operations: Arc<Vec<OperationSpec>>,
    tools: Arc<Vec<Tool>>,
}

impl ProviderServer {
    pub fn new(info: PeerInfo, registry: impl ToolRegistry + 'static) -> Self {
        let operations = registry.specs();
        let tools = operations.iter().map(tool_from_spec).collect();
        Self {
            info,
            registry: Arc::new(registry),
            operations: Arc::new(operations),
            tools: Arc::new(tools),
        }
    }

    pub fn info(&self) -> &PeerInfo {
        &self.info
    }

    pub fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }

    /// Serve on the process's stdin and stdout
    pub async fn serve_stdio(self) -> Result<(), ServeError> {
        self.serve(rmcp::transport::io::stdio()).await
    }

    /// Answer requests until the client disconnects.
    ///
    /// A client that goes away before initializing is a clean exit.
    pub async fn serve<T, E, A>(self, transport: T) -> Result<(), ServeError>
    where
        T: IntoTransport<RoleServer, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let provider = self.info.name.clone();
        info!(
            provider = %provider,
            version = %self.info.version,
            operations = self.operations.len(),
            "provider ready"
        );

        let service = match rmcp::serve_server(self, transport).await {
            Ok(service) => service,
            Err(ServerInitializeError::ConnectionClosed(_)) => {
                info!(provider = %provider, "input closed before initialize");
                return Ok(());
            }
            Err(err) => return Err(ServeError::Initialize(err.to_string())),
        };

        let reason = service.waiting().await?;
        info!(provider = %provider, ?reason, "connection closed, shutting down");
        Ok(())
    }

    /// Run one `tools/call` against the registry
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = Arguments::from(arguments.unwrap_or_default());
        debug!(operation = %name, "calling operation");
        match self.registry.dispatch(name, arguments).await {
            Some(result) => {
                if let Some(reason) = result.failure_reason() {
                    debug!(operation = %name, %reason, "operation failed");
                }
                Ok(call_result_from(result))
            }
            None => Err(ErrorData::invalid_params(
                format!("unknown operation '{name}'"),
                Some(json!({ "name": name })),
            )),
        }
    }
}

impl ServerHandler for ProviderServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.info.name.clone(),
                version: self.info.version.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tools.to_vec(),
            next_cursor: None,
            meta: None,
        }))
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move { self.call(&request.name, request.arguments).await }
    }
}
