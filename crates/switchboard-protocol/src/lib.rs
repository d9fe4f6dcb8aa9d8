//! # Switchboard Protocol
//!
//! Providers and the orchestrator speak the Model Context Protocol over the
//! provider's stdin and stdout, using the `rmcp` SDK.
//!
//! - **Client**: [`ProviderClient`] spawns or connects to a provider, runs
//!   the handshake and discovery, and serializes `tools/call` requests
//! - **Server**: [`ProviderServer`] serves a tool registry as an MCP server
//! - **Mapping**: operation specs and execution results to and from MCP
//!   tool messages ([`mapping`])
//!
//! ## Example: a provider on stdio
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use switchboard_protocol::{PeerInfo, ProviderServer};
//! use switchboard_tools::InMemoryToolRegistry;
//! use switchboard_tools::standard::{Arithmetic, ArithmeticTool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tools = InMemoryToolRegistry::new()
//!         .try_with_tool(Arc::new(ArithmeticTool::new(Arithmetic::Add)))?;
//!     ProviderServer::new(PeerInfo::new("math"), tools)
//!         .serve_stdio()
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod mapping;
pub mod server;

pub use client::{ChannelConfig, ChannelState, ProviderClient};
pub use error::{ChannelError, ChannelResult, ServeError};
pub use server::{PeerInfo, ProviderServer};
