//! # Switchboard Tools
//!
//! Everything a provider process needs on its side of the channel: a
//! registry that owns the provider's fixed operation set, the standard
//! tool implementations and the named toolsets that group them.

/// Tool registry implementations for managing collections of tools.
pub mod registry;
/// Standard tool library.
pub mod standard;
/// Named groups of standard tools, one per provider process.
pub mod toolset;

pub use registry::{InMemoryToolRegistry, ToolRegistry, ToolRegistryError};
pub use switchboard_core::{Arguments, ExecutionResult, Tool};
pub use toolset::{Toolset, ToolsetError, ToolsetSettings};
