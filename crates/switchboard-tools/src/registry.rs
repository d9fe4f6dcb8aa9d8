use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use switchboard_core::{Arguments, ExecutionResult, IdValidationError, OperationName, OperationSpec, Tool};
use thiserror::Error;

/// Errors raised while assembling or querying a provider's tool set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolRegistryError {
    #[error("tool not found: {0}")]
    NotFound(String),

    #[error("invalid tool name '{name}': {source}")]
    InvalidName {
        name: String,
        #[source]
        source: IdValidationError,
    },

    #[error("tool '{0}' is already registered")]
    Duplicate(OperationName),
}

/// Trait for managing and dispatching tool calls inside a provider.
///
/// A registry owns the fixed operation set a provider declares at startup
/// and routes each incoming call to the matching implementation.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Execute the named tool.
    ///
    /// Returns `None` if the requested tool is not found in the registry.
    async fn dispatch(&self, name: &str, arguments: Arguments) -> Option<ExecutionResult>;

    /// Declarations of every registered tool, in registration order
    fn specs(&self) -> Vec<OperationSpec>;

    /// Dispatch with a structured error for unknown names
    async fn try_dispatch(
        &self,
        name: &str,
        arguments: Arguments,
    ) -> Result<ExecutionResult, ToolRegistryError> {
        self.dispatch(name, arguments)
            .await
            .ok_or_else(|| ToolRegistryError::NotFound(name.to_string()))
    }
}

/// In-memory tool registry for a single provider process.
///
/// ```rust
/// use std::sync::Arc;
/// use switchboard_tools::InMemoryToolRegistry;
/// use switchboard_tools::standard::{Arithmetic, ArithmeticTool};
///
/// let registry = InMemoryToolRegistry::new()
///     .try_with_tool(Arc::new(ArithmeticTool::new(Arithmetic::Add)))
///     .unwrap();
/// assert!(registry.get_tool("add").is_some());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryToolRegistry {
    tools: HashMap<OperationName, Arc<dyn Tool>>,
    order: Vec<OperationName>,
}

impl InMemoryToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool using the builder pattern.
    ///
    /// Fails if the tool's name is invalid or already taken.
    pub fn try_with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, ToolRegistryError> {
        self.register(tool)?;
        Ok(self)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolRegistryError> {
        let name = OperationName::parse(tool.name()).map_err(|source| {
            ToolRegistryError::InvalidName {
                name: tool.name().to_string(),
                source,
            }
        })?;
        if self.tools.contains_key(&name) {
            return Err(ToolRegistryError::Duplicate(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let name = OperationName::parse(name).ok()?;
        self.tools.get(&name).cloned()
    }

    /// Registered names, in registration order
    pub fn tool_names(&self) -> &[OperationName] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[async_trait]
impl ToolRegistry for InMemoryToolRegistry {
    async fn dispatch(&self, name: &str, arguments: Arguments) -> Option<ExecutionResult> {
        let name = OperationName::parse(name).ok()?;
        let tool = self.tools.get(&name)?;
        Some(tool.call(arguments).await)
    }

    fn specs(&self) -> Vec<OperationSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .filter_map(|tool| tool.spec().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::{FailureReason, ParamSpec};

    struct UppercaseTool;

    #[async_trait]
    impl Tool for UppercaseTool {
        fn name(&self) -> &str {
            "uppercase"
        }

        fn parameters(&self) -> Vec<ParamSpec> {
            vec![ParamSpec::string("text")]
        }

        async fn call(&self, arguments: Arguments) -> ExecutionResult {
            arguments.string("text").map(str::to_uppercase).into()
        }
    }

    struct ReverseTool;

    #[async_trait]
    impl Tool for ReverseTool {
        fn name(&self) -> &str {
            "reverse"
        }

        async fn call(&self, arguments: Arguments) -> ExecutionResult {
            arguments
                .string("text")
                .map(|t| t.chars().rev().collect::<String>())
                .into()
        }
    }

    struct BadNameTool;

    #[async_trait]
    impl Tool for BadNameTool {
        fn name(&self) -> &str {
            "bad name"
        }

        async fn call(&self, _arguments: Arguments) -> ExecutionResult {
            ExecutionResult::failed(FailureReason::internal("unreachable"))
        }
    }

    fn registry() -> InMemoryToolRegistry {
        InMemoryToolRegistry::new()
            .try_with_tool(Arc::new(UppercaseTool))
            .unwrap()
            .try_with_tool(Arc::new(ReverseTool))
            .unwrap()
    }

    #[tokio::test]
    async fn registry_dispatches_to_correct_tool() {
        let registry = registry();
        let args = Arguments::new().with("text", "hello");

        let out = registry.dispatch("uppercase", args.clone()).await.unwrap();
        assert_eq!(out.render(), "HELLO");

        let out = registry.dispatch("reverse", args).await.unwrap();
        assert_eq!(out.render(), "olleh");
    }

    #[tokio::test]
    async fn registry_returns_none_for_unknown_tool() {
        let registry = registry();
        assert!(registry.dispatch("missing", Arguments::new()).await.is_none());
        assert!(registry.dispatch("not valid", Arguments::new()).await.is_none());

        let err = registry
            .try_dispatch("missing", Arguments::new())
            .await
            .unwrap_err();
        assert_eq!(err, ToolRegistryError::NotFound("missing".into()));
    }

    #[tokio::test]
    async fn tool_failures_are_results_not_errors() {
        let registry = registry();
        let out = registry
            .try_dispatch("uppercase", Arguments::new())
            .await
            .unwrap();
        assert!(out.is_failure());
    }

    #[test]
    fn registry_rejects_duplicates_and_invalid_names() {
        let err = registry().try_with_tool(Arc::new(ReverseTool)).err();
        assert_eq!(
            err,
            Some(ToolRegistryError::Duplicate(OperationName::new_unchecked(
                "reverse"
            )))
        );

        let err = InMemoryToolRegistry::new()
            .try_with_tool(Arc::new(BadNameTool))
            .err();
        assert!(matches!(err, Some(ToolRegistryError::InvalidName { .. })));
    }

    #[test]
    fn specs_follow_registration_order() {
        let registry = registry();
        let names: Vec<_> = registry
            .specs()
            .into_iter()
            .map(|s| s.name.to_string())
            .collect();
        assert_eq!(names, ["uppercase", "reverse"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert_eq!(registry.tool_names()[0], "uppercase");
    }
}
