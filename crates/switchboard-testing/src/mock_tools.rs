//! # Mock Tools for Testing
//!
//! Tools with predictable responses, for serving from in-memory providers.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use switchboard_core::{Arguments, ExecutionResult, FailureReason, ParamSpec, Tool};
use switchboard_tools::{InMemoryToolRegistry, ToolRegistryError};

/// A mock tool that answers from a table keyed by the call's arguments.
///
/// Unmatched calls get the default response, or the arguments echoed back
/// as an object when no default is set.
#[derive(Debug, Clone)]
pub struct MockTool {
    name: String,
    description: String,
    parameters: Vec<ParamSpec>,
    responses: HashMap<String, ExecutionResult>,
    default_response: Option<ExecutionResult>,
    call_history: Arc<Mutex<Vec<Arguments>>>,
}

impl MockTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameters: Vec::new(),
            responses: HashMap::new(),
            default_response: None,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Respond with `output` when called with exactly `arguments`
    pub fn with_response(mut self, arguments: Arguments, output: impl Into<Value>) -> Self {
        self.responses
            .insert(key(&arguments), ExecutionResult::success(output));
        self
    }

    /// Fail with `message` when called with exactly `arguments`
    pub fn with_failure(mut self, arguments: Arguments, message: impl Into<String>) -> Self {
        self.responses.insert(
            key(&arguments),
            ExecutionResult::failed(FailureReason::internal(message)),
        );
        self
    }

    pub fn with_default_response(mut self, output: impl Into<Value>) -> Self {
        self.default_response = Some(ExecutionResult::success(output));
        self
    }

    pub fn with_default_failure(mut self, message: impl Into<String>) -> Self {
        self.default_response = Some(ExecutionResult::failed(FailureReason::internal(message)));
        self
    }

    pub fn call_count(&self) -> usize {
        self.history().len()
    }

    /// Arguments of every call so far, oldest first
    pub fn call_history(&self) -> Vec<Arguments> {
        self.history().clone()
    }

    pub fn was_called_with(&self, arguments: &Arguments) -> bool {
        self.history().contains(arguments)
    }

    pub fn reset(&self) {
        self.history().clear();
    }

    fn history(&self) -> std::sync::MutexGuard<'_, Vec<Arguments>> {
        self.call_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn key(arguments: &Arguments) -> String {
    arguments.clone().into_value().to_string()
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        self.parameters.clone()
    }

    async fn call(&self, arguments: Arguments) -> ExecutionResult {
        self.history().push(arguments.clone());

        if let Some(response) = self.responses.get(&key(&arguments)) {
            response.clone()
        } else if let Some(default) = &self.default_response {
            default.clone()
        } else {
            ExecutionResult::success(arguments.into_value())
        }
    }
}

/// Registry holding clones of `tools`; the clones share call history with
/// the originals.
pub fn mock_registry(tools: &[MockTool]) -> Result<InMemoryToolRegistry, ToolRegistryError> {
    tools
        .iter()
        .try_fold(InMemoryToolRegistry::new(), |registry, tool| {
            registry.try_with_tool(Arc::new(tool.clone()))
        })
}
