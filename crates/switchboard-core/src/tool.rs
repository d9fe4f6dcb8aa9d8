//! Provider-side tool abstraction: arguments in, structured result out.

use crate::identifiers::{IdValidationError, OperationName};
use crate::schema::{OperationSpec, ParamSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Categorized failure reasons for tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// Missing or mistyped argument
    InvalidInput { message: String },
    /// The thing the caller asked about does not exist upstream
    NotFound { resource: String },
    /// Transport-level failure while calling an upstream service
    NetworkError { message: String },
    /// Upstream answered, but not with something usable
    UpstreamError { message: String },
    /// The request is well-formed but the tool cannot serve it
    Unsupported { message: String },
    /// Internal tool error or unexpected state
    InternalError { message: String },
}

impl FailureReason {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        FailureReason::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        FailureReason::NotFound {
            resource: resource.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        FailureReason::NetworkError {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        FailureReason::UpstreamError {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        FailureReason::Unsupported {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        FailureReason::InternalError {
            message: message.into(),
        }
    }

    /// Get a human-readable error message
    pub fn message(&self) -> String {
        match self {
            FailureReason::InvalidInput { message } => format!("Invalid input: {}", message),
            FailureReason::NotFound { resource } => format!("Not found: {}", resource),
            FailureReason::NetworkError { message } => format!("Network error: {}", message),
            FailureReason::UpstreamError { message } => format!("Upstream error: {}", message),
            FailureReason::Unsupported { message } => message.clone(),
            FailureReason::InternalError { message } => format!("Internal error: {}", message),
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// The result of executing a tool.
///
/// Success carries an opaque structured value. Most tools return a string,
/// which travels unchanged to the reasoning engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Success { output: Value },
    Failure { reason: FailureReason },
}

impl ExecutionResult {
    pub fn success(output: impl Into<Value>) -> Self {
        ExecutionResult::Success {
            output: output.into(),
        }
    }

    pub fn failed(reason: FailureReason) -> Self {
        ExecutionResult::Failure { reason }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionResult::Failure { .. })
    }

    /// Text form of the outcome: the rendered output or the failure message.
    pub fn render(&self) -> String {
        match self {
            ExecutionResult::Success { output } => render_value(output),
            ExecutionResult::Failure { reason } => reason.message(),
        }
    }

    pub fn success_output(&self) -> Option<&Value> {
        match self {
            ExecutionResult::Success { output } => Some(output),
            ExecutionResult::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            ExecutionResult::Success { .. } => None,
            ExecutionResult::Failure { reason } => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<Value, FailureReason> {
        match self {
            ExecutionResult::Success { output } => Ok(output),
            ExecutionResult::Failure { reason } => Err(reason),
        }
    }
}

impl<T: Into<Value>> From<Result<T, FailureReason>> for ExecutionResult {
    fn from(result: Result<T, FailureReason>) -> Self {
        match result {
            Ok(output) => ExecutionResult::success(output),
            Err(reason) => ExecutionResult::failed(reason),
        }
    }
}

/// Render a result payload as text: strings verbatim, anything else as
/// compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Named argument mapping passed to an operation.
///
/// The orchestrator forwards arguments untouched; typing is checked by the
/// tool through the accessors below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn required(&self, name: &str) -> Result<&Value, FailureReason> {
        self.0
            .get(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| FailureReason::invalid_input(format!("missing parameter '{name}'")))
    }

    /// Integer parameter. Integral floats such as `3.0` are accepted.
    pub fn integer(&self, name: &str) -> Result<i64, FailureReason> {
        let value = self.required(name)?;
        if let Some(n) = value.as_i64() {
            return Ok(n);
        }
        match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
            _ => Err(FailureReason::invalid_input(format!(
                "parameter '{name}' must be an integer, got {value}"
            ))),
        }
    }

    /// Floating point parameter. Any JSON number is accepted.
    pub fn float(&self, name: &str) -> Result<f64, FailureReason> {
        let value = self.required(name)?;
        value.as_f64().ok_or_else(|| {
            FailureReason::invalid_input(format!("parameter '{name}' must be a number, got {value}"))
        })
    }

    pub fn string(&self, name: &str) -> Result<&str, FailureReason> {
        let value = self.required(name)?;
        value.as_str().ok_or_else(|| {
            FailureReason::invalid_input(format!("parameter '{name}' must be a string, got {value}"))
        })
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Arguments {
    type Error = FailureReason;

    /// `null` is treated as an empty mapping; any other non-object is rejected.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(FailureReason::invalid_input(format!(
                "arguments must be an object, got {other}"
            ))),
        }
    }
}

/// An operation implemented inside a provider process.
///
/// ```rust
/// use async_trait::async_trait;
/// use switchboard_core::schema::ParamSpec;
/// use switchboard_core::tool::{Arguments, ExecutionResult, Tool};
///
/// struct Shout;
///
/// #[async_trait]
/// impl Tool for Shout {
///     fn name(&self) -> &str {
///         "shout"
///     }
///
///     fn parameters(&self) -> Vec<ParamSpec> {
///         vec![ParamSpec::string("text")]
///     }
///
///     async fn call(&self, arguments: Arguments) -> ExecutionResult {
///         arguments.string("text").map(|t| t.to_uppercase()).into()
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Operation name, unique within a registry
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Declared parameters, in order
    fn parameters(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    async fn call(&self, arguments: Arguments) -> ExecutionResult;

    /// The declaration advertised over `tools/list`
    fn spec(&self) -> Result<OperationSpec, IdValidationError> {
        let name = OperationName::parse(self.name())?;
        Ok(OperationSpec {
            name,
            description: self.description().to_string(),
            parameters: self.parameters(),
        })
    }
}
