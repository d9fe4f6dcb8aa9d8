//! Operation descriptors and their input schemas.

use crate::identifiers::{OperationName, ProviderId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// Primitive parameter types an operation may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Float,
    String,
}

impl ParamType {
    /// JSON Schema type keyword for this parameter type
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::Float => "number",
            ParamType::String => "string",
        }
    }

    /// Inverse of [`ParamType::json_type`]
    pub fn from_json_type(keyword: &str) -> Option<Self> {
        match keyword {
            "integer" => Some(ParamType::Integer),
            "number" => Some(ParamType::Float),
            "string" => Some(ParamType::String),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Integer => "integer",
            ParamType::Float => "float",
            ParamType::String => "string",
        };
        f.write_str(name)
    }
}

/// A single named, typed parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: String::new(),
            required: true,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Float)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::String)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// What a provider declares about one of its operations.
///
/// Parameter order is significant and is preserved on the wire and in the
/// rendered JSON Schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSpec {
    pub name: OperationName,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParamSpec>,
}

impl OperationSpec {
    pub fn new(name: OperationName, description: impl Into<String>) -> Self {
        Self {
            name,
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Render the parameter list as a JSON Schema object.
    ///
    /// ```rust
    /// use switchboard_core::schema::{OperationSpec, ParamSpec};
    /// use switchboard_core::identifiers::OperationName;
    ///
    /// let spec = OperationSpec::new(OperationName::parse("add").unwrap(), "Add two integers")
    ///     .with_param(ParamSpec::integer("a"))
    ///     .with_param(ParamSpec::integer("b"));
    /// let schema = spec.input_schema();
    /// assert_eq!(schema["properties"]["a"]["type"], "integer");
    /// assert_eq!(schema["required"], serde_json::json!(["a", "b"]));
    /// ```
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.parameters {
            let mut property = Map::new();
            property.insert("type".into(), Value::from(param.ty.json_type()));
            if !param.description.is_empty() {
                property.insert("description".into(), Value::from(param.description.clone()));
            }
            properties.insert(param.name.clone(), Value::Object(property));
            if param.required {
                required.push(Value::from(param.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// An operation as registered in the orchestrator: the provider's
/// declaration plus the identity of the provider that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescriptor {
    pub spec: OperationSpec,
    pub provider: ProviderId,
}

impl OperationDescriptor {
    pub fn new(spec: OperationSpec, provider: ProviderId) -> Self {
        Self { spec, provider }
    }

    pub fn name(&self) -> &OperationName {
        &self.spec.name
    }

    pub fn description(&self) -> &str {
        &self.spec.description
    }

    pub fn parameters(&self) -> &[ParamSpec] {
        &self.spec.parameters
    }
}
