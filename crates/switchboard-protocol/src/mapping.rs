//! Translation between Switchboard's operation model and MCP tool messages.

use crate::error::{ChannelError, ChannelResult};
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::{Value, json};
use std::sync::Arc;
use switchboard_core::{
    ExecutionResult, OperationName, OperationSpec, ParamSpec, ParamType, render_value,
};

/// Key under which a non-object result travels in `structuredContent`
const RESULT_KEY: &str = "result";

/// Describe an operation as an MCP tool
pub fn tool_from_spec(spec: &OperationSpec) -> Tool {
    let schema = match spec.input_schema() {
        Value::Object(schema) => schema,
        _ => JsonObject::new(),
    };
    Tool::new(
        spec.name.to_string(),
        spec.description.clone(),
        Arc::new(schema),
    )
}

/// Read an MCP tool declaration back into an operation.
///
/// Parameters come out in the order the schema lists its properties.
/// Fails when the name is not a valid operation name or a parameter
/// is not an integer, number or string.
pub fn spec_from_tool(tool: &Tool) -> ChannelResult<OperationSpec> {
    let name = OperationName::parse(&tool.name).map_err(|err| {
        ChannelError::UnexpectedResponse(format!("tool '{}': {err}", tool.name))
    })?;
    let mut spec = OperationSpec::new(name, tool.description.as_deref().unwrap_or_default());

    let required: Vec<&str> = tool
        .input_schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = tool.input_schema.get("properties").and_then(Value::as_object) else {
        return Ok(spec);
    };
    for (param, property) in properties {
        let ty = param_type(property).ok_or_else(|| {
            ChannelError::UnexpectedResponse(format!(
                "tool '{}': parameter '{param}' has an unsupported type",
                tool.name
            ))
        })?;
        let mut param_spec = ParamSpec::new(param.clone(), ty);
        if let Some(description) = property.get("description").and_then(Value::as_str) {
            param_spec = param_spec.describe(description);
        }
        if !required.contains(&param.as_str()) {
            param_spec = param_spec.optional();
        }
        spec = spec.with_param(param_spec);
    }
    Ok(spec)
}

/// `{"type": "number"}`, or `{"anyOf": [{"type": "number"}, {"type": "null"}]}`
/// for an optional value
fn param_type(property: &Value) -> Option<ParamType> {
    if let Some(keyword) = property.get("type").and_then(Value::as_str) {
        return ParamType::from_json_type(keyword);
    }
    let mut variants = property
        .get("anyOf")?
        .as_array()?
        .iter()
        .filter_map(|variant| variant.get("type").and_then(Value::as_str))
        .filter(|keyword| *keyword != "null");
    match (variants.next(), variants.next()) {
        (Some(keyword), None) => ParamType::from_json_type(keyword),
        _ => None,
    }
}

/// Encode an execution outcome as a `tools/call` result.
///
/// Success carries the rendered text plus the raw value as structured
/// content. Failure sets `isError` with the reason's message.
pub fn call_result_from(result: ExecutionResult) -> CallToolResult {
    match result {
        ExecutionResult::Success { output } => {
            let mut call = CallToolResult::success(vec![Content::text(render_value(&output))]);
            call.structured_content = Some(json!({ RESULT_KEY: output }));
            call
        }
        ExecutionResult::Failure { reason } => {
            let mut call = CallToolResult::error(vec![Content::text(reason.message())]);
            call.structured_content = serde_json::to_value(&reason).ok();
            call
        }
    }
}

/// Decode a `tools/call` result into the payload the operation produced.
///
/// Providers that send only text content get the joined text back as a
/// JSON string.
pub fn value_from_call_result(result: CallToolResult) -> ChannelResult<Value> {
    let text = result
        .content
        .iter()
        .filter_map(|content| content.as_text().map(|t| t.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n");

    if result.is_error == Some(true) {
        if text.is_empty() {
            return Err(ChannelError::ToolFailed(
                "provider reported a failure without a message".to_string(),
            ));
        }
        return Err(ChannelError::ToolFailed(text));
    }

    match result.structured_content {
        Some(Value::Object(mut fields)) if fields.len() == 1 && fields.contains_key(RESULT_KEY) => {
            Ok(fields.remove(RESULT_KEY).unwrap_or(Value::Null))
        }
        Some(structured) => Ok(structured),
        None => Ok(Value::String(text)),
    }
}
