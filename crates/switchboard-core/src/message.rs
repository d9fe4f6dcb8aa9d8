//! Messages exchanged with the reasoning engine during one query.

use crate::tool::Arguments;
use serde::{Deserialize, Serialize};

/// Author of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call requested by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Engine-assigned call identifier, echoed on the matching tool message
    pub id: String,
    pub name: String,
    pub arguments: Arguments,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One entry of the transcript the engine returns.
///
/// Tool messages carry the name of the operation that produced them in
/// `tool_name`; assistant messages that asked for tools carry the requests
/// in `tool_calls`. Both annotations feed tool-usage reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl Message {
    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_name: None,
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::Assistant, content)
    }

    /// Assistant message that requests one or more tool calls
    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::plain(MessageRole::Assistant, content)
        }
    }

    /// Result of a tool call, fed back to the engine
    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: Some(tool_name.into()),
            tool_call_id: Some(call_id.into()),
            ..Self::plain(MessageRole::Tool, content)
        }
    }

    /// Whether the message carries natural-language content
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_annotations() {
        let call = ToolCallRequest::new("call_1", "add", Arguments::new().with("a", 1));
        let request = Message::assistant_with_calls("", vec![call.clone()]);
        assert_eq!(request.role, MessageRole::Assistant);
        assert_eq!(request.tool_calls, vec![call]);
        assert!(!request.has_content());

        let result = Message::tool_result("call_1", "add", "3");
        assert_eq!(result.role, MessageRole::Tool);
        assert_eq!(result.tool_name.as_deref(), Some("add"));
        assert_eq!(result.tool_call_id.as_deref(), Some("call_1"));
        assert!(result.has_content());
    }

    #[test]
    fn test_whitespace_only_content_is_empty() {
        assert!(!Message::assistant("  \n").has_content());
    }

    #[test]
    fn test_serialization_skips_empty_annotations() {
        let json = serde_json::to_value(Message::user("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hello"}));
    }
}
