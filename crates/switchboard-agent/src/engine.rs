//! The reasoning engine seam.

use crate::dispatcher::ToolInvoker;
use crate::error::AgentResult;
use async_trait::async_trait;
use serde_json::{Value, json};
use switchboard_core::{Conversation, Message, OperationDescriptor};

/// Decides, given the conversation so far, which operations to call and what
/// to answer.
///
/// `respond` receives the full conversation (ending with the new user turn)
/// and returns the messages produced for that turn, in order: assistant
/// messages that requested tools, the matching tool results and finally the
/// answer. The engine may call `tools` any number of times meanwhile.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    async fn respond(
        &self,
        conversation: &Conversation,
        tools: &dyn ToolInvoker,
    ) -> AgentResult<Vec<Message>>;
}

/// Function declarations in the chat-completions `tools` format
pub fn function_declarations(descriptors: &[OperationDescriptor]) -> Vec<Value> {
    descriptors
        .iter()
        .map(|descriptor| {
            json!({
                "type": "function",
                "function": {
                    "name": descriptor.name().as_str(),
                    "description": descriptor.description(),
                    "parameters": descriptor.spec.input_schema(),
                }
            })
        })
        .collect()
}
