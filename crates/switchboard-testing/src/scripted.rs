//! # Scripted Reasoning Engine
//!
//! A [`ReasoningEngine`] that follows a fixed script instead of a model, so
//! the orchestrator can be tested end to end without network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use switchboard_agent::{AgentError, AgentResult, ReasoningEngine, ToolInvoker};
use switchboard_core::{Arguments, Conversation, Message, ToolCallRequest};
use uuid::Uuid;

type ArgumentsFn = Arc<dyn Fn(&[String]) -> Arguments + Send + Sync>;
type AnswerFn = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// One step of a script. Closures receive the text results of the calls made
/// so far in the current query, oldest first.
#[derive(Clone)]
pub enum Step {
    Call { name: String, arguments: ArgumentsFn },
    Answer(AnswerFn),
    Fail(String),
}

impl Step {
    /// Call `name` with fixed arguments
    pub fn call(name: impl Into<String>, arguments: Arguments) -> Self {
        Step::Call {
            name: name.into(),
            arguments: Arc::new(move |_: &[String]| arguments.clone()),
        }
    }

    /// Call `name` with arguments built from earlier results
    pub fn call_with(
        name: impl Into<String>,
        arguments: impl Fn(&[String]) -> Arguments + Send + Sync + 'static,
    ) -> Self {
        Step::Call {
            name: name.into(),
            arguments: Arc::new(arguments),
        }
    }

    pub fn answer(text: impl Into<String>) -> Self {
        let text = text.into();
        Step::Answer(Arc::new(move |_: &[String]| text.clone()))
    }

    pub fn answer_with(answer: impl Fn(&[String]) -> String + Send + Sync + 'static) -> Self {
        Step::Answer(Arc::new(answer))
    }

    /// Make the engine itself fail
    pub fn fail(message: impl Into<String>) -> Self {
        Step::Fail(message.into())
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Call { name, .. } => write!(f, "Call({name})"),
            Step::Answer(_) => f.write_str("Answer"),
            Step::Fail(message) => write!(f, "Fail({message})"),
        }
    }
}

/// Plays the same script for every query.
///
/// Every call step produces an assistant message carrying the request and a
/// tool message with the result, like a model using function calling. A
/// script that ends without an answer step produces no content, which the
/// orchestrator reports as "No answer found.".
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    steps: Vec<Step>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Engine that answers every query without calling tools
    pub fn answering(text: impl Into<String>) -> Self {
        Self::new(vec![Step::answer(text)])
    }

    /// Latest user turn of every conversation seen so far
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn respond(
        &self,
        conversation: &Conversation,
        tools: &dyn ToolInvoker,
    ) -> AgentResult<Vec<Message>> {
        if let Some(turn) = conversation.last() {
            self.queries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(turn.content.clone());
        }

        let mut results: Vec<String> = Vec::new();
        let mut messages = Vec::new();
        for step in &self.steps {
            match step {
                Step::Call { name, arguments } => {
                    let arguments = arguments(&results);
                    let id = format!("call_{}", Uuid::new_v4().simple());
                    messages.push(Message::assistant_with_calls(
                        "",
                        vec![ToolCallRequest::new(id.clone(), name.clone(), arguments.clone())],
                    ));
                    let text = tools.invoke_text(name, arguments).await;
                    tracing::debug!(operation = %name, result = %text, "scripted call");
                    messages.push(Message::tool_result(id, name.clone(), text.clone()));
                    results.push(text);
                }
                Step::Answer(answer) => {
                    messages.push(Message::assistant(answer(&results)));
                    break;
                }
                Step::Fail(message) => {
                    return Err(AgentError::engine(message.clone()).interrupted(messages));
                }
            }
        }
        Ok(messages)
    }
}
