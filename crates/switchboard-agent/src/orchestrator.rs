//! The interactive query loop.
//!
//! ```text
//! Idle -> AwaitingQuery -> Reasoning -> Reporting -> AwaitingQuery ... -> Terminated
//! ```
//!
//! Each non-empty line read from the input becomes a user turn. The engine
//! answers it (calling tools through the invoker as it sees fit), the report
//! is written to the output and the answer becomes the assistant turn.
//! End of input or the shutdown future terminates the loop from any state.

use crate::dispatcher::ToolInvoker;
use crate::engine::ReasoningEngine;
use crate::error::AgentResult;
use crate::report::{ToolUsage, TurnReport};
use std::future::Future;
use std::sync::Arc;
use switchboard_core::Conversation;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

pub const BANNER: &str = "\
DISCLAIMER: This application supports the following types of queries:
- Math operations (e.g., what's (3 + 5) x 12?)
- Weather information (e.g., what is the weather in Paris?)
- Web search (e.g., Search: latest news on AI)
- Currency conversion (e.g., Convert 100 USD to EUR)
- Wikipedia lookup (e.g., Wikipedia: Alan Turing)
- Unit conversion (e.g., Convert 10 miles to kilometers)
You can ask follow-up questions. Type Ctrl+C to exit.
";

pub const PROMPT: &str = "\nQuery: ";
pub const EMPTY_QUERY: &str = "Please enter a query.";
pub const FAREWELL: &str = "\nExiting. Goodbye!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    AwaitingQuery,
    Reasoning,
    Reporting,
    Terminated,
}

/// What happened to one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Blank input; nothing was recorded
    Empty,
    Answered(TurnReport),
}

/// Owns the conversation and drives one query at a time through the engine.
pub struct Orchestrator {
    engine: Arc<dyn ReasoningEngine>,
    invoker: Arc<dyn ToolInvoker>,
    conversation: Conversation,
    state: LoopState,
}

impl Orchestrator {
    pub fn new(engine: Arc<dyn ReasoningEngine>, invoker: Arc<dyn ToolInvoker>) -> Self {
        Self {
            engine,
            invoker,
            conversation: Conversation::new(),
            state: LoopState::Idle,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run one query cycle.
    ///
    /// Engine failures do not escape: they become the answer text so the
    /// conversation keeps alternating.
    pub async fn handle_query(&mut self, query: &str) -> AgentResult<QueryOutcome> {
        if query.trim().is_empty() {
            self.state = LoopState::AwaitingQuery;
            return Ok(QueryOutcome::Empty);
        }

        self.state = LoopState::Reasoning;
        self.conversation.push_user(query)?;

        let report = match self
            .engine
            .respond(&self.conversation, self.invoker.as_ref())
            .await
        {
            Ok(messages) => TurnReport::from_messages(&messages),
            Err(err) => {
                warn!(error = %err, code = err.error_code(), "reasoning engine failed");
                TurnReport {
                    tools: ToolUsage::from_messages(err.produced()),
                    answer: format!("The reasoning engine failed: {err}"),
                }
            }
        };

        self.state = LoopState::Reporting;
        self.conversation.push_assistant(report.answer.clone())?;
        info!(
            turns = self.conversation.len(),
            tools = %report.tools,
            "query answered"
        );

        self.state = LoopState::AwaitingQuery;
        Ok(QueryOutcome::Answered(report))
    }

    /// Read queries from `input` until it ends or `shutdown` resolves,
    /// writing the transcript to `output`.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than ending the
    /// session.
    pub async fn run<R, W, S>(&mut self, mut input: R, mut output: W, shutdown: S) -> AgentResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut buf = Vec::new();

        output.write_all(BANNER.as_bytes()).await?;
        self.state = LoopState::AwaitingQuery;

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let line = tokio::select! {
                _ = &mut shutdown => break,
                line = read_line(&mut input, &mut buf) => line?,
            };
            let Some(line) = line else { break };

            let outcome = tokio::select! {
                _ = &mut shutdown => break,
                outcome = self.handle_query(&line) => outcome?,
            };
            match outcome {
                QueryOutcome::Empty => {
                    output.write_all(EMPTY_QUERY.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                }
                QueryOutcome::Answered(report) => {
                    output.write_all(report.to_string().as_bytes()).await?;
                }
            }
        }

        self.state = LoopState::Terminated;
        output.write_all(FAREWELL.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        Ok(())
    }
}

/// Next line without its terminator, or `None` at end of input
async fn read_line<R>(input: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if input.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state)
            .field("turns", &self.conversation.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;
    use switchboard_core::{
        Arguments, InvocationResult, Message, OperationDescriptor, Role, ToolCallRequest,
    };

    /// Echoes the last user turn, calling `echo` first when asked to
    struct Parrot;

    #[async_trait]
    impl ReasoningEngine for Parrot {
        async fn respond(
            &self,
            conversation: &Conversation,
            tools: &dyn ToolInvoker,
        ) -> AgentResult<Vec<Message>> {
            let query = conversation
                .last()
                .map(|turn| turn.content.clone())
                .unwrap_or_default();
            match query.strip_prefix("tool:") {
                Some(text) => {
                    let args = Arguments::new().with("text", text);
                    let call = ToolCallRequest::new("c1", "echo", args.clone());
                    let result = tools.invoke_text("echo", args).await;
                    Ok(vec![
                        Message::assistant_with_calls("", vec![call]),
                        Message::tool_result("c1", "echo", result.clone()),
                        Message::assistant(result),
                    ])
                }
                None if query == "fail" => Err(AgentError::engine("HTTP 500")),
                None if query == "fail after tool" => {
                    let args = Arguments::new().with("text", "partial");
                    let call = ToolCallRequest::new("c1", "echo", args.clone());
                    let result = tools.invoke_text("echo", args).await;
                    Err(AgentError::engine("HTTP 500").interrupted(vec![
                        Message::assistant_with_calls("", vec![call]),
                        Message::tool_result("c1", "echo", result),
                    ]))
                }
                None if query == "silent" => Ok(vec![Message::assistant("")]),
                None => Ok(vec![Message::assistant(format!("you said {query}"))]),
            }
        }
    }

    /// Never answers
    struct Stuck;

    #[async_trait]
    impl ReasoningEngine for Stuck {
        async fn respond(
            &self,
            _conversation: &Conversation,
            _tools: &dyn ToolInvoker,
        ) -> AgentResult<Vec<Message>> {
            std::future::pending().await
        }
    }

    struct EchoTools;

    #[async_trait]
    impl ToolInvoker for EchoTools {
        async fn invoke(&self, _name: &str, arguments: Arguments) -> InvocationResult {
            Ok(arguments.get("text").cloned().unwrap_or(json!(null)))
        }

        fn capabilities(&self) -> Vec<OperationDescriptor> {
            Vec::new()
        }
    }

    fn orchestrator(engine: impl ReasoningEngine + 'static) -> Orchestrator {
        Orchestrator::new(Arc::new(engine), Arc::new(EchoTools))
    }

    #[tokio::test]
    async fn test_empty_input_changes_nothing() {
        let mut orchestrator = orchestrator(Parrot);
        assert_eq!(orchestrator.state(), LoopState::Idle);

        for blank in ["", "   ", "\t"] {
            let outcome = orchestrator.handle_query(blank).await.unwrap();
            assert_eq!(outcome, QueryOutcome::Empty);
        }
        assert!(orchestrator.conversation().is_empty());
        assert_eq!(orchestrator.state(), LoopState::AwaitingQuery);
    }

    #[tokio::test]
    async fn test_cycles_alternate_turns() {
        let mut orchestrator = orchestrator(Parrot);
        for i in 0..3 {
            orchestrator.handle_query(&format!("q{i}")).await.unwrap();
        }

        let turns = orchestrator.conversation().turns();
        assert_eq!(turns.len(), 6);
        for (i, turn) in turns.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role, expected);
        }
        assert_eq!(turns[5].content, "you said q2");
    }

    #[tokio::test]
    async fn test_report_lists_tools() {
        let mut orchestrator = orchestrator(Parrot);
        let QueryOutcome::Answered(report) = orchestrator.handle_query("tool:hi").await.unwrap()
        else {
            panic!("expected an answer");
        };
        assert_eq!(report.tools.to_string(), "[Used tool(s): echo]");
        assert_eq!(report.answer, "hi");
    }

    #[tokio::test]
    async fn test_engine_failure_becomes_answer() {
        let mut orchestrator = orchestrator(Parrot);
        let QueryOutcome::Answered(report) = orchestrator.handle_query("fail").await.unwrap() else {
            panic!("expected an answer");
        };
        assert_eq!(report.answer, "The reasoning engine failed: HTTP 500");
        assert_eq!(orchestrator.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_engine_failure_after_tools_lists_them() {
        let mut orchestrator = orchestrator(Parrot);
        let QueryOutcome::Answered(report) =
            orchestrator.handle_query("fail after tool").await.unwrap()
        else {
            panic!("expected an answer");
        };
        assert_eq!(report.tools.to_string(), "[Used tool(s): echo]");
        assert_eq!(report.answer, "The reasoning engine failed: HTTP 500");
    }

    #[tokio::test]
    async fn test_no_content_uses_sentinel() {
        let mut orchestrator = orchestrator(Parrot);
        let QueryOutcome::Answered(report) = orchestrator.handle_query("silent").await.unwrap()
        else {
            panic!("expected an answer");
        };
        assert_eq!(report.answer, crate::report::NO_ANSWER);
        assert_eq!(
            orchestrator.conversation().last().unwrap().content,
            "No answer found."
        );
    }

    #[tokio::test]
    async fn test_run_transcript() {
        let mut orchestrator = orchestrator(Parrot);
        let mut output = Vec::new();
        orchestrator
            .run(
                &b"hello\n\n"[..],
                &mut output,
                std::future::pending::<()>(),
            )
            .await
            .unwrap();

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.starts_with("DISCLAIMER"));
        assert!(transcript.contains(
            "\nQuery: \n[Response from model only]\nAnswer: you said hello\n"
        ));
        assert!(transcript.contains("\nQuery: Please enter a query.\n"));
        assert!(transcript.ends_with("\nQuery: \nExiting. Goodbye!\n"));
        assert_eq!(orchestrator.state(), LoopState::Terminated);
        assert_eq!(orchestrator.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_run_survives_invalid_utf8() {
        let mut orchestrator = orchestrator(Parrot);
        let mut output = Vec::new();
        orchestrator
            .run(
                &b"caf\xe9 prices?\r\nhello\n"[..],
                &mut output,
                std::future::pending::<()>(),
            )
            .await
            .unwrap();

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("Answer: you said caf\u{FFFD} prices?\n"));
        assert!(transcript.contains("Answer: you said hello\n"));
        assert!(transcript.ends_with("\nExiting. Goodbye!\n"));
        assert_eq!(orchestrator.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_last_line_without_newline_is_answered() {
        let mut orchestrator = orchestrator(Parrot);
        let mut output = Vec::new();
        orchestrator
            .run(&b"hello"[..], &mut output, std::future::pending::<()>())
            .await
            .unwrap();

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("Answer: you said hello\n"));
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_reasoning() {
        let mut orchestrator = orchestrator(Stuck);
        let mut output = Vec::new();
        orchestrator
            .run(
                &b"what's the weather?\n"[..],
                &mut output,
                tokio::time::sleep(Duration::from_millis(50)),
            )
            .await
            .unwrap();

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.ends_with("\nExiting. Goodbye!\n"));
        assert!(!transcript.contains("Answer:"));
        assert_eq!(orchestrator.state(), LoopState::Terminated);
    }
}
