//! Azure OpenAI chat-completions engine with function calling.

use crate::config::{ApiKey, ConfigError, ENV_API_KEY, ENV_DEPLOYMENT, ENV_ENDPOINT, EngineConfig};
use crate::dispatcher::ToolInvoker;
use crate::engine::{ReasoningEngine, function_declarations};
use crate::error::{AgentError, AgentResult};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use switchboard_core::{Arguments, Conversation, Message, MessageRole, ToolCallRequest};
use tracing::{debug, warn};

/// Reasoning engine backed by an Azure OpenAI deployment.
///
/// Each query runs a loop: send the transcript, run every tool call the
/// model asks for (concurrently), feed the results back, and stop when the
/// model answers without calling tools.
pub struct AzureOpenAiEngine {
    client: Client,
    url: String,
    api_version: String,
    api_key: ApiKey,
    temperature: f32,
    max_iterations: usize,
    system_prompt: Option<String>,
}

impl AzureOpenAiEngine {
    pub fn from_config(config: &EngineConfig) -> AgentResult<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or(ConfigError::MissingEngineSetting {
                setting: "endpoint",
                env: ENV_ENDPOINT,
            })?;
        let deployment = config
            .deployment
            .as_deref()
            .ok_or(ConfigError::MissingEngineSetting {
                setting: "deployment",
                env: ENV_DEPLOYMENT,
            })?;
        let api_key = config
            .api_key
            .clone()
            .ok_or(ConfigError::MissingEngineSetting {
                setting: "api_key",
                env: ENV_API_KEY,
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::engine(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!(
                "{}/openai/deployments/{}/chat/completions",
                endpoint.trim_end_matches('/'),
                deployment
            ),
            api_version: config.api_version.clone(),
            api_key,
            temperature: config.temperature,
            max_iterations: config.max_iterations.max(1),
            system_prompt: config.system_prompt.clone(),
        })
    }

    pub fn completions_url(&self) -> &str {
        &self.url
    }

    async fn complete(&self, messages: &[Value], tools: &[Value]) -> AgentResult<ResponseMessage> {
        let mut body = json!({
            "messages": messages,
            "temperature": self.temperature,
        });
        if !tools.is_empty() {
            body["tools"] = Value::from(tools.to_vec());
            body["tool_choice"] = Value::from("auto");
        }

        let response = self
            .client
            .post(&self.url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::engine(format!("request to Azure OpenAI failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::engine(format!(
                "Azure OpenAI returned HTTP {}: {}",
                status.as_u16(),
                error_text.trim()
            )));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| AgentError::engine(format!("malformed Azure OpenAI response: {e}")))?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AgentError::engine("Azure OpenAI response has no choices"))
    }
}

#[async_trait]
impl ReasoningEngine for AzureOpenAiEngine {
    async fn respond(
        &self,
        conversation: &Conversation,
        tools: &dyn ToolInvoker,
    ) -> AgentResult<Vec<Message>> {
        let declarations = function_declarations(&tools.capabilities());
        let mut wire: Vec<Value> = self
            .system_prompt
            .iter()
            .map(|prompt| to_wire(&Message::system(prompt.clone())))
            .collect();
        wire.extend(conversation.to_messages().iter().map(to_wire));

        let mut produced = Vec::new();
        for iteration in 0..self.max_iterations {
            let reply = match self.complete(&wire, &declarations).await {
                Ok(reply) => reply,
                Err(err) => return Err(err.interrupted(produced)),
            };
            let content = reply.content.unwrap_or_default();
            let tool_calls = reply.tool_calls.unwrap_or_default();

            if tool_calls.is_empty() {
                debug!(iteration, "model answered");
                let answer = Message::assistant(content);
                wire.push(to_wire(&answer));
                produced.push(answer);
                return Ok(produced);
            }

            debug!(iteration, calls = tool_calls.len(), "model requested tools");
            let calls: Vec<(ToolCallRequest, Result<Arguments, String>)> = tool_calls
                .into_iter()
                .map(|call| {
                    let parsed = parse_arguments(&call.function.arguments);
                    let request = ToolCallRequest::new(
                        call.id,
                        call.function.name,
                        parsed.clone().unwrap_or_default(),
                    );
                    (request, parsed)
                })
                .collect();

            let request_message = Message::assistant_with_calls(
                content,
                calls.iter().map(|(request, _)| request.clone()).collect(),
            );
            wire.push(to_wire(&request_message));
            produced.push(request_message);

            let results = join_all(calls.into_iter().map(|(request, parsed)| async move {
                let text = match parsed {
                    Ok(arguments) => tools.invoke_text(&request.name, arguments).await,
                    Err(message) => {
                        warn!(tool = %request.name, %message, "unparseable tool arguments");
                        format!("Error: {message}")
                    }
                };
                Message::tool_result(request.id, request.name, text)
            }))
            .await;

            for result in results {
                wire.push(to_wire(&result));
                produced.push(result);
            }
        }

        Err(AgentError::engine(format!(
            "no final answer after {} reasoning steps",
            self.max_iterations
        ))
        .interrupted(produced))
    }
}

fn parse_arguments(raw: &str) -> Result<Arguments, String> {
    if raw.trim().is_empty() {
        return Ok(Arguments::new());
    }
    let value: Value =
        serde_json::from_str(raw).map_err(|e| format!("invalid tool arguments: {e}"))?;
    Arguments::try_from(value).map_err(|reason| reason.message())
}

/// Chat-completions representation of a transcript message
fn to_wire(message: &Message) -> Value {
    match message.role {
        MessageRole::System => json!({"role": "system", "content": message.content}),
        MessageRole::User => json!({"role": "user", "content": message.content}),
        MessageRole::Assistant if message.tool_calls.is_empty() => {
            json!({"role": "assistant", "content": message.content})
        }
        MessageRole::Assistant => {
            let calls: Vec<WireToolCall> = message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: "function".to_string(),
                    function: WireFunction {
                        name: call.name.clone(),
                        arguments: call.arguments.clone().into_value().to_string(),
                    },
                })
                .collect();
            let content = if message.has_content() {
                Value::from(message.content.clone())
            } else {
                Value::Null
            };
            json!({"role": "assistant", "content": content, "tool_calls": calls})
        }
        MessageRole::Tool => json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id,
            "content": message.content,
        }),
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunction,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use switchboard_core::{
        InvocationError, InvocationResult, OperationDescriptor, OperationName, OperationSpec,
        ParamSpec, ProviderId,
    };
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    /// Replies with the scripted responses in order, repeating the last one
    struct Script {
        responses: Vec<ResponseTemplate>,
        next: AtomicUsize,
    }

    impl Script {
        fn new(bodies: Vec<Value>) -> Self {
            Self::from_responses(
                bodies
                    .into_iter()
                    .map(|body| ResponseTemplate::new(200).set_body_json(body))
                    .collect(),
            )
        }

        fn from_responses(responses: Vec<ResponseTemplate>) -> Self {
            Self {
                responses,
                next: AtomicUsize::new(0),
            }
        }
    }

    impl Respond for Script {
        fn respond(&self, _request: &Request) -> ResponseTemplate {
            let index = self.next.fetch_add(1, Ordering::SeqCst);
            self.responses[index.min(self.responses.len() - 1)].clone()
        }
    }

    fn tool_call_reply(calls: &[(&str, &str, Value)]) -> Value {
        let calls: Vec<Value> = calls
            .iter()
            .map(|(id, name, args)| {
                json!({
                    "id": id,
                    "type": "function",
                    "function": {"name": name, "arguments": args.to_string()}
                })
            })
            .collect();
        json!({"choices": [{"message": {"role": "assistant", "content": null, "tool_calls": calls}}]})
    }

    fn answer_reply(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    /// Integer calculator that records what it was asked
    #[derive(Default)]
    struct Calculator {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ToolInvoker for Calculator {
        async fn invoke(&self, name: &str, arguments: Arguments) -> InvocationResult {
            self.seen.lock().unwrap().push(name.to_string());
            let (a, b) = (
                arguments.integer("a").unwrap_or(0),
                arguments.integer("b").unwrap_or(0),
            );
            match name {
                "add" => Ok(json!(a + b)),
                "multiply" => Ok(json!(a * b)),
                other => Err(InvocationError::UnknownOperation {
                    name: other.to_string(),
                }),
            }
        }

        fn capabilities(&self) -> Vec<OperationDescriptor> {
            ["add", "multiply"]
                .iter()
                .map(|name| {
                    OperationDescriptor::new(
                        OperationSpec::new(OperationName::new_unchecked(*name), "")
                            .with_param(ParamSpec::integer("a"))
                            .with_param(ParamSpec::integer("b")),
                        ProviderId::new_unchecked("math"),
                    )
                })
                .collect()
        }
    }

    fn engine(server: &MockServer, max_iterations: usize) -> AzureOpenAiEngine {
        let config = EngineConfig {
            endpoint: Some(format!("{}/", server.uri())),
            deployment: Some("gpt-4o".into()),
            api_key: Some(ApiKey::new("sk-test")),
            max_iterations,
            ..EngineConfig::default()
        };
        AzureOpenAiEngine::from_config(&config).unwrap()
    }

    fn conversation(query: &str) -> Conversation {
        let mut conversation = Conversation::new();
        conversation.push_user(query).unwrap();
        conversation
    }

    #[tokio::test]
    async fn test_tool_loop_until_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/gpt-4o/chat/completions"))
            .and(query_param("api-version", crate::config::DEFAULT_API_VERSION))
            .and(header("api-key", "sk-test"))
            .respond_with(Script::new(vec![
                tool_call_reply(&[("call_1", "add", json!({"a": 3, "b": 5}))]),
                tool_call_reply(&[("call_2", "multiply", json!({"a": 8, "b": 12}))]),
                answer_reply("(3 + 5) x 12 = 96"),
            ]))
            .expect(3)
            .mount(&server)
            .await;

        let calculator = Calculator::default();
        let messages = engine(&server, 10)
            .respond(&conversation("what's (3 + 5) x 12?"), &calculator)
            .await
            .unwrap();

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].tool_calls[0].name, "add");
        assert_eq!(messages[1].tool_name.as_deref(), Some("add"));
        assert_eq!(messages[1].content, "8");
        assert_eq!(messages[3].content, "96");
        assert_eq!(messages[4].content, "(3 + 5) x 12 = 96");
        assert_eq!(*calculator.seen.lock().unwrap(), ["add", "multiply"]);

        // The second request carried the first tool result back to the model.
        let requests = server.received_requests().await.unwrap();
        let second: Value = serde_json::from_slice(&requests[1].body).unwrap();
        let sent = second["messages"].as_array().unwrap();
        assert_eq!(sent[0]["role"], "user");
        assert_eq!(sent[1]["tool_calls"][0]["function"]["name"], "add");
        assert_eq!(sent[2], json!({"role": "tool", "tool_call_id": "call_1", "content": "8"}));
        assert_eq!(second["tools"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_parallel_tool_calls_keep_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(Script::new(vec![
                tool_call_reply(&[
                    ("c1", "add", json!({"a": 1, "b": 1})),
                    ("c2", "multiply", json!({"a": 2, "b": 3})),
                ]),
                answer_reply("2 and 6"),
            ]))
            .mount(&server)
            .await;

        let messages = engine(&server, 10)
            .respond(&conversation("two things"), &Calculator::default())
            .await
            .unwrap();
        assert_eq!(messages[1].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(messages[1].content, "2");
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("c2"));
        assert_eq!(messages[2].content, "6");
    }

    #[tokio::test]
    async fn test_tool_errors_are_fed_back_as_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(Script::new(vec![
                tool_call_reply(&[("c1", "teleport", json!({}))]),
                answer_reply("I cannot do that."),
            ]))
            .mount(&server)
            .await;

        let messages = engine(&server, 10)
            .respond(&conversation("beam me up"), &Calculator::default())
            .await
            .unwrap();
        assert_eq!(messages[1].content, "Error: unknown operation 'teleport'");
        assert_eq!(messages[2].content, "I cannot do that.");
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(Script::new(vec![tool_call_reply(&[(
                "c",
                "add",
                json!({"a": 1, "b": 1}),
            )])]))
            .mount(&server)
            .await;

        let err = engine(&server, 2)
            .respond(&conversation("loop forever"), &Calculator::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no final answer after 2"));
        assert_eq!(err.produced().len(), 4);
    }

    fn add_then_server_error() -> Script {
        Script::from_responses(vec![
            ResponseTemplate::new(200).set_body_json(tool_call_reply(&[(
                "c1",
                "add",
                json!({"a": 3, "b": 5}),
            )])),
            ResponseTemplate::new(500).set_body_string("upstream overloaded"),
        ])
    }

    #[tokio::test]
    async fn test_failure_after_tool_calls_keeps_partial_transcript() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(add_then_server_error())
            .expect(2)
            .mount(&server)
            .await;

        let err = engine(&server, 10)
            .respond(&conversation("what's 3 + 5?"), &Calculator::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Azure OpenAI returned HTTP 500: upstream overloaded"
        );
        let produced = err.produced();
        assert_eq!(produced.len(), 2);
        assert_eq!(produced[0].tool_calls[0].name, "add");
        assert_eq!(produced[1].tool_name.as_deref(), Some("add"));
        assert_eq!(produced[1].content, "8");
    }

    #[tokio::test]
    async fn test_report_lists_tools_run_before_engine_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(add_then_server_error())
            .mount(&server)
            .await;

        let mut orchestrator = crate::Orchestrator::new(
            std::sync::Arc::new(engine(&server, 10)),
            std::sync::Arc::new(Calculator::default()),
        );
        let outcome = orchestrator.handle_query("what's 3 + 5?").await.unwrap();
        let crate::QueryOutcome::Answered(report) = outcome else {
            panic!("expected an answer");
        };
        assert_eq!(report.tools.to_string(), "[Used tool(s): add]");
        assert_eq!(
            report.answer,
            "The reasoning engine failed: Azure OpenAI returned HTTP 500: upstream overloaded"
        );
    }

    #[tokio::test]
    async fn test_http_error_is_engine_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = engine(&server, 10)
            .respond(&conversation("hi"), &Calculator::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Engine(_)));
        assert_eq!(err.to_string(), "Azure OpenAI returned HTTP 401: invalid api key");
    }

    #[test]
    fn test_parse_arguments() {
        assert!(parse_arguments("").unwrap().is_empty());
        assert_eq!(parse_arguments(r#"{"a": 1}"#).unwrap().integer("a"), Ok(1));
        assert!(parse_arguments("{oops").is_err());
        assert!(parse_arguments("[1]").is_err());
    }

    #[test]
    fn test_missing_settings() {
        let err = AzureOpenAiEngine::from_config(&EngineConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
