use super::{HttpConfig, read_json, send, trim_base};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use switchboard_core::{Arguments, ExecutionResult, FailureReason, ParamSpec, Tool};

pub const DEFAULT_WIKIPEDIA_API: &str = "https://en.wikipedia.org/api/rest_v1";

/// Turn free text into a Wikipedia page title: collapse whitespace,
/// title-case every word, join with underscores.
///
/// ```rust
/// use switchboard_tools::standard::normalize_topic;
///
/// assert_eq!(normalize_topic("  alan   turing "), "Alan_Turing");
/// ```
pub fn normalize_topic(topic: &str) -> String {
    topic
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join("_")
}

fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_word_start = true;
    for c in word.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// `wikipedia_summary(topic)` via the Wikipedia REST summary endpoint
pub struct WikipediaTool {
    client: Client,
    base_url: String,
}

impl WikipediaTool {
    pub fn new(config: &HttpConfig) -> Result<Self, FailureReason> {
        Ok(Self {
            client: config.client()?,
            base_url: DEFAULT_WIKIPEDIA_API.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn summary(&self, topic: &str) -> Result<String, FailureReason> {
        let title = normalize_topic(topic);
        if title.is_empty() {
            return Err(FailureReason::invalid_input("topic must not be empty"));
        }

        let mut url = reqwest::Url::parse(trim_base(&self.base_url))
            .map_err(|e| FailureReason::internal(format!("invalid Wikipedia base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| FailureReason::internal("Wikipedia base URL cannot have a path"))?
            .pop_if_empty()
            .extend(["page", "summary", title.as_str()]);

        let response = send(self.client.get(url)).await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(FailureReason::not_found(format!(
                "No Wikipedia summary found for {topic}. (HTTP {status})"
            )));
        }
        let data = read_json(response).await?;
        Ok(data
            .get("extract")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("No summary found for {topic}.")))
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia_summary"
    }

    fn description(&self) -> &str {
        "Get a summary for a topic from Wikipedia."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string("topic")]
    }

    async fn call(&self, arguments: Arguments) -> ExecutionResult {
        match arguments.string("topic") {
            Ok(topic) => self.summary(topic).await.into(),
            Err(reason) => ExecutionResult::failed(reason),
        }
    }
}
