use super::{HttpConfig, fetch_json, trim_base};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use switchboard_core::{Arguments, ExecutionResult, FailureReason, ParamSpec, Tool};

pub const DEFAULT_DUCKDUCKGO_API: &str = "https://api.duckduckgo.com";
pub const DEFAULT_SERPAPI: &str = "https://serpapi.com";

/// Collapse runs of whitespace and trim.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `web_search(query)`: DuckDuckGo Instant Answers, falling back to Google
/// results through SerpAPI when a key is configured.
pub struct WebSearchTool {
    client: Client,
    duckduckgo_url: String,
    serpapi_url: String,
    serpapi_key: Option<String>,
}

impl WebSearchTool {
    pub fn new(config: &HttpConfig) -> Result<Self, FailureReason> {
        Ok(Self {
            client: config.client()?,
            duckduckgo_url: DEFAULT_DUCKDUCKGO_API.to_string(),
            serpapi_url: DEFAULT_SERPAPI.to_string(),
            serpapi_key: None,
        })
    }

    pub fn with_serpapi_key(mut self, key: Option<String>) -> Self {
        self.serpapi_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_endpoints(
        mut self,
        duckduckgo_url: impl Into<String>,
        serpapi_url: impl Into<String>,
    ) -> Self {
        self.duckduckgo_url = duckduckgo_url.into();
        self.serpapi_url = serpapi_url.into();
        self
    }

    async fn instant_answer(&self, query: &str) -> Result<Option<String>, FailureReason> {
        let url = format!("{}/", trim_base(&self.duckduckgo_url));
        let request = self.client.get(&url).query(&[
            ("q", query),
            ("format", "json"),
            ("no_redirect", "1"),
            ("no_html", "1"),
        ]);
        let data = fetch_json(request).await?;

        if let Some(text) = non_empty_str(data.get("AbstractText")) {
            return Ok(Some(text.to_string()));
        }
        let first_topic = data
            .get("RelatedTopics")
            .and_then(Value::as_array)
            .and_then(|topics| topics.first());
        Ok(first_topic.map(|topic| {
            non_empty_str(topic.get("Text"))
                .unwrap_or("No summary found.")
                .to_string()
        }))
    }

    async fn google(&self, query: &str, key: &str) -> Result<String, FailureReason> {
        let url = format!("{}/search.json", trim_base(&self.serpapi_url));
        let request = self.client.get(&url).query(&[
            ("q", query),
            ("api_key", key),
            ("engine", "google"),
        ]);
        let data = fetch_json(request).await?;

        let top = data
            .get("organic_results")
            .and_then(Value::as_array)
            .and_then(|results| results.first());
        if let Some(top) = top {
            let snippet = non_empty_str(top.get("snippet"));
            let title = non_empty_str(top.get("title"));
            let link = non_empty_str(top.get("link"));
            match (snippet, title, link) {
                (Some(snippet), Some(title), Some(link)) => {
                    return Ok(format!("{snippet}\nSource: {title} ({link})"));
                }
                (Some(snippet), _, _) => return Ok(snippet.to_string()),
                (None, Some(title), Some(link)) => {
                    return Ok(format!("Top result: {title}\nURL: {link}"));
                }
                _ => {}
            }
        }
        Err(FailureReason::not_found(
            "No relevant web result found from DuckDuckGo or Google (SerpAPI).",
        ))
    }

    async fn search(&self, query: &str) -> Result<String, FailureReason> {
        let query = normalize_query(query);
        if query.is_empty() {
            return Err(FailureReason::invalid_input("query must not be empty"));
        }

        if let Some(answer) = self.instant_answer(&query).await? {
            return Ok(answer);
        }

        match &self.serpapi_key {
            Some(key) => {
                tracing::debug!(%query, "no instant answer, falling back to SerpAPI");
                self.google(&query, key).await
            }
            None => Err(FailureReason::not_found(
                "No relevant web result found and SERPAPI_API_KEY not set for fallback.",
            )),
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date information. Use this for real-world, current or \
         factual queries such as prices, news, events or product details."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string("query")]
    }

    async fn call(&self, arguments: Arguments) -> ExecutionResult {
        match arguments.string("query") {
            Ok(query) => self.search(query).await.into(),
            Err(reason) => ExecutionResult::failed(reason),
        }
    }
}
