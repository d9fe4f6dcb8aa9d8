//! # Network Tools
//!
//! Tools backed by public HTTP APIs. Every tool takes its base URL from an
//! [`HttpConfig`] so tests can point it at a local mock server.

mod currency;
mod weather;
mod web_search;
mod wikipedia;

pub use currency::{CurrencyConvertTool, normalize_currency};
pub use weather::WeatherTool;
pub use web_search::{WebSearchTool, normalize_query};
pub use wikipedia::{WikipediaTool, normalize_topic};

use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use switchboard_core::FailureReason;

/// Client settings shared by the network tools of one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: format!("switchboard-provider/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Build a client. Some public APIs (Nominatim) reject requests
    /// without a User-Agent.
    pub fn client(&self) -> Result<Client, FailureReason> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| FailureReason::internal(format!("failed to build HTTP client: {e}")))
    }
}

async fn send(request: RequestBuilder) -> Result<Response, FailureReason> {
    let response = request
        .send()
        .await
        .map_err(|e| FailureReason::network(e.to_string()))?;
    tracing::debug!(status = response.status().as_u16(), url = %response.url(), "upstream responded");
    Ok(response)
}

async fn read_json(response: Response) -> Result<Value, FailureReason> {
    let status = response.status().as_u16();
    response.json::<Value>().await.map_err(|e| {
        FailureReason::upstream(format!("invalid JSON in response (HTTP {status}): {e}"))
    })
}

/// Send a request and decode the JSON body, whatever the status code.
async fn fetch_json(request: RequestBuilder) -> Result<Value, FailureReason> {
    read_json(send(request).await?).await
}

fn trim_base(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_client_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "switchboard-test/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let config = HttpConfig {
            user_agent: "switchboard-test/1".to_string(),
            ..HttpConfig::default()
        }
        .with_timeout(5);
        let client = config.client().unwrap();
        let body = fetch_json(client.get(server.uri())).await.unwrap();
        assert_eq!(body["ok"], true);
    }

    #[test]
    fn test_default_user_agent_names_the_provider() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout_secs, 15);
        assert!(config.user_agent.starts_with("switchboard-provider/"));
    }
}
