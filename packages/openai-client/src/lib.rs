//! Pure OpenAI-compatible chat completion client
//!
//! A minimal client for chat completions with no domain-specific logic. Talks
//! either to the public OpenAI API or to an Azure OpenAI deployment.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{ChatRequest, Message, OpenAIClient};
//!
//! let client = OpenAIClient::azure(endpoint, api_key, "gpt-4o-mini", "2024-10-21");
//!
//! let response = client.chat_completion(
//!     ChatRequest::default()
//!         .message(Message::system("Reply in JSON."))
//!         .message(Message::user("{\"greeting\": \"hello\"}"))
//!         .json_object(),
//! ).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

/// How requests are addressed and authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `{base_url}/chat/completions` with a bearer token.
    OpenAI { base_url: String },

    /// `{base_url}/openai/deployments/{deployment}/chat/completions?api-version=…`
    /// with an `api-key` header.
    Azure {
        base_url: String,
        deployment: String,
        api_version: String,
    },
}

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    endpoint: Endpoint,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            endpoint: Endpoint::OpenAI {
                base_url: "https://api.openai.com/v1".to_string(),
            },
        }
    }

    /// Create a client for an Azure OpenAI deployment.
    pub fn azure(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            endpoint: Endpoint::Azure {
                base_url: base_url.into().trim_end_matches('/').to_string(),
                deployment: deployment.into(),
                api_version: api_version.into(),
            },
        }
    }

    /// Set a custom base URL (for proxies or compatible services).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        match &mut self.endpoint {
            Endpoint::OpenAI { base_url } | Endpoint::Azure { base_url, .. } => *base_url = url,
        }
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Full URL of the chat completions resource.
    pub fn chat_completions_url(&self) -> String {
        match &self.endpoint {
            Endpoint::OpenAI { base_url } => format!("{}/chat/completions", base_url),
            Endpoint::Azure {
                base_url,
                deployment,
                api_version,
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                base_url, deployment, api_version
            ),
        }
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and get a response.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let builder = self
            .http_client
            .post(self.chat_completions_url())
            .header("Content-Type", "application/json");
        let builder = match &self.endpoint {
            Endpoint::OpenAI { .. } => {
                builder.header("Authorization", format!("Bearer {}", self.api_key))
            }
            Endpoint::Azure { .. } => builder.header("api-key", &self.api_key),
        };

        let response = builder.json(&request).send().await.map_err(|e| {
            warn!(error = %e, "Chat completion request failed");
            OpenAIError::Network(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after(response.headers());
            warn!(retry_after = ?retry_after, "Chat completion rate limited");
            return Err(OpenAIError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Chat completion API error");
            return Err(OpenAIError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OpenAIError::Parse("No content in chat completion".into()))?;

        debug!(
            duration_ms = start.elapsed().as_millis(),
            "Chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }
}

/// Read the server's back-off hint. Azure sends `retry-after-ms` alongside
/// the standard `retry-after` (seconds).
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(ms) = header("retry-after-ms").and_then(|v| v.trim().parse::<u64>().ok()) {
        return Some(Duration::from_millis(ms));
    }
    header("retry-after")
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_client_builder() {
        let client = OpenAIClient::new("sk-test").with_base_url("https://custom.api.com/");

        assert_eq!(client.api_key, "sk-test");
        assert_eq!(
            client.chat_completions_url(),
            "https://custom.api.com/chat/completions"
        );
    }

    #[test]
    fn test_azure_url() {
        let client = OpenAIClient::azure(
            "https://example.openai.azure.com/",
            "key",
            "rewriter",
            "2024-10-21",
        );

        assert_eq!(
            client.chat_completions_url(),
            "https://example.openai.azure.com/openai/deployments/rewriter/chat/completions?api-version=2024-10-21"
        );
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert("retry-after", HeaderValue::from_static("12"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(12)));

        headers.insert("retry-after-ms", HeaderValue::from_static("1500"));
        assert_eq!(retry_after(&headers), Some(Duration::from_millis(1500)));

        let mut bad = HeaderMap::new();
        bad.insert("retry-after", HeaderValue::from_static("soon"));
        assert_eq!(retry_after(&bad), None);
    }
}
