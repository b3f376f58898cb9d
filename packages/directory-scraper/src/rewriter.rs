//! LLM rewriting of scraped text.
//!
//! One request per record carries every eligible field as a JSON object;
//! the model answers with the same keys. Requests share a rolling-window
//! budget, 429s are waited out inside the retry loop, and the reply is
//! merged field by field so a partial answer still helps.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use openai_client::{strip_code_blocks, ChatRequest, Message, OpenAIClient, OpenAIError};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{RewriteError, RewriteResult};
use crate::rate_limit::{RequestWindow, WindowLimits};
use crate::records::ContentType;
use crate::traits::RewriteBackend;
use crate::utils::{with_retry, RetryPolicy};

/// Fields shorter than this (in characters) are left as they are.
pub const DEFAULT_MIN_LENGTH: usize = 10;

/// Default retry-after when a 429 carries no hint.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Rewrites record text through a [`RewriteBackend`].
pub struct Rewriter<B> {
    backend: Arc<B>,
    window: RequestWindow,
    retry: RetryPolicy,
    min_length: usize,
    default_retry_after: Duration,
}

impl<B: RewriteBackend> Rewriter<B> {
    pub fn new(backend: Arc<B>, limits: WindowLimits, retry: RetryPolicy) -> Self {
        Self {
            backend,
            window: RequestWindow::new(limits),
            retry,
            min_length: DEFAULT_MIN_LENGTH,
            default_retry_after: DEFAULT_RETRY_AFTER,
        }
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_default_retry_after(mut self, wait: Duration) -> Self {
        self.default_retry_after = wait;
        self
    }

    /// Rewrite `fields` for a record of `content_type`.
    ///
    /// Returns the input with every field the model rewrote replaced.
    /// Fields below the minimum length are never sent; if none remain, no
    /// request is made.
    pub async fn rewrite(
        &self,
        fields: &IndexMap<String, String>,
        content_type: ContentType,
    ) -> RewriteResult<IndexMap<String, String>> {
        let eligible: IndexMap<&str, &str> = fields
            .iter()
            .filter(|(_, text)| text.trim().chars().count() >= self.min_length)
            .map(|(field, text)| (field.as_str(), text.as_str()))
            .collect();

        if eligible.is_empty() {
            debug!(content_type = %content_type, "Nothing long enough to rewrite");
            return Ok(fields.clone());
        }

        let system = system_prompt(content_type);
        let system = system.as_str();
        let user = serde_json::to_string(&eligible)?;
        let user = user.as_str();
        let field_count = eligible.len();

        let reply = with_retry(self.retry, "rewrite", |attempt| async move {
            self.window.acquire().await;
            debug!(
                content_type = %content_type,
                attempt = attempt + 1,
                fields = field_count,
                "Sending rewrite request"
            );

            match self.backend.complete_json(system, user).await {
                Err(RewriteError::RateLimited { retry_after }) => {
                    let wait = retry_after.unwrap_or(self.default_retry_after);
                    warn!(wait_ms = wait.as_millis() as u64, "Rewrite service rate limited, waiting");
                    tokio::time::sleep(wait).await;
                    Err(RewriteError::RateLimited { retry_after })
                }
                other => other,
            }
        })
        .await?;

        let rewritten = parse_reply(&reply)?;

        let mut merged = fields.clone();
        let mut applied = 0;
        for (field, value) in rewritten {
            let Value::String(text) = value else {
                continue;
            };
            if eligible.contains_key(field.as_str()) && !text.trim().is_empty() {
                merged.insert(field, text);
                applied += 1;
            }
        }

        info!(
            content_type = %content_type,
            requested = eligible.len(),
            applied = applied,
            "Rewrite complete"
        );
        Ok(merged)
    }
}

fn parse_reply(reply: &str) -> RewriteResult<Map<String, Value>> {
    match serde_json::from_str(strip_code_blocks(reply)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RewriteError::InvalidResponse(format!(
            "expected an object, got {}",
            other
        ))),
        Err(e) => Err(RewriteError::InvalidResponse(e.to_string())),
    }
}

fn tone(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Consultant => "a concise, professional third-person biography",
        ContentType::Article => "a clear and engaging editorial style",
        ContentType::EditorialPage => "a clear, informative and neutral style",
        ContentType::SpecialistCategory => "a short, informative overview",
        _ => "a polished, professional third-person voice suited to a business directory",
    }
}

/// Instruction sent with every rewrite of `content_type`.
pub fn system_prompt(content_type: ContentType) -> String {
    format!(
        r#"You are an editor for a directory of EU public affairs professionals in Brussels.

Rewrite the text fields of this {label} in {tone}. Keep every fact exactly as given: names, organisations, numbers, dates and places. Do not add information that is not in the input.

You receive a JSON object mapping field names to text. Respond with a JSON object that has exactly the same keys, each mapped to its rewritten text."#,
        label = content_type.label(),
        tone = tone(content_type),
    )
}

/// [`RewriteBackend`] over an OpenAI-compatible chat-completion endpoint.
pub struct OpenAIRewriteBackend {
    client: OpenAIClient,
    max_completion_tokens: u32,
}

impl OpenAIRewriteBackend {
    pub fn new(client: OpenAIClient, max_completion_tokens: u32) -> Self {
        Self {
            client,
            max_completion_tokens,
        }
    }
}

#[async_trait]
impl RewriteBackend for OpenAIRewriteBackend {
    async fn complete_json(&self, system: &str, user: &str) -> RewriteResult<String> {
        let request = ChatRequest::default()
            .message(Message::system(system))
            .message(Message::user(user))
            .max_completion_tokens(self.max_completion_tokens)
            .json_object();

        match self.client.chat_completion(request).await {
            Ok(response) => Ok(response.content),
            Err(OpenAIError::RateLimited { retry_after }) => {
                Err(RewriteError::RateLimited { retry_after })
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockReply, MockRewriteBackend};
    use tokio::time::Instant;

    fn limits() -> WindowLimits {
        WindowLimits {
            window: Duration::from_secs(60),
            max_requests: 55,
            safety_margin: Duration::from_secs(2),
            min_spacing: Duration::from_secs(1),
        }
    }

    fn rewriter(backend: &MockRewriteBackend) -> Rewriter<MockRewriteBackend> {
        Rewriter::new(
            Arc::new(backend.clone()),
            limits(),
            RetryPolicy::new(3, Duration::from_secs(5)),
        )
    }

    fn fields(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_fields_make_no_request() {
        let backend = MockRewriteBackend::new();
        let input = fields(&[("description", "Too short")]);

        let output = rewriter(&backend)
            .rewrite(&input, ContentType::Consultancy)
            .await
            .unwrap();

        assert_eq!(output, input);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_request_per_record() {
        let backend = MockRewriteBackend::new();
        let input = fields(&[
            ("description", "We advise on EU energy policy."),
            ("achievements", "Shaped the 2030 climate package."),
            ("tagline", "Short"),
        ]);

        let output = rewriter(&backend)
            .rewrite(&input, ContentType::Consultancy)
            .await
            .unwrap();

        assert_eq!(backend.call_count(), 1);
        let (system, user) = &backend.calls()[0];
        assert!(system.contains("consultancy"));
        let payload: Map<String, Value> = serde_json::from_str(user).unwrap();
        assert_eq!(payload.len(), 2);
        assert!(!payload.contains_key("tagline"));

        assert_eq!(output["description"], "Rewritten: We advise on EU energy policy.");
        assert_eq!(output["tagline"], "Short");
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_reply_keeps_missing_fields() {
        let backend = MockRewriteBackend::new().with_reply(MockReply::Json(
            r#"{"excerpt": "A sharper excerpt.", "content": 42, "extra": "ignored"}"#.into(),
        ));
        let input = fields(&[
            ("excerpt", "The original excerpt."),
            ("content", "The original article body."),
            ("author", "Jo Bloggs the columnist"),
        ]);

        let output = rewriter(&backend)
            .rewrite(&input, ContentType::Article)
            .await
            .unwrap();

        assert_eq!(output["excerpt"], "A sharper excerpt.");
        assert_eq!(output["content"], "The original article body.");
        assert_eq!(output["author"], "Jo Bloggs the columnist");
        assert!(!output.contains_key("extra"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_in_code_fence() {
        let backend = MockRewriteBackend::new().with_reply(MockReply::Json(
            "```json\n{\"biography\": \"New biography text.\"}\n```".into(),
        ));
        let input = fields(&[("biography", "Old biography text.")]);

        let output = rewriter(&backend)
            .rewrite(&input, ContentType::Consultant)
            .await
            .unwrap();

        assert_eq!(output["biography"], "New biography text.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_waits_then_retries() {
        let backend = MockRewriteBackend::new()
            .with_reply(MockReply::RateLimited(Some(Duration::from_secs(10))))
            .with_reply(MockReply::Json(r#"{"description": "Done rewriting."}"#.into()));
        let input = fields(&[("description", "Needs rewriting.")]);
        let start = Instant::now();

        let output = rewriter(&backend)
            .rewrite(&input, ContentType::LawFirm)
            .await
            .unwrap();

        assert_eq!(output["description"], "Done rewriting.");
        assert_eq!(backend.call_count(), 2);
        // retry-after, then the first backoff step
        assert!(start.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_without_hint_uses_default() {
        let backend = MockRewriteBackend::new()
            .with_reply(MockReply::RateLimited(None))
            .with_reply(MockReply::Json(r#"{"description": "Done rewriting."}"#.into()));
        let input = fields(&[("description", "Needs rewriting.")]);
        let start = Instant::now();

        rewriter(&backend)
            .rewrite(&input, ContentType::Trainer)
            .await
            .unwrap();

        assert!(start.elapsed() >= DEFAULT_RETRY_AFTER + Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_propagates_after_retries() {
        let backend = MockRewriteBackend::new();
        backend.always_fail();
        let input = fields(&[("description", "Needs rewriting.")]);

        let err = rewriter(&backend)
            .rewrite(&input, ContentType::DigitalTool)
            .await
            .unwrap_err();

        assert!(matches!(err, RewriteError::Service(_)));
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_object_reply_is_an_error() {
        let backend = MockRewriteBackend::new().with_reply(MockReply::Json("[1, 2]".into()));
        let input = fields(&[("description", "Needs rewriting.")]);

        let err = rewriter(&backend)
            .rewrite(&input, ContentType::DigitalTool)
            .await
            .unwrap_err();

        assert!(matches!(err, RewriteError::InvalidResponse(_)));
    }

    #[test]
    fn test_system_prompt_names_type_and_demands_same_keys() {
        for content_type in ContentType::ALL {
            let prompt = system_prompt(content_type);
            assert!(prompt.contains(content_type.label()));
            assert!(prompt.contains("exactly the same keys"));
        }
    }
}
