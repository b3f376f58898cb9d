//! Test doubles for the pipeline's seams.
//!
//! These let the whole scrape → rewrite → save flow run without network or
//! database access. See also [`crate::stores::MemoryStore`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use openai_client::OpenAIError;
use serde_json::Value;

use crate::error::{FetchError, FetchResult, RewriteError, RewriteResult};
use crate::config::PipelineSettings;
use crate::rate_limit::WindowLimits;
use crate::traits::{RewriteBackend, WebClient};
use crate::utils::RetryPolicy;

/// Canned web responses with call tracking.
///
/// Unknown URLs answer 404. Clones share state, so a test can keep a handle
/// after passing the client to the pipeline.
#[derive(Default, Clone)]
pub struct MockWebClient {
    pages: Arc<RwLock<HashMap<String, String>>>,
    bytes: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// Remaining forced failures per URL
    failures: Arc<RwLock<HashMap<String, u32>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockWebClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&self, url: impl Into<String>, body: impl Into<String>) {
        self.pages.write().unwrap().insert(url.into(), body.into());
    }

    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.add_page(url, body);
        self
    }

    pub fn add_bytes(&self, url: impl Into<String>, body: Vec<u8>) {
        self.bytes.write().unwrap().insert(url.into(), body);
    }

    pub fn with_bytes(self, url: impl Into<String>, body: Vec<u8>) -> Self {
        self.add_bytes(url, body);
        self
    }

    /// Answer 503 for the next `times` requests to `url`.
    pub fn fail_times(&self, url: impl Into<String>, times: u32) {
        self.failures.write().unwrap().insert(url.into(), times);
    }

    /// Answer 503 for every request to `url`.
    pub fn always_fail(&self, url: impl Into<String>) {
        self.fail_times(url, u32::MAX);
    }

    /// Every requested URL, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// How many times `url` was requested.
    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }

    fn record(&self, url: &str) -> FetchResult<()> {
        self.calls.write().unwrap().push(url.to_string());

        let mut failures = self.failures.write().unwrap();
        if let Some(remaining) = failures.get_mut(url) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                return Err(FetchError::Status {
                    status: 503,
                    url: url.to_string(),
                });
            }
        }
        Ok(())
    }

    fn not_found(url: &str) -> FetchError {
        FetchError::Status {
            status: 404,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl WebClient for MockWebClient {
    async fn get_text(&self, url: &str) -> FetchResult<String> {
        self.record(url)?;
        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }

    async fn get_bytes(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.record(url)?;
        self.bytes
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }
}

/// A queued reply for [`MockRewriteBackend`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text as the model's answer
    Json(String),
    /// Answer 429 with the given retry-after hint
    RateLimited(Option<Duration>),
    /// Fail with a network error
    Fail(String),
}

/// Rewrite backend with scripted replies.
///
/// Queued replies are used first. Once the queue is empty the backend
/// echoes the request payload with every string value prefixed by
/// `"Rewritten: "`, unless [`MockRewriteBackend::always_fail`] was called.
#[derive(Default, Clone)]
pub struct MockRewriteBackend {
    replies: Arc<RwLock<VecDeque<MockReply>>>,
    always_fail: Arc<RwLock<bool>>,
    calls: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockRewriteBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: MockReply) {
        self.replies.write().unwrap().push_back(reply);
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.push_reply(reply);
        self
    }

    /// Fail every call that has no queued reply.
    pub fn always_fail(&self) {
        *self.always_fail.write().unwrap() = true;
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// `(system, user)` messages of every call, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.read().unwrap().clone()
    }

    fn echo(user: &str) -> RewriteResult<String> {
        let mut payload: serde_json::Map<String, Value> = serde_json::from_str(user)
            .map_err(|e| RewriteError::InvalidResponse(e.to_string()))?;
        for value in payload.values_mut() {
            if let Value::String(text) = value {
                *text = format!("Rewritten: {}", text);
            }
        }
        Ok(Value::Object(payload).to_string())
    }
}

#[async_trait]
impl RewriteBackend for MockRewriteBackend {
    async fn complete_json(&self, system: &str, user: &str) -> RewriteResult<String> {
        self.calls
            .write()
            .unwrap()
            .push((system.to_string(), user.to_string()));

        let queued = self.replies.write().unwrap().pop_front();
        match queued {
            Some(MockReply::Json(text)) => Ok(text),
            Some(MockReply::RateLimited(retry_after)) => Err(RewriteError::RateLimited { retry_after }),
            Some(MockReply::Fail(message)) => Err(OpenAIError::Network(message).into()),
            None if *self.always_fail.read().unwrap() => {
                Err(OpenAIError::Network("connection refused".into()).into())
            }
            None => Self::echo(user),
        }
    }
}

/// Pipeline settings with every delay set to zero.
pub fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        page_interval: Duration::ZERO,
        page_retry: RetryPolicy::new(3, Duration::ZERO),
        image_retry: RetryPolicy::new(3, Duration::ZERO),
        image_delay: Duration::ZERO,
        rewrite_window: WindowLimits {
            window: Duration::from_secs(60),
            max_requests: 1000,
            safety_margin: Duration::ZERO,
            min_spacing: Duration::ZERO,
        },
        rewrite_retry: RetryPolicy::new(3, Duration::ZERO),
        default_retry_after: Duration::ZERO,
        ..PipelineSettings::default()
    }
}
