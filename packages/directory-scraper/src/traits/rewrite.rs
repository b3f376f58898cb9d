//! Chat-completion access for the rewriter.

use async_trait::async_trait;

use crate::error::RewriteResult;

/// A text-generation service that answers with a JSON object.
#[async_trait]
pub trait RewriteBackend: Send + Sync {
    /// Send one system + user message pair and return the raw reply text.
    ///
    /// A 429 must surface as [`RewriteError::RateLimited`] so the caller can
    /// honour the retry-after hint.
    ///
    /// [`RewriteError::RateLimited`]: crate::error::RewriteError::RateLimited
    async fn complete_json(&self, system: &str, user: &str) -> RewriteResult<String>;
}
