//! HTTP access used for pages, indexes and images.

use async_trait::async_trait;

use crate::error::FetchResult;

/// Plain GET access to the source site.
///
/// Implementations return an error for transport failures and for any
/// non-2xx status; retrying and pacing are the caller's job.
#[async_trait]
pub trait WebClient: Send + Sync {
    /// Fetch a URL and return its body as text.
    async fn get_text(&self, url: &str) -> FetchResult<String>;

    /// Fetch a URL and return its raw body.
    async fn get_bytes(&self, url: &str) -> FetchResult<Vec<u8>>;
}
