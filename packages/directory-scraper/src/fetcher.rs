//! Paced, retrying page fetches.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::FetchResult;
use crate::html::Document;
use crate::rate_limit::RequestPacer;
use crate::traits::WebClient;
use crate::utils::{with_retry, RetryPolicy};

/// Fetches pages one at a time with a fixed gap between requests.
///
/// Each attempt, including retries, waits for the pacer, so the site never
/// sees two requests closer than `min_interval` apart.
pub struct PageFetcher<C> {
    client: Arc<C>,
    pacer: RequestPacer,
    retry: RetryPolicy,
}

impl<C: WebClient> PageFetcher<C> {
    pub fn new(client: Arc<C>, min_interval: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            pacer: RequestPacer::new(min_interval),
            retry,
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Fetch a URL's body, retrying with exponential backoff.
    ///
    /// After the last attempt fails its error is returned.
    pub async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        with_retry(self.retry, url, |attempt| async move {
            self.pacer.wait().await;
            debug!(url = %url, attempt = attempt + 1, "Fetching page");
            let result = self.client.get_text(url).await;
            self.pacer.finish();
            result
        })
        .await
    }

    /// Fetch and parse a page.
    pub async fn fetch(&self, url: &str) -> FetchResult<Document> {
        let html = self.fetch_text(url).await?;
        Ok(Document::parse(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::testing::MockWebClient;
    use tokio::time::Instant;

    const URL: &str = "https://example.com/best_consultancies/acme/";

    #[tokio::test(start_paused = true)]
    async fn test_fetch_retries_then_succeeds() {
        let client = MockWebClient::new().with_page(URL, "<h1>Acme</h1>");
        client.fail_times(URL, 2);
        let fetcher = PageFetcher::new(
            Arc::new(client.clone()),
            Duration::ZERO,
            RetryPolicy::new(3, Duration::from_secs(2)),
        );
        let start = Instant::now();

        let doc = fetcher.fetch(URL).await.unwrap();

        assert_eq!(doc.text_of("h1").as_deref(), Some("Acme"));
        assert_eq!(client.calls_for(URL), 3);
        // 2s + 4s of backoff
        assert!(start.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_gives_up_after_ceiling() {
        let client = MockWebClient::new();
        client.always_fail(URL);
        let fetcher = PageFetcher::new(
            Arc::new(client.clone()),
            Duration::ZERO,
            RetryPolicy::new(3, Duration::from_secs(1)),
        );

        let err = fetcher.fetch_text(URL).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert_eq!(client.calls_for(URL), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_are_paced() {
        let client = MockWebClient::new()
            .with_page("https://example.com/a/", "a")
            .with_page("https://example.com/b/", "b");
        let fetcher = PageFetcher::new(
            Arc::new(client),
            Duration::from_millis(1500),
            RetryPolicy::new(1, Duration::ZERO),
        );
        let start = Instant::now();

        fetcher.fetch_text("https://example.com/a/").await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(1));

        fetcher.fetch_text("https://example.com/b/").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }
}
