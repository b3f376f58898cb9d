//! Crawl frontier discovery.
//!
//! Every indexed content type publishes a sitemap-style XML file listing
//! its pages. Editorial pages have no index; they come from a fixed list
//! of site paths.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use url::Url;

use crate::fetcher::PageFetcher;
use crate::records::ContentType;
use crate::traits::WebClient;

lazy_static! {
    static ref LOC_REGEX: Regex = Regex::new(r"(?is)<loc>\s*(.*?)\s*</loc>").unwrap();
}

/// Editorial page paths, relative to the site root.
pub const EDITORIAL_PATHS: &[&str] = &[
    "/about-us/",
    "/about-us/our-team/",
    "/contact/",
    "/advertise/",
    "/eu-affairs-guide/",
    "/eu-affairs-guide/eu-institutions/",
    "/eu-affairs-guide/eu-decision-making/",
    "/eu-affairs-guide/lobbying-in-brussels/",
    "/eu-affairs-guide/transparency-register/",
    "/eu-affairs-guide/working-with-consultancies/",
];

/// Discovered URLs per content type, in crawl order.
pub type Frontier = IndexMap<ContentType, Vec<String>>;

/// Builds the crawl frontier from the site's indexes.
#[derive(Debug, Clone)]
pub struct UrlDiscoverer {
    base_url: String,
    editorial_paths: Vec<String>,
}

impl UrlDiscoverer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            editorial_paths: EDITORIAL_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Replace the editorial path list.
    pub fn with_editorial_paths(mut self, paths: Vec<String>) -> Self {
        self.editorial_paths = paths;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Discover URLs for every content type.
    ///
    /// A failed index yields an empty list for its type; discovery itself
    /// never fails.
    pub async fn discover<C: WebClient>(&self, fetcher: &PageFetcher<C>) -> Frontier {
        let mut frontier = Frontier::new();

        for content_type in ContentType::ALL {
            let urls = match content_type.index_path() {
                Some(path) => self.discover_index(fetcher, content_type, path).await,
                None => self.editorial_urls(),
            };
            info!(content_type = %content_type, count = urls.len(), "Discovered URLs");
            frontier.insert(content_type, urls);
        }

        frontier
    }

    async fn discover_index<C: WebClient>(
        &self,
        fetcher: &PageFetcher<C>,
        content_type: ContentType,
        path: &str,
    ) -> Vec<String> {
        let index_url = format!("{}{}", self.base_url, path);
        match fetcher.fetch_text(&index_url).await {
            Ok(xml) => parse_index(&xml),
            Err(e) => {
                warn!(
                    content_type = %content_type,
                    url = %index_url,
                    error = %e,
                    "Index fetch failed, continuing without it"
                );
                Vec::new()
            }
        }
    }

    /// Absolute URLs for the editorial paths.
    pub fn editorial_urls(&self) -> Vec<String> {
        self.editorial_paths
            .iter()
            .map(|path| format!("{}/{}", self.base_url, path.trim_start_matches('/')))
            .collect()
    }
}

/// Every `<loc>` entry of a sitemap, de-duplicated in first-seen order.
///
/// Only absolute http(s) URLs are kept.
pub fn parse_index(xml: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    for capture in LOC_REGEX.captures_iter(xml) {
        let raw = unescape_xml(capture[1].trim());
        let raw = raw
            .trim_start_matches("<![CDATA[")
            .trim_end_matches("]]>")
            .trim();
        let Ok(url) = Url::parse(raw) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        let url = raw.to_string();
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    urls
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWebClient;
    use crate::utils::RetryPolicy;
    use std::sync::Arc;
    use std::time::Duration;

    const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://www.bestinbrussels.eu/best_consultancies/acme/</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc>
    https://www.bestinbrussels.eu/best_consultancies/beta/
  </loc></url>
  <url><loc>https://www.bestinbrussels.eu/best_consultancies/acme/</loc></url>
  <url><loc>https://www.bestinbrussels.eu/best_consultancies/c?a=1&amp;b=2</loc></url>
  <url><loc>/relative/ignored/</loc></url>
</urlset>"#;

    #[test]
    fn test_parse_index() {
        assert_eq!(
            parse_index(SITEMAP),
            vec![
                "https://www.bestinbrussels.eu/best_consultancies/acme/",
                "https://www.bestinbrussels.eu/best_consultancies/beta/",
                "https://www.bestinbrussels.eu/best_consultancies/c?a=1&b=2",
            ]
        );
        assert!(parse_index("<html>not a sitemap</html>").is_empty());
    }

    #[test]
    fn test_editorial_urls() {
        let discoverer = UrlDiscoverer::new("https://www.bestinbrussels.eu/")
            .with_editorial_paths(vec!["/about-us/".into(), "contact/".into()]);

        assert_eq!(
            discoverer.editorial_urls(),
            vec![
                "https://www.bestinbrussels.eu/about-us/",
                "https://www.bestinbrussels.eu/contact/",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_index_yields_empty_list() {
        let base = "https://www.bestinbrussels.eu";
        let client = MockWebClient::new()
            .with_page(format!("{}/best_consultancies-sitemap.xml", base), SITEMAP);
        // Every other index answers 404
        let fetcher = PageFetcher::new(
            Arc::new(client.clone()),
            Duration::ZERO,
            RetryPolicy::new(2, Duration::from_millis(10)),
        );

        let frontier = UrlDiscoverer::new(base).discover(&fetcher).await;

        assert_eq!(frontier.len(), ContentType::ALL.len());
        assert_eq!(frontier[&ContentType::Consultancy].len(), 3);
        assert!(frontier[&ContentType::Consultant].is_empty());
        assert!(frontier[&ContentType::Article].is_empty());
        assert_eq!(
            frontier[&ContentType::EditorialPage].len(),
            EDITORIAL_PATHS.len()
        );
        // Fetcher retries apply, nothing more
        assert_eq!(
            client.calls_for(&format!("{}/best_consultants-sitemap.xml", base)),
            2
        );
        let keys: Vec<_> = frontier.keys().copied().collect();
        assert_eq!(keys, ContentType::ALL.to_vec());
    }
}
