use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::rate_limit::WindowLimits;
use crate::rewriter::{DEFAULT_MIN_LENGTH, DEFAULT_RETRY_AFTER};
use crate::utils::RetryPolicy;

const DEFAULT_API_VERSION: &str = "2024-10-21";
const DEFAULT_SOURCE_URL: &str = "https://www.bestinbrussels.eu";
const DEFAULT_PUBLIC_DIR: &str = "public";
const DEFAULT_PROGRESS_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scrape-progress.json");

/// Scraper configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub azure_openai_endpoint: String,
    pub azure_openai_api_key: String,
    pub azure_openai_deployment: String,
    pub azure_openai_api_version: String,
    pub database_url: String,
    pub database_name: Option<String>,
    pub source_url: String,
    pub public_dir: PathBuf,
    pub progress_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            azure_openai_endpoint: env::var("AZURE_OPENAI_ENDPOINT")
                .context("AZURE_OPENAI_ENDPOINT must be set")?,
            azure_openai_api_key: env::var("AZURE_OPENAI_API_KEY")
                .context("AZURE_OPENAI_API_KEY must be set")?,
            azure_openai_deployment: env::var("AZURE_OPENAI_DEPLOYMENT")
                .context("AZURE_OPENAI_DEPLOYMENT must be set")?,
            azure_openai_api_version: env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_name: env::var("DATABASE_NAME").ok().filter(|name| !name.is_empty()),
            source_url: env::var("SCRAPER_SOURCE_URL")
                .unwrap_or_else(|_| DEFAULT_SOURCE_URL.to_string()),
            public_dir: env::var("SCRAPER_PUBLIC_DIR")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_DIR.to_string())
                .into(),
            progress_file: env::var("SCRAPER_PROGRESS_FILE")
                .unwrap_or_else(|_| DEFAULT_PROGRESS_FILE.to_string())
                .into(),
        })
    }
}

/// Pacing, retry and rewrite limits for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Gap between the end of one page fetch and the start of the next
    pub page_interval: Duration,
    pub page_retry: RetryPolicy,
    pub image_retry: RetryPolicy,
    /// Pause after each downloaded image
    pub image_delay: Duration,
    pub rewrite_window: WindowLimits,
    pub rewrite_retry: RetryPolicy,
    /// Wait used when a 429 carries no retry-after hint
    pub default_retry_after: Duration,
    /// Shorter fields are not sent for rewriting
    pub min_rewrite_length: usize,
    pub max_completion_tokens: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            page_interval: Duration::from_millis(1500),
            page_retry: RetryPolicy::new(3, Duration::from_secs(2)),
            image_retry: RetryPolicy::new(3, Duration::from_secs(1)),
            image_delay: Duration::from_millis(500),
            rewrite_window: WindowLimits {
                window: Duration::from_secs(60),
                max_requests: 55,
                safety_margin: Duration::from_secs(2),
                min_spacing: Duration::from_secs(1),
            },
            rewrite_retry: RetryPolicy::new(3, Duration::from_secs(5)),
            default_retry_after: DEFAULT_RETRY_AFTER,
            min_rewrite_length: DEFAULT_MIN_LENGTH,
            max_completion_tokens: 4000,
        }
    }
}
