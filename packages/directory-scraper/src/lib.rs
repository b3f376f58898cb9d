//! Directory Site Scraper
//!
//! Mirrors the Best in Brussels directory (consultancies, consultants, law
//! firms, intelligence systems, digital tools, trainers, specialist
//! categories, articles and editorial pages) into a document store.
//!
//! # Pipeline
//!
//! - Discover record URLs from the site's XML indexes
//! - Fetch each page politely (one request at a time, paced, retried)
//! - Parse it into a typed record and cache its image locally
//! - Rewrite the descriptive fields through an LLM, keeping the originals
//! - Upsert the document by slug and record progress in a JSON ledger
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use directory_scraper::{Pipeline, ProgressTracker, RunOptions, MemoryStore};
//! use directory_scraper::testing::{fast_settings, MockRewriteBackend, MockWebClient};
//!
//! let mut pipeline = Pipeline::new(
//!     Arc::new(MockWebClient::new()),
//!     Arc::new(MockRewriteBackend::new()),
//!     Arc::new(MemoryStore::new()),
//!     ProgressTracker::load("scrape-progress.json"),
//!     url::Url::parse("https://www.bestinbrussels.eu")?,
//!     "public",
//!     fast_settings(),
//! );
//! let tasks = pipeline.discover().await;
//! let summary = pipeline.run(&tasks, RunOptions::default()).await?;
//! println!("{summary}");
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams to the web, the rewrite model and the store
//! - [`parsers`] - One field parser per content type
//! - [`pipeline`] - Run orchestration and resume logic
//! - [`stores`] - Store implementations (MemoryStore, PostgresStore)
//! - [`testing`] - Mock implementations for testing

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetcher;
pub mod html;
pub mod images;
pub mod parsers;
pub mod pipeline;
pub mod progress;
pub mod rate_limit;
pub mod records;
pub mod rewriter;
pub mod sections;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod utils;

// Re-export core types at crate root
pub use client::HttpClient;
pub use config::{Config, PipelineSettings};
pub use discovery::{Frontier, UrlDiscoverer};
pub use error::{
    FetchError, ParseError, ProgressError, RewriteError, ScrapeError, StoreError,
};
pub use fetcher::PageFetcher;
pub use html::{Document, Node};
pub use images::ImageDownloader;
pub use pipeline::{CrawlTask, Pipeline, RunOptions, RunSummary, TaskSummary};
pub use progress::{Ledger, LedgerError, Phase, ProgressTracker};
pub use records::{ContentType, RecordDocument, ScrapedRecord};
pub use rewriter::{OpenAIRewriteBackend, Rewriter};
pub use stores::{MemoryStore, PostgresStore};
pub use traits::{RecordStore, RewriteBackend, WebClient};
