//! Typed errors for the scraping pipeline.
//!
//! Each concern gets its own enum so callers can decide per phase whether a
//! failure is recoverable. [`ScrapeError`] is the umbrella the pipeline returns.

use std::time::Duration;

use openai_client::OpenAIError;
use thiserror::Error;

/// Errors from fetching pages, indexes, or images.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, connection reset, body read)
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Non-2xx response
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// URL could not be parsed or resolved
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Writing a downloaded file failed
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from turning a page into a record.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The URL has no usable path segment to derive a slug from
    #[error("no slug derivable from {url}")]
    MissingSlug { url: String },

    /// The record could not be converted to a document
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from the text-rewrite service.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Service answered 429, optionally with a retry-after hint
    #[error("rewrite service rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// Any other service failure
    #[error("rewrite service error: {0}")]
    Service(#[from] OpenAIError),

    /// The model's reply was not a JSON object
    #[error("rewrite response was not a JSON object: {0}")]
    InvalidResponse(String),

    /// The request payload could not be built
    #[error("rewrite payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document for {collection} has no slug")]
    MissingSlug { collection: String },
}

/// Errors from reading or writing the progress ledger.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("ledger I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors surfaced by the pipeline.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("rewrite failed: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("store failed: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for parse operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type alias for rewrite operations.
pub type RewriteResult<T> = std::result::Result<T, RewriteError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for ledger operations.
pub type ProgressResult<T> = std::result::Result<T, ProgressError>;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;
