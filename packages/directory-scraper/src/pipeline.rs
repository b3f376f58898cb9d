//! Run orchestration.
//!
//! Content types are crawled one after another and URLs within a type one
//! at a time. Each URL moves through
//!
//! ```text
//! Pending -> Scraped -> (Rewritten) -> Saved
//! ```
//!
//! and can drop into an error state from any phase. Scrape failures skip
//! the URL, rewrite failures fall back to the scraped text, and store
//! failures end the run.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{error, info, warn};
use url::Url;

use crate::config::PipelineSettings;
use crate::discovery::{Frontier, UrlDiscoverer};
use crate::error::{ProgressResult, Result, StoreError};
use crate::fetcher::PageFetcher;
use crate::html::Document;
use crate::images::ImageDownloader;
use crate::parsers::{parser_for, ParseFn};
use crate::progress::{LedgerError, Phase, ProgressTracker};
use crate::records::{ContentType, RecordDocument, RewriteField};
use crate::rewriter::Rewriter;
use crate::traits::{RecordStore, RewriteBackend, WebClient};

/// Number of ledger errors shown in the run summary.
const RECENT_ERRORS: usize = 10;

/// Everything needed to crawl one content type.
#[derive(Debug, Clone)]
pub struct CrawlTask {
    pub content_type: ContentType,
    pub urls: Vec<String>,
    pub parse: ParseFn,
    pub collection: &'static str,
    pub image_field: &'static str,
    pub rewrite_fields: &'static [RewriteField],
}

impl CrawlTask {
    pub fn new(content_type: ContentType, urls: Vec<String>) -> Self {
        Self {
            content_type,
            urls,
            parse: parser_for(content_type),
            collection: content_type.collection(),
            image_field: content_type.image_field(),
            rewrite_fields: content_type.rewrite_fields(),
        }
    }

    /// One task per discovered content type, in frontier order.
    pub fn from_frontier(frontier: Frontier) -> Vec<Self> {
        frontier
            .into_iter()
            .map(|(content_type, urls)| Self::new(content_type, urls))
            .collect()
    }
}

/// Command-line switches for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip URLs already in the ledger's `scraped` list
    pub resume: bool,
    /// Never call the rewrite service
    pub scrape_only: bool,
    /// Only process URLs that were scraped but never rewritten
    pub rewrite_only: bool,
    /// Accepted for compatibility; has no effect
    pub retry_errors: bool,
}

/// Counts for one content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub content_type: ContentType,
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl TaskSummary {
    fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            processed: 0,
            skipped: 0,
            errors: 0,
        }
    }
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tasks: Vec<TaskSummary>,
    /// Most recent ledger errors, oldest first
    pub recent_errors: Vec<LedgerError>,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.tasks.iter().map(|t| t.processed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.tasks.iter().map(|t| t.skipped).sum()
    }

    pub fn errors(&self) -> usize {
        self.tasks.iter().map(|t| t.errors).sum()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scrape summary:")?;
        for task in &self.tasks {
            writeln!(
                f,
                "  {}: {} processed, {} skipped, {} errors",
                task.content_type, task.processed, task.skipped, task.errors
            )?;
        }
        if !self.recent_errors.is_empty() {
            writeln!(f, "Recent errors:")?;
            for err in &self.recent_errors {
                writeln!(f, "  {}", err)?;
            }
        }
        Ok(())
    }
}

/// What happened to a single URL.
enum UrlOutcome {
    Saved { rewrite_failed: bool },
    ScrapeFailed,
}

/// Drives discovery, scraping, rewriting and saving.
pub struct Pipeline<C, B, S> {
    fetcher: PageFetcher<C>,
    discoverer: UrlDiscoverer,
    images: ImageDownloader<C>,
    rewriter: Rewriter<B>,
    store: Arc<S>,
    progress: ProgressTracker,
}

impl<C, B, S> Pipeline<C, B, S>
where
    C: WebClient,
    B: RewriteBackend,
    S: RecordStore,
{
    pub fn new(
        client: Arc<C>,
        backend: Arc<B>,
        store: Arc<S>,
        progress: ProgressTracker,
        source_url: Url,
        public_dir: impl Into<PathBuf>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            fetcher: PageFetcher::new(client.clone(), settings.page_interval, settings.page_retry),
            discoverer: UrlDiscoverer::new(source_url.as_str()),
            images: ImageDownloader::new(
                client,
                source_url,
                public_dir,
                settings.image_retry,
                settings.image_delay,
            ),
            rewriter: Rewriter::new(backend, settings.rewrite_window, settings.rewrite_retry)
                .with_min_length(settings.min_rewrite_length)
                .with_default_retry_after(settings.default_retry_after),
            store,
            progress,
        }
    }

    pub fn with_discoverer(mut self, discoverer: UrlDiscoverer) -> Self {
        self.discoverer = discoverer;
        self
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Build the crawl tasks from the site's indexes.
    pub async fn discover(&self) -> Vec<CrawlTask> {
        let frontier = self.discoverer.discover(&self.fetcher).await;
        CrawlTask::from_frontier(frontier)
    }

    /// Process every task in order.
    ///
    /// Only a store failure aborts the run; everything else is logged to
    /// the ledger and counted.
    pub async fn run(&mut self, tasks: &[CrawlTask], options: RunOptions) -> Result<RunSummary> {
        if options.retry_errors {
            warn!("--retry-errors has no effect; failed URLs are retried by a normal or --resume run");
        }
        if options.rewrite_only && options.scrape_only {
            warn!("--rewrite-only with --scrape-only: URLs are re-scraped but not rewritten");
        }

        let mut summary = RunSummary::default();
        for task in tasks {
            let task_summary = self.run_task(task, options).await?;
            summary.tasks.push(task_summary);
        }

        summary.recent_errors = self.progress.ledger().recent_errors(RECENT_ERRORS).to_vec();
        info!(
            processed = summary.processed(),
            skipped = summary.skipped(),
            errors = summary.errors(),
            "Run complete"
        );
        Ok(summary)
    }

    async fn run_task(&mut self, task: &CrawlTask, options: RunOptions) -> Result<TaskSummary> {
        let mut summary = TaskSummary::new(task.content_type);
        let total = task.urls.len();
        info!(content_type = %task.content_type, urls = total, "Starting task");

        for (index, url) in task.urls.iter().enumerate() {
            if self.should_skip(url, options) {
                summary.skipped += 1;
                continue;
            }

            info!(
                content_type = %task.content_type,
                url = %url,
                position = index + 1,
                total = total,
                "Processing"
            );

            match self.process_url(task, url, options).await? {
                UrlOutcome::Saved { rewrite_failed } => {
                    summary.processed += 1;
                    if rewrite_failed {
                        summary.errors += 1;
                    }
                }
                UrlOutcome::ScrapeFailed => summary.errors += 1,
            }
        }

        info!(
            content_type = %task.content_type,
            processed = summary.processed,
            skipped = summary.skipped,
            errors = summary.errors,
            "Task complete"
        );
        Ok(summary)
    }

    fn should_skip(&self, url: &str, options: RunOptions) -> bool {
        let ledger = self.progress.ledger();
        if options.rewrite_only {
            return !(ledger.is_scraped(url) && !ledger.is_rewritten(url));
        }
        options.resume && ledger.is_scraped(url)
    }

    async fn process_url(&mut self, task: &CrawlTask, url: &str, options: RunOptions) -> Result<UrlOutcome> {
        // Pending -> Scraped
        let mut document = match self.scrape(task, url).await {
            Ok(document) => document,
            Err(e) => {
                error!(url = %url, error = %e, "Scrape failed");
                let logged = self.progress.log_error(url, &e, Phase::Scrape);
                self.check_ledger(logged);
                return Ok(UrlOutcome::ScrapeFailed);
            }
        };
        let marked = self.progress.mark_scraped(url);
        self.check_ledger(marked);

        // Scraped -> Rewritten
        let mut rewrite_failed = false;
        if !options.scrape_only && !task.rewrite_fields.is_empty() {
            let input = document.rewrite_input(task.rewrite_fields);
            match self.rewriter.rewrite(&input, task.content_type).await {
                Ok(rewritten) => {
                    document.apply_rewrites(task.rewrite_fields, &rewritten);
                    let marked = self.progress.mark_rewritten(url);
                    self.check_ledger(marked);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Rewrite failed, keeping original text");
                    rewrite_failed = true;
                    let logged = self.progress.log_error(url, &e, Phase::Rewrite);
                    self.check_ledger(logged);
                }
            }
        }

        // -> Saved
        document.set("scrapedAt", Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        let slug = document.slug().unwrap_or_default().to_string();
        if let Err(e) = self.store.upsert(task.collection, &slug, document.as_map()).await {
            error!(url = %url, collection = task.collection, error = %e, "Save failed, aborting run");
            let logged = self.progress.log_error(url, &e, Phase::Save);
            self.check_ledger(logged);
            return Err(e.into());
        }
        let marked = self.progress.mark_saved(url);
        self.check_ledger(marked);

        Ok(UrlOutcome::Saved { rewrite_failed })
    }

    /// Fetch, parse, cache the image and stamp `original<Field>` copies.
    async fn scrape(&self, task: &CrawlTask, url: &str) -> Result<RecordDocument> {
        let html = self.fetcher.fetch_text(url).await?;
        let record = {
            let page = Document::parse(&html);
            (task.parse)(url, &page)?
        };
        let mut document = record.to_document()?;

        let slug = document
            .slug()
            .map(str::to_string)
            .ok_or_else(|| StoreError::MissingSlug {
                collection: task.collection.to_string(),
            })?;

        if let Some(image_url) = document.text(task.image_field).map(str::to_string) {
            match self
                .images
                .download(&image_url, task.content_type.image_bucket(), &slug)
                .await
            {
                Some(public_path) => document.set(task.image_field, public_path),
                None => {
                    document.remove(task.image_field);
                }
            }
        }

        document.stamp_originals(task.rewrite_fields);
        Ok(document)
    }

    fn check_ledger<T>(&self, result: ProgressResult<T>) {
        if let Err(e) = result {
            warn!(
                path = %self.progress.path().display(),
                error = %e,
                "Could not write progress ledger"
            );
        }
    }
}
