//! Directory scrape runner
//!
//! Discovers every record on the source site, scrapes, rewrites and saves
//! it. Progress is kept in a JSON ledger so an interrupted run can pick up
//! where it stopped with `--resume`.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use directory_scraper::{
    Config, HttpClient, OpenAIRewriteBackend, Pipeline, PipelineSettings, PostgresStore,
    ProgressTracker, RunOptions,
};
use openai_client::OpenAIClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "scrape-directory")]
#[command(about = "Scrape the directory site into the document store")]
struct Cli {
    /// Skip URLs that earlier runs already scraped
    #[arg(long)]
    resume: bool,

    /// Save scraped text without calling the rewrite model
    #[arg(long)]
    scrape_only: bool,

    /// Only process URLs that were scraped but never rewritten
    #[arg(long)]
    rewrite_only: bool,

    /// Accepted for compatibility; has no effect
    #[arg(long)]
    retry_errors: bool,
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            resume: cli.resume,
            scrape_only: cli.scrape_only,
            rewrite_only: cli.rewrite_only,
            retry_errors: cli.retry_errors,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,directory_scraper=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();
    let options = RunOptions::from(&cli);

    let config = Config::from_env().context("Failed to load configuration")?;
    let settings = PipelineSettings::default();
    let source_url = Url::parse(&config.source_url)
        .with_context(|| format!("Invalid SCRAPER_SOURCE_URL: {}", config.source_url))?;

    tracing::info!(source = %source_url, ?options, "Starting directory scrape");

    let store = PostgresStore::connect(&config.database_url, config.database_name.as_deref())
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    let openai = OpenAIClient::azure(
        &config.azure_openai_endpoint,
        &config.azure_openai_api_key,
        &config.azure_openai_deployment,
        &config.azure_openai_api_version,
    );
    let backend = OpenAIRewriteBackend::new(openai, settings.max_completion_tokens);
    let client = HttpClient::new().context("Failed to build HTTP client")?;
    let progress = ProgressTracker::load(&config.progress_file);

    let mut pipeline = Pipeline::new(
        Arc::new(client),
        Arc::new(backend),
        Arc::new(store),
        progress,
        source_url,
        &config.public_dir,
        settings,
    );

    let tasks = pipeline.discover().await;
    let discovered: usize = tasks.iter().map(|task| task.urls.len()).sum();
    tracing::info!(tasks = tasks.len(), urls = discovered, "Discovery complete");

    let summary = pipeline.run(&tasks, options).await.context("Scrape run aborted")?;
    println!("{summary}");

    Ok(())
}
