//! File-backed progress ledger.
//!
//! The ledger records which URLs have been scraped, rewritten and saved,
//! plus every error. It is rewritten in full after each change, so a killed
//! run loses nothing that completed.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ProgressResult;

/// Pipeline phase an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Scrape,
    Rewrite,
    Save,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Scrape => "scrape",
            Phase::Rewrite => "rewrite",
            Phase::Save => "save",
        })
    }
}

/// One failed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerError {
    pub url: String,
    pub error: String,
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.phase, self.url, self.error)
    }
}

/// Persisted run state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ledger {
    pub scraped: Vec<String>,
    pub rewritten: Vec<String>,
    pub saved: Vec<String>,
    pub errors: Vec<LedgerError>,
    pub last_run: Option<DateTime<Utc>>,
}

impl Ledger {
    pub fn is_scraped(&self, url: &str) -> bool {
        self.scraped.iter().any(|u| u == url)
    }

    pub fn is_rewritten(&self, url: &str) -> bool {
        self.rewritten.iter().any(|u| u == url)
    }

    pub fn is_saved(&self, url: &str) -> bool {
        self.saved.iter().any(|u| u == url)
    }

    /// The last `n` errors, oldest first.
    pub fn recent_errors(&self, n: usize) -> &[LedgerError] {
        let start = self.errors.len().saturating_sub(n);
        &self.errors[start..]
    }
}

fn push_unique(list: &mut Vec<String>, url: &str) -> bool {
    if list.iter().any(|u| u == url) {
        return false;
    }
    list.push(url.to_string());
    true
}

/// Owns the ledger and its file.
#[derive(Debug)]
pub struct ProgressTracker {
    path: PathBuf,
    ledger: Ledger,
}

impl ProgressTracker {
    /// Load the ledger at `path`.
    ///
    /// A missing or unreadable file gives an empty ledger; first runs and
    /// corrupted state are treated the same.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ledger = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Progress file unreadable, starting fresh");
                Ledger::default()
            }),
            Err(_) => {
                debug!(path = %path.display(), "No progress file, starting fresh");
                Ledger::default()
            }
        };
        Self { path, ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a scraped URL. Returns `false` if it was already recorded.
    pub fn mark_scraped(&mut self, url: &str) -> ProgressResult<bool> {
        if !push_unique(&mut self.ledger.scraped, url) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Record a rewritten URL. Returns `false` if it was already recorded.
    pub fn mark_rewritten(&mut self, url: &str) -> ProgressResult<bool> {
        if !push_unique(&mut self.ledger.rewritten, url) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Record a saved URL. Returns `false` if it was already recorded.
    pub fn mark_saved(&mut self, url: &str) -> ProgressResult<bool> {
        if !push_unique(&mut self.ledger.saved, url) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Append an error. Errors are never de-duplicated.
    pub fn log_error(&mut self, url: &str, error: impl fmt::Display, phase: Phase) -> ProgressResult<()> {
        self.ledger.errors.push(LedgerError {
            url: url.to_string(),
            error: error.to_string(),
            phase,
            timestamp: Utc::now(),
        });
        self.persist()
    }

    /// Replace the file with the full ledger. The JSON goes to a sibling
    /// temp file first and is renamed over the ledger, so a crash mid-write
    /// never leaves a truncated file behind.
    fn persist(&mut self) -> ProgressResult<()> {
        self.ledger.last_run = Some(Utc::now());
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.ledger)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = ProgressTracker::load(dir.path().join("progress.json"));
        assert_eq!(tracker.ledger(), &Ledger::default());
    }

    #[test]
    fn test_corrupt_file_gives_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "{ not json").unwrap();

        let tracker = ProgressTracker::load(&path);
        assert!(tracker.ledger().scraped.is_empty());
    }

    #[test]
    fn test_mark_is_idempotent_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let mut tracker = ProgressTracker::load(&path);

        assert!(tracker.mark_scraped("https://example.com/a/").unwrap());
        assert!(!tracker.mark_scraped("https://example.com/a/").unwrap());
        assert_eq!(tracker.ledger().scraped.len(), 1);

        tracker.mark_rewritten("https://example.com/a/").unwrap();
        tracker.mark_saved("https://example.com/a/").unwrap();

        let reloaded = ProgressTracker::load(&path);
        assert_eq!(reloaded.ledger().scraped, vec!["https://example.com/a/"]);
        assert!(reloaded.ledger().is_rewritten("https://example.com/a/"));
        assert!(reloaded.ledger().is_saved("https://example.com/a/"));
        assert!(reloaded.ledger().last_run.is_some());
    }

    #[test]
    fn test_persist_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let tmp = dir.path().join("progress.json.tmp");
        // A write interrupted by an earlier crash
        std::fs::write(&tmp, "{ \"scraped\": [").unwrap();
        std::fs::write(&path, r#"{"scraped": ["https://example.com/a/"]}"#).unwrap();

        let mut tracker = ProgressTracker::load(&path);
        assert_eq!(tracker.ledger().scraped, vec!["https://example.com/a/"]);

        tracker.mark_scraped("https://example.com/b/").unwrap();

        assert!(!tmp.exists());
        let reloaded = ProgressTracker::load(&path);
        assert_eq!(
            reloaded.ledger().scraped,
            vec!["https://example.com/a/", "https://example.com/b/"]
        );
    }

    #[test]
    fn test_errors_are_appended_and_formatted() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = ProgressTracker::load(dir.path().join("progress.json"));

        for i in 0..12 {
            tracker
                .log_error(&format!("https://example.com/{}/", i), "HTTP 503", Phase::Scrape)
                .unwrap();
        }
        tracker
            .log_error("https://example.com/0/", "HTTP 503", Phase::Rewrite)
            .unwrap();

        let recent = tracker.ledger().recent_errors(10);
        assert_eq!(tracker.ledger().errors.len(), 13);
        assert_eq!(recent.len(), 10);
        assert_eq!(
            recent.last().unwrap().to_string(),
            "rewrite: https://example.com/0/ - HTTP 503"
        );
    }

    #[test]
    fn test_ledger_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let mut tracker = ProgressTracker::load(&path);
        tracker.mark_scraped("https://example.com/a/").unwrap();
        tracker
            .log_error("https://example.com/b/", "boom", Phase::Save)
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["scraped"][0], "https://example.com/a/");
        assert_eq!(json["errors"][0]["phase"], "save");
        assert!(json["lastRun"].is_string());
        assert!(json["rewritten"].as_array().unwrap().is_empty());
    }
}
