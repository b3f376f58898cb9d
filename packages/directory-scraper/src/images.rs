//! Local image cache.
//!
//! Each record gets at most one image, stored at
//! `{public_dir}/images/{bucket}/{slug}/logo{ext}` and referenced by its
//! public path `/images/{bucket}/{slug}/logo{ext}`. An existing file is
//! never fetched again.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::WebClient;
use crate::utils::{with_retry, RetryPolicy};

const DEFAULT_EXTENSION: &str = ".jpg";

/// Downloads and caches record images.
pub struct ImageDownloader<C> {
    client: Arc<C>,
    base_url: Url,
    public_dir: PathBuf,
    retry: RetryPolicy,
    delay: Duration,
}

impl<C: WebClient> ImageDownloader<C> {
    /// `base_url` resolves relative image URLs; `delay` is slept after each
    /// successful download.
    pub fn new(
        client: Arc<C>,
        base_url: Url,
        public_dir: impl Into<PathBuf>,
        retry: RetryPolicy,
        delay: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            public_dir: public_dir.into(),
            retry,
            delay,
        }
    }

    /// Download `image_url` for the record `slug`, returning its public path.
    ///
    /// Failures are logged and give `None`; a missing image never fails the
    /// record.
    pub async fn download(&self, image_url: &str, bucket: &str, slug: &str) -> Option<String> {
        match self.try_download(image_url, bucket, slug).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(url = %image_url, slug = %slug, error = %e, "Image download failed");
                None
            }
        }
    }

    async fn try_download(&self, image_url: &str, bucket: &str, slug: &str) -> FetchResult<String> {
        let resolved = self
            .base_url
            .join(image_url)
            .map_err(|_| FetchError::InvalidUrl {
                url: image_url.to_string(),
            })?;

        let file_name = format!("logo{}", extension_of(&resolved));
        let relative = Path::new("images").join(bucket).join(slug).join(&file_name);
        let local_path = self.public_dir.join(&relative);
        let public_path = format!("/images/{}/{}/{}", bucket, slug, file_name);

        if tokio::fs::try_exists(&local_path).await.unwrap_or(false) {
            debug!(path = %local_path.display(), "Image already cached");
            return Ok(public_path);
        }

        if let Some(dir) = local_path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error(&local_path, e))?;
        }

        let url = resolved.as_str();
        let bytes = with_retry(self.retry, url, |_| async move { self.client.get_bytes(url).await }).await?;

        tokio::fs::write(&local_path, &bytes)
            .await
            .map_err(|e| io_error(&local_path, e))?;
        debug!(url = %url, path = %local_path.display(), size = bytes.len(), "Image saved");

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(public_path)
    }
}

/// `.ext` of the URL's last path segment, lowercased; `.jpg` when absent.
fn extension_of(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn io_error(path: &Path, source: std::io::Error) -> FetchError {
    FetchError::Io {
        path: path.display().to_string(),
        source,
    }
}
