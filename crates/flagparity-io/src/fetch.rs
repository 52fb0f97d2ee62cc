//! Export fetchers
//!
//! A fetcher yields the parsed export document of one platform. Fetching is
//! the only suspending step of a run; normalization and reconciliation start
//! once both documents are in hand.

use crate::error::{FetchError, FetchResult};
use async_trait::async_trait;
use flagparity_core::{normalize_export, Platform, PlatformSnapshot};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Source of one platform's export document
#[async_trait]
pub trait ConfigFetcher: Send + Sync {
    /// Platform this fetcher serves
    fn platform(&self) -> Platform;

    /// Fetch the raw export document
    ///
    /// # Errors
    /// When the document cannot be read or parsed.
    async fn fetch(&self) -> FetchResult<Value>;

    /// Fetch and normalize into a snapshot
    ///
    /// # Errors
    /// Fetch errors, or [`FetchError::Normalize`] for an unsupported root.
    async fn snapshot(&self) -> FetchResult<PlatformSnapshot> {
        let document = self.fetch().await?;
        Ok(normalize_export(self.platform(), &document)?)
    }
}

/// Reads a saved JSON export from disk
#[derive(Debug, Clone)]
pub struct FileFetcher {
    platform: Platform,
    path: PathBuf,
}

impl FileFetcher {
    /// Create fetcher for `path`
    #[must_use]
    pub fn new(platform: Platform, path: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            path: path.into(),
        }
    }

    /// Export file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigFetcher for FileFetcher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self) -> FetchResult<Value> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::io_error(self.platform, &self.path, e))?;

        tracing::debug!(
            platform = %self.platform,
            path = %self.path.display(),
            bytes = content.len(),
            "read export"
        );

        serde_json::from_str(&content)
            .map_err(|e| FetchError::json_error(self.platform, self.path.display().to_string(), e))
    }
}

/// Serves an in-memory document
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    platform: Platform,
    document: Value,
}

impl StaticFetcher {
    /// Create fetcher returning `document`
    #[must_use]
    pub fn new(platform: Platform, document: Value) -> Self {
        Self { platform, document }
    }
}

#[async_trait]
impl ConfigFetcher for StaticFetcher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self) -> FetchResult<Value> {
        Ok(self.document.clone())
    }
}

/// Fetch and normalize both platforms concurrently
///
/// Returns once both snapshots are ready; the first failure aborts the pair.
///
/// # Errors
/// The first error reported by either fetcher.
pub async fn fetch_both(
    source_a: &dyn ConfigFetcher,
    source_b: &dyn ConfigFetcher,
) -> FetchResult<(PlatformSnapshot, PlatformSnapshot)> {
    let (a, b) = tokio::try_join!(source_a.snapshot(), source_b.snapshot())?;
    tracing::info!(
        records_a = a.len(),
        records_b = b.len(),
        issues = a.issues().len() + b.issues().len(),
        "exports loaded"
    );
    Ok((a, b))
}
