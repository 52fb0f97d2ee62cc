//! Result export
//!
//! Writers persist named, serializable results. The JSON writer stores each
//! under `<dir>/<name>.json`, pretty printed.

use crate::error::{ExportError, ExportResult};
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Destination for structured results
#[async_trait]
pub trait ExportWriter: Send + Sync {
    /// Persist `value` under `name`, returning where it went
    ///
    /// # Errors
    /// When serialization or the write fails.
    async fn write<T: Serialize + Sync>(&self, name: &str, value: &T) -> ExportResult<PathBuf>;
}

/// Writes pretty-printed JSON files into one directory
#[derive(Debug, Clone)]
pub struct JsonExportWriter {
    dir: PathBuf,
}

impl JsonExportWriter {
    /// Create writer targeting `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a result named `name` is written to
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl ExportWriter for JsonExportWriter {
    async fn write<T: Serialize + Sync>(&self, name: &str, value: &T) -> ExportResult<PathBuf> {
        let content = serde_json::to_string_pretty(value).map_err(|source| ExportError::Serialize {
            name: name.to_string(),
            source,
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ExportError::io_error(&self.dir, e))?;

        let path = self.path_for(name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ExportError::io_error(&path, e))?;

        tracing::info!(path = %path.display(), "exported {}", name);
        Ok(path)
    }
}
