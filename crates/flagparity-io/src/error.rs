//! Error types for the IO collaborators
//!
//! Kept apart from [`ReconcileError`] so the engine stays free of IO
//! concerns:
//! - Fetch operations (export document → snapshot)
//! - Export operations (results → JSON files)
//! - Run configuration loading

use flagparity_core::{Platform, ReconcileError};
use std::path::PathBuf;

/// Errors while fetching an export document
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// IO error during file read
    #[error("io error reading {platform} export {path}: {source}")]
    Io {
        platform: Platform,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export is not valid JSON
    #[error("invalid JSON in {platform} export {origin}: {source}")]
    Json {
        platform: Platform,
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Document parsed but could not be normalized
    #[error(transparent)]
    Normalize(#[from] ReconcileError),
}

impl FetchError {
    /// Create IO error for path
    pub fn io_error(platform: Platform, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            platform,
            path: path.into(),
            source,
        }
    }

    /// Create JSON error for an export origin
    pub fn json_error(platform: Platform, origin: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            platform,
            origin: origin.into(),
            source,
        }
    }
}

/// Errors while persisting results
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// IO error during directory creation or write
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Value could not be serialized
    #[error("failed to serialize '{name}': {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ExportError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors while loading a run configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Config names something the engine does not know
    #[error(transparent)]
    Invalid(#[from] ReconcileError),
}

/// Result alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Result alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Result alias for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;
