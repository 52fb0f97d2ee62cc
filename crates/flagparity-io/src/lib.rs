//! flagparity IO
//!
//! External collaborators around the pure engine:
//! - [`ConfigFetcher`]: yields each platform's export document
//! - [`ExportWriter`]: persists structured results
//! - [`RunConfig`]: TOML run settings

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod export;
pub mod fetch;

pub use config::{RunConfig, StatusPair};
pub use error::{ConfigError, ConfigResult, ExportError, ExportResult, FetchError, FetchResult};
pub use export::{ExportWriter, JsonExportWriter};
pub use fetch::{fetch_both, ConfigFetcher, FileFetcher, StaticFetcher};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
