//! Run configuration
//!
//! ```toml
//! source_a = "exports/amplitude.json"
//! source_b = "exports/statsig.json"
//! output_dir = "out"
//! targets = ["mpu-heuristics-v1", "boost-price-test"]
//! policy = "first_substring"
//!
//! [[status_equivalences]]
//! a_state = "draft"
//! b_status = "setup"
//! ```

use crate::error::{ConfigError, ConfigResult};
use flagparity_core::{
    policy_by_name, ChecklistConfig, FirstSubstringPolicy, MatchPolicy, Reconciler,
    StatusEquivalence,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extra platform A state / platform B status pair treated as equivalent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPair {
    /// Platform A state
    pub a_state: String,
    /// Platform B status
    pub b_status: String,
}

/// Settings for one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Platform A export file
    pub source_a: PathBuf,
    /// Platform B export file
    pub source_b: PathBuf,
    /// Directory receiving the JSON exports
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Target keys, reconciled in this order
    #[serde(default)]
    pub targets: Vec<String>,
    /// Application allowlist audited against platform A
    #[serde(default)]
    pub allowlist: Option<Vec<String>>,
    /// Match policy name
    #[serde(default = "default_policy")]
    pub policy: String,
    /// Replacement for the static review items
    #[serde(default)]
    pub review_items: Option<Vec<String>>,
    /// Pairs added to the default status table
    #[serde(default)]
    pub status_equivalences: Vec<StatusPair>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("flagparity-out")
}

fn default_policy() -> String {
    FirstSubstringPolicy::NAME.to_string()
}

impl RunConfig {
    /// Create config for two export files with every other setting defaulted
    #[must_use]
    pub fn new(source_a: impl Into<PathBuf>, source_b: impl Into<PathBuf>) -> Self {
        Self {
            source_a: source_a.into(),
            source_b: source_b.into(),
            output_dir: default_output_dir(),
            targets: Vec::new(),
            allowlist: None,
            policy: default_policy(),
            review_items: None,
            status_equivalences: Vec::new(),
        }
    }

    /// Load from a TOML file
    ///
    /// Relative export and output paths are resolved against the file's
    /// directory.
    ///
    /// # Errors
    /// On read failure, malformed TOML, or an unknown policy name.
    pub async fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let mut config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Toml { source, .. } => ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        if let Some(base) = path.parent() {
            config.source_a = base.join(&config.source_a);
            config.source_b = base.join(&config.source_b);
            config.output_dir = base.join(&config.output_dir);
        }
        tracing::debug!(path = %path.display(), targets = config.targets.len(), "loaded run config");
        Ok(config)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// On malformed TOML or an unknown policy name.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that named components exist
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] for an unknown policy.
    pub fn validate(&self) -> ConfigResult<()> {
        policy_by_name(&self.policy)?;
        Ok(())
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// With target keys
    #[must_use]
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// With allowlist
    #[must_use]
    pub fn with_allowlist<I, S>(mut self, allowlist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowlist = Some(allowlist.into_iter().map(Into::into).collect());
        self
    }

    /// With match policy name
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = policy.into();
        self
    }

    /// With review items replacing the defaults
    #[must_use]
    pub fn with_review_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.review_items = Some(items.into_iter().map(Into::into).collect());
        self
    }

    /// With one extra status equivalence
    #[must_use]
    pub fn with_status_pair(mut self, a_state: impl Into<String>, b_status: impl Into<String>) -> Self {
        self.status_equivalences.push(StatusPair {
            a_state: a_state.into(),
            b_status: b_status.into(),
        });
        self
    }

    /// Instantiate the configured match policy
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] for an unknown policy.
    pub fn policy(&self) -> ConfigResult<Box<dyn MatchPolicy>> {
        Ok(policy_by_name(&self.policy)?)
    }

    /// Default status table extended with the configured pairs
    #[must_use]
    pub fn status_table(&self) -> StatusEquivalence {
        self.status_equivalences
            .iter()
            .fold(StatusEquivalence::default(), |table, pair| {
                table.with_pair(pair.a_state.as_str(), pair.b_status.as_str())
            })
    }

    /// Checklist settings
    #[must_use]
    pub fn checklist_config(&self) -> ChecklistConfig {
        match &self.review_items {
            Some(items) => ChecklistConfig::new().with_review_items(items.iter().cloned()),
            None => ChecklistConfig::new(),
        }
    }

    /// Engine configured from these settings
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] for an unknown policy.
    pub fn reconciler(&self) -> ConfigResult<Reconciler> {
        Ok(Reconciler::new()
            .with_policy(self.policy()?)
            .with_status_table(self.status_table())
            .with_checklist(self.checklist_config()))
    }
}
