//! Source platform inventory and allowlist audit

use crate::record::{ConfigRecord, RecordKind, RUNNING_STATUS, UNKNOWN_STATUS};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;

/// Counts over the platform A export
///
/// Group maps keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    /// Number of flags
    pub total_flags: usize,
    /// Enabled flags
    pub enabled_flags: usize,
    /// Disabled flags
    pub disabled_flags: usize,
    /// Flags carrying at least one variant
    pub flags_with_variants: usize,
    /// Flags per evaluation mode
    pub flag_evaluation_modes: IndexMap<String, usize>,
    /// Number of experiments
    pub total_experiments: usize,
    /// Experiments in the running state
    pub running_experiments: usize,
    /// Experiments per state
    pub experiment_states: IndexMap<String, usize>,
    /// Experiments per evaluation mode
    pub experiment_evaluation_modes: IndexMap<String, usize>,
}

impl InventorySummary {
    /// Tally platform A records
    #[must_use]
    pub fn from_records(records: &[ConfigRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            let mode = record.evaluation_mode().unwrap_or(UNKNOWN_STATUS).to_string();
            match record.kind() {
                RecordKind::Flag => {
                    summary.total_flags += 1;
                    if record.enabled() {
                        summary.enabled_flags += 1;
                    } else {
                        summary.disabled_flags += 1;
                    }
                    if !record.variants().is_empty() {
                        summary.flags_with_variants += 1;
                    }
                    *summary.flag_evaluation_modes.entry(mode).or_insert(0) += 1;
                }
                RecordKind::Experiment => {
                    summary.total_experiments += 1;
                    if record.status() == RUNNING_STATUS {
                        summary.running_experiments += 1;
                    }
                    *summary
                        .experiment_states
                        .entry(record.status().to_string())
                        .or_insert(0) += 1;
                    *summary.experiment_evaluation_modes.entry(mode).or_insert(0) += 1;
                }
                RecordKind::Gate | RecordKind::DynamicConfig => {}
            }
        }
        summary
    }
}

/// Cross-check of an application allowlist against platform A identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllowlistAudit {
    /// Keys on the allowlist and in the export
    pub found_in_both: Vec<String>,
    /// Keys on the allowlist but missing from the export
    pub missing_from_source: Vec<String>,
    /// Keys in the export but not on the allowlist
    pub extra_in_source: Vec<String>,
}

impl AllowlistAudit {
    /// Compare `allowlist` with the identifiers of `records`; all lists sorted
    #[must_use]
    pub fn audit<S: AsRef<str>>(allowlist: &[S], records: &[ConfigRecord]) -> Self {
        let allowed: BTreeSet<&str> = allowlist.iter().map(|s| s.as_ref()).collect();
        let present: BTreeSet<&str> = records.iter().map(ConfigRecord::identifier).collect();

        let owned = |set: BTreeSet<&str>| set.into_iter().map(str::to_string).collect::<Vec<_>>();
        Self {
            found_in_both: owned(allowed.intersection(&present).copied().collect()),
            missing_from_source: owned(allowed.difference(&present).copied().collect()),
            extra_in_source: owned(present.difference(&allowed).copied().collect()),
        }
    }

    /// Check if allowlist and export agree
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing_from_source.is_empty() && self.extra_in_source.is_empty()
    }
}
