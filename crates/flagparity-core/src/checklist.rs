//! Migration checklist synthesis
//!
//! Lists every active platform A record that still has to move to platform
//! B, plus a fixed set of review reminders taken from configuration.

use crate::record::{ConfigRecord, RecordKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Review reminders used when configuration provides none
pub const DEFAULT_REVIEW_ITEMS: &[&str] = &[
    "Verify all variant keys match between platforms",
    "Check rollout percentages are correctly configured",
    "Review targeting rules and segments",
    "Validate experiment start/end dates",
    "Test payload structures match expected format",
    "Update application configuration allowlists",
    "Remove deprecated/unused experiments",
];

/// Checklist configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistConfig {
    /// Data-independent review reminders, in display order
    pub review_items: Vec<String>,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            review_items: DEFAULT_REVIEW_ITEMS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl ChecklistConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With replacement review items
    #[must_use]
    pub fn with_review_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.review_items = items.into_iter().map(Into::into).collect();
        self
    }
}

/// One record to migrate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistLine {
    /// Platform A identifier
    pub key: String,
    /// Display name
    pub name: String,
    /// Variant count, only when the record has more than one variant
    pub variant_count: Option<usize>,
    /// Whether platform B already holds a record with this exact identifier
    pub present_in_b: bool,
}

impl ChecklistLine {
    fn from_record(record: &ConfigRecord, present_in_b: bool) -> Self {
        let count = record.variants().len();
        Self {
            key: record.identifier().to_string(),
            name: record.display_name().to_string(),
            variant_count: (count > 1).then_some(count),
            present_in_b,
        }
    }
}

impl fmt::Display for ChecklistLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- [ ] {}: {}", self.key, self.name)?;
        if let Some(count) = self.variant_count {
            write!(f, " ({count} variants)")?;
        }
        Ok(())
    }
}

/// Human-actionable migration checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationChecklist {
    /// Enabled platform A flags
    pub migratable_flags: Vec<ChecklistLine>,
    /// Running platform A experiments
    pub migratable_experiments: Vec<ChecklistLine>,
    /// Fixed review reminders
    pub static_review_items: Vec<String>,
}

impl MigrationChecklist {
    /// Total number of records to migrate
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.migratable_flags.len() + self.migratable_experiments.len()
    }
}

impl fmt::Display for MigrationChecklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Feature Flags to Migrate:")?;
        for line in &self.migratable_flags {
            writeln!(f, "{line}")?;
        }
        writeln!(f)?;
        writeln!(f, "## Experiments to Migrate:")?;
        for line in &self.migratable_experiments {
            writeln!(f, "{line}")?;
        }
        writeln!(f)?;
        writeln!(f, "## Configuration Items to Review:")?;
        for item in &self.static_review_items {
            writeln!(f, "- [ ] {item}")?;
        }
        Ok(())
    }
}

/// Checklist synthesizer
#[derive(Debug, Clone, Default)]
pub struct ChecklistSynthesizer {
    config: ChecklistConfig,
}

impl ChecklistSynthesizer {
    /// Create synthesizer
    #[inline]
    #[must_use]
    pub fn new(config: ChecklistConfig) -> Self {
        Self { config }
    }

    /// Derive the checklist from the full, unfiltered record sets
    ///
    /// Only platform A activity decides membership; platform B records are
    /// used to mark lines whose identifier already exists there.
    #[must_use]
    pub fn synthesize(&self, records_a: &[ConfigRecord], records_b: &[ConfigRecord]) -> MigrationChecklist {
        let in_b: HashSet<&str> = records_b.iter().map(ConfigRecord::identifier).collect();
        let lines = |kind: RecordKind| -> Vec<ChecklistLine> {
            records_a
                .iter()
                .filter(|r| r.kind() == kind && r.is_active())
                .map(|r| ChecklistLine::from_record(r, in_b.contains(r.identifier())))
                .collect()
        };

        let checklist = MigrationChecklist {
            migratable_flags: lines(RecordKind::Flag),
            migratable_experiments: lines(RecordKind::Experiment),
            static_review_items: self.config.review_items.clone(),
        };
        tracing::debug!(
            flags = checklist.migratable_flags.len(),
            experiments = checklist.migratable_experiments.len(),
            "synthesized migration checklist"
        );
        checklist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Platform;

    fn flag(key: &str, enabled: bool, variants: &[&str]) -> ConfigRecord {
        ConfigRecord::builder(key, Platform::A, RecordKind::Flag)
            .name(key.to_uppercase())
            .enabled(enabled)
            .variants(variants.iter().copied())
            .build()
    }

    fn experiment(key: &str, state: &str) -> ConfigRecord {
        ConfigRecord::builder(key, Platform::A, RecordKind::Experiment)
            .status(state)
            .build()
    }

    #[test]
    fn only_enabled_flags_and_running_experiments() {
        let a = vec![
            flag("on", true, &[]),
            flag("off", false, &["x", "y"]),
            experiment("live", "running"),
            experiment("draft", "draft"),
        ];
        let checklist = ChecklistSynthesizer::default().synthesize(&a, &[]);
        let flags: Vec<_> = checklist.migratable_flags.iter().map(|l| l.key.as_str()).collect();
        let exps: Vec<_> = checklist
            .migratable_experiments
            .iter()
            .map(|l| l.key.as_str())
            .collect();
        assert_eq!(flags, vec!["on"]);
        assert_eq!(exps, vec!["live"]);
        assert_eq!(checklist.pending(), 2);
    }

    #[test]
    fn variant_annotation_only_above_one() {
        let a = vec![flag("one", true, &["a"]), flag("two", true, &["a", "b"])];
        let checklist = ChecklistSynthesizer::default().synthesize(&a, &[]);
        assert_eq!(checklist.migratable_flags[0].variant_count, None);
        assert_eq!(checklist.migratable_flags[1].variant_count, Some(2));
        assert_eq!(checklist.migratable_flags[1].to_string(), "- [ ] two: TWO (2 variants)");
    }

    #[test]
    fn missing_name_uses_placeholder() {
        let checklist = ChecklistSynthesizer::default().synthesize(&[experiment("e", "running")], &[]);
        assert_eq!(checklist.migratable_experiments[0].to_string(), "- [ ] e: No name");
    }

    #[test]
    fn marks_lines_present_in_b() {
        let b = vec![ConfigRecord::builder("on", Platform::B, RecordKind::Gate).build()];
        let checklist = ChecklistSynthesizer::default().synthesize(&[flag("on", true, &[])], &b);
        assert!(checklist.migratable_flags[0].present_in_b);
    }

    #[test]
    fn review_items_ignore_input() {
        let empty = ChecklistSynthesizer::default().synthesize(&[], &[]);
        let full = ChecklistSynthesizer::default().synthesize(&[flag("x", true, &[])], &[]);
        assert_eq!(empty.static_review_items, full.static_review_items);
        assert_eq!(empty.static_review_items.len(), DEFAULT_REVIEW_ITEMS.len());
    }

    #[test]
    fn custom_review_items() {
        let config = ChecklistConfig::new().with_review_items(["Check SDK keys"]);
        let checklist = ChecklistSynthesizer::new(config).synthesize(&[], &[]);
        assert_eq!(checklist.static_review_items, vec!["Check SDK keys".to_string()]);
    }

    #[test]
    fn display_renders_sections() {
        let checklist = ChecklistSynthesizer::default().synthesize(&[flag("f", true, &[])], &[]);
        let text = checklist.to_string();
        assert!(text.starts_with("## Feature Flags to Migrate:\n- [ ] f: F\n"));
        assert!(text.contains("## Experiments to Migrate:"));
        assert!(text.contains("- [ ] Review targeting rules and segments"));
    }
}
