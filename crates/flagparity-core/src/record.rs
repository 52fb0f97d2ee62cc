//! Normalized configuration records
//!
//! [`ConfigRecord`] is the single intermediate representation shared by both
//! platforms. Every optional source field already carries its documented
//! default here, so resolution and comparison never deal with absence.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Status token used when a record carries no state/status field
pub const UNKNOWN_STATUS: &str = "unknown";

/// Status token of a platform A experiment that is currently live
pub const RUNNING_STATUS: &str = "running";

/// Status token of a platform B experiment or gate that is currently live
pub const ACTIVE_STATUS: &str = "active";

/// Status token derived for a toggle-only record that is switched off
pub const DISABLED_STATUS: &str = "disabled";

/// Identifier given to a variant entry that carries none
pub const UNKNOWN_VARIANT: &str = "unknown";

/// Placeholder shown for records without a display name
pub const NO_NAME: &str = "No name";

/// Source platform of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Migration source (Amplitude Experiment shaped exports)
    A,
    /// Migration target (Statsig shaped exports)
    B,
}

impl Platform {
    /// Field holding the record identifier on this platform
    #[inline]
    #[must_use]
    pub fn identifier_field(self) -> &'static str {
        match self {
            Self::A => "key",
            Self::B => "name",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("platform A"),
            Self::B => f.write_str("platform B"),
        }
    }
}

/// Shape of a record within its platform export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Feature flag (platform A)
    Flag,
    /// Experiment (both platforms)
    Experiment,
    /// Feature gate (platform B)
    Gate,
    /// Dynamic config (platform B)
    DynamicConfig,
}

impl RecordKind {
    /// Section name of this kind inside a combined export document
    #[must_use]
    pub fn section(self) -> &'static str {
        match self {
            Self::Flag => "flags",
            Self::Experiment => "experiments",
            Self::Gate => "feature_gates",
            Self::DynamicConfig => "dynamic_configs",
        }
    }

    /// Whether activity is expressed through an on/off toggle
    #[inline]
    #[must_use]
    pub fn is_flag_shaped(self) -> bool {
        matches!(self, Self::Flag | Self::Gate)
    }
}

/// A flag or experiment branch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantRef {
    /// Variant key (A) or group name (B)
    pub identifier: String,
}

impl VariantRef {
    /// Create new variant reference
    #[inline]
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

/// Normalized flag or experiment definition
///
/// Built once by the normalizer and never mutated afterwards; fields are
/// read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    identifier: String,
    name: Option<String>,
    description: String,
    enabled: bool,
    status: String,
    variants: Vec<VariantRef>,
    rollout: Value,
    evaluation_mode: Option<String>,
    platform: Platform,
    kind: RecordKind,
}

impl ConfigRecord {
    /// Start building a record with every optional field at its default
    #[must_use]
    pub fn builder(
        identifier: impl Into<String>,
        platform: Platform,
        kind: RecordKind,
    ) -> ConfigRecordBuilder {
        ConfigRecordBuilder {
            record: Self {
                identifier: identifier.into(),
                name: None,
                description: String::new(),
                enabled: false,
                status: UNKNOWN_STATUS.to_string(),
                variants: Vec::new(),
                rollout: Value::Null,
                evaluation_mode: None,
                platform,
                kind,
            },
        }
    }

    /// Platform-unique identifier (`key` on A, `name`/`id` on B)
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Display name, if the source carried one
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Display name with the [`NO_NAME`] placeholder
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(NO_NAME)
    }

    /// Description, empty when absent
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Toggle state, `false` when absent
    #[inline]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// State (A) or status (B) token, [`UNKNOWN_STATUS`] when absent
    #[inline]
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Variants in source order
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[VariantRef] {
        &self.variants
    }

    /// Variant identifiers in source order
    pub fn variant_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.variants.iter().map(|v| v.identifier.as_str())
    }

    /// Raw rollout allocation, `null` when absent
    #[inline]
    #[must_use]
    pub fn rollout(&self) -> &Value {
        &self.rollout
    }

    /// Evaluation mode (platform A only)
    #[inline]
    #[must_use]
    pub fn evaluation_mode(&self) -> Option<&str> {
        self.evaluation_mode.as_deref()
    }

    /// Source platform
    #[inline]
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Record shape
    #[inline]
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Whether this record still needs to move to the target platform
    ///
    /// Flag-shaped records are active when enabled, experiments when running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        if self.kind.is_flag_shaped() {
            self.enabled
        } else {
            self.status == RUNNING_STATUS
        }
    }
}

/// Builder for [`ConfigRecord`]
#[derive(Debug, Clone)]
pub struct ConfigRecordBuilder {
    record: ConfigRecord,
}

impl ConfigRecordBuilder {
    /// With display name
    #[inline]
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.record.name = Some(name.into());
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.record.description = description.into();
        self
    }

    /// With toggle state
    #[inline]
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.record.enabled = enabled;
        self
    }

    /// With state/status token
    #[inline]
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.record.status = status.into();
        self
    }

    /// With variants
    #[must_use]
    pub fn variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record.variants = variants.into_iter().map(VariantRef::new).collect();
        self
    }

    /// With raw rollout value
    #[inline]
    #[must_use]
    pub fn rollout(mut self, rollout: Value) -> Self {
        self.record.rollout = rollout;
        self
    }

    /// With evaluation mode
    #[inline]
    #[must_use]
    pub fn evaluation_mode(mut self, mode: impl Into<String>) -> Self {
        self.record.evaluation_mode = Some(mode.into());
        self
    }

    /// Finish the record
    #[inline]
    #[must_use]
    pub fn build(self) -> ConfigRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let r = ConfigRecord::builder("x", Platform::A, RecordKind::Flag).build();
        assert_eq!(r.identifier(), "x");
        assert_eq!(r.name(), None);
        assert_eq!(r.display_name(), NO_NAME);
        assert_eq!(r.description(), "");
        assert!(!r.enabled());
        assert_eq!(r.status(), UNKNOWN_STATUS);
        assert!(r.variants().is_empty());
        assert!(r.rollout().is_null());
    }

    #[test]
    fn flag_activity_follows_toggle() {
        let on = ConfigRecord::builder("f", Platform::A, RecordKind::Flag)
            .enabled(true)
            .build();
        let off = ConfigRecord::builder("g", Platform::A, RecordKind::Flag)
            .status(RUNNING_STATUS)
            .build();
        assert!(on.is_active());
        assert!(!off.is_active());
    }

    #[test]
    fn experiment_activity_follows_state() {
        let running = ConfigRecord::builder("e", Platform::A, RecordKind::Experiment)
            .status("running")
            .build();
        let draft = ConfigRecord::builder("d", Platform::A, RecordKind::Experiment)
            .status("draft")
            .enabled(true)
            .build();
        assert!(running.is_active());
        assert!(!draft.is_active());
    }

    #[test]
    fn platform_identifier_fields() {
        assert_eq!(Platform::A.identifier_field(), "key");
        assert_eq!(Platform::B.identifier_field(), "name");
    }

    #[test]
    fn variant_ids_keep_source_order() {
        let r = ConfigRecord::builder("x", Platform::B, RecordKind::Experiment)
            .variants(["control", "treatment"])
            .build();
        let ids: Vec<_> = r.variant_ids().collect();
        assert_eq!(ids, vec!["control", "treatment"]);
    }
}
