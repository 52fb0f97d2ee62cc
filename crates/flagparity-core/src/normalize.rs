//! Record normalizer
//!
//! Turns raw platform exports (already parsed JSON) into [`ConfigRecord`]s.
//! Absent optional fields get their documented defaults here; records
//! without an identifier are dropped and reported as [`RecordIssue`]s.
//! Extra, unknown structure in a record is ignored.

use crate::error::{IssueKind, ReconcileError, ReconcileResult, RecordIssue};
use crate::record::{
    ConfigRecord, Platform, RecordKind, ACTIVE_STATUS, DISABLED_STATUS, RUNNING_STATUS,
    UNKNOWN_STATUS, UNKNOWN_VARIANT,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Normalized records of one platform plus the normalization report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformSnapshot {
    records: Vec<ConfigRecord>,
    issues: Vec<RecordIssue>,
}

impl PlatformSnapshot {
    /// Build a snapshot from already-normalized records
    ///
    /// Later records reusing an identifier are dropped and reported.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = ConfigRecord>) -> Self {
        let mut snapshot = Self::default();
        let mut seen = HashSet::new();
        let mut positions = std::collections::HashMap::new();
        for record in records {
            let index = positions.entry(record.kind()).or_insert(0usize);
            snapshot.push(record, *index, &mut seen);
            *index += 1;
        }
        snapshot
    }

    fn push(&mut self, record: ConfigRecord, index: usize, seen: &mut HashSet<String>) {
        if seen.insert(record.identifier().to_string()) {
            self.records.push(record);
        } else {
            tracing::warn!(
                identifier = record.identifier(),
                "dropping record with duplicate identifier"
            );
            self.issues.push(RecordIssue::new(
                record.platform(),
                record.kind(),
                index,
                IssueKind::DuplicateIdentifier {
                    identifier: record.identifier().to_string(),
                },
            ));
        }
    }

    /// Records in export order
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[ConfigRecord] {
        &self.records
    }

    /// Records excluded during normalization
    #[inline]
    #[must_use]
    pub fn issues(&self) -> &[RecordIssue] {
        &self.issues
    }

    /// Record whose identifier equals `identifier` exactly
    #[must_use]
    pub fn find_exact(&self, identifier: &str) -> Option<&ConfigRecord> {
        self.records.iter().find(|r| r.identifier() == identifier)
    }

    /// Number of usable records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no usable record was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalize a whole export document for `platform`
///
/// Accepted shapes:
/// - platform A: `{"flags": [...], "experiments": [...]}` or a bare array
/// - platform B: `{"experiments": [...], "feature_gates": [...],
///   "dynamic_configs": [...]}`, `{"data": [...]}` or a bare array
///
/// Records in a bare array or `data` wrapper take their kind from their own
/// fields (see [`infer_kind`]).
///
/// # Errors
/// [`ReconcileError::UnsupportedDocument`] when the root is neither an object
/// nor an array. Individual bad records never fail the call.
pub fn normalize_export(platform: Platform, document: &Value) -> ReconcileResult<PlatformSnapshot> {
    let sections: Vec<(Option<RecordKind>, &[Value])> = match document {
        Value::Array(items) => vec![(None, items.as_slice())],
        Value::Object(map) => sections_of(platform, map),
        other => return Err(ReconcileError::unsupported_document(platform, other)),
    };

    let mut snapshot = PlatformSnapshot::default();
    let mut seen = HashSet::new();

    for (section_kind, items) in sections {
        for (index, raw) in items.iter().enumerate() {
            let kind = section_kind.unwrap_or_else(|| infer_kind(platform, raw));
            match normalize_record(platform, kind, raw) {
                Ok(record) => snapshot.push(record, index, &mut seen),
                Err(problem) => {
                    let issue = RecordIssue::new(platform, kind, index, problem);
                    tracing::warn!("excluding malformed record: {}", issue);
                    snapshot.issues.push(issue);
                }
            }
        }
    }

    tracing::debug!(
        %platform,
        records = snapshot.len(),
        issues = snapshot.issues.len(),
        "normalized export"
    );
    Ok(snapshot)
}

fn sections_of(platform: Platform, map: &Map<String, Value>) -> Vec<(Option<RecordKind>, &[Value])> {
    let kinds: &[RecordKind] = match platform {
        Platform::A => &[RecordKind::Flag, RecordKind::Experiment],
        Platform::B => &[
            RecordKind::Experiment,
            RecordKind::Gate,
            RecordKind::DynamicConfig,
        ],
    };

    let mut sections = Vec::new();
    for &kind in kinds {
        match map.get(kind.section()) {
            Some(Value::Array(items)) => sections.push((Some(kind), items.as_slice())),
            Some(other) => tracing::warn!(
                section = kind.section(),
                "ignoring section that is not an array: {}",
                other
            ),
            None => {}
        }
    }

    // Console list responses wrap their payload in `data`
    if platform == Platform::B && sections.is_empty() {
        if let Some(Value::Array(items)) = map.get("data") {
            sections.push((None, items.as_slice()));
        }
    }
    sections
}

/// Kind of a record found outside a typed section
///
/// A record carrying its toggle (`enabled` on A, `isEnabled` on B) but no
/// state/status token is flag-shaped; anything else is an experiment.
#[must_use]
pub fn infer_kind(platform: Platform, raw: &Value) -> RecordKind {
    let Some(fields) = raw.as_object() else {
        return RecordKind::Experiment;
    };
    let (toggle, token, flag_kind) = match platform {
        Platform::A => ("enabled", "state", RecordKind::Flag),
        Platform::B => ("isEnabled", "status", RecordKind::Gate),
    };
    if fields.contains_key(toggle) && !fields.contains_key(token) {
        flag_kind
    } else {
        RecordKind::Experiment
    }
}

/// Normalize one raw record
///
/// # Errors
/// The [`IssueKind`] explaining why the record cannot take part in
/// resolution.
pub fn normalize_record(
    platform: Platform,
    kind: RecordKind,
    raw: &Value,
) -> Result<ConfigRecord, IssueKind> {
    let raw = RawRecord::new(raw).ok_or(IssueKind::NotAnObject)?;

    let identifier = match platform {
        Platform::A => raw.str_field("key"),
        Platform::B => raw.str_field("name").or_else(|| raw.str_field("id")),
    }
    .filter(|id| !id.is_empty())
    .ok_or(IssueKind::MissingIdentifier)?;

    let mut builder = ConfigRecord::builder(identifier, platform, kind)
        .description(raw.str_field("description").unwrap_or_default());

    if let Some(name) = raw.str_field("name") {
        builder = builder.name(name);
    }

    builder = match platform {
        Platform::A => {
            let rollout_field = if kind == RecordKind::Flag {
                "rolloutPercentage"
            } else {
                "rolloutWeights"
            };
            let enabled = raw.bool_field("enabled").unwrap_or(false);
            let status = status_token(kind, raw.str_field("state"), enabled, RUNNING_STATUS);
            let mut b = builder
                .enabled(enabled)
                .status(status)
                .variants(raw.variant_ids("variants", "key"))
                .rollout(raw.value_field(rollout_field));
            if let Some(mode) = raw.str_field("evaluationMode") {
                b = b.evaluation_mode(mode);
            }
            b
        }
        Platform::B => {
            let enabled = raw.bool_field("isEnabled").unwrap_or(false);
            builder
                .enabled(enabled)
                .status(status_token(kind, raw.str_field("status"), enabled, ACTIVE_STATUS))
                .variants(raw.variant_ids("groups", "name"))
                .rollout(raw.value_field("allocation"))
        }
    };

    Ok(builder.build())
}

/// Explicit state/status token, else one derived from the toggle for
/// flag-shaped records
fn status_token<'a>(kind: RecordKind, explicit: Option<&'a str>, enabled: bool, live: &'a str) -> &'a str {
    match explicit {
        Some(token) => token,
        None if !kind.is_flag_shaped() => UNKNOWN_STATUS,
        None if enabled => live,
        None => DISABLED_STATUS,
    }
}

/// Typed accessors over a raw JSON object
struct RawRecord<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RawRecord<'a> {
    fn new(value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { fields })
    }

    fn str_field(&self, field: &str) -> Option<&'a str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    fn bool_field(&self, field: &str) -> Option<bool> {
        self.fields.get(field).and_then(Value::as_bool)
    }

    fn value_field(&self, field: &str) -> Value {
        self.fields.get(field).cloned().unwrap_or(Value::Null)
    }

    /// Identifiers of a variant list; entries are bare strings or objects
    /// carrying `id_field`. Every entry counts: one without a usable
    /// identifier becomes [`UNKNOWN_VARIANT`].
    fn variant_ids(&self, field: &str, id_field: &str) -> Vec<&'a str> {
        let Some(Value::Array(entries)) = self.fields.get(field) else {
            return Vec::new();
        };
        entries
            .iter()
            .map(|entry| match entry {
                Value::String(s) => s.as_str(),
                Value::Object(obj) => obj
                    .get(id_field)
                    .and_then(Value::as_str)
                    .unwrap_or(UNKNOWN_VARIANT),
                _ => UNKNOWN_VARIANT,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn platform_a_flag_defaults() {
        let r = normalize_record(Platform::A, RecordKind::Flag, &json!({"key": "f"})).unwrap();
        assert_eq!(r.identifier(), "f");
        assert_eq!(r.description(), "");
        assert!(!r.enabled());
        assert_eq!(r.status(), DISABLED_STATUS);
        assert!(r.variants().is_empty());
        assert!(r.rollout().is_null());
    }

    #[test]
    fn toggle_only_records_derive_status() {
        let flag = normalize_record(Platform::A, RecordKind::Flag, &json!({"key": "f", "enabled": true}))
            .unwrap();
        assert_eq!(flag.status(), RUNNING_STATUS);

        let gate = normalize_record(Platform::B, RecordKind::Gate, &json!({"name": "g", "isEnabled": true}))
            .unwrap();
        assert_eq!(gate.status(), ACTIVE_STATUS);

        let experiment = normalize_record(Platform::B, RecordKind::Experiment, &json!({"name": "e"}))
            .unwrap();
        assert_eq!(experiment.status(), UNKNOWN_STATUS);

        let explicit = normalize_record(
            Platform::A,
            RecordKind::Flag,
            &json!({"key": "f", "enabled": true, "state": "archived"}),
        )
        .unwrap();
        assert_eq!(explicit.status(), "archived");
    }

    #[test]
    fn platform_a_experiment_fields() {
        let raw = json!({
            "key": "exp",
            "name": "Experiment",
            "description": "desc",
            "state": "running",
            "evaluationMode": "remote",
            "variants": [{"key": "control"}, {"key": "treatment", "payload": {}}],
            "rolloutWeights": {"control": 1, "treatment": 1},
            "somethingElse": [1, 2, 3]
        });
        let r = normalize_record(Platform::A, RecordKind::Experiment, &raw).unwrap();
        assert_eq!(r.name(), Some("Experiment"));
        assert_eq!(r.description(), "desc");
        assert_eq!(r.status(), "running");
        assert_eq!(r.evaluation_mode(), Some("remote"));
        assert_eq!(r.variant_ids().collect::<Vec<_>>(), vec!["control", "treatment"]);
        assert_eq!(r.rollout(), &json!({"control": 1, "treatment": 1}));
    }

    #[test]
    fn platform_b_identifier_falls_back_to_id() {
        let r = normalize_record(Platform::B, RecordKind::Experiment, &json!({"id": "abc"}))
            .unwrap();
        assert_eq!(r.identifier(), "abc");
        assert_eq!(r.name(), None);
    }

    #[test]
    fn platform_b_fields() {
        let raw = json!({
            "name": "exp",
            "status": "active",
            "groups": [{"name": "b"}, "a"],
            "allocation": 50
        });
        let r = normalize_record(Platform::B, RecordKind::Experiment, &raw).unwrap();
        assert_eq!(r.status(), "active");
        assert_eq!(r.variant_ids().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(r.rollout(), &json!(50));
    }

    #[test]
    fn missing_identifier_is_reported() {
        let err = normalize_record(Platform::A, RecordKind::Flag, &json!({"name": "x"}))
            .unwrap_err();
        assert_eq!(err, IssueKind::MissingIdentifier);

        let err = normalize_record(Platform::A, RecordKind::Flag, &json!({"key": ""}))
            .unwrap_err();
        assert_eq!(err, IssueKind::MissingIdentifier);
    }

    #[test]
    fn non_object_is_reported() {
        let err = normalize_record(Platform::B, RecordKind::Gate, &json!("gate")).unwrap_err();
        assert_eq!(err, IssueKind::NotAnObject);
    }

    #[test]
    fn export_keeps_going_past_malformed_records() {
        let doc = json!({
            "flags": [{"key": "a"}, {"name": "no key"}, {"key": "b"}],
            "experiments": [{"key": "c", "state": "draft"}]
        });
        let snapshot = normalize_export(Platform::A, &doc).unwrap();
        let ids: Vec<_> = snapshot.records().iter().map(ConfigRecord::identifier).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(snapshot.issues().len(), 1);
        assert_eq!(snapshot.issues()[0].index, 1);
        assert_eq!(snapshot.issues()[0].kind, RecordKind::Flag);
    }

    #[test]
    fn export_reports_duplicates_and_keeps_first() {
        let doc = json!({
            "experiments": [{"name": "x", "status": "active"}],
            "feature_gates": [{"name": "x", "isEnabled": true}]
        });
        let snapshot = normalize_export(Platform::B, &doc).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records()[0].kind(), RecordKind::Experiment);
        assert_eq!(
            snapshot.issues()[0].problem,
            IssueKind::DuplicateIdentifier {
                identifier: "x".to_string()
            }
        );
    }

    #[test]
    fn bare_array_is_experiments() {
        let snapshot = normalize_export(Platform::A, &json!([{"key": "e"}])).unwrap();
        assert_eq!(snapshot.records()[0].kind(), RecordKind::Experiment);
    }

    #[test]
    fn bare_array_kind_follows_record_fields() {
        let doc = json!([
            {"key": "f", "enabled": true},
            {"key": "e", "enabled": true, "state": "running"},
            {"key": "d", "enabled": false}
        ]);
        let snapshot = normalize_export(Platform::A, &doc).unwrap();
        let kinds: Vec<_> = snapshot.records().iter().map(ConfigRecord::kind).collect();
        assert_eq!(kinds, vec![RecordKind::Flag, RecordKind::Experiment, RecordKind::Flag]);
        assert_eq!(snapshot.records()[0].status(), RUNNING_STATUS);
        assert_eq!(snapshot.records()[2].status(), DISABLED_STATUS);
    }

    #[test]
    fn data_wrapper_kind_follows_record_fields() {
        let doc = json!({"data": [{"name": "g", "isEnabled": true}, {"name": "e", "status": "active"}]});
        let snapshot = normalize_export(Platform::B, &doc).unwrap();
        assert_eq!(snapshot.records()[0].kind(), RecordKind::Gate);
        assert_eq!(snapshot.records()[0].status(), ACTIVE_STATUS);
        assert_eq!(snapshot.records()[1].kind(), RecordKind::Experiment);
    }

    #[test]
    fn typed_section_overrides_inference() {
        let doc = json!({"experiments": [{"key": "e", "enabled": true}]});
        let snapshot = normalize_export(Platform::A, &doc).unwrap();
        assert_eq!(snapshot.records()[0].kind(), RecordKind::Experiment);
    }

    #[test]
    fn keyless_variant_entries_still_count() {
        let raw = json!({"key": "f", "enabled": true, "variants": [{"key": "on"}, {"value": "off"}, 7]});
        let r = normalize_record(Platform::A, RecordKind::Flag, &raw).unwrap();
        assert_eq!(
            r.variant_ids().collect::<Vec<_>>(),
            vec!["on", UNKNOWN_VARIANT, UNKNOWN_VARIANT]
        );

        let raw = json!({"name": "e", "groups": [{"size": 50}]});
        let r = normalize_record(Platform::B, RecordKind::Experiment, &raw).unwrap();
        assert_eq!(r.variants().len(), 1);
    }

    #[test]
    fn platform_b_data_wrapper() {
        let snapshot = normalize_export(Platform::B, &json!({"data": [{"name": "e"}]})).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.find_exact("e").is_some());
    }

    #[test]
    fn scalar_document_is_rejected() {
        let err = normalize_export(Platform::A, &json!("nope")).unwrap_err();
        assert!(matches!(err, ReconcileError::UnsupportedDocument { found: "string", .. }));
    }

    #[test]
    fn from_records_drops_duplicates() {
        let a = ConfigRecord::builder("x", Platform::A, RecordKind::Flag).build();
        let b = ConfigRecord::builder("x", Platform::A, RecordKind::Flag)
            .enabled(true)
            .build();
        let snapshot = PlatformSnapshot::from_records([a.clone(), b]);
        assert_eq!(snapshot.records(), &[a]);
        assert_eq!(snapshot.issues()[0].index, 1);
    }
}
