//! Human-readable console report

use flagparity_core::{
    AllowlistAudit, ComparisonResult, ConfigRecord, InventorySummary, MigrationChecklist,
    Presence, ReconcileObserver, ReconciliationReport, RecordIssue, RecordKind,
};
use serde_json::Value;

const RULE: &str = "==================================================";

/// Records listed per kind in the inventory details
const DETAIL_LIMIT: usize = 10;

/// Collects the text report while observing a run
#[derive(Debug, Default)]
pub(crate) struct ConsolePresenter {
    lines: Vec<String>,
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "MISMATCH"
    }
}

fn ids(record: &ConfigRecord) -> String {
    format!("{:?}", record.variant_ids().collect::<Vec<_>>())
}

fn rollout(record: &ConfigRecord) -> String {
    match (record.kind(), record.rollout()) {
        (RecordKind::Flag, Value::Null) => "0%".to_string(),
        (RecordKind::Flag, value) => format!("{value}%"),
        (_, value) => value.to_string(),
    }
}

impl ConsolePresenter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn heading(&mut self, title: &str) {
        self.line("");
        self.line(title);
        self.line(RULE);
    }

    /// Finished report text
    pub(crate) fn render(&self) -> String {
        self.lines.join("\n")
    }

    pub(crate) fn inventory(&mut self, summary: &InventorySummary) {
        self.heading("PLATFORM A INVENTORY");
        self.line(format!("Feature flags: {} total", summary.total_flags));
        self.line(format!("   enabled: {}", summary.enabled_flags));
        self.line(format!("   disabled: {}", summary.disabled_flags));
        self.line(format!("   with variants: {}", summary.flags_with_variants));
        for (mode, count) in &summary.flag_evaluation_modes {
            self.line(format!("   evaluation mode {mode}: {count}"));
        }
        self.line(format!(
            "Experiments: {} total, {} running",
            summary.total_experiments, summary.running_experiments
        ));
        for (state, count) in &summary.experiment_states {
            self.line(format!("   state {state}: {count}"));
        }
        for (mode, count) in &summary.experiment_evaluation_modes {
            self.line(format!("   evaluation mode {mode}: {count}"));
        }
    }

    /// Per-record details, capped at [`DETAIL_LIMIT`] records of each kind
    pub(crate) fn record_details(&mut self, records: &[ConfigRecord]) {
        let sections = [
            (RecordKind::Flag, "Flag details"),
            (RecordKind::Experiment, "Experiment details"),
        ];
        for (kind, title) in sections {
            let of_kind: Vec<&ConfigRecord> = records.iter().filter(|r| r.kind() == kind).collect();
            if of_kind.is_empty() {
                continue;
            }
            self.line(format!("{title}:"));
            for record in of_kind.iter().take(DETAIL_LIMIT) {
                let activity = if record.is_active() { "active" } else { "inactive" };
                self.line(format!("   {} ({activity})", record.identifier()));
                self.line(format!("      Name: {}", record.display_name()));
                if kind == RecordKind::Experiment {
                    self.line(format!("      State: {}", record.status()));
                }
                self.line(format!("      Variants: {}", ids(record)));
                self.line(format!("      Rollout: {}", rollout(record)));
            }
            if of_kind.len() > DETAIL_LIMIT {
                self.line(format!("   ... and {} more", of_kind.len() - DETAIL_LIMIT));
            }
        }
    }

    pub(crate) fn allowlist(&mut self, audit: &AllowlistAudit) {
        self.heading("ALLOWLIST AUDIT");
        self.line(format!("Found in both: {}", audit.found_in_both.len()));
        for key in &audit.found_in_both {
            self.line(format!("   + {key}"));
        }
        self.line(format!(
            "On allowlist but missing from platform A: {}",
            audit.missing_from_source.len()
        ));
        for key in &audit.missing_from_source {
            self.line(format!("   ! {key}"));
        }
        self.line(format!(
            "In platform A but not on allowlist: {}",
            audit.extra_in_source.len()
        ));
        for key in &audit.extra_in_source {
            self.line(format!("   ? {key}"));
        }
    }

    pub(crate) fn checklist(&mut self, checklist: &MigrationChecklist) {
        self.heading("MIGRATION CHECKLIST");
        self.line(checklist.to_string());
    }
}

impl ReconcileObserver for ConsolePresenter {
    fn on_issue(&mut self, issue: &RecordIssue) {
        self.line(format!("skipped {issue}"));
    }

    fn on_result(&mut self, result: &ComparisonResult) {
        self.line("");
        self.line(format!("{} [{}]", result.target_key(), result.confidence()));

        match (result.presence(), result.record_a(), result.record_b()) {
            (Presence::Both, Some(a), Some(b)) => {
                if result.confidence().needs_review() {
                    self.line(format!("   matched platform B record: {} (confirm)", b.identifier()));
                }
                if let Some(fields) = result.field_results() {
                    self.line(format!("   Name: {}", mark(fields.name_match)));
                    self.line(format!("   Description: {}", mark(fields.description_match)));
                    self.line(format!(
                        "   Status: {} -> {} {}",
                        fields.status.a_state,
                        fields.status.b_status,
                        mark(fields.status.equivalent)
                    ));
                    self.line(format!(
                        "   Variants: {} -> {} {}",
                        ids(a),
                        ids(b),
                        mark(fields.variants.variants_match)
                    ));
                }
            }
            (Presence::OnlyA, Some(a), _) => {
                self.line("   found only on platform A");
                self.line(format!("   State: {}", a.status()));
                self.line(format!("   Variants: {}", ids(a)));
            }
            (Presence::OnlyB, _, Some(b)) => {
                self.line("   found only on platform B");
                self.line(format!("   Status: {}", b.status()));
                self.line(format!("   Groups: {}", ids(b)));
            }
            _ => self.line("   not found on either platform"),
        }
    }

    fn on_complete(&mut self, report: &ReconciliationReport) {
        let s = &report.summary;
        self.heading("SUMMARY");
        self.line(format!("Policy: {}", report.policy));
        self.line(format!("Targets: {}", s.total));
        self.line(format!("   both platforms: {}", s.found_both));
        self.line(format!("   platform A only: {}", s.only_a));
        self.line(format!("   platform B only: {}", s.only_b));
        self.line(format!("   neither: {}", s.neither));
        self.line(format!("   fuzzy matches to confirm: {}", s.fuzzy_matches));
        self.line(format!("   fully matching: {}", s.fully_matching));
        self.checklist(&report.checklist);
    }
}
