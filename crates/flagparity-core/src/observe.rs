//! Structured-log observer

use crate::error::RecordIssue;
use crate::reconcile::{ComparisonResult, Presence, ReconcileObserver, ReconciliationReport};

/// Reports reconciliation output through `tracing`
///
/// Mismatches and fuzzy matches log at `warn`, everything else at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn on_issue(&mut self, issue: &RecordIssue) {
        tracing::warn!(%issue, "record excluded");
    }

    fn on_result(&mut self, result: &ComparisonResult) {
        let key = result.target_key();
        match (result.presence(), result.field_results()) {
            (Presence::Both, Some(fields))
                if fields.all_match() && !result.confidence().needs_review() =>
            {
                tracing::info!(key, confidence = %result.confidence(), "records match");
            }
            (Presence::Both, Some(fields)) => {
                tracing::warn!(
                    key,
                    confidence = %result.confidence(),
                    mismatched = ?fields.mismatched_fields(),
                    matched_b = result.record_b().map(|r| r.identifier()),
                    "records differ or need confirmation"
                );
            }
            (presence, _) => {
                tracing::warn!(key, ?presence, "target not found on every platform");
            }
        }
    }

    fn on_complete(&mut self, report: &ReconciliationReport) {
        let s = &report.summary;
        tracing::info!(
            total = s.total,
            found_both = s.found_both,
            only_a = s.only_a,
            only_b = s.only_b,
            neither = s.neither,
            fuzzy = s.fuzzy_matches,
            pending_migrations = report.checklist.pending(),
            "reconciliation report ready"
        );
    }
}
