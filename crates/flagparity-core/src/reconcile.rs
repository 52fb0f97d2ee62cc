//! Reconciliation run
//!
//! Drives resolution and comparison for each requested target key, then
//! synthesizes the checklist. The run is a pure batch transformation over two
//! fully-materialized snapshots; every key is handled independently.
//!
//! ```text
//! targets ──┬─> exact lookup in A ─────────────┐
//!           └─> MatchPolicy over B candidates ─┴─> FieldComparator ─> ComparisonResult
//! snapshots ─> ChecklistSynthesizer ─> MigrationChecklist
//! ```

use crate::checklist::{ChecklistConfig, ChecklistSynthesizer, MigrationChecklist};
use crate::compare::{FieldComparator, FieldResult, StatusEquivalence};
use crate::error::RecordIssue;
use crate::normalize::PlatformSnapshot;
use crate::record::ConfigRecord;
use crate::resolve::{Confidence, FirstSubstringPolicy, MatchPolicy};
use serde::Serialize;

/// Outcome for one target key
///
/// `field_results` is present exactly when both platforms produced a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    target_key: String,
    found_a: bool,
    found_b: bool,
    record_a: Option<ConfigRecord>,
    record_b: Option<ConfigRecord>,
    confidence: Confidence,
    field_results: Option<FieldResult>,
}

impl ComparisonResult {
    fn new(
        target_key: &str,
        record_a: Option<&ConfigRecord>,
        record_b: Option<&ConfigRecord>,
        confidence: Confidence,
        comparator: &FieldComparator,
    ) -> Self {
        let field_results = match (record_a, record_b) {
            (Some(a), Some(b)) => Some(comparator.compare(a, b)),
            _ => None,
        };
        Self {
            target_key: target_key.to_string(),
            found_a: record_a.is_some(),
            found_b: record_b.is_some(),
            record_a: record_a.cloned(),
            record_b: record_b.cloned(),
            confidence,
            field_results,
        }
    }

    /// Requested identifier
    #[inline]
    #[must_use]
    pub fn target_key(&self) -> &str {
        &self.target_key
    }

    /// Whether platform A holds the key
    #[inline]
    #[must_use]
    pub fn found_a(&self) -> bool {
        self.found_a
    }

    /// Whether a platform B counterpart was resolved
    #[inline]
    #[must_use]
    pub fn found_b(&self) -> bool {
        self.found_b
    }

    /// Platform A record
    #[inline]
    #[must_use]
    pub fn record_a(&self) -> Option<&ConfigRecord> {
        self.record_a.as_ref()
    }

    /// Resolved platform B record
    #[inline]
    #[must_use]
    pub fn record_b(&self) -> Option<&ConfigRecord> {
        self.record_b.as_ref()
    }

    /// How the platform B record was resolved
    #[inline]
    #[must_use]
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Field comparison, present iff both records exist
    #[inline]
    #[must_use]
    pub fn field_results(&self) -> Option<&FieldResult> {
        self.field_results.as_ref()
    }

    /// Presence classification
    #[must_use]
    pub fn presence(&self) -> Presence {
        match (self.found_a, self.found_b) {
            (true, true) => Presence::Both,
            (true, false) => Presence::OnlyA,
            (false, true) => Presence::OnlyB,
            (false, false) => Presence::Neither,
        }
    }
}

/// Where a target key was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Both platforms
    Both,
    /// Platform A only
    OnlyA,
    /// Platform B only
    OnlyB,
    /// Neither platform
    Neither,
}

/// Aggregate counts over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationSummary {
    /// Targets requested
    pub total: usize,
    /// Found on both platforms
    pub found_both: usize,
    /// Found on platform A only
    pub only_a: usize,
    /// Found on platform B only
    pub only_b: usize,
    /// Found on neither platform
    pub neither: usize,
    /// Platform B matches obtained heuristically
    pub fuzzy_matches: usize,
    /// Pairs whose computed fields all agree
    pub fully_matching: usize,
}

impl ReconciliationSummary {
    /// Tally results
    #[must_use]
    pub fn from_results(results: &[ComparisonResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.presence() {
                Presence::Both => summary.found_both += 1,
                Presence::OnlyA => summary.only_a += 1,
                Presence::OnlyB => summary.only_b += 1,
                Presence::Neither => summary.neither += 1,
            }
            if result.confidence().needs_review() {
                summary.fuzzy_matches += 1;
            }
            if result.field_results().is_some_and(FieldResult::all_match) {
                summary.fully_matching += 1;
            }
        }
        summary
    }
}

/// Complete output of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    /// Match policy used for platform B
    pub policy: &'static str,
    /// One result per target, in request order
    pub results: Vec<ComparisonResult>,
    /// Aggregate counts
    pub summary: ReconciliationSummary,
    /// Migration checklist
    pub checklist: MigrationChecklist,
    /// Records excluded while normalizing either platform
    pub issues: Vec<RecordIssue>,
}

/// Observer for reconciliation output
///
/// Presentation lives in implementations of this trait; the engine never
/// prints. All methods default to no-ops.
pub trait ReconcileObserver {
    /// A record was excluded during normalization
    fn on_issue(&mut self, _issue: &RecordIssue) {}

    /// One target key was reconciled
    fn on_result(&mut self, _result: &ComparisonResult) {}

    /// The whole report is available
    fn on_complete(&mut self, _report: &ReconciliationReport) {}
}

impl ReconciliationReport {
    /// Replay the report to observers, in order: issues, results, completion
    pub fn notify(&self, observers: &mut [&mut dyn ReconcileObserver]) {
        for observer in observers.iter_mut() {
            for issue in &self.issues {
                observer.on_issue(issue);
            }
            for result in &self.results {
                observer.on_result(result);
            }
            observer.on_complete(self);
        }
    }
}

/// Reconciliation engine
#[derive(Debug)]
pub struct Reconciler {
    policy: Box<dyn MatchPolicy>,
    comparator: FieldComparator,
    synthesizer: ChecklistSynthesizer,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    /// Create engine with the first-substring policy and default tables
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: Box::new(FirstSubstringPolicy::new()),
            comparator: FieldComparator::new(),
            synthesizer: ChecklistSynthesizer::default(),
        }
    }

    /// With match policy
    #[must_use]
    pub fn with_policy(mut self, policy: Box<dyn MatchPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// With status equivalence table
    #[must_use]
    pub fn with_status_table(mut self, table: StatusEquivalence) -> Self {
        self.comparator = FieldComparator::with_status_table(table);
        self
    }

    /// With checklist configuration
    #[must_use]
    pub fn with_checklist(mut self, config: ChecklistConfig) -> Self {
        self.synthesizer = ChecklistSynthesizer::new(config);
        self
    }

    /// Active match policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &dyn MatchPolicy {
        &*self.policy
    }

    /// Reconcile one target key
    ///
    /// Platform A is looked up by exact identifier; platform B goes through
    /// the match policy.
    #[must_use]
    pub fn reconcile_key(
        &self,
        target_key: &str,
        snapshot_a: &PlatformSnapshot,
        snapshot_b: &PlatformSnapshot,
    ) -> ComparisonResult {
        let record_a = snapshot_a.find_exact(target_key);
        let resolution = self.policy.resolve(target_key, snapshot_b.records());

        if resolution.confidence.needs_review() {
            tracing::debug!(
                target_key,
                matched = resolution.matched.map(ConfigRecord::identifier),
                "heuristic match needs confirmation"
            );
        }

        ComparisonResult::new(
            target_key,
            record_a,
            resolution.matched,
            resolution.confidence,
            &self.comparator,
        )
    }

    /// Reconcile every target key, in order, and synthesize the checklist
    #[must_use]
    pub fn run<S: AsRef<str>>(
        &self,
        snapshot_a: &PlatformSnapshot,
        snapshot_b: &PlatformSnapshot,
        target_keys: &[S],
    ) -> ReconciliationReport {
        tracing::info!(
            policy = self.policy.name(),
            targets = target_keys.len(),
            records_a = snapshot_a.len(),
            records_b = snapshot_b.len(),
            "starting reconciliation"
        );

        let results: Vec<ComparisonResult> = target_keys
            .iter()
            .map(|key| self.reconcile_key(key.as_ref(), snapshot_a, snapshot_b))
            .collect();
        let summary = ReconciliationSummary::from_results(&results);
        let checklist = self
            .synthesizer
            .synthesize(snapshot_a.records(), snapshot_b.records());
        let issues = snapshot_a
            .issues()
            .iter()
            .chain(snapshot_b.issues())
            .cloned()
            .collect();

        tracing::info!(
            found_both = summary.found_both,
            only_a = summary.only_a,
            only_b = summary.only_b,
            neither = summary.neither,
            fuzzy = summary.fuzzy_matches,
            "reconciliation finished"
        );

        ReconciliationReport {
            policy: self.policy.name(),
            results,
            summary,
            checklist,
            issues,
        }
    }
}
