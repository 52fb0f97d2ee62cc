//! flagparity Core
//!
//! Reconciliation engine that audits whether flag and experiment definitions
//! exported from a source platform (A) have equivalent counterparts on a
//! target platform (B).
//!
//! # Core Concepts
//!
//! - [`normalize_export`]: raw export document → [`PlatformSnapshot`]
//! - [`MatchPolicy`]: identity resolution across differing identifiers
//! - [`FieldComparator`]: field-level equivalence of a matched pair
//! - [`ChecklistSynthesizer`]: migration checklist from platform A activity
//! - [`Reconciler`]: drives all of the above over an ordered key list
//!
//! # Architecture
//!
//! ```text
//! export A ─> normalize ─┐
//!                        ├─> Reconciler ─> ReconciliationReport ─> observers
//! export B ─> normalize ─┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use flagparity_core::{normalize_export, Confidence, Platform, Reconciler};
//! use serde_json::json;
//!
//! let a = normalize_export(Platform::A, &json!({
//!     "experiments": [{"key": "x", "name": "x", "state": "running", "variants": [{"key": "a"}]}]
//! })).unwrap();
//! let b = normalize_export(Platform::B, &json!({
//!     "experiments": [{"name": "x", "status": "active", "groups": [{"name": "a"}]}]
//! })).unwrap();
//!
//! let report = Reconciler::new().run(&a, &b, &["x"]);
//! assert_eq!(report.results[0].confidence(), Confidence::Exact);
//! assert!(report.results[0].field_results().unwrap().all_match());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod checklist;
pub mod compare;
pub mod error;
pub mod inventory;
pub mod normalize;
pub mod observe;
pub mod reconcile;
pub mod record;
pub mod resolve;

// Re-exports for convenience
pub use checklist::{
    ChecklistConfig, ChecklistLine, ChecklistSynthesizer, MigrationChecklist, DEFAULT_REVIEW_ITEMS,
};
pub use compare::{
    FieldComparator, FieldResult, RolloutComparison, StatusComparison, StatusEquivalence,
    VariantComparison,
};
pub use error::{IssueKind, ReconcileError, ReconcileResult, RecordIssue};
pub use inventory::{AllowlistAudit, InventorySummary};
pub use normalize::{infer_kind, normalize_export, normalize_record, PlatformSnapshot};
pub use observe::TracingObserver;
pub use reconcile::{
    ComparisonResult, Presence, ReconcileObserver, Reconciler, ReconciliationReport,
    ReconciliationSummary,
};
pub use record::{ConfigRecord, ConfigRecordBuilder, Platform, RecordKind, VariantRef};
pub use resolve::{
    policy_by_name, ClosestLengthPolicy, Confidence, ExactOnlyPolicy, FirstSubstringPolicy,
    MatchPolicy, PolicyRegistry, Resolution,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running a reconciliation
    pub use crate::{
        normalize_export, ChecklistConfig, ComparisonResult, Confidence, ConfigRecord,
        MatchPolicy, Platform, PlatformSnapshot, ReconcileObserver, Reconciler,
        ReconciliationReport, StatusEquivalence,
    };
}
