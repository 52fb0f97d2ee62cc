//! Field-level comparison of a matched record pair
//!
//! Only called when both platforms produced a record. Rollout allocations
//! are carried through uncompared because the two schemas have no common
//! structure.

use crate::record::ConfigRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// Platform A state / platform B status vocabulary mapping
///
/// Tokens are equivalent when literally equal or when the pair is listed in
/// the table. The table is directional: the first token is a platform A
/// state, the second a platform B status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEquivalence {
    pairs: HashSet<(String, String)>,
}

impl Default for StatusEquivalence {
    fn default() -> Self {
        let mut table = Self::literal_only();
        table.allow("running", "active");
        table
    }
}

impl StatusEquivalence {
    /// Table with no special pairs; only literal equality matches
    #[inline]
    #[must_use]
    pub fn literal_only() -> Self {
        Self {
            pairs: HashSet::new(),
        }
    }

    /// Declare `a_state` equivalent to `b_status`
    pub fn allow(&mut self, a_state: impl Into<String>, b_status: impl Into<String>) {
        self.pairs.insert((a_state.into(), b_status.into()));
    }

    /// With an extra equivalent pair
    #[inline]
    #[must_use]
    pub fn with_pair(mut self, a_state: impl Into<String>, b_status: impl Into<String>) -> Self {
        self.allow(a_state, b_status);
        self
    }

    /// Check if the two tokens are equivalent
    #[must_use]
    pub fn equivalent(&self, a_state: &str, b_status: &str) -> bool {
        a_state == b_status
            || self
                .pairs
                .contains(&(a_state.to_string(), b_status.to_string()))
    }

    /// Number of special pairs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if only literal equality applies
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// State/status outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusComparison {
    /// Platform A state token
    pub a_state: String,
    /// Platform B status token
    pub b_status: String,
    /// Whether the tokens are equivalent
    pub equivalent: bool,
}

/// Variant/group outcome
///
/// The raw lists keep source order and are always present for manual
/// inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantComparison {
    /// Platform A variant keys
    pub a_variants: Vec<String>,
    /// Platform B group names
    pub b_groups: Vec<String>,
    /// Whether both reduce to the same identifier set
    pub variants_match: bool,
}

impl VariantComparison {
    /// Identifiers present on A but not on B, sorted
    #[must_use]
    pub fn only_in_a(&self) -> Vec<&str> {
        let b: BTreeSet<&str> = self.b_groups.iter().map(String::as_str).collect();
        self.a_variants
            .iter()
            .map(String::as_str)
            .filter(|v| !b.contains(v))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Identifiers present on B but not on A, sorted
    #[must_use]
    pub fn only_in_b(&self) -> Vec<&str> {
        let a: BTreeSet<&str> = self.a_variants.iter().map(String::as_str).collect();
        self.b_groups
            .iter()
            .map(String::as_str)
            .filter(|v| !a.contains(v))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Rollout values carried for review; never compared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutComparison {
    /// Platform A rollout weights/percentage
    pub a_rollout: Value,
    /// Platform B allocation
    pub b_allocation: Value,
}

/// Per-field outcome for a matched pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldResult {
    /// Display names equal (absent on both sides counts as equal)
    pub name_match: bool,
    /// Descriptions equal, absent read as empty
    pub description_match: bool,
    /// State/status equivalence
    pub status: StatusComparison,
    /// Variant set equality
    pub variants: VariantComparison,
    /// Raw rollout values
    pub rollout: RolloutComparison,
}

impl FieldResult {
    /// Check if every computed field agrees
    ///
    /// Rollout is excluded since it is never compared.
    #[must_use]
    pub fn all_match(&self) -> bool {
        self.name_match
            && self.description_match
            && self.status.equivalent
            && self.variants.variants_match
    }

    /// Names of computed fields that disagree
    #[must_use]
    pub fn mismatched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if !self.name_match {
            fields.push("name");
        }
        if !self.description_match {
            fields.push("description");
        }
        if !self.status.equivalent {
            fields.push("status");
        }
        if !self.variants.variants_match {
            fields.push("variants");
        }
        fields
    }
}

/// Field comparator
#[derive(Debug, Clone, Default)]
pub struct FieldComparator {
    status_table: StatusEquivalence,
}

impl FieldComparator {
    /// Create comparator with the default status table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create comparator with a custom status table
    #[inline]
    #[must_use]
    pub fn with_status_table(status_table: StatusEquivalence) -> Self {
        Self { status_table }
    }

    /// Status table in use
    #[inline]
    #[must_use]
    pub fn status_table(&self) -> &StatusEquivalence {
        &self.status_table
    }

    /// Compare a platform A record with its platform B counterpart
    #[must_use]
    pub fn compare(&self, a: &ConfigRecord, b: &ConfigRecord) -> FieldResult {
        let a_variants: Vec<String> = a.variant_ids().map(str::to_string).collect();
        let b_groups: Vec<String> = b.variant_ids().map(str::to_string).collect();
        let variants_match = a.variant_ids().collect::<HashSet<_>>()
            == b.variant_ids().collect::<HashSet<_>>();

        FieldResult {
            name_match: a.name() == b.name(),
            description_match: a.description() == b.description(),
            status: StatusComparison {
                a_state: a.status().to_string(),
                b_status: b.status().to_string(),
                equivalent: self.status_table.equivalent(a.status(), b.status()),
            },
            variants: VariantComparison {
                a_variants,
                b_groups,
                variants_match,
            },
            rollout: RolloutComparison {
                a_rollout: a.rollout().clone(),
                b_allocation: b.rollout().clone(),
            },
        }
    }
}
