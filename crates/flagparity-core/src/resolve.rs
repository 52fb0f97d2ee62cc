//! Identity resolution across platforms
//!
//! Provides the [`MatchPolicy`] trait for finding the platform B record that
//! corresponds to a platform A identifier, and the built-in policies.
//!
//! Every policy tries exact, case-sensitive identifier equality first. They
//! differ only in the fallback used when no exact match exists:
//!
//! | Policy | Fallback |
//! |---|---|
//! | [`FirstSubstringPolicy`] | first candidate with a case-insensitive substring relation |
//! | [`ClosestLengthPolicy`] | qualifying candidate with the closest identifier length |
//! | [`ExactOnlyPolicy`] | none |
//!
//! [`FirstSubstringPolicy`] is the default. Its result depends on candidate
//! order: target `boost-price-test` matches whichever of
//! `boost-price-test-gb` / `boost-price-test-fr` comes first. Such matches
//! are tagged [`Confidence::Fuzzy`] so they can be confirmed by hand.

use crate::error::{ReconcileError, ReconcileResult};
use crate::record::ConfigRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a match was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    /// Identifiers are equal
    Exact,
    /// Found through a heuristic; needs manual confirmation
    Fuzzy,
    /// No candidate matched
    None,
}

impl Confidence {
    /// Check if the match should be confirmed by a human
    #[inline]
    #[must_use]
    pub fn needs_review(self) -> bool {
        matches!(self, Self::Fuzzy)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exact => "EXACT",
            Self::Fuzzy => "FUZZY",
            Self::None => "NONE",
        })
    }
}

/// Outcome of resolving one target identifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    /// Matched candidate, if any
    pub matched: Option<&'a ConfigRecord>,
    /// How the candidate was found
    pub confidence: Confidence,
}

impl<'a> Resolution<'a> {
    /// Exact match
    #[inline]
    #[must_use]
    pub fn exact(record: &'a ConfigRecord) -> Self {
        Self {
            matched: Some(record),
            confidence: Confidence::Exact,
        }
    }

    /// Heuristic match
    #[inline]
    #[must_use]
    pub fn fuzzy(record: &'a ConfigRecord) -> Self {
        Self {
            matched: Some(record),
            confidence: Confidence::Fuzzy,
        }
    }

    /// No match
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self {
            matched: None,
            confidence: Confidence::None,
        }
    }
}

/// Identity resolution policy
///
/// Implementations must be deterministic for a given candidate order.
pub trait MatchPolicy: Send + Sync + fmt::Debug {
    /// Find the candidate corresponding to `target`
    fn resolve<'a>(&self, target: &str, candidates: &'a [ConfigRecord]) -> Resolution<'a>;

    /// Policy name (for configuration and reports)
    fn name(&self) -> &'static str;
}

/// Exact, case-sensitive identifier lookup
#[must_use]
pub fn find_exact<'a>(target: &str, candidates: &'a [ConfigRecord]) -> Option<&'a ConfigRecord> {
    candidates.iter().find(|c| c.identifier() == target)
}

/// Case-insensitive substring relation in either direction
#[must_use]
pub fn overlaps(target: &str, candidate: &str) -> bool {
    let target = target.to_lowercase();
    let candidate = candidate.to_lowercase();
    target.contains(&candidate) || candidate.contains(&target)
}

/// Exact match, then first substring match in candidate order
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSubstringPolicy;

impl FirstSubstringPolicy {
    /// Registry name
    pub const NAME: &'static str = "first_substring";

    /// Create new policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MatchPolicy for FirstSubstringPolicy {
    fn resolve<'a>(&self, target: &str, candidates: &'a [ConfigRecord]) -> Resolution<'a> {
        if let Some(record) = find_exact(target, candidates) {
            return Resolution::exact(record);
        }
        candidates
            .iter()
            .find(|c| overlaps(target, c.identifier()))
            .map_or_else(Resolution::none, Resolution::fuzzy)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Exact match only
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactOnlyPolicy;

impl ExactOnlyPolicy {
    /// Registry name
    pub const NAME: &'static str = "exact_only";

    /// Create new policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MatchPolicy for ExactOnlyPolicy {
    fn resolve<'a>(&self, target: &str, candidates: &'a [ConfigRecord]) -> Resolution<'a> {
        find_exact(target, candidates).map_or_else(Resolution::none, Resolution::exact)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Exact match, then the substring match whose identifier length is closest
/// to the target's
///
/// Ties keep candidate order. Still a heuristic, so matches are
/// [`Confidence::Fuzzy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestLengthPolicy;

impl ClosestLengthPolicy {
    /// Registry name
    pub const NAME: &'static str = "closest_length";

    /// Create new policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MatchPolicy for ClosestLengthPolicy {
    fn resolve<'a>(&self, target: &str, candidates: &'a [ConfigRecord]) -> Resolution<'a> {
        if let Some(record) = find_exact(target, candidates) {
            return Resolution::exact(record);
        }
        let target_len = target.chars().count();
        let mut best: Option<(usize, &'a ConfigRecord)> = None;
        for candidate in candidates {
            if !overlaps(target, candidate.identifier()) {
                continue;
            }
            let distance = candidate.identifier().chars().count().abs_diff(target_len);
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, candidate));
            }
        }
        best.map_or_else(Resolution::none, |(_, record)| Resolution::fuzzy(record))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Registry of match policies by name
#[derive(Debug, Default)]
pub struct PolicyRegistry {
    policies: BTreeMap<&'static str, Box<dyn MatchPolicy>>,
}

impl PolicyRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            policies: BTreeMap::new(),
        }
    }

    /// Create registry with built-in policies
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FirstSubstringPolicy::new());
        registry.register(ExactOnlyPolicy::new());
        registry.register(ClosestLengthPolicy::new());
        registry
    }

    /// Register a policy under its own name, replacing any previous one
    pub fn register<P: MatchPolicy + 'static>(&mut self, policy: P) {
        self.policies.insert(policy.name(), Box::new(policy));
    }

    /// Check if policy exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    /// Look up a policy
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn MatchPolicy> {
        self.policies.get(name).map(|p| &**p)
    }

    /// Remove a policy and hand it back
    ///
    /// # Errors
    /// [`ReconcileError::UnknownPolicy`] if `name` is not registered.
    pub fn take(&mut self, name: &str) -> ReconcileResult<Box<dyn MatchPolicy>> {
        self.policies
            .remove(name)
            .ok_or_else(|| ReconcileError::UnknownPolicy(name.to_string()))
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.policies.keys().copied().collect()
    }

    /// Get number of registered policies
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// Built-in policy by name
///
/// # Errors
/// [`ReconcileError::UnknownPolicy`] for names outside the built-in set.
pub fn policy_by_name(name: &str) -> ReconcileResult<Box<dyn MatchPolicy>> {
    PolicyRegistry::with_defaults().take(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Platform, RecordKind};

    fn candidates(ids: &[&str]) -> Vec<ConfigRecord> {
        ids.iter()
            .map(|id| ConfigRecord::builder(*id, Platform::B, RecordKind::Experiment).build())
            .collect()
    }

    fn matched_id<'a>(r: &Resolution<'a>) -> Option<&'a str> {
        r.matched.map(ConfigRecord::identifier)
    }

    #[test]
    fn exact_match_wins_over_earlier_fuzzy_candidate() {
        let c = candidates(&["boost-price-test-gb", "boost"]);
        let r = FirstSubstringPolicy.resolve("boost", &c);
        assert_eq!(matched_id(&r), Some("boost"));
        assert_eq!(r.confidence, Confidence::Exact);
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let c = candidates(&["Boost"]);
        let r = FirstSubstringPolicy.resolve("boost", &c);
        assert_eq!(r.confidence, Confidence::Fuzzy);
        assert_eq!(ExactOnlyPolicy.resolve("boost", &c).confidence, Confidence::None);
    }

    #[test]
    fn fuzzy_takes_first_candidate_in_order() {
        let c = candidates(&["boost-price-test-gb", "boost-price-test-fr"]);
        let r = FirstSubstringPolicy.resolve("boost-price-test", &c);
        assert_eq!(matched_id(&r), Some("boost-price-test-gb"));
        assert_eq!(r.confidence, Confidence::Fuzzy);

        let reversed = candidates(&["boost-price-test-fr", "boost-price-test-gb"]);
        let r = FirstSubstringPolicy.resolve("boost-price-test", &reversed);
        assert_eq!(matched_id(&r), Some("boost-price-test-fr"));
    }

    #[test]
    fn fuzzy_matches_in_both_directions() {
        let c = candidates(&["mpu"]);
        let r = FirstSubstringPolicy.resolve("MPU-heuristics-v1", &c);
        assert_eq!(matched_id(&r), Some("mpu"));
        assert_eq!(r.confidence, Confidence::Fuzzy);
    }

    #[test]
    fn no_match_is_none() {
        let c = candidates(&["alpha", "beta"]);
        let r = FirstSubstringPolicy.resolve("gamma", &c);
        assert!(r.matched.is_none());
        assert_eq!(r.confidence, Confidence::None);
    }

    #[test]
    fn empty_candidates() {
        let r = FirstSubstringPolicy.resolve("x", &[]);
        assert_eq!(r, Resolution::none());
    }

    #[test]
    fn closest_length_prefers_nearest_identifier() {
        let c = candidates(&["boost-price-test-gb-android", "boost-price-test-gb"]);
        let r = ClosestLengthPolicy.resolve("boost-price-test", &c);
        assert_eq!(matched_id(&r), Some("boost-price-test-gb"));
        assert_eq!(r.confidence, Confidence::Fuzzy);
    }

    #[test]
    fn closest_length_ties_keep_order() {
        let c = candidates(&["boost-price-test-fr", "boost-price-test-gb"]);
        let r = ClosestLengthPolicy.resolve("boost-price-test", &c);
        assert_eq!(matched_id(&r), Some("boost-price-test-fr"));
    }

    #[test]
    fn registry_with_defaults() {
        let registry = PolicyRegistry::with_defaults();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains(FirstSubstringPolicy::NAME));
        assert!(registry.contains(ExactOnlyPolicy::NAME));
        assert!(registry.contains(ClosestLengthPolicy::NAME));
        assert_eq!(
            registry.names(),
            vec!["closest_length", "exact_only", "first_substring"]
        );
    }

    #[test]
    fn registry_get_and_take() {
        let mut registry = PolicyRegistry::with_defaults();
        assert_eq!(registry.get("exact_only").map(|p| p.name()), Some("exact_only"));
        let taken = registry.take("exact_only").unwrap();
        assert_eq!(taken.name(), "exact_only");
        assert!(!registry.contains("exact_only"));
    }

    #[test]
    fn policy_by_name_rejects_unknown() {
        assert!(policy_by_name("first_substring").is_ok());
        let err = policy_by_name("best_score").unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownPolicy(name) if name == "best_score"));
    }

    #[test]
    fn confidence_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Confidence::Fuzzy).unwrap(), "\"FUZZY\"");
        assert!(Confidence::Fuzzy.needs_review());
        assert!(!Confidence::Exact.needs_review());
    }
}
