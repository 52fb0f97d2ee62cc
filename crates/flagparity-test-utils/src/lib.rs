//! Testing utilities for flagparity workspace
//!
//! Raw export fixtures shaped like the two platforms' JSON, plus shortcuts
//! that normalize them.

#![allow(missing_docs)]

use flagparity_core::{normalize_export, Platform, PlatformSnapshot};
use serde_json::{json, Value};

fn amp_variants(variants: &[&str]) -> Vec<Value> {
    variants.iter().map(|v| json!({"key": v})).collect()
}

pub fn amp_flag(key: &str, enabled: bool, variants: &[&str]) -> Value {
    json!({
        "key": key,
        "name": key,
        "enabled": enabled,
        "evaluationMode": "remote",
        "variants": amp_variants(variants),
        "rolloutPercentage": 100,
    })
}

pub fn amp_experiment(key: &str, state: &str, variants: &[&str]) -> Value {
    let weights: serde_json::Map<String, Value> =
        variants.iter().map(|v| ((*v).to_string(), json!(1))).collect();
    json!({
        "key": key,
        "name": key,
        "state": state,
        "evaluationMode": "remote",
        "variants": amp_variants(variants),
        "rolloutWeights": weights,
    })
}

pub fn statsig_experiment(name: &str, status: &str, groups: &[&str]) -> Value {
    let groups: Vec<Value> = groups.iter().map(|g| json!({"name": g, "size": 50})).collect();
    json!({
        "id": format!("id-{name}"),
        "name": name,
        "status": status,
        "groups": groups,
        "allocation": 100,
    })
}

pub fn statsig_gate(name: &str, enabled: bool) -> Value {
    json!({
        "id": format!("id-{name}"),
        "name": name,
        "isEnabled": enabled,
    })
}

pub fn amp_export(flags: Vec<Value>, experiments: Vec<Value>) -> Value {
    json!({
        "flags": flags,
        "experiments": experiments,
    })
}

pub fn statsig_export(experiments: Vec<Value>, gates: Vec<Value>) -> Value {
    json!({
        "experiments": experiments,
        "feature_gates": gates,
        "dynamic_configs": [],
    })
}

pub fn snapshot_a(document: &Value) -> PlatformSnapshot {
    normalize_export(Platform::A, document).unwrap()
}

pub fn snapshot_b(document: &Value) -> PlatformSnapshot {
    normalize_export(Platform::B, document).unwrap()
}

/// Platform A export with one flag and one experiment of each activity state
pub fn sample_amp_export() -> Value {
    amp_export(
        vec![
            amp_flag("new-onboarding", true, &["on", "off"]),
            amp_flag("legacy-banner", false, &[]),
        ],
        vec![
            amp_experiment("mpu-heuristics-v1", "running", &["control", "treatment"]),
            amp_experiment("boost-price-test", "running", &["control", "low", "high"]),
            amp_experiment("gender-filter", "draft", &["control"]),
        ],
    )
}

/// Platform B export matching part of [`sample_amp_export`]
pub fn sample_statsig_export() -> Value {
    statsig_export(
        vec![
            statsig_experiment("mpu-heuristics-v1", "active", &["treatment", "control"]),
            statsig_experiment("boost-price-test-gb", "active", &["control", "low"]),
            statsig_experiment("boost-price-test-fr", "active", &["control", "low", "high"]),
        ],
        vec![statsig_gate("new-onboarding", true)],
    )
}
