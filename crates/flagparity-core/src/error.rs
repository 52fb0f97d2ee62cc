//! Error and issue types for the reconciliation engine
//!
//! Reconciliation itself never fails: absent records, heuristic matches and
//! malformed inputs are carried as data. The error enum covers the few
//! boundary conditions a caller must fix before a run can start.

use crate::record::{Platform, RecordKind};
use serde::Serialize;
use std::fmt;

/// Errors raised before reconciliation starts
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Export document root is neither an object nor an array
    #[error("unsupported {platform} export document: expected object or array, got {found}")]
    UnsupportedDocument {
        /// Platform the document was fetched for
        platform: Platform,
        /// JSON type that was found instead
        found: &'static str,
    },

    /// Requested match policy is not registered
    #[error("unknown match policy: '{0}'")]
    UnknownPolicy(String),
}

impl ReconcileError {
    /// Create unsupported document error for a JSON value
    #[must_use]
    pub fn unsupported_document(platform: Platform, value: &serde_json::Value) -> Self {
        Self::UnsupportedDocument {
            platform,
            found: json_type_name(value),
        }
    }
}

/// Result type alias for engine operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Problem found while normalizing one raw record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum IssueKind {
    /// Required identifier field is absent, empty or not a string
    MissingIdentifier,

    /// Entry is not a JSON object
    NotAnObject,

    /// Identifier already used by an earlier record; this one was dropped
    DuplicateIdentifier {
        /// Repeated identifier
        identifier: String,
    },
}

/// Malformed-record report; the record is excluded, the batch continues
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIssue {
    /// Platform the record came from
    pub platform: Platform,
    /// Export section the record sat in
    pub kind: RecordKind,
    /// Position within that section
    pub index: usize,
    /// What was wrong
    #[serde(flatten)]
    pub problem: IssueKind,
}

impl RecordIssue {
    /// Create new issue
    #[inline]
    #[must_use]
    pub fn new(platform: Platform, kind: RecordKind, index: usize, problem: IssueKind) -> Self {
        Self {
            platform,
            kind,
            index,
            problem,
        }
    }
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let section = self.kind.section();
        match &self.problem {
            IssueKind::MissingIdentifier => write!(
                f,
                "{} {section}[{}]: missing '{}' identifier",
                self.platform,
                self.index,
                self.platform.identifier_field()
            ),
            IssueKind::NotAnObject => {
                write!(f, "{} {section}[{}]: not an object", self.platform, self.index)
            }
            IssueKind::DuplicateIdentifier { identifier } => write!(
                f,
                "{} {section}[{}]: duplicate identifier '{identifier}'",
                self.platform, self.index
            ),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_document_display() {
        let err = ReconcileError::unsupported_document(Platform::B, &serde_json::json!(42));
        assert_eq!(
            err.to_string(),
            "unsupported platform B export document: expected object or array, got number"
        );
    }

    #[test]
    fn unknown_policy_display() {
        let err = ReconcileError::UnknownPolicy("best".to_string());
        assert_eq!(err.to_string(), "unknown match policy: 'best'");
    }

    #[test]
    fn issue_display_names_identifier_field() {
        let issue = RecordIssue::new(
            Platform::A,
            RecordKind::Flag,
            3,
            IssueKind::MissingIdentifier,
        );
        assert_eq!(issue.to_string(), "platform A flags[3]: missing 'key' identifier");
    }

    #[test]
    fn duplicate_issue_display() {
        let issue = RecordIssue::new(
            Platform::B,
            RecordKind::Gate,
            0,
            IssueKind::DuplicateIdentifier {
                identifier: "dup".to_string(),
            },
        );
        assert!(issue.to_string().contains("duplicate identifier 'dup'"));
    }
}
