//! Structured diagnostics for one analysis pass.

use portwatch_core::{AnalysisResult, DataState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a summary row was dropped instead of classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Row token count does not match the header under the active policy.
    ColumnCount,
    /// A column the analyzer needs is absent.
    MissingColumn,
    /// The interface column is blank.
    EmptyInterface,
    /// The interface already appeared earlier in the table.
    DuplicateInterface,
    /// An error counter is not a non-negative integer.
    InvalidErrorCount,
    /// A utilization value is neither a percentage nor the `--` sentinel.
    InvalidUtilization,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ColumnCount => write!(f, "column_count"),
            Self::MissingColumn => write!(f, "missing_column"),
            Self::EmptyInterface => write!(f, "empty_interface"),
            Self::DuplicateInterface => write!(f, "duplicate_interface"),
            Self::InvalidErrorCount => write!(f, "invalid_error_count"),
            Self::InvalidUtilization => write!(f, "invalid_utilization"),
        }
    }
}

/// Per-record failure: the record is dropped, its siblings are still analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("missing required column {0}")]
    MissingColumn(String),
    #[error("interface name is empty")]
    EmptyInterface,
    #[error("duplicate interface {0}")]
    DuplicateInterface(String),
    #[error("{column} value {value:?} is not a non-negative integer")]
    InvalidErrorCount { column: String, value: String },
    #[error("{column} value {value:?} is not a percentage")]
    InvalidUtilization { column: String, value: String },
}

impl RecordError {
    /// Structured reason code for this failure.
    pub fn reason(&self) -> DropReason {
        match self {
            Self::ColumnCount { .. } => DropReason::ColumnCount,
            Self::MissingColumn(_) => DropReason::MissingColumn,
            Self::EmptyInterface => DropReason::EmptyInterface,
            Self::DuplicateInterface(_) => DropReason::DuplicateInterface,
            Self::InvalidErrorCount { .. } => DropReason::InvalidErrorCount,
            Self::InvalidUtilization { .. } => DropReason::InvalidUtilization,
        }
    }
}

/// A summary row that did not receive a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRecord {
    /// Source line number (1-based).
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    pub reason: DropReason,
    /// Human-readable detail about the failure.
    pub detail: String,
}

impl DroppedRecord {
    pub fn new(line: usize, interface: Option<&str>, error: &RecordError) -> Self {
        Self {
            line,
            interface: interface.map(String::from),
            reason: error.reason(),
            detail: error.to_string(),
        }
    }
}

/// Diagnostics accompanying an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Summary rows consumed, dropped ones included.
    pub records_seen: usize,
    pub dropped: Vec<DroppedRecord>,
    /// Classified ports with no detail block in the detail dump.
    pub missing_detail: Vec<String>,
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    /// Returns `true` when no record was dropped.
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }

    /// Counts dropped records per reason, in first-seen order.
    pub fn drop_summary(&self) -> Vec<(DropReason, usize)> {
        let mut summary: Vec<(DropReason, usize)> = Vec::new();
        for record in &self.dropped {
            match summary.iter_mut().find(|(reason, _)| *reason == record.reason) {
                Some((_, count)) => *count += 1,
                None => summary.push((record.reason, 1)),
            }
        }
        summary
    }
}

/// Analysis output with both the partitioned verdicts and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub result: AnalysisResult,
    pub report: AnalysisReport,
}

impl AnalysisRun {
    pub fn data_state(&self) -> DataState {
        self.result.data_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_reason_display_matches_serde() {
        let reasons = [
            (DropReason::ColumnCount, "column_count"),
            (DropReason::MissingColumn, "missing_column"),
            (DropReason::EmptyInterface, "empty_interface"),
            (DropReason::DuplicateInterface, "duplicate_interface"),
            (DropReason::InvalidErrorCount, "invalid_error_count"),
            (DropReason::InvalidUtilization, "invalid_utilization"),
        ];

        for (reason, expected) in reasons {
            assert_eq!(reason.to_string(), expected);
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{expected}\""));
        }
    }

    #[test]
    fn test_record_error_maps_to_reason() {
        let err = RecordError::InvalidErrorCount {
            column: "inErrors".into(),
            value: "abc".into(),
        };
        assert_eq!(err.reason(), DropReason::InvalidErrorCount);
        assert_eq!(
            err.to_string(),
            "inErrors value \"abc\" is not a non-negative integer"
        );

        let dropped = DroppedRecord::new(7, Some("GE1/0/3"), &err);
        assert_eq!(dropped.line, 7);
        assert_eq!(dropped.interface.as_deref(), Some("GE1/0/3"));
        assert_eq!(dropped.reason, DropReason::InvalidErrorCount);
    }

    #[test]
    fn test_dropped_record_omits_missing_interface() {
        let err = RecordError::ColumnCount {
            expected: 7,
            found: 5,
        };
        let json = serde_json::to_string(&DroppedRecord::new(3, None, &err)).unwrap();
        assert!(!json.contains("interface"));
        assert!(json.contains("\"reason\":\"column_count\""));
    }

    #[test]
    fn test_drop_summary_groups_by_reason() {
        let count = RecordError::ColumnCount {
            expected: 7,
            found: 6,
        };
        let dup = RecordError::DuplicateInterface("GE1/0/1".into());
        let report = AnalysisReport {
            records_seen: 5,
            dropped: vec![
                DroppedRecord::new(2, None, &count),
                DroppedRecord::new(3, Some("GE1/0/1"), &dup),
                DroppedRecord::new(4, None, &count),
            ],
            ..Default::default()
        };
        assert!(!report.is_clean());
        assert_eq!(
            report.drop_summary(),
            vec![
                (DropReason::ColumnCount, 2),
                (DropReason::DuplicateInterface, 1)
            ]
        );
    }
}
