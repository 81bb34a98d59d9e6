//! Summary record validation.
//!
//! Checks the structural invariants the analyzer relies on: every required
//! column is present and the interface name is non-empty. Uniqueness across
//! a snapshot depends on which rows survive diagnosis, so the analyzer
//! enforces it.
//!
//! # Examples
//!
//! ```
//! use portwatch_core::*;
//!
//! let record = PortSummaryRecord::new(2)
//!     .with_field("Interface", "GE1/0/1")
//!     .with_field("PHY", "up");
//! let errors = validate_record(&record);
//! assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingColumn { .. })));
//! ```

use thiserror::Error;

use crate::{PortSummaryRecord, columns};

/// Summary record validation errors.
///
/// Each variant names the source line of the offending record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A column the analyzer needs has no value in this row.
    #[error("line {line}: missing required column {column}")]
    MissingColumn { line: usize, column: String },
    /// The interface column is present but blank.
    #[error("line {line}: interface name cannot be empty")]
    EmptyInterface { line: usize },
}

impl ValidationError {
    /// Source line of the record that failed validation.
    pub fn line(&self) -> usize {
        match self {
            Self::MissingColumn { line, .. } | Self::EmptyInterface { line } => *line,
        }
    }
}

/// Validates a single record in isolation.
///
/// Reports every missing required column, then an empty interface name.
pub fn validate_record(record: &PortSummaryRecord) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for column in columns::REQUIRED {
        if record.get(column).is_none() {
            errors.push(ValidationError::MissingColumn {
                line: record.line,
                column: (*column).to_string(),
            });
        }
    }

    if record.interface().is_some_and(|name| name.trim().is_empty()) {
        errors.push(ValidationError::EmptyInterface { line: record.line });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(line: usize, interface: &str) -> PortSummaryRecord {
        PortSummaryRecord::new(line)
            .with_field("Interface", interface)
            .with_field("PHY", "up")
            .with_field("Protocol", "up")
            .with_field("InUti", "10%")
            .with_field("OutUti", "10%")
            .with_field("inErrors", "0")
            .with_field("outErrors", "0")
    }

    #[test]
    fn test_validate_record_accepts_complete_row() {
        assert!(validate_record(&complete(2, "GE1/0/1")).is_empty());
    }

    #[test]
    fn test_validate_record_reports_each_missing_column() {
        let record = PortSummaryRecord::new(5)
            .with_field("Interface", "GE1/0/1")
            .with_field("PHY", "up");
        let missing: Vec<String> = validate_record(&record)
            .into_iter()
            .filter_map(|e| match e {
                ValidationError::MissingColumn { column, .. } => Some(column),
                _ => None,
            })
            .collect();
        assert_eq!(
            missing,
            vec!["Protocol", "InUti", "OutUti", "inErrors", "outErrors"]
        );
    }

    #[test]
    fn test_validate_record_rejects_blank_interface() {
        let errors = validate_record(&complete(4, "  "));
        assert_eq!(errors, vec![ValidationError::EmptyInterface { line: 4 }]);
        assert_eq!(errors[0].line(), 4);
    }
}
