//! Core record and verdict types for switch port health analysis.
//!
//! This crate defines the data model shared by the portwatch parsers, the
//! health analyzer, and the presentation layers:
//!
//! - [`PortSummaryRecord`]: one row of the interface summary table.
//! - [`PortVerdict`]: the diagnosed health of one port with its issue list.
//! - [`AnalysisResult`]: verdicts partitioned into good, issue, and inactive.
//! - [`TransceiverRecord`]: normalized transceiver diagnostics for one port.
//!
//! Validation ([`validate_record`]) catches rows the analyzer cannot
//! classify: missing columns and blank interface names.
//!
//! # Example
//!
//! ```
//! use portwatch_core::*;
//!
//! let mut result = AnalysisResult { total: 2, ..Default::default() };
//! result.push(PortVerdict::from_issues("GE1/0/1", Vec::new(), vec![String::new()]));
//! result.push(PortVerdict::from_issues(
//!     "GE1/0/2",
//!     vec!["Link layer protocol failure.".to_string()],
//!     vec![String::new()],
//! ));
//!
//! assert_eq!(result.counts().as_array(), [1, 1, 0, 2]);
//! assert_eq!(result.data_state(), DataState::IssuesFound);
//! ```

mod types;
mod validate;

pub use types::*;
pub use validate::{ValidationError, validate_record};
