//! Switch CLI output parsing and port health classification.
//!
//! This crate turns the raw text of three device commands into structured
//! data:
//!
//! - `display interface brief` is a whitespace-column summary table, parsed
//!   by [`table::parse_summary_table`].
//! - `display interface` is a sequence of per-interface detail blocks,
//!   looked up with [`detail::DetailIndex`] or
//!   [`detail::extract_detail_block`].
//! - `display transceiver` is parsed by
//!   [`transceiver::parse_transceiver_dump`].
//!
//! [`analyze::PortAnalyzer`] combines the summary and detail text into GOOD,
//! ISSUE, and INACTIVE verdicts. Records that cannot be diagnosed are
//! dropped and listed in an [`report::AnalysisReport`] instead of failing
//! the whole pass.
//!
//! # Main entry points
//!
//! - [`analyze_text`]: analyze summary and detail text with default settings.
//! - [`analyze_text_with`]: same, with explicit thresholds and column policy.
//! - [`parse_transceivers`]: parse a transceiver dump.
//!
//! # Example
//!
//! ```
//! use portwatch_parser::analyze_text;
//!
//! let summary = "\
//! Interface   PHY   Protocol  InUti  OutUti  inErrors  outErrors
//! GE1/0/1     up    up        45%    40%     0         0
//! GE1/0/2     down  down      --     --      0         0
//! ";
//!
//! let run = analyze_text(summary, "");
//! assert_eq!(run.result.good[0].port, "GE1/0/1");
//! assert_eq!(run.result.issue[0].issues.len(), 2);
//! assert_eq!(run.result.counts().as_array(), [1, 1, 0, 2]);
//! ```

pub mod analyze;
pub mod detail;
pub mod output;
pub mod report;
pub mod rules;
pub mod snapshot;
pub mod table;
pub mod transceiver;
pub mod util;

use portwatch_core::TransceiverRecord;

pub use analyze::{AnalyzerConfig, PortAnalyzer};
pub use report::{AnalysisReport, AnalysisRun, DropReason, DroppedRecord, RecordError};
pub use rules::HealthThresholds;
pub use table::ColumnPolicy;

/// Analyzes summary and detail text with default thresholds and the strict
/// column policy.
pub fn analyze_text(summary: &str, detail: &str) -> AnalysisRun {
    analyze_text_with(summary, detail, &AnalyzerConfig::default())
}

/// Analyzes summary and detail text with explicit settings.
pub fn analyze_text_with(summary: &str, detail: &str, config: &AnalyzerConfig) -> AnalysisRun {
    analyze::analyze_dumps(summary, detail, config)
}

/// Parses a transceiver dump into per-interface records.
pub fn parse_transceivers(dump: &str) -> Vec<TransceiverRecord> {
    transceiver::parse_transceiver_dump(dump)
}
