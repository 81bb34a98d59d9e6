//! Whitespace-column table parsing for the interface summary.
//!
//! The summary is a header row followed by value rows, all split on runs of
//! whitespace. Each value row becomes one [`PortSummaryRecord`] by zipping
//! header tokens with value tokens by position. Rows whose token count does
//! not match the header are handled according to [`ColumnPolicy`].
//!
//! Device output usually opens with a legend describing the status codes;
//! when the legend's closing line is present, parsing starts after it.

use portwatch_core::PortSummaryRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::report::{DroppedRecord, RecordError};

/// Last line of the status-code legend printed before the summary table.
pub const LEGEND_TERMINATOR: &str = "InUti/OutUti: input utility/output utility";

/// How to treat a row whose token count differs from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Drop the row as malformed.
    #[default]
    Strict,
    /// Zip to the shorter of header and row; extra tokens and trailing
    /// headers are discarded.
    Truncate,
    /// Fill missing trailing values with empty strings; extra tokens are
    /// discarded.
    Pad,
}

/// Output of [`parse_summary_table`].
#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub records: Vec<PortSummaryRecord>,
    /// Rows rejected by the column policy.
    pub rejected: Vec<DroppedRecord>,
}

impl ParsedTable {
    /// Number of value rows consumed, rejected rows included.
    pub fn rows_seen(&self) -> usize {
        self.records.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows_seen() == 0
    }
}

/// Parses summary text into records.
///
/// Blank lines are skipped. Empty input yields an empty table.
///
/// # Examples
///
/// ```
/// use portwatch_parser::table::{ColumnPolicy, parse_summary_table};
///
/// let text = "\
/// Interface  PHY  Protocol  InUti  OutUti  inErrors  outErrors
/// GE1/0/1    up   up        12%    30%     0         0
/// GE1/0/2    up   up        --     --      0
/// ";
///
/// let table = parse_summary_table(text, ColumnPolicy::Strict);
/// assert_eq!(table.records.len(), 1);
/// assert_eq!(table.rejected.len(), 1);
/// assert_eq!(table.records[0].get("InUti"), Some("12%"));
/// ```
pub fn parse_summary_table(text: &str, policy: ColumnPolicy) -> ParsedTable {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .collect();

    let start = lines
        .iter()
        .position(|(_, line)| line.trim() == LEGEND_TERMINATOR)
        .map_or(0, |idx| idx + 1);

    let mut rows = lines[start..]
        .iter()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((header_line, header)) = rows.next() else {
        return ParsedTable::default();
    };
    let headers: Vec<String> = header.split_whitespace().map(String::from).collect();
    debug!(line = header_line, columns = headers.len(), "summary header");

    let mut table = ParsedTable {
        headers,
        ..Default::default()
    };

    for (line, row) in rows {
        let values: Vec<&str> = row.split_whitespace().collect();
        match build_record(*line, &table.headers, &values, policy) {
            Ok(record) => table.records.push(record),
            Err(err) => {
                let interface = values.first().copied();
                debug!(line, error = %err, "summary row rejected");
                table
                    .rejected
                    .push(DroppedRecord::new(*line, interface, &err));
            }
        }
    }

    table
}

fn build_record(
    line: usize,
    headers: &[String],
    values: &[&str],
    policy: ColumnPolicy,
) -> Result<PortSummaryRecord, RecordError> {
    if values.len() != headers.len() && policy == ColumnPolicy::Strict {
        return Err(RecordError::ColumnCount {
            expected: headers.len(),
            found: values.len(),
        });
    }

    let mut record = PortSummaryRecord::new(line);
    for (idx, header) in headers.iter().enumerate() {
        match values.get(idx) {
            Some(value) => {
                record.fields.insert(header.clone(), (*value).to_string());
            }
            None if policy == ColumnPolicy::Pad => {
                record.fields.insert(header.clone(), String::new());
            }
            None => break,
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DropReason;

    const HEADER: &str = "Interface PHY Protocol InUti OutUti inErrors outErrors";

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_summary_table("", ColumnPolicy::Strict).is_empty());
        assert!(parse_summary_table("\n  \n", ColumnPolicy::Strict).is_empty());
    }

    #[test]
    fn test_header_only_yields_no_records() {
        let table = parse_summary_table(HEADER, ColumnPolicy::Strict);
        assert_eq!(table.headers.len(), 7);
        assert!(table.records.is_empty());
    }

    #[test]
    fn test_skips_legend_preamble() {
        let text = format!(
            "PHY: Physical\n*down: administratively down\n(s): spoofing\n{LEGEND_TERMINATOR}\n{HEADER}\nGE1/0/1 up up 1% 1% 0 0\n"
        );
        let table = parse_summary_table(&text, ColumnPolicy::Strict);
        assert_eq!(table.headers[0], "Interface");
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].line, 6);
        assert_eq!(table.records[0].interface(), Some("GE1/0/1"));
    }

    #[test]
    fn test_blank_lines_between_rows_are_skipped() {
        let text = format!("\n{HEADER}\n\nGE1/0/1 up up 1% 1% 0 0\n\nGE1/0/2 down down 0% 0% 0 0\n");
        let table = parse_summary_table(&text, ColumnPolicy::Strict);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.rows_seen(), 2);
    }

    #[test]
    fn test_strict_rejects_short_and_long_rows() {
        let text = format!("{HEADER}\nGE1/0/1 up up 1% 1% 0\nGE1/0/2 up up 1% 1% 0 0 extra\n");
        let table = parse_summary_table(&text, ColumnPolicy::Strict);
        assert!(table.records.is_empty());
        assert_eq!(table.rejected.len(), 2);
        assert_eq!(table.rejected[0].reason, DropReason::ColumnCount);
        assert_eq!(table.rejected[0].interface.as_deref(), Some("GE1/0/1"));
        assert_eq!(table.rejected[0].detail, "expected 7 columns, found 6");
    }

    #[test]
    fn test_truncate_drops_trailing_headers() {
        let text = format!("{HEADER}\nGE1/0/1 up up 1% 1% 0\n");
        let table = parse_summary_table(&text, ColumnPolicy::Truncate);
        let record = &table.records[0];
        assert_eq!(record.get("inErrors"), Some("0"));
        assert_eq!(record.get("outErrors"), None);
    }

    #[test]
    fn test_pad_fills_missing_values() {
        let text = format!("{HEADER}\nGE1/0/1 up up 1% 1% 0\n");
        let table = parse_summary_table(&text, ColumnPolicy::Pad);
        assert_eq!(table.records[0].get("outErrors"), Some(""));
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = format!("{HEADER}\r\nGE1/0/1 up up 1% 1% 0 0\r\n");
        let table = parse_summary_table(&text, ColumnPolicy::Strict);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].get("outErrors"), Some("0"));
    }
}
