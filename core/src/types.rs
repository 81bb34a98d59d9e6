//! Record and verdict types for switch port health analysis.
//!
//! This module defines the data model shared by the parsers, the analyzer,
//! and the presentation layers. All types serialize with [`serde`] so a
//! published snapshot can be rendered as JSON or YAML without conversion.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Column names of the interface summary table consumed by the analyzer.
pub mod columns {
    /// Interface name, the unique key of a summary record.
    pub const INTERFACE: &str = "Interface";
    /// Physical-layer status token.
    pub const PHY: &str = "PHY";
    /// Link-layer protocol status token.
    pub const PROTOCOL: &str = "Protocol";
    /// Inbound utilization (`NN%` or `--`).
    pub const IN_UTI: &str = "InUti";
    /// Outbound utilization (`NN%` or `--`).
    pub const OUT_UTI: &str = "OutUti";
    /// Received error packet count.
    pub const IN_ERRORS: &str = "inErrors";
    /// Sent error packet count.
    pub const OUT_ERRORS: &str = "outErrors";

    /// Every column the analyzer requires, in table order.
    pub const REQUIRED: &[&str] = &[
        INTERFACE, PHY, PROTOCOL, IN_UTI, OUT_UTI, IN_ERRORS, OUT_ERRORS,
    ];
}

/// One row of the interface summary table.
///
/// Maps column-header name to the raw token found under it. `line` is the
/// 1-based line number of the row in the source text and is used only for
/// diagnostics.
///
/// # Examples
///
/// ```
/// use portwatch_core::PortSummaryRecord;
///
/// let record = PortSummaryRecord::new(3)
///     .with_field("Interface", "GE1/0/1")
///     .with_field("PHY", "up");
/// assert_eq!(record.interface(), Some("GE1/0/1"));
/// assert_eq!(record.get("PHY"), Some("up"));
/// assert_eq!(record.get("Protocol"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortSummaryRecord {
    /// Source line number (1-based).
    pub line: usize,
    /// Column header to raw value.
    pub fields: BTreeMap<String, String>,
}

impl PortSummaryRecord {
    /// Creates an empty record for the given source line.
    pub fn new(line: usize) -> Self {
        Self {
            line,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field, replacing any previous value under the same column.
    pub fn with_field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    /// Returns the raw value under `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Returns the interface name, if the record has one.
    pub fn interface(&self) -> Option<&str> {
        self.get(columns::INTERFACE)
    }
}

/// Health classification of one port.
///
/// Serializes (and displays) as `GOOD`, `ISSUE`, or `INACTIVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortStatus {
    /// No problem diagnosed.
    Good,
    /// At least one problem diagnosed.
    Issue,
    /// Traffic is too low in at least one direction.
    Inactive,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "GOOD"),
            Self::Issue => write!(f, "ISSUE"),
            Self::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// Diagnosed health of one port.
///
/// `issues` is empty exactly when `status` is [`PortStatus::Good`]; use the
/// constructors to keep that invariant.
///
/// # Examples
///
/// ```
/// use portwatch_core::{PortStatus, PortVerdict};
///
/// let ok = PortVerdict::from_issues("GE1/0/1", Vec::new(), vec![String::new()]);
/// assert_eq!(ok.status, PortStatus::Good);
///
/// let bad = PortVerdict::from_issues(
///     "GE1/0/2",
///     vec!["Physical layer failure.".to_string()],
///     vec![String::new()],
/// );
/// assert_eq!(bad.status, PortStatus::Issue);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortVerdict {
    pub port: String,
    pub status: PortStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
    /// Lines of the port's detail block with separator hyphens removed.
    pub detailed: Vec<String>,
}

impl PortVerdict {
    /// Builds a verdict from accumulated issues: GOOD when empty, ISSUE otherwise.
    pub fn from_issues(
        port: impl Into<String>,
        issues: Vec<String>,
        detailed: Vec<String>,
    ) -> Self {
        let status = if issues.is_empty() {
            PortStatus::Good
        } else {
            PortStatus::Issue
        };
        Self {
            port: port.into(),
            status,
            issues,
            detailed,
        }
    }

    /// Builds an INACTIVE verdict carrying a single reason.
    pub fn inactive(
        port: impl Into<String>,
        reason: impl Into<String>,
        detailed: Vec<String>,
    ) -> Self {
        Self {
            port: port.into(),
            status: PortStatus::Inactive,
            issues: vec![reason.into()],
            detailed,
        }
    }
}

/// Count summary of one analysis pass.
///
/// `total` is the number of summary records consumed, including records that
/// were dropped as malformed, so it is not necessarily the sum of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortCounts {
    pub good: usize,
    pub issue: usize,
    pub inactive: usize,
    pub total: usize,
}

impl PortCounts {
    /// Number of records that received a verdict.
    pub fn classified(&self) -> usize {
        self.good + self.issue + self.inactive
    }

    /// Four-element summary in `[good, issue, inactive, total]` order.
    pub fn as_array(&self) -> [usize; 4] {
        [self.good, self.issue, self.inactive, self.total]
    }
}

/// Partitioned verdicts for one snapshot of summary records.
///
/// Within each partition verdicts keep the order of the source records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub good: Vec<PortVerdict>,
    pub issue: Vec<PortVerdict>,
    pub inactive: Vec<PortVerdict>,
    /// Number of summary records consumed.
    pub total: usize,
}

impl AnalysisResult {
    /// Appends a verdict to the partition matching its status.
    pub fn push(&mut self, verdict: PortVerdict) {
        match verdict.status {
            PortStatus::Good => self.good.push(verdict),
            PortStatus::Issue => self.issue.push(verdict),
            PortStatus::Inactive => self.inactive.push(verdict),
        }
    }

    /// Returns the count summary.
    pub fn counts(&self) -> PortCounts {
        PortCounts {
            good: self.good.len(),
            issue: self.issue.len(),
            inactive: self.inactive.len(),
            total: self.total,
        }
    }

    /// Iterates all verdicts: good first, then issue, then inactive.
    pub fn all_ports(&self) -> impl Iterator<Item = &PortVerdict> {
        self.good
            .iter()
            .chain(self.issue.iter())
            .chain(self.inactive.iter())
    }

    /// Looks up a verdict by port name.
    pub fn find(&self, port: &str) -> Option<&PortVerdict> {
        self.all_ports().find(|v| v.port == port)
    }

    /// Returns what a reader should be told about this result.
    pub fn data_state(&self) -> DataState {
        let counts = self.counts();
        if counts.classified() == 0 {
            DataState::NoData
        } else if counts.issue == 0 && counts.inactive == 0 {
            DataState::AllGood
        } else {
            DataState::IssuesFound
        }
    }
}

/// User-facing state of an analysis result.
///
/// An empty result (or one where every record was dropped) is
/// [`NoData`](Self::NoData), which is distinct from [`AllGood`](Self::AllGood).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataState {
    NoData,
    AllGood,
    IssuesFound,
}

impl fmt::Display for DataState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "no data yet"),
            Self::AllGood => write!(f, "all good"),
            Self::IssuesFound => write!(f, "issues found"),
        }
    }
}

/// Labeled sub-block of a transceiver section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransceiverSection {
    Common,
    Manufacture,
    Alarm,
}

impl TransceiverSection {
    /// All sections in display order.
    pub const ALL: [TransceiverSection; 3] = [Self::Common, Self::Manufacture, Self::Alarm];

    /// Header line that opens this sub-block in device output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Common => "Common information:",
            Self::Manufacture => "Manufacture information:",
            Self::Alarm => "Alarm information:",
        }
    }
}

/// One `key : value` line of a transceiver sub-block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransceiverAttribute {
    pub section: TransceiverSection,
    pub key: String,
    pub value: String,
}

/// Transceiver diagnostics for one interface.
///
/// `common`, `manufacture`, and `alarm` are single whitespace-normalized
/// lines; a missing sub-block is an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransceiverRecord {
    pub interface: String,
    pub common: String,
    pub manufacture: String,
    pub alarm: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<TransceiverAttribute>,
}

impl TransceiverRecord {
    /// Returns the normalized text of one sub-block.
    pub fn section(&self, section: TransceiverSection) -> &str {
        match section {
            TransceiverSection::Common => &self.common,
            TransceiverSection::Manufacture => &self.manufacture,
            TransceiverSection::Alarm => &self.alarm,
        }
    }

    /// Returns `true` when the alarm sub-block has content.
    pub fn has_alarms(&self) -> bool {
        !self.alarm.is_empty()
    }

    /// Looks up an attribute value by section and key.
    pub fn attribute(&self, section: TransceiverSection, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.section == section && a.key == key)
            .map(|a| a.value.as_str())
    }
}
