//! Port health analysis.
//!
//! Each summary record is diagnosed in a fixed order: PHY status, Protocol
//! status, utilization, then error counters. All four categories append to
//! one issue list. Classification happens afterwards:
//!
//! 1. Both utilization directions measured and either below the low
//!    threshold: INACTIVE, with [`INACTIVE_REASON`] as the only issue.
//! 2. Otherwise any accumulated issue: ISSUE.
//! 3. Otherwise GOOD.
//!
//! Records that cannot be diagnosed (missing columns, bad numbers, duplicate
//! names) are dropped and reported; their siblings are still analyzed.

use std::collections::HashSet;

use portwatch_core::{
    AnalysisResult, PortSummaryRecord, PortVerdict, ValidationError, columns, validate_record,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::detail::DetailIndex;
use crate::report::{AnalysisReport, AnalysisRun, DroppedRecord, RecordError};
use crate::rules::{
    Direction, HealthThresholds, INACTIVE_REASON, PHY_RULES, PROTOCOL_RULES, first_match,
    parse_error_count, parse_utilization,
};
use crate::table::{ColumnPolicy, ParsedTable};
use crate::util::strip_separator_hyphens;

/// Settings for one analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub thresholds: HealthThresholds,
    pub column_policy: ColumnPolicy,
}

/// Issues and parsed measurements for one record, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub issues: Vec<String>,
    pub inbound: Option<f64>,
    pub outbound: Option<f64>,
}

/// Runs the four rule categories against one record.
///
/// # Errors
///
/// Returns a [`RecordError`] when a required column is absent or a numeric
/// field cannot be parsed.
pub fn diagnose(
    record: &PortSummaryRecord,
    thresholds: &HealthThresholds,
) -> Result<Diagnosis, RecordError> {
    let field = |column: &str| {
        record
            .get(column)
            .ok_or_else(|| RecordError::MissingColumn(column.to_string()))
    };

    let mut issues = Vec::new();

    if let Some(rule) = first_match(PHY_RULES, field(columns::PHY)?) {
        issues.push(rule.message.to_string());
    }
    if let Some(rule) = first_match(PROTOCOL_RULES, field(columns::PROTOCOL)?) {
        issues.push(rule.message.to_string());
    }

    let inbound = parse_utilization(columns::IN_UTI, field(columns::IN_UTI)?)?;
    let outbound = parse_utilization(columns::OUT_UTI, field(columns::OUT_UTI)?)?;
    for (direction, value) in [(Direction::Inbound, inbound), (Direction::Outbound, outbound)] {
        if let Some(issue) = value.and_then(|v| thresholds.utilization_issue(direction, v)) {
            issues.push(issue);
        }
    }

    let in_errors = parse_error_count(columns::IN_ERRORS, field(columns::IN_ERRORS)?)?;
    let out_errors = parse_error_count(columns::OUT_ERRORS, field(columns::OUT_ERRORS)?)?;
    issues.extend(thresholds.error_issues(in_errors, out_errors));

    Ok(Diagnosis {
        issues,
        inbound,
        outbound,
    })
}

/// Turns a diagnosis into a verdict.
pub fn classify(
    port: &str,
    diagnosis: Diagnosis,
    thresholds: &HealthThresholds,
    detailed: Vec<String>,
) -> PortVerdict {
    if thresholds.is_inactive(diagnosis.inbound, diagnosis.outbound) {
        PortVerdict::inactive(port, INACTIVE_REASON, detailed)
    } else {
        PortVerdict::from_issues(port, diagnosis.issues, detailed)
    }
}

/// Analyzes summary records against a detail dump.
pub struct PortAnalyzer<'d> {
    thresholds: HealthThresholds,
    detail_dump: &'d str,
}

impl<'d> PortAnalyzer<'d> {
    pub fn new(detail_dump: &'d str, thresholds: HealthThresholds) -> Self {
        Self {
            thresholds,
            detail_dump,
        }
    }

    /// Analyzes a parsed table, carrying its rejected rows into the report.
    pub fn analyze_table(&self, table: ParsedTable) -> AnalysisRun {
        let rejected = table.rejected;
        let mut run = self.analyze_records(&table.records);
        run.result.total += rejected.len();
        run.report.records_seen += rejected.len();
        // Keep dropped records in source line order.
        run.report.dropped.extend(rejected);
        run.report.dropped.sort_by_key(|d| d.line);
        run
    }

    /// Analyzes records in order; every record lands in exactly one
    /// partition or in the dropped list.
    ///
    /// The detail dump is indexed once per call, for the interfaces named by
    /// `records`.
    pub fn analyze_records(&self, records: &[PortSummaryRecord]) -> AnalysisRun {
        let details = DetailIndex::build(
            self.detail_dump,
            records.iter().filter_map(PortSummaryRecord::interface),
        );
        let mut result = AnalysisResult {
            total: records.len(),
            ..Default::default()
        };
        let mut report = AnalysisReport {
            records_seen: records.len(),
            ..Default::default()
        };
        let mut seen: HashSet<&str> = HashSet::new();

        for record in records {
            match self.analyze_one(record, &details, &mut seen) {
                Ok(verdict) => {
                    if !details.contains(&verdict.port) {
                        report.missing_detail.push(verdict.port.clone());
                    }
                    debug!(
                        port = %verdict.port,
                        status = %verdict.status,
                        issues = verdict.issues.len(),
                        "port classified"
                    );
                    result.push(verdict);
                }
                Err(err) => {
                    warn!(line = record.line, error = %err, "dropping summary record");
                    report
                        .dropped
                        .push(DroppedRecord::new(record.line, record.interface(), &err));
                }
            }
        }

        if !records.is_empty() && self.detail_dump.trim().is_empty() {
            report
                .warnings
                .push("Detail dump is empty; verdicts carry no detail lines".to_string());
        }

        AnalysisRun { result, report }
    }

    fn analyze_one<'r>(
        &self,
        record: &'r PortSummaryRecord,
        details: &DetailIndex,
        seen: &mut HashSet<&'r str>,
    ) -> Result<PortVerdict, RecordError> {
        if let Some(error) = validate_record(record).into_iter().next() {
            return Err(match error {
                ValidationError::MissingColumn { column, .. } => RecordError::MissingColumn(column),
                ValidationError::EmptyInterface { .. } => RecordError::EmptyInterface,
            });
        }
        let port = record
            .interface()
            .ok_or_else(|| RecordError::MissingColumn(columns::INTERFACE.to_string()))?;

        let diagnosis = diagnose(record, &self.thresholds)?;

        if !seen.insert(port) {
            return Err(RecordError::DuplicateInterface(port.to_string()));
        }

        let detailed = strip_separator_hyphens(details.get(port));
        Ok(classify(port, diagnosis, &self.thresholds, detailed))
    }
}

/// Parses and analyzes raw summary and detail text.
pub fn analyze_dumps(summary: &str, detail: &str, config: &AnalyzerConfig) -> AnalysisRun {
    let table = crate::table::parse_summary_table(summary, config.column_policy);
    PortAnalyzer::new(detail, config.thresholds).analyze_table(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portwatch_core::PortStatus;

    use crate::report::DropReason;

    fn record(line: usize, fields: [(&str, &str); 7]) -> PortSummaryRecord {
        fields
            .into_iter()
            .fold(PortSummaryRecord::new(line), |r, (k, v)| r.with_field(k, v))
    }

    fn port(
        name: &str,
        phy: &str,
        proto: &str,
        inu: &str,
        outu: &str,
        ine: &str,
        oute: &str,
    ) -> PortSummaryRecord {
        record(
            2,
            [
                ("Interface", name),
                ("PHY", phy),
                ("Protocol", proto),
                ("InUti", inu),
                ("OutUti", outu),
                ("inErrors", ine),
                ("outErrors", oute),
            ],
        )
    }

    fn analyze(records: &[PortSummaryRecord]) -> AnalysisRun {
        PortAnalyzer::new("", HealthThresholds::default()).analyze_records(records)
    }

    #[test]
    fn test_nominal_port_is_good() {
        let run = analyze(&[port("GE1/0/1", "up", "up", "40%", "50%", "0", "0")]);
        assert_eq!(run.result.good.len(), 1);
        assert!(run.result.good[0].issues.is_empty());
        assert_eq!(run.result.good[0].detailed, vec![String::new()]);
    }

    #[test]
    fn test_phy_and_protocol_down_report_one_issue_each() {
        let run = analyze(&[port("GE1/0/1", "down", "down", "--", "--", "0", "0")]);
        let verdict = &run.result.issue[0];
        assert_eq!(verdict.status, PortStatus::Issue);
        assert_eq!(
            verdict.issues,
            vec!["Physical layer failure.", "Link layer protocol failure."]
        );
    }

    #[test]
    fn test_low_inbound_overrides_to_inactive() {
        let run = analyze(&[port("GE1/0/1", "up", "up", "2%", "50%", "0", "0")]);
        assert!(run.result.good.is_empty());
        assert!(run.result.issue.is_empty());
        assert_eq!(run.result.inactive[0].issues, vec![INACTIVE_REASON]);
    }

    #[test]
    fn test_inactive_discards_other_issues() {
        let run = analyze(&[port("GE1/0/1", "down", "down", "0%", "0%", "1500", "0")]);
        assert_eq!(run.result.inactive.len(), 1);
        assert_eq!(run.result.inactive[0].issues, vec![INACTIVE_REASON]);
    }

    #[test]
    fn test_high_error_count_produces_two_issues() {
        let run = analyze(&[port("GE1/0/1", "up", "up", "40%", "40%", "1500", "0")]);
        assert_eq!(
            run.result.issue[0].issues,
            vec!["Received error packets: 1500", "High rate of inbound errors."]
        );
    }

    #[test]
    fn test_sentinel_utilization_never_inactive() {
        let run = analyze(&[port("GE1/0/1", "up", "up", "--", "1%", "0", "0")]);
        let verdict = &run.result.issue[0];
        assert_eq!(
            verdict.issues,
            vec!["Low outbound utilization (may indicate inactivity)."]
        );
        let run = analyze(&[port("Vlanif1", "up", "up", "--", "--", "0", "0")]);
        assert_eq!(run.result.good.len(), 1);
    }

    #[test]
    fn test_high_utilization_both_directions() {
        let run = analyze(&[port("GE1/0/1", "up", "up", "95%", "90%", "0", "0")]);
        assert_eq!(
            run.result.issue[0].issues,
            vec![
                "High inbound utilization (possible congestion).",
                "High outbound utilization (possible congestion).",
            ]
        );
    }

    #[test]
    fn test_malformed_record_is_dropped_siblings_kept() {
        let run = analyze(&[
            port("GE1/0/1", "up", "up", "40%", "40%", "abc", "0"),
            port("GE1/0/2", "up", "up", "40%", "40%", "0", "0"),
        ]);
        assert_eq!(run.result.good.len(), 1);
        assert_eq!(run.result.total, 2);
        assert_eq!(run.report.dropped.len(), 1);
        assert_eq!(run.report.dropped[0].reason, DropReason::InvalidErrorCount);
        assert_eq!(run.report.dropped[0].interface.as_deref(), Some("GE1/0/1"));
    }

    #[test]
    fn test_missing_column_is_dropped() {
        let partial = PortSummaryRecord::new(4)
            .with_field("Interface", "GE1/0/1")
            .with_field("PHY", "up");
        let run = analyze(&[partial]);
        assert_eq!(run.result.counts().classified(), 0);
        assert_eq!(run.report.dropped[0].reason, DropReason::MissingColumn);
        assert_eq!(run.report.dropped[0].line, 4);
    }

    #[test]
    fn test_duplicate_interface_second_is_dropped() {
        let run = analyze(&[
            port("GE1/0/1", "up", "up", "40%", "40%", "0", "0"),
            port("GE1/0/1", "down", "down", "40%", "40%", "0", "0"),
        ]);
        assert_eq!(run.result.good.len(), 1);
        assert!(run.result.issue.is_empty());
        assert_eq!(run.report.dropped[0].reason, DropReason::DuplicateInterface);
    }

    #[test]
    fn test_detail_lines_are_attached_and_stripped() {
        let detail = "GE1/0/1 current state : UP\nLine protocol current state : UP\n--------\nLast up: 2024-01-02\n";
        let analyzer = PortAnalyzer::new(detail, HealthThresholds::default());
        let run = analyzer.analyze_records(&[port("GE1/0/1", "up", "up", "40%", "40%", "0", "0")]);
        assert_eq!(
            run.result.good[0].detailed,
            vec!["Line protocol current state : UP", "", "Last up: 20240102"]
        );
        assert!(run.report.missing_detail.is_empty());
        assert!(run.report.warnings.is_empty());
    }

    #[test]
    fn test_detail_found_after_banner_and_without_blank_separator() {
        let detail = "\
Info: output follows
GE1/0/1 current state : UP
Description: a
GE1/0/2 current state : DOWN
Description: b
";
        let analyzer = PortAnalyzer::new(detail, HealthThresholds::default());
        let run = analyzer.analyze_records(&[
            port("GE1/0/1", "up", "up", "40%", "40%", "0", "0"),
            port("GE1/0/2", "up", "up", "40%", "40%", "0", "0"),
        ]);
        assert!(run.report.missing_detail.is_empty());
        assert_eq!(run.result.good[1].detailed, vec!["Description: b"]);
        assert_eq!(
            run.result.good[0].detailed,
            vec![
                "Description: a",
                "GE1/0/2 current state : DOWN",
                "Description: b"
            ]
        );
    }

    #[test]
    fn test_missing_detail_is_reported_not_fatal() {
        let run = analyze(&[port("GE1/0/1", "up", "up", "40%", "40%", "0", "0")]);
        assert_eq!(run.report.missing_detail, vec!["GE1/0/1"]);
        assert_eq!(run.report.warnings.len(), 1);
    }

    #[test]
    fn test_partitions_keep_source_order() {
        let run = analyze(&[
            port("a", "down", "up", "40%", "40%", "0", "0"),
            port("b", "up", "up", "40%", "40%", "0", "0"),
            port("c", "up", "down", "40%", "40%", "0", "0"),
            port("d", "up", "up", "40%", "40%", "0", "0"),
        ]);
        let issue: Vec<&str> = run.result.issue.iter().map(|v| v.port.as_str()).collect();
        let good: Vec<&str> = run.result.good.iter().map(|v| v.port.as_str()).collect();
        assert_eq!(issue, vec!["a", "c"]);
        assert_eq!(good, vec!["b", "d"]);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = HealthThresholds {
            high_utilization: 50.0,
            low_utilization: 1.0,
            high_error_count: 10,
        };
        let analyzer = PortAnalyzer::new("", thresholds);
        let run = analyzer.analyze_records(&[port("GE1/0/1", "up", "up", "2%", "60%", "11", "0")]);
        assert_eq!(
            run.result.issue[0].issues,
            vec![
                "High outbound utilization (possible congestion).",
                "Received error packets: 11",
                "High rate of inbound errors.",
            ]
        );
    }
}
