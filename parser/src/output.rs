//! Output formatting for analysis results and transceiver records.

use portwatch_core::{
    AnalysisResult, DataState, PortVerdict, TransceiverRecord, TransceiverSection,
};

use crate::report::{AnalysisReport, AnalysisRun};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    #[default]
    Table,
}

/// Formats partitioned verdicts in the requested output format.
pub fn format_analysis(result: &AnalysisResult, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(result).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(analysis_to_markdown(result)),
        OutputFormat::Table => Ok(analysis_to_table(result)),
    }
}

/// Formats verdicts together with the analysis report.
pub fn format_run(run: &AnalysisRun, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(run)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(run).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => {
            let mut out = analysis_to_markdown(&run.result);
            out.push_str(&report_to_markdown(&run.report));
            Ok(out)
        }
        OutputFormat::Table => {
            let mut out = analysis_to_table(&run.result);
            out.push_str(&report_to_table(&run.report));
            Ok(out)
        }
    }
}

/// Formats transceiver records in the requested output format.
pub fn format_transceivers(
    records: &[TransceiverRecord],
    format: OutputFormat,
) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(records)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(records).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(transceivers_to_markdown(records)),
        OutputFormat::Table => Ok(transceivers_to_table(records)),
    }
}

/// One-line count summary, e.g. `good=3 issue=1 inactive=0 total=5`.
pub fn summary_line(result: &AnalysisResult) -> String {
    let counts = result.counts();
    format!(
        "good={} issue={} inactive={} total={} ({})",
        counts.good,
        counts.issue,
        counts.inactive,
        counts.total,
        result.data_state()
    )
}

fn issues_cell(verdict: &PortVerdict) -> String {
    verdict.issues.join("; ")
}

fn analysis_to_markdown(result: &AnalysisResult) -> String {
    let mut out = String::from("# Port Health\n\n");

    if result.data_state() == DataState::NoData {
        out.push_str(&format!("{}\n", DataState::NoData));
        return out;
    }

    let counts = result.counts();
    out.push_str(&format!("- **Good:** {}\n", counts.good));
    out.push_str(&format!("- **Issue:** {}\n", counts.issue));
    out.push_str(&format!("- **Inactive:** {}\n", counts.inactive));
    out.push_str(&format!("- **Total:** {}\n\n", counts.total));

    out.push_str("| Port | Status | Issues |\n");
    out.push_str("|------|--------|--------|\n");
    for verdict in result.all_ports() {
        out.push_str(&format!(
            "| `{}` | {} | {} |\n",
            verdict.port,
            verdict.status,
            issues_cell(verdict)
        ));
    }
    out.push('\n');

    out
}

fn analysis_to_table(result: &AnalysisResult) -> String {
    if result.data_state() == DataState::NoData {
        return format!("{}\n", DataState::NoData);
    }

    let mut out = String::new();
    let counts = result.counts();
    out.push_str(&format!(
        "Good: {}  Issue: {}  Inactive: {}  Total: {}\n",
        counts.good, counts.issue, counts.inactive, counts.total
    ));

    let max_name = result
        .all_ports()
        .map(|v| v.port.len())
        .max()
        .unwrap_or(4)
        .max(4);

    out.push_str(&format!("\n{:<width$}  {:<8}  ISSUES\n", "PORT", "STATUS", width = max_name));
    for verdict in result.all_ports() {
        out.push_str(&format!(
            "{:<width$}  {:<8}  {}\n",
            verdict.port,
            verdict.status.to_string(),
            issues_cell(verdict),
            width = max_name
        ));
    }

    out
}

fn report_to_markdown(report: &AnalysisReport) -> String {
    let mut out = String::new();

    if !report.dropped.is_empty() {
        out.push_str("## Dropped Records\n\n");
        out.push_str("| Line | Interface | Reason | Detail |\n");
        out.push_str("|------|-----------|--------|--------|\n");
        for dropped in &report.dropped {
            let interface = dropped.interface.as_deref().unwrap_or("");
            out.push_str(&format!(
                "| {} | {interface} | {} | {} |\n",
                dropped.line, dropped.reason, dropped.detail
            ));
        }
        out.push('\n');
    }

    if !report.missing_detail.is_empty() {
        out.push_str("## Missing Detail\n\n");
        for port in &report.missing_detail {
            out.push_str(&format!("- `{port}`\n"));
        }
        out.push('\n');
    }

    if !report.warnings.is_empty() {
        out.push_str("## Warnings\n\n");
        for w in &report.warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}

fn report_to_table(report: &AnalysisReport) -> String {
    let mut out = String::new();
    for dropped in &report.dropped {
        out.push_str(&format!(
            "dropped line {:<4} {:<20} [{}] {}\n",
            dropped.line,
            dropped.interface.as_deref().unwrap_or("-"),
            dropped.reason,
            dropped.detail
        ));
    }
    if !report.missing_detail.is_empty() {
        out.push_str(&format!(
            "no detail block: {}\n",
            report.missing_detail.join(", ")
        ));
    }
    for w in &report.warnings {
        out.push_str(&format!("warning: {w}\n"));
    }
    out
}

fn transceivers_to_markdown(records: &[TransceiverRecord]) -> String {
    let mut out = String::from("# Transceivers\n\n");

    if records.is_empty() {
        out.push_str(&format!("{}\n", DataState::NoData));
        return out;
    }

    for record in records {
        out.push_str(&format!("## {}\n\n", record.interface));
        if record.attributes.is_empty() {
            for section in [TransceiverSection::Common, TransceiverSection::Manufacture] {
                let text = record.section(section);
                out.push_str(&format!("- **{}** {text}\n", section.label()));
            }
        } else {
            out.push_str("| Section | Key | Value |\n");
            out.push_str("|---------|-----|-------|\n");
            for attr in &record.attributes {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    attr.section.label().trim_end_matches(':'),
                    attr.key,
                    attr.value
                ));
            }
        }
        if record.has_alarms() {
            out.push_str(&format!("\n**Alarms:** {}\n", record.alarm));
        }
        out.push('\n');
    }

    out
}

fn transceivers_to_table(records: &[TransceiverRecord]) -> String {
    if records.is_empty() {
        return format!("{}\n", DataState::NoData);
    }

    let max_name = records
        .iter()
        .map(|r| r.interface.len())
        .max()
        .unwrap_or(9)
        .max(9);

    let mut out = format!("{:<width$}  COMMON\n", "INTERFACE", width = max_name);
    for record in records {
        out.push_str(&format!(
            "{:<width$}  {}\n",
            record.interface,
            record.common,
            width = max_name
        ));
        if record.has_alarms() {
            out.push_str(&format!("{:<width$}  alarm: {}\n", "", record.alarm, width = max_name));
        }
    }
    out
}
