//! Transceiver diagnostics parsing.
//!
//! The dump is split into sections on blank lines. A section belongs to an
//! interface when it carries a `<name> transceiver information:` line;
//! sections without that marker (banners, prompts) are skipped. Inside a
//! section, three labeled sub-blocks are captured:
//!
//! ```text
//! GE1/0/1 transceiver information:
//! -------------------------------------------------------------
//!  Common information:
//!    Transceiver Type                      :1000_BASE_SX_SFP
//!    Connector Type                        :LC
//! -------------------------------------------------------------
//!  Manufacture information:
//!    Manu. Serial Number                   :HA12345678
//! -------------------------------------------------------------
//! ```
//!
//! A sub-block runs from its label line to the next dash separator (or the
//! end of the section) and is flattened into one whitespace-normalized line.

use std::sync::LazyLock;

use portwatch_core::{TransceiverAttribute, TransceiverRecord, TransceiverSection};
use regex::Regex;
use tracing::debug;

use crate::util::{is_dash_separator, normalize_whitespace};

static PATTERNS: LazyLock<TransceiverPatterns> = LazyLock::new(TransceiverPatterns::new);

struct TransceiverPatterns {
    section_break: Regex,
    interface_header: Regex,
}

impl TransceiverPatterns {
    fn new() -> Self {
        Self {
            section_break: Regex::new(r"\r?\n[ \t]*\r?\n").expect("static regex must compile"),
            interface_header: Regex::new(r"(?m)^\s*(\S+)\s+transceiver information:")
                .expect("static regex must compile"),
        }
    }
}

/// Parses a transceiver dump into one record per interface section.
///
/// Records keep the order in which sections appear. Empty input yields an
/// empty vector.
///
/// # Examples
///
/// ```
/// use portwatch_parser::transceiver::parse_transceiver_dump;
///
/// let dump = "\
/// GE1/0/1 transceiver information:
/// ------------------------------------------
///  Common information:
///    Transceiver Type     :1000_BASE_SX_SFP
///    Connector Type       :LC
/// ------------------------------------------
///  Manufacture information:
///    Manu. Serial Number  :HA12345678
/// ------------------------------------------
/// ";
///
/// let records = parse_transceiver_dump(dump);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].interface, "GE1/0/1");
/// assert_eq!(records[0].common, "Transceiver Type :1000_BASE_SX_SFP Connector Type :LC");
/// assert_eq!(records[0].alarm, "");
/// ```
pub fn parse_transceiver_dump(dump: &str) -> Vec<TransceiverRecord> {
    PATTERNS
        .section_break
        .split(dump)
        .filter_map(parse_section)
        .collect()
}

fn parse_section(section: &str) -> Option<TransceiverRecord> {
    let Some(caps) = PATTERNS.interface_header.captures(section) else {
        if !section.trim().is_empty() {
            debug!(
                preview = %section.lines().next().unwrap_or_default(),
                "skipping non-interface transceiver section"
            );
        }
        return None;
    };
    let interface = caps.get(1)?.as_str().to_string();

    let lines: Vec<&str> = section.lines().collect();
    let mut record = TransceiverRecord {
        interface,
        ..Default::default()
    };

    for kind in TransceiverSection::ALL {
        let Some(block) = sub_block(&lines, kind) else {
            continue;
        };
        let text = normalize_whitespace(&block.join("\n"));
        match kind {
            TransceiverSection::Common => record.common = text,
            TransceiverSection::Manufacture => record.manufacture = text,
            TransceiverSection::Alarm => record.alarm = text,
        }
        record
            .attributes
            .extend(block.iter().filter_map(|line| parse_attribute(kind, line)));
    }

    Some(record)
}

/// Returns the lines between the label of `kind` and the next separator.
fn sub_block<'a>(lines: &[&'a str], kind: TransceiverSection) -> Option<Vec<&'a str>> {
    let label = kind.label();
    let start = lines.iter().position(|line| line.trim() == label)?;
    Some(
        lines[start + 1..]
            .iter()
            .take_while(|line| !is_dash_separator(line))
            .copied()
            .collect(),
    )
}

/// Splits a `Key : value` line at its first colon.
fn parse_attribute(section: TransceiverSection, line: &str) -> Option<TransceiverAttribute> {
    let (key, value) = line.split_once(':')?;
    let key = normalize_whitespace(key);
    if key.is_empty() {
        return None;
    }
    Some(TransceiverAttribute {
        section,
        key,
        value: normalize_whitespace(value),
    })
}
