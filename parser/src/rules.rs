//! Diagnostic rule tables and thresholds for port health.
//!
//! PHY and Protocol status tokens are checked against ordered rule tables;
//! the first matching rule in table order contributes its message and the
//! rest of the table is ignored. Utilization and error counters are checked
//! against [`HealthThresholds`].

use serde::{Deserialize, Serialize};

use crate::report::RecordError;

/// Sentinel the device prints when utilization is not measured.
pub const UTILIZATION_SENTINEL: &str = "--";

/// Sole issue reported for a port classified INACTIVE.
pub const INACTIVE_REASON: &str = "Port inactive due to low utilization.";

/// How a rule matches a status token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMatch {
    /// The whole token equals the pattern.
    Exact(&'static str),
    /// The token contains the pattern anywhere.
    Contains(&'static str),
}

impl StatusMatch {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(pattern) => value == *pattern,
            Self::Contains(pattern) => value.contains(pattern),
        }
    }
}

/// One (predicate, message) entry of a status rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRule {
    pub matcher: StatusMatch,
    pub message: &'static str,
}

const fn exact(pattern: &'static str, message: &'static str) -> StatusRule {
    StatusRule {
        matcher: StatusMatch::Exact(pattern),
        message,
    }
}

const fn contains(pattern: &'static str, message: &'static str) -> StatusRule {
    StatusRule {
        matcher: StatusMatch::Contains(pattern),
        message,
    }
}

/// Physical-layer rules in precedence order.
pub const PHY_RULES: &[StatusRule] = &[
    exact("down", "Physical layer failure."),
    exact("*down", "Administratively down (shutdown)."),
    exact("^down", "Backup interface (not in use)."),
    exact("#down", "Loop detected and interface shut down."),
    contains("(l)", "Loopback function enabled."),
    contains("(b)", "BFD down state detected on physical layer."),
    // Values with an inner space only reach these rules through records
    // built directly; a whitespace-split summary row carries an extra token.
    exact("up (d)", "Interface disabled by device."),
    exact("unreachable", "Interface unreachable."),
    exact("testing", "Interface in testing mode."),
];

/// Link-layer protocol rules in precedence order.
pub const PROTOCOL_RULES: &[StatusRule] = &[
    exact("down", "Link layer protocol failure."),
    contains("(s)", "Spoofing enabled."),
    contains("(E)", "Eth-Trunk down due to E-Trunk negotiation failure."),
    contains("(b)", "BFD down state on link layer."),
    contains("(e)", "ETHOAM down state."),
    contains("(dl)", "DLDP down state."),
    contains("(lb)", "Blocked due to loops."),
    contains("(ms)", "MACsec down state (MACsec disabled on peer)."),
    exact("admin-down", "Admin down - protocol administratively disabled."),
    // See the "up (d)" note above.
    exact("up (m)", "Maintenance mode active."),
];

/// Returns the first rule in `rules` matching `value`.
pub fn first_match<'a>(rules: &'a [StatusRule], value: &str) -> Option<&'a StatusRule> {
    rules.iter().find(|rule| rule.matcher.matches(value))
}

/// Numeric thresholds driving utilization and error diagnoses.
///
/// # Examples
///
/// ```
/// use portwatch_parser::rules::HealthThresholds;
///
/// let t = HealthThresholds::default();
/// assert_eq!(t.high_utilization, 90.0);
/// assert_eq!(t.low_utilization, 5.0);
/// assert_eq!(t.high_error_count, 1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    /// Utilization at or above this percentage is congestion.
    pub high_utilization: f64,
    /// Utilization below this percentage is inactivity.
    pub low_utilization: f64,
    /// Error counts above this value are a high error rate.
    pub high_error_count: u64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            high_utilization: 90.0,
            low_utilization: 5.0,
            high_error_count: 1000,
        }
    }
}

/// Traffic direction of a utilization or error counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

/// Parses a utilization token: `--` is no measurement, otherwise a number
/// with optional surrounding `%` signs.
pub fn parse_utilization(column: &str, raw: &str) -> Result<Option<f64>, RecordError> {
    let raw = raw.trim();
    if raw == UTILIZATION_SENTINEL {
        return Ok(None);
    }
    raw.trim_matches('%')
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(Some)
        .ok_or_else(|| RecordError::InvalidUtilization {
            column: column.to_string(),
            value: raw.to_string(),
        })
}

/// Parses an error counter as a non-negative integer.
pub fn parse_error_count(column: &str, raw: &str) -> Result<u64, RecordError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| RecordError::InvalidErrorCount {
            column: column.to_string(),
            value: raw.to_string(),
        })
}

impl HealthThresholds {
    /// Issue for one measured utilization direction, if any.
    pub fn utilization_issue(&self, direction: Direction, value: f64) -> Option<String> {
        let label = direction.label();
        if value >= self.high_utilization {
            Some(format!("High {label} utilization (possible congestion)."))
        } else if value < self.low_utilization {
            Some(format!("Low {label} utilization (may indicate inactivity)."))
        } else {
            None
        }
    }

    /// Error issues: count reports first, then high-rate warnings.
    pub fn error_issues(&self, in_errors: u64, out_errors: u64) -> Vec<String> {
        let mut issues = Vec::new();
        if in_errors > 0 {
            issues.push(format!("Received error packets: {in_errors}"));
        }
        if out_errors > 0 {
            issues.push(format!("Sent error packets: {out_errors}"));
        }
        if in_errors > self.high_error_count {
            issues.push("High rate of inbound errors.".to_string());
        }
        if out_errors > self.high_error_count {
            issues.push("High rate of outbound errors.".to_string());
        }
        issues
    }

    /// A port is inactive when both directions are measured and either one
    /// is below the low-utilization threshold.
    pub fn is_inactive(&self, inbound: Option<f64>, outbound: Option<f64>) -> bool {
        match (inbound, outbound) {
            (Some(i), Some(o)) => i < self.low_utilization || o < self.low_utilization,
            _ => false,
        }
    }
}
