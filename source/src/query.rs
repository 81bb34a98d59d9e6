//! The three device queries a capture is built from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One raw-text query against a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Tabular per-port summary.
    InterfaceSummary,
    /// Per-interface detail blocks.
    InterfaceDetail,
    /// Transceiver diagnostics.
    Transceiver,
}

impl Query {
    /// All queries in capture order.
    pub const ALL: [Query; 3] = [
        Self::InterfaceSummary,
        Self::InterfaceDetail,
        Self::Transceiver,
    ];

    /// CLI command that produces this output on the device.
    pub fn device_command(self) -> &'static str {
        match self {
            Self::InterfaceSummary => "display interface brief",
            Self::InterfaceDetail => "display interface",
            Self::Transceiver => "display transceiver",
        }
    }

    /// File holding this output inside a capture directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::InterfaceSummary => "summary.txt",
            Self::InterfaceDetail => "detail.txt",
            Self::Transceiver => "transceiver.txt",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InterfaceSummary => write!(f, "interface_summary"),
            Self::InterfaceDetail => write!(f, "interface_detail"),
            Self::Transceiver => write!(f, "transceiver"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for query in Query::ALL {
            let yaml = serde_yaml::to_string(&query).unwrap();
            assert_eq!(yaml.trim(), query.to_string());
        }
    }

    #[test]
    fn test_device_commands() {
        assert_eq!(
            Query::InterfaceSummary.device_command(),
            "display interface brief"
        );
        assert_eq!(Query::InterfaceDetail.device_command(), "display interface");
        assert_eq!(Query::Transceiver.device_command(), "display transceiver");
    }

    #[test]
    fn test_file_names_are_distinct() {
        let names: std::collections::HashSet<&str> =
            Query::ALL.iter().map(|q| q.file_name()).collect();
        assert_eq!(names.len(), 3);
    }
}
