//! Monitor configuration.
//!
//! A YAML file tells the `watch` loop which device it is looking at, how to
//! capture its output, and how to judge port health.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! device: core-sw-01
//! refresh_secs: 60
//! command_timeout_secs: 20
//! commands:
//!   interface_summary: ssh admin@10.0.0.2 'display interface brief'
//!   interface_detail: ssh admin@10.0.0.2 'display interface'
//!   transceiver: ssh admin@10.0.0.2 'display transceiver'
//! capture_dir: /var/lib/portwatch/core-sw-01
//! thresholds:
//!   high_utilization: 85.0
//!   low_utilization: 5.0
//!   high_error_count: 1000
//! column_policy: strict
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use portwatch_parser::{AnalyzerConfig, ColumnPolicy, HealthThresholds};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SourceError};
use crate::query::Query;
use crate::source::{CommandSource, DirectorySource, SourceChain};

fn default_refresh_secs() -> u64 {
    60
}

fn default_command_timeout_secs() -> u64 {
    30
}

/// Shell command per query. Unset queries yield empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transceiver: Option<String>,
}

impl CommandSet {
    /// Returns the command configured for `query`.
    pub fn get(&self, query: Query) -> Option<&str> {
        match query {
            Query::InterfaceSummary => self.interface_summary.as_deref(),
            Query::InterfaceDetail => self.interface_detail.as_deref(),
            Query::Transceiver => self.transceiver.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Query::ALL.iter().all(|q| self.get(*q).is_none())
    }
}

/// Top-level monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Device label used in logs and output.
    pub device: String,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    #[serde(default)]
    pub commands: CommandSet,
    /// Directory of captured files used when commands are unset or fail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_dir: Option<PathBuf>,
    #[serde(default)]
    pub thresholds: HealthThresholds,
    #[serde(default)]
    pub column_policy: ColumnPolicy,
}

impl MonitorConfig {
    /// Loads and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](SourceError::IoError) if the file cannot be read,
    /// [`YamlError`](SourceError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](SourceError::InvalidConfig) if
    /// [`validate`](Self::validate) rejects it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks the settings the refresh loop depends on.
    pub fn validate(&self) -> Result<()> {
        if self.device.trim().is_empty() {
            return Err(SourceError::InvalidConfig("device must not be empty".into()));
        }
        if self.refresh_secs == 0 {
            return Err(SourceError::InvalidConfig(
                "refresh_secs must be greater than zero".into(),
            ));
        }
        if self.command_timeout_secs == 0 {
            return Err(SourceError::InvalidConfig(
                "command_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.commands.interface_summary.is_none() && self.capture_dir.is_none() {
            return Err(SourceError::InvalidConfig(
                "either commands.interface_summary or capture_dir is required".into(),
            ));
        }
        let t = &self.thresholds;
        if t.low_utilization >= t.high_utilization {
            return Err(SourceError::InvalidConfig(format!(
                "low_utilization ({}) must be below high_utilization ({})",
                t.low_utilization, t.high_utilization
            )));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            thresholds: self.thresholds,
            column_policy: self.column_policy,
        }
    }

    /// Builds the capture chain: configured commands first, then the
    /// capture directory.
    pub fn source(&self) -> SourceChain {
        let mut chain = SourceChain::builder();
        if !self.commands.is_empty() {
            chain = chain.with(CommandSource::new(
                self.commands.clone(),
                Duration::from_secs(self.command_timeout_secs),
            ));
        }
        if let Some(dir) = &self.capture_dir {
            chain = chain.with(DirectorySource::new(dir.clone()));
        }
        chain.build()
    }
}
