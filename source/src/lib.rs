//! Capture sources and monitor configuration for portwatch.
//!
//! This crate fetches the raw text the parsers consume. It knows nothing
//! about how that text is interpreted beyond bundling it into a
//! [`Capture`] that can be fingerprinted and turned into a
//! [`Snapshot`](portwatch_parser::snapshot::Snapshot).
//!
//! # Quick start
//!
//! ```no_run
//! use portwatch_source::{CaptureSource, MonitorConfig};
//!
//! let config = MonitorConfig::load("monitor.yaml").unwrap();
//! let capture = config.source().capture().unwrap();
//! let snapshot = capture.to_snapshot(&config.analyzer_config());
//! println!("{} ports analyzed", snapshot.analysis.total);
//! ```

mod capture;
mod config;
mod error;
mod query;
mod source;

pub use capture::Capture;
pub use config::{CommandSet, MonitorConfig};
pub use error::{Result, SourceError};
pub use query::Query;
pub use source::{CaptureSource, CommandSource, DirectorySource, SourceChain, SourceChainBuilder};
