//! Capture sources with a fallback chain.
//!
//! A [`CaptureSource`] returns the raw text of one [`Query`]. Two
//! implementations exist:
//!
//! - [`DirectorySource`] reads previously captured files.
//! - [`CommandSource`] runs one shell command per query with a timeout.
//!
//! [`SourceChain`] tries sources in order and returns the first non-empty
//! capture.
//!
//! ```no_run
//! use portwatch_source::{CaptureSource, DirectorySource, SourceChain};
//!
//! let chain = SourceChain::builder()
//!     .with(DirectorySource::new("captures/core-sw-01"))
//!     .with(DirectorySource::new("/var/lib/portwatch/last"))
//!     .build();
//! let capture = chain.capture().unwrap();
//! println!("fingerprint {}", capture.fingerprint());
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::capture::Capture;
use crate::config::CommandSet;
use crate::error::{Result, SourceError};
use crate::query::Query;

/// Anything that can produce raw device output for a query.
pub trait CaptureSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Returns the raw text for one query.
    fn fetch(&self, query: Query) -> Result<String>;

    /// Fetches all three queries.
    fn capture(&self) -> Result<Capture> {
        let mut capture = Capture::default();
        for query in Query::ALL {
            capture.set_text(query, self.fetch(query)?);
        }
        Ok(capture)
    }
}

/// Reads `summary.txt`, `detail.txt`, and `transceiver.txt` from a directory.
///
/// A missing file is empty input; a missing directory is an error.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CaptureSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    fn fetch(&self, query: Query) -> Result<String> {
        if !self.root.is_dir() {
            return Err(SourceError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("capture directory {} not found", self.root.display()),
            )));
        }
        let path = self.root.join(query.file_name());
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), %query, "capture file missing, treating as empty");
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Runs configured shell commands through `sh -c`.
///
/// Each query is attempted once. Commands are never logged since they may
/// embed credentials; logs name the query instead.
#[derive(Debug, Clone)]
pub struct CommandSource {
    commands: CommandSet,
    timeout: Duration,
}

impl CommandSource {
    pub fn new(commands: CommandSet, timeout: Duration) -> Self {
        Self { commands, timeout }
    }

    fn run(&self, query: Query, command_line: &str) -> Result<String> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain both pipes so a chatty command cannot block on a full buffer.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let Some(status) = child.wait_timeout(self.timeout)? else {
            warn!(%query, timeout_secs = self.timeout.as_secs(), "capture command timed out");
            let _ = child.kill();
            let _ = child.wait();
            return Err(SourceError::CommandTimeout {
                query,
                timeout_secs: self.timeout.as_secs(),
            });
        };

        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;

        if !status.success() {
            warn!(%query, code = ?status.code(), "capture command failed");
            return Err(SourceError::CommandFailed {
                query,
                code: status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        debug!(%query, bytes = stdout.len(), "capture command finished");
        Ok(stdout)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<String> {
    let bytes = match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| std::io::Error::other("pipe reader thread panicked"))??,
        None => Vec::new(),
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl CaptureSource for CommandSource {
    fn name(&self) -> &str {
        "command"
    }

    fn fetch(&self, query: Query) -> Result<String> {
        match self.commands.get(query) {
            Some(command_line) => self.run(query, command_line),
            None if query == Query::InterfaceSummary => Err(SourceError::MissingCommand(query)),
            None => Ok(String::new()),
        }
    }
}

/// Ordered list of sources; the first one yielding a non-empty capture wins.
pub struct SourceChain {
    sources: Vec<Box<dyn CaptureSource>>,
}

impl SourceChain {
    pub fn builder() -> SourceChainBuilder {
        SourceChainBuilder::new()
    }

    /// Source labels in try order.
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl CaptureSource for SourceChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn fetch(&self, query: Query) -> Result<String> {
        for source in &self.sources {
            match source.fetch(query) {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(source = source.name(), %query, error = %e, "capture source failed")
                }
            }
        }
        Err(SourceError::NoSourcesAvailable)
    }

    /// Takes all three queries from the same source so a capture is never
    /// stitched together from different moments.
    fn capture(&self) -> Result<Capture> {
        let mut empty = None;
        for source in &self.sources {
            match source.capture() {
                Ok(capture) if !capture.is_empty() => return Ok(capture),
                Ok(capture) => {
                    debug!(source = source.name(), "capture source returned no summary");
                    empty.get_or_insert(capture);
                }
                Err(e) => warn!(source = source.name(), error = %e, "capture source failed"),
            }
        }
        empty.ok_or(SourceError::NoSourcesAvailable)
    }
}

/// Builder for [`SourceChain`].
#[derive(Default)]
pub struct SourceChainBuilder {
    sources: Vec<Box<dyn CaptureSource>>,
}

impl SourceChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source to the end of the chain.
    pub fn with(mut self, source: impl CaptureSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn build(self) -> SourceChain {
        SourceChain {
            sources: self.sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(summary: &str) -> CommandSet {
        CommandSet {
            interface_summary: Some(summary.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_directory_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("summary.txt"), "Interface PHY\n").unwrap();
        let source = DirectorySource::new(dir.path());
        assert_eq!(source.fetch(Query::InterfaceSummary).unwrap(), "Interface PHY\n");
        assert_eq!(source.fetch(Query::Transceiver).unwrap(), "");
    }

    #[test]
    fn test_directory_missing_root_is_error() {
        let source = DirectorySource::new("/nonexistent/portwatch/capture");
        assert!(matches!(
            source.fetch(Query::InterfaceSummary),
            Err(SourceError::IoError(_))
        ));
    }

    #[test]
    fn test_command_source_captures_stdout() {
        let source = CommandSource::new(commands("printf 'a b\\n'"), Duration::from_secs(5));
        assert_eq!(source.fetch(Query::InterfaceSummary).unwrap(), "a b\n");
        assert_eq!(source.fetch(Query::InterfaceDetail).unwrap(), "");
    }

    #[test]
    fn test_command_source_reports_failure() {
        let source = CommandSource::new(commands("echo oops >&2; exit 3"), Duration::from_secs(5));
        match source.fetch(Query::InterfaceSummary) {
            Err(SourceError::CommandFailed { code, stderr, .. }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "oops");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_command_source_times_out() {
        let source = CommandSource::new(commands("sleep 5"), Duration::from_millis(200));
        assert!(matches!(
            source.fetch(Query::InterfaceSummary),
            Err(SourceError::CommandTimeout { .. })
        ));
    }

    #[test]
    fn test_command_source_requires_summary() {
        let source = CommandSource::new(CommandSet::default(), Duration::from_secs(1));
        assert!(matches!(
            source.fetch(Query::InterfaceSummary),
            Err(SourceError::MissingCommand(Query::InterfaceSummary))
        ));
    }

    #[test]
    fn test_chain_falls_back_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("summary.txt"), "Interface PHY\n").unwrap();
        let chain = SourceChain::builder()
            .with(CommandSource::new(commands("exit 1"), Duration::from_secs(5)))
            .with(DirectorySource::new(dir.path()))
            .build();
        let capture = chain.capture().unwrap();
        assert_eq!(capture.summary, "Interface PHY\n");
    }

    #[test]
    fn test_chain_prefers_non_empty_capture() {
        let empty = tempfile::tempdir().unwrap();
        let full = tempfile::tempdir().unwrap();
        std::fs::write(full.path().join("summary.txt"), "Interface PHY\n").unwrap();
        let chain = SourceChain::builder()
            .with(DirectorySource::new(empty.path()))
            .with(DirectorySource::new(full.path()))
            .build();
        assert!(!chain.capture().unwrap().is_empty());
    }

    #[test]
    fn test_chain_with_only_empty_sources_returns_empty_capture() {
        let empty = tempfile::tempdir().unwrap();
        let chain = SourceChain::builder()
            .with(DirectorySource::new(empty.path()))
            .build();
        assert!(chain.capture().unwrap().is_empty());
    }

    #[test]
    fn test_empty_chain_has_no_sources() {
        let chain = SourceChain::builder().build();
        assert!(chain.is_empty());
        assert!(matches!(chain.capture(), Err(SourceError::NoSourcesAvailable)));
    }
}
