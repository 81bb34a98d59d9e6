//! Raw text captured from one device.

use portwatch_core::TransceiverRecord;
use portwatch_parser::snapshot::Snapshot;
use portwatch_parser::{AnalysisRun, AnalyzerConfig, analyze_text_with, parse_transceivers};
use sha2::{Digest, Sha256};

use crate::query::Query;

/// Output of the three device queries taken in one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    pub summary: String,
    pub detail: String,
    pub transceiver: String,
}

impl Capture {
    /// Returns the text captured for `query`.
    pub fn text(&self, query: Query) -> &str {
        match query {
            Query::InterfaceSummary => &self.summary,
            Query::InterfaceDetail => &self.detail,
            Query::Transceiver => &self.transceiver,
        }
    }

    pub fn set_text(&mut self, query: Query, text: String) {
        match query {
            Query::InterfaceSummary => self.summary = text,
            Query::InterfaceDetail => self.detail = text,
            Query::Transceiver => self.transceiver = text,
        }
    }

    /// `true` when the summary holds no table text at all.
    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty()
    }

    /// SHA-256 hex digest over all three texts.
    ///
    /// Each text is prefixed with its byte length so moving content between
    /// queries changes the digest.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for query in Query::ALL {
            let text = self.text(query);
            hasher.update((text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn analyze(&self, config: &AnalyzerConfig) -> AnalysisRun {
        analyze_text_with(&self.summary, &self.detail, config)
    }

    pub fn transceivers(&self) -> Vec<TransceiverRecord> {
        parse_transceivers(&self.transceiver)
    }

    /// Runs every parser and packages the result for publication.
    pub fn to_snapshot(&self, config: &AnalyzerConfig) -> Snapshot {
        Snapshot::new(self.analyze(config), self.transceivers())
            .with_fingerprint(self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture() -> Capture {
        Capture {
            summary: "Interface PHY Protocol InUti OutUti inErrors outErrors\nGE1/0/1 up up 40% 40% 0 0\n"
                .to_string(),
            detail: "GE1/0/1 current state : UP\nLine protocol current state : UP\n".to_string(),
            transceiver: String::new(),
        }
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let fp = capture().fingerprint();
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, capture().fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let mut changed = capture();
        changed.set_text(Query::Transceiver, "x".to_string());
        assert_ne!(capture().fingerprint(), changed.fingerprint());
    }

    #[test]
    fn test_fingerprint_distinguishes_moved_text() {
        let a = Capture {
            summary: "ab".into(),
            detail: String::new(),
            transceiver: String::new(),
        };
        let b = Capture {
            summary: "a".into(),
            detail: "b".into(),
            transceiver: String::new(),
        };
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_to_snapshot_carries_fingerprint() {
        let capture = capture();
        let snapshot = capture.to_snapshot(&AnalyzerConfig::default());
        assert_eq!(snapshot.fingerprint.as_deref(), Some(capture.fingerprint().as_str()));
        assert_eq!(snapshot.analysis.good.len(), 1);
        assert!(snapshot.transceivers.is_empty());
    }

    #[test]
    fn test_is_empty() {
        assert!(Capture::default().is_empty());
        assert!(!capture().is_empty());
    }
}
