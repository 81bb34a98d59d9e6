//! Atomic publication of analysis snapshots.
//!
//! A refresh cycle builds a complete [`Snapshot`] off to the side and hands
//! it to [`SnapshotStore::publish`], which swaps one `Arc` under a write
//! lock. Readers clone the `Arc` out of a read lock, so they always see
//! either the previous snapshot or the new one in full.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use portwatch_core::{AnalysisResult, DataState, TransceiverRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::report::{AnalysisReport, AnalysisRun};

/// Everything one refresh cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// RFC 3339 time the snapshot was built.
    pub generated_at: String,
    /// Fingerprint of the raw capture the snapshot was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub analysis: AnalysisResult,
    pub report: AnalysisReport,
    #[serde(default)]
    pub transceivers: Vec<TransceiverRecord>,
}

impl Snapshot {
    /// Builds a snapshot stamped with the current time.
    pub fn new(run: AnalysisRun, transceivers: Vec<TransceiverRecord>) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            fingerprint: None,
            analysis: run.result,
            report: run.report,
            transceivers,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn data_state(&self) -> DataState {
        self.analysis.data_state()
    }
}

/// Holds the latest published snapshot.
///
/// # Examples
///
/// ```
/// use portwatch_parser::report::AnalysisRun;
/// use portwatch_parser::snapshot::{Snapshot, SnapshotStore};
///
/// let store = SnapshotStore::new();
/// assert!(store.latest().is_none());
///
/// store.publish(Snapshot::new(AnalysisRun::default(), Vec::new()));
/// assert_eq!(store.generation(), 1);
/// assert!(store.latest().is_some());
/// ```
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<Snapshot>>>,
    generation: AtomicU64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the live snapshot and returns the new generation number.
    pub fn publish(&self, snapshot: Snapshot) -> u64 {
        let snapshot = Arc::new(snapshot);
        let counts = snapshot.analysis.counts();
        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *current = Some(snapshot);
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        info!(
            generation,
            good = counts.good,
            issue = counts.issue,
            inactive = counts.inactive,
            total = counts.total,
            "snapshot published"
        );
        generation
    }

    /// Returns the live snapshot, if one has been published.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of snapshots published so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Fingerprint of the live snapshot, if any.
    pub fn latest_fingerprint(&self) -> Option<String> {
        self.latest().and_then(|s| s.fingerprint.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use portwatch_core::PortVerdict;

    use super::*;

    fn snapshot_with(ports: usize) -> Snapshot {
        let mut result = AnalysisResult {
            total: ports,
            ..Default::default()
        };
        for idx in 0..ports {
            result.push(PortVerdict::from_issues(
                format!("GE1/0/{idx}"),
                Vec::new(),
                vec![String::new()],
            ));
        }
        Snapshot::new(
            AnalysisRun {
                result,
                report: AnalysisReport::default(),
            },
            Vec::new(),
        )
    }

    #[test]
    fn test_empty_store_has_no_data() {
        let store = SnapshotStore::new();
        assert!(store.latest().is_none());
        assert_eq!(store.generation(), 0);
        assert!(store.latest_fingerprint().is_none());
    }

    #[test]
    fn test_publish_replaces_snapshot() {
        let store = SnapshotStore::new();
        store.publish(snapshot_with(1).with_fingerprint("aaa"));
        let first = store.latest().unwrap();
        store.publish(snapshot_with(2).with_fingerprint("bbb"));

        // Readers holding the old Arc keep a consistent view.
        assert_eq!(first.analysis.good.len(), 1);
        assert_eq!(store.latest().unwrap().analysis.good.len(), 2);
        assert_eq!(store.latest_fingerprint().as_deref(), Some("bbb"));
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_readers_never_see_partial_snapshot() {
        let store = Arc::new(SnapshotStore::new());
        store.publish(snapshot_with(1));

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 1..=50 {
                    store.publish(snapshot_with(n));
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let snap = store.latest().unwrap();
                        assert_eq!(snap.analysis.good.len(), snap.analysis.total);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.generation(), 51);
    }

    #[test]
    fn test_snapshot_serializes_rfc3339_timestamp() {
        let snap = snapshot_with(0).with_fingerprint("abc");
        let json = serde_json::to_value(&snap).unwrap();
        let stamp = json["generated_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(json["fingerprint"], "abc");
        assert_eq!(snap.data_state(), DataState::NoData);
    }
}
