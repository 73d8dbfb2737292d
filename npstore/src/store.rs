use std::sync::Arc;

use chrono::{DateTime, Utc};
use npmodel::SnapshotPatch;
use tokio::sync::RwLock;

use crate::SharedStateRecord;

/// Shared handle on the single state record.
///
/// Writers are serialized and each merge is applied under one write guard,
/// so a reader never sees a half-merged record.
#[derive(Debug, Clone)]
pub struct StateStore {
    record: Arc<RwLock<SharedStateRecord>>,
}

impl StateStore {
    pub fn new(source: &str) -> Self {
        Self {
            record: Arc::new(RwLock::new(SharedStateRecord::new(source, Utc::now()))),
        }
    }

    /// Merges the fields present in `patch` and stamps the record.
    pub async fn ingest(&self, patch: &SnapshotPatch) -> SharedStateRecord {
        self.ingest_at(patch, Utc::now()).await
    }

    pub async fn ingest_at(&self, patch: &SnapshotPatch, now: DateTime<Utc>) -> SharedStateRecord {
        let mut record = self.record.write().await;
        patch.apply_to(&mut record.snapshot);
        record.snapshot.observed_at = Some(now);
        record.updated_at = now;
        record.clone()
    }

    pub async fn read(&self) -> SharedStateRecord {
        self.record.read().await.clone()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new("youtube")
    }
}
