use chrono::{DateTime, Utc};
use npmodel::PlaybackSnapshot;
use serde::{Deserialize, Serialize};

/// The store's single slot: the merged snapshot and its arrival stamp.
///
/// Serialized flat, `updatedAt` in epoch milliseconds next to the snapshot
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedStateRecord {
    #[serde(flatten)]
    pub snapshot: PlaybackSnapshot,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl SharedStateRecord {
    /// Empty record for a store created at `now`.
    pub fn new(source: &str, now: DateTime<Utc>) -> Self {
        Self {
            snapshot: PlaybackSnapshot::new(source),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_is_flat_on_the_wire() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let mut record = SharedStateRecord::new("youtube", now);
        record.snapshot.title = "Song".to_string();
        record.snapshot.observed_at = Some(now);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["title"], "Song");
        assert_eq!(value["source"], "youtube");
        assert_eq!(value["updatedAt"], json!(1_700_000_000_123i64));
        assert_eq!(value["observedAt"], json!(1_700_000_000_123i64));
        assert!(value.get("snapshot").is_none());

        let back: SharedStateRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
