use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{PlaybackSnapshot, sanitize_seconds};

/// Partial snapshot accepted by the store's ingest operation.
///
/// Only the fields present in the payload are merged; everything else keeps
/// its previous value. Unknown fields are rejected. The legacy field names
/// (`videoId`, `thumbnail`, `duration`, `position`) are accepted as aliases.
///
/// Time fields accept any JSON value: anything that is not a finite,
/// non-negative number becomes 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnapshotPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, alias = "videoId", skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
    #[serde(default, alias = "thumbnail", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(
        default,
        alias = "duration",
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_seconds: Option<f64>,
    #[serde(
        default,
        alias = "position",
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub position_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playing: Option<bool>,
    // Stamps are owned by the store; a producer-supplied one is ignored.
    #[serde(default, rename = "updatedAt", skip_serializing)]
    pub updated_at: Option<IgnoredAny>,
    #[serde(default, rename = "observedAt", skip_serializing)]
    pub observed_at: Option<IgnoredAny>,
}

impl SnapshotPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.title.is_none()
            && self.channel.is_none()
            && self.url.is_none()
            && self.media_id.is_none()
            && self.thumbnail_url.is_none()
            && self.duration_seconds.is_none()
            && self.position_seconds.is_none()
            && self.playing.is_none()
    }

    /// Overwrites the fields of `target` that are present in this patch.
    pub fn apply_to(&self, target: &mut PlaybackSnapshot) {
        if let Some(source) = &self.source {
            target.source.clone_from(source);
        }
        if let Some(title) = &self.title {
            target.title.clone_from(title);
        }
        if let Some(channel) = &self.channel {
            target.channel.clone_from(channel);
        }
        if let Some(url) = &self.url {
            target.url.clone_from(url);
        }
        if let Some(media_id) = &self.media_id {
            target.media_id.clone_from(media_id);
        }
        if let Some(thumbnail_url) = &self.thumbnail_url {
            target.thumbnail_url.clone_from(thumbnail_url);
        }
        if let Some(duration) = self.duration_seconds {
            target.duration_seconds = sanitize_seconds(duration);
        }
        if let Some(position) = self.position_seconds {
            target.position_seconds = sanitize_seconds(position);
        }
        if let Some(playing) = self.playing {
            target.playing = playing;
        }
    }
}

impl From<&PlaybackSnapshot> for SnapshotPatch {
    fn from(snapshot: &PlaybackSnapshot) -> Self {
        Self {
            source: Some(snapshot.source.clone()),
            title: Some(snapshot.title.clone()),
            channel: Some(snapshot.channel.clone()),
            url: Some(snapshot.url.clone()),
            media_id: Some(snapshot.media_id.clone()),
            thumbnail_url: Some(snapshot.thumbnail_url.clone()),
            duration_seconds: Some(snapshot.duration_seconds),
            position_seconds: Some(snapshot.position_seconds),
            playing: Some(snapshot.playing),
            updated_at: None,
            observed_at: None,
        }
    }
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map(sanitize_seconds).unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(Some(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<SnapshotPatch, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_partial_patch_only_touches_present_fields() {
        let mut snapshot = PlaybackSnapshot {
            title: "Song".to_string(),
            channel: "Artist".to_string(),
            playing: true,
            ..PlaybackSnapshot::new("youtube")
        }
        .with_timing(200.0, 10.0);

        let patch = parse(json!({ "positionSeconds": 42 })).unwrap();
        patch.apply_to(&mut snapshot);

        assert_eq!(snapshot.position_seconds, 42.0);
        assert_eq!(snapshot.title, "Song");
        assert_eq!(snapshot.channel, "Artist");
        assert_eq!(snapshot.duration_seconds, 200.0);
        assert!(snapshot.playing);
    }

    #[test]
    fn test_legacy_aliases() {
        let patch = parse(json!({
            "videoId": "abcdef",
            "thumbnail": "https://i.ytimg.com/vi/abcdef/hqdefault.jpg",
            "duration": 120,
            "position": 30.5,
        }))
        .unwrap();

        assert_eq!(patch.media_id.as_deref(), Some("abcdef"));
        assert_eq!(
            patch.thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/abcdef/hqdefault.jpg")
        );
        assert_eq!(patch.duration_seconds, Some(120.0));
        assert_eq!(patch.position_seconds, Some(30.5));
    }

    #[test]
    fn test_non_numeric_times_are_coerced_to_zero() {
        let patch = parse(json!({
            "durationSeconds": "forever",
            "positionSeconds": null,
        }))
        .unwrap();
        assert_eq!(patch.duration_seconds, Some(0.0));
        assert_eq!(patch.position_seconds, Some(0.0));

        let negative = parse(json!({ "positionSeconds": -4.0 })).unwrap();
        assert_eq!(negative.position_seconds, Some(0.0));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(parse(json!({ "title": "x", "admin": true })).is_err());
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        assert!(parse(json!({ "playing": "yes" })).is_err());
        assert!(parse(json!({ "title": 12 })).is_err());
    }

    #[test]
    fn test_producer_stamp_is_ignored() {
        let patch = parse(json!({ "updatedAt": 1, "title": "x" })).unwrap();
        assert_eq!(patch.title.as_deref(), Some("x"));

        let mut snapshot = PlaybackSnapshot::default();
        patch.apply_to(&mut snapshot);
        assert!(snapshot.observed_at.is_none());
    }

    #[test]
    fn test_both_producer_stamps_are_ignored() {
        let patch = parse(json!({
            "updatedAt": 1_700_000_000_000u64,
            "observedAt": "2024-01-01T00:00:00Z",
            "playing": true
        }))
        .unwrap();
        assert_eq!(patch.playing, Some(true));

        let mut snapshot = PlaybackSnapshot::default();
        patch.apply_to(&mut snapshot);
        assert!(snapshot.observed_at.is_none());
    }

    #[test]
    fn test_full_patch_from_snapshot() {
        let snapshot = PlaybackSnapshot {
            title: "Song".to_string(),
            playing: true,
            ..PlaybackSnapshot::new("youtube")
        }
        .with_timing(120.0, 31.0);

        let mut target = PlaybackSnapshot::default();
        SnapshotPatch::from(&snapshot).apply_to(&mut target);
        assert_eq!(target, snapshot);
        assert!(!SnapshotPatch::from(&snapshot).is_empty());
        assert!(SnapshotPatch::new().is_empty());
    }
}
