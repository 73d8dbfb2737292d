use std::fmt;

use crate::PlaybackSnapshot;

/// Composite key describing the "material" content of a snapshot.
///
/// Position is not part of the key: it changes continuously while playing
/// and is rate-limited by a separate rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn of(snapshot: &PlaybackSnapshot) -> Self {
        Self(format!(
            "{}|{}|{}|{}|{}|{}|{}",
            snapshot.url,
            snapshot.media_id,
            snapshot.title,
            snapshot.channel,
            snapshot.thumbnail_url,
            snapshot.playing,
            snapshot.duration_seconds.round() as i64,
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
