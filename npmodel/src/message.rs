use serde::{Deserialize, Serialize};

use crate::PlaybackSnapshot;

/// Envelope sent by the observer to the relay.
///
/// Serialized as `{"type": "PLAYBACK_UPDATE", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelayMessage {
    PlaybackUpdate(PlaybackSnapshot),
}

impl RelayMessage {
    pub fn payload(&self) -> &PlaybackSnapshot {
        match self {
            RelayMessage::PlaybackUpdate(snapshot) => snapshot,
        }
    }

    pub fn into_payload(self) -> PlaybackSnapshot {
        match self {
            RelayMessage::PlaybackUpdate(snapshot) => snapshot,
        }
    }
}
