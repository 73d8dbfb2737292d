//! What a reader renders from a record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{SharedStateRecord, StalenessPolicy};

pub const NOTHING_PLAYING: &str = "Nothing playing";
pub const NO_DATA: &str = "Server running, no data";
pub const WAITING_BADGE: &str = "Waiting for YouTube...";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    pub title: String,
    pub channel: String,
    /// `m:ss / m:ss`, empty when the duration is unknown.
    pub time_label: String,
    /// Fraction of the media played, in `[0, 1]`.
    pub progress: f64,
    pub background: Option<String>,
    pub badge: String,
    /// Stored `playing` flag, overridden by staleness.
    pub playing: bool,
    pub stale: bool,
}

impl DisplayState {
    pub fn from_record(
        record: &SharedStateRecord,
        policy: &StalenessPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        let snapshot = &record.snapshot;
        let stale = policy.is_stale(record, now);
        let playing = snapshot.playing && !stale;

        let duration = snapshot.duration_seconds;
        let position = snapshot.position_seconds;
        let (time_label, progress) = if duration > 0.0 {
            (
                format!("{} / {}", format_clock(position), format_clock(duration)),
                (position / duration).clamp(0.0, 1.0),
            )
        } else {
            (String::new(), 0.0)
        };

        let badge = if stale {
            WAITING_BADGE
        } else if playing {
            "Playing"
        } else {
            "Paused"
        };

        Self {
            title: if snapshot.title.is_empty() {
                NOTHING_PLAYING.to_string()
            } else {
                snapshot.title.clone()
            },
            channel: snapshot.channel.clone(),
            time_label,
            progress,
            background: Some(snapshot.thumbnail_url.clone()).filter(|url| url.starts_with("http")),
            badge: badge.to_string(),
            playing,
            stale,
        }
    }

    /// Shown when the state could not be read at all.
    pub fn waiting() -> Self {
        Self {
            title: NO_DATA.to_string(),
            channel: String::new(),
            time_label: String::new(),
            progress: 0.0,
            background: None,
            badge: WAITING_BADGE.to_string(),
            playing: false,
            stale: true,
        }
    }
}

/// Formats whole seconds as `m:ss`.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
