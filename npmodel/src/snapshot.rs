use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time description of what the page is playing.
///
/// Producers leave `observed_at` empty: it is stamped by the store when the
/// snapshot is merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    /// Tag of the origin type (e.g. `youtube`).
    pub source: String,
    pub title: String,
    pub channel: String,
    pub url: String,
    pub media_id: String,
    pub thumbnail_url: String,
    /// Media duration, 0 when unknown.
    pub duration_seconds: f64,
    pub position_seconds: f64,
    pub playing: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub observed_at: Option<DateTime<Utc>>,
}

impl PlaybackSnapshot {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Sets duration and position, coercing non-finite or negative inputs to 0.
    pub fn with_timing(mut self, duration_seconds: f64, position_seconds: f64) -> Self {
        self.duration_seconds = sanitize_seconds(duration_seconds);
        self.position_seconds = sanitize_seconds(position_seconds);
        self
    }

    /// Whole seconds elapsed, used for position-driven change detection.
    pub fn whole_position(&self) -> i64 {
        self.position_seconds.floor() as i64
    }
}

/// Coerces a time value to a finite, non-negative number of seconds.
pub fn sanitize_seconds(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_seconds() {
        assert_eq!(sanitize_seconds(12.5), 12.5);
        assert_eq!(sanitize_seconds(0.0), 0.0);
        assert_eq!(sanitize_seconds(-3.0), 0.0);
        assert_eq!(sanitize_seconds(f64::NAN), 0.0);
        assert_eq!(sanitize_seconds(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_with_timing_coerces_live_stream_duration() {
        // Live streams report an infinite duration.
        let snapshot = PlaybackSnapshot::new("youtube").with_timing(f64::INFINITY, 42.7);
        assert_eq!(snapshot.duration_seconds, 0.0);
        assert_eq!(snapshot.position_seconds, 42.7);
        assert_eq!(snapshot.whole_position(), 42);
    }

    #[test]
    fn test_serializes_camel_case_without_stamp() {
        let snapshot = PlaybackSnapshot {
            media_id: "dQw4w9WgXcQ".to_string(),
            thumbnail_url: "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg".to_string(),
            duration_seconds: 212.0,
            playing: true,
            ..PlaybackSnapshot::new("youtube")
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["mediaId"], "dQw4w9WgXcQ");
        assert_eq!(json["durationSeconds"], 212.0);
        assert_eq!(json["playing"], true);
        assert!(json.get("observedAt").is_none());
    }
}
