use std::time::Duration;

use chrono::{DateTime, Utc};
use npconfig::Config;

use crate::SharedStateRecord;

/// Age past which a record no longer reflects live playback.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// Read-time freshness rule applied by every reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    stale_after: Duration,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}

impl StalenessPolicy {
    pub fn new(stale_after: Duration) -> Self {
        Self { stale_after }
    }

    pub fn from_config(config: &Config) -> Self {
        config
            .get_stale_after_ms()
            .map(|ms| Self::new(Duration::from_millis(ms)))
            .unwrap_or_default()
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Stale when strictly more than `stale_after` elapsed since `updated_at`.
    /// A stamp in the future counts as fresh.
    pub fn evaluate(&self, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> Freshness {
        let age_ms = now.signed_duration_since(updated_at).num_milliseconds();
        let limit_ms = i64::try_from(self.stale_after.as_millis()).unwrap_or(i64::MAX);
        if age_ms > limit_ms {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }

    pub fn is_stale(&self, record: &SharedStateRecord, now: DateTime<Utc>) -> bool {
        self.evaluate(record.updated_at, now) == Freshness::Stale
    }
}
