use std::time::{Duration, Instant};

use npmodel::{DedupKey, PlaybackSnapshot};

/// Timing thresholds of the transmission filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitPolicy {
    /// Hard floor between two non-forced sends.
    pub min_gap: Duration,
    /// Refresh period while playback is not active.
    pub paused_refresh: Duration,
}

impl Default for TransmitPolicy {
    fn default() -> Self {
        Self {
            min_gap: Duration::from_millis(350),
            paused_refresh: Duration::from_millis(1500),
        }
    }
}

/// Outcome of evaluating a candidate snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Hook, navigation or visibility boundary: sent unconditionally.
    Forced,
    /// The dedup key differs from the last one sent.
    Changed,
    /// Playing, and the whole-second position moved.
    Advanced,
    /// Not playing, and the last send is older than the refresh period.
    PausedRefresh,
    /// Dropped: too close to the previous send.
    RateLimited,
    /// Dropped: nothing worth sending.
    Unchanged,
}

impl Verdict {
    pub fn transmits(self) -> bool {
        !matches!(self, Verdict::RateLimited | Verdict::Unchanged)
    }
}

/// What was last transmitted, and when.
#[derive(Debug, Clone, Default)]
pub struct TransmitState {
    last_key: Option<DedupKey>,
    last_pos: Option<i64>,
    last_sent_at: Option<Instant>,
}

impl TransmitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when a non-forced send at `now` would be rate limited.
    pub fn within_gap(&self, policy: &TransmitPolicy, now: Instant) -> bool {
        self.last_sent_at
            .is_some_and(|sent| now.saturating_duration_since(sent) < policy.min_gap)
    }

    /// Decides whether `candidate` goes out.
    ///
    /// A transmitting verdict records the key, the whole-second position and
    /// the time before any delivery is attempted; a failed delivery does not
    /// roll them back.
    pub fn evaluate(
        &mut self,
        policy: &TransmitPolicy,
        candidate: &PlaybackSnapshot,
        now: Instant,
        force: bool,
    ) -> Verdict {
        let key = DedupKey::of(candidate);
        let position = candidate.whole_position();
        let elapsed = self
            .last_sent_at
            .map(|sent| now.saturating_duration_since(sent));

        let verdict = if force {
            Verdict::Forced
        } else if elapsed.is_some_and(|e| e < policy.min_gap) {
            Verdict::RateLimited
        } else if self.last_key.as_ref() != Some(&key) {
            Verdict::Changed
        } else if candidate.playing && self.last_pos != Some(position) {
            Verdict::Advanced
        } else if !candidate.playing && elapsed.is_none_or(|e| e > policy.paused_refresh) {
            Verdict::PausedRefresh
        } else {
            Verdict::Unchanged
        };

        if verdict.transmits() {
            self.last_key = Some(key);
            self.last_pos = Some(position);
            self.last_sent_at = Some(now);
        }

        verdict
    }

    pub fn last_sent_at(&self) -> Option<Instant> {
        self.last_sent_at
    }

    pub fn last_key(&self) -> Option<&DedupKey> {
        self.last_key.as_ref()
    }
}
