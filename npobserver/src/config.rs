use std::time::Duration;

use npconfig::Config;

use crate::TransmitPolicy;

/// Tunables of one observer instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverConfig {
    /// Value of the `source` field on every snapshot.
    pub source: String,
    /// Stable query resolving the active media element.
    pub media_selector: String,
    pub heartbeat: Duration,
    pub rehook: Duration,
    pub policy: TransmitPolicy,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            source: "youtube".to_string(),
            media_selector: "video".to_string(),
            heartbeat: Duration::from_millis(750),
            rehook: Duration::from_millis(3000),
            policy: TransmitPolicy::default(),
        }
    }
}

impl ObserverConfig {
    /// Reads the `observer` section, keeping defaults for missing keys.
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        let millis = |value: anyhow::Result<u64>, default: Duration| {
            value
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            source: config.get_observer_source().unwrap_or(defaults.source),
            media_selector: config
                .get_media_selector()
                .unwrap_or(defaults.media_selector),
            heartbeat: millis(config.get_heartbeat_ms(), defaults.heartbeat),
            rehook: millis(config.get_rehook_ms(), defaults.rehook),
            policy: TransmitPolicy {
                min_gap: millis(config.get_min_send_gap_ms(), defaults.policy.min_gap),
                paused_refresh: millis(
                    config.get_paused_refresh_ms(),
                    defaults.policy.paused_refresh,
                ),
            },
        }
    }
}
