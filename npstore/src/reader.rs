use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use npconfig::Config;
use reqwest::Client;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;
use url::Url;

use crate::{DisplayState, SharedStateRecord, StalenessPolicy};

/// Default polling period of a reader
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Polling reader of `GET /state`.
///
/// Each tick fetches the record, applies the staleness rule and hands the
/// resulting [`DisplayState`] to a callback. A failed read yields
/// [`DisplayState::waiting`].
#[derive(Debug, Clone)]
pub struct StatePoller {
    client: Client,
    state_url: Url,
    interval: Duration,
    policy: StalenessPolicy,
}

impl StatePoller {
    /// A zero `interval` falls back to [`DEFAULT_POLL_INTERVAL`].
    pub fn new(state_url: &str, interval: Duration, policy: StalenessPolicy) -> anyhow::Result<Self> {
        let interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        let state_url =
            Url::parse(state_url).with_context(|| format!("Invalid state URL: {}", state_url))?;
        let client = Client::builder()
            .timeout(interval.max(Duration::from_secs(1)))
            .build()?;

        Ok(Self {
            client,
            state_url,
            interval,
            policy,
        })
    }

    /// Reads the `reader` and `store` sections of the configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let state_url = config.get_reader_state_url()?;
        let interval = config
            .get_reader_poll_ms()
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        Self::new(&state_url, interval, StalenessPolicy::from_config(config))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn fetch(&self) -> anyhow::Result<SharedStateRecord> {
        let record = self
            .client
            .get(self.state_url.clone())
            .send()
            .await?
            .error_for_status()?
            .json::<SharedStateRecord>()
            .await?;
        Ok(record)
    }

    pub async fn poll_once(&self) -> DisplayState {
        match self.fetch().await {
            Ok(record) => DisplayState::from_record(&record, &self.policy, Utc::now()),
            Err(e) => {
                debug!("State read failed: {}", e);
                DisplayState::waiting()
            }
        }
    }

    /// Polls forever; abort the returned handle to stop.
    pub fn spawn<F>(self, mut on_state: F) -> JoinHandle<()>
    where
        F: FnMut(DisplayState) + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                on_state(self.poll_once().await);
            }
        })
    }
}
