use std::time::Duration;

use npconfig::Config;
use npmodel::RelayMessage;
use reqwest::Client;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

use crate::{RelayChannel, RelayError, Result, relay_channel};

/// Default timeout of one delivery attempt
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;

/// Stateless HTTP forwarder to the store's ingest endpoint.
#[derive(Debug, Clone)]
pub struct Relay {
    client: Client,
    ingest_url: Url,
}

impl Relay {
    pub fn new(ingest_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, Url::parse(ingest_url)?))
    }

    /// Create a relay with a custom reqwest::Client
    pub fn with_client(client: Client, ingest_url: Url) -> Self {
        Self { client, ingest_url }
    }

    /// Reads the `relay` section of the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let ingest_url = config
            .get_relay_ingest_url()
            .unwrap_or_else(|_| "http://127.0.0.1:27123/update".to_string());
        let timeout = config
            .get_relay_timeout_ms()
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
        Self::new(&ingest_url, Duration::from_millis(timeout))
    }

    pub fn ingest_url(&self) -> &Url {
        &self.ingest_url
    }

    /// Makes exactly one delivery attempt. The response body is ignored.
    pub async fn deliver_once(&self, message: &RelayMessage) -> Result<()> {
        let response = self
            .client
            .post(self.ingest_url.clone())
            .json(message.payload())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Rejected(status));
        }
        Ok(())
    }

    /// Fire-and-forget: spawns one attempt and drops any failure.
    pub fn forward(&self, message: RelayMessage) -> JoinHandle<()> {
        let relay = self.clone();
        tokio::spawn(async move {
            if let Err(e) = relay.deliver_once(&message).await {
                debug!("Dropping update: {}", e);
            }
        })
    }

    /// Forwards every message of `inbox` until all senders are gone.
    ///
    /// Attempts are independent: a slow store does not delay the next
    /// message, and arrival order at the store is not guaranteed.
    pub async fn serve(self, mut inbox: UnboundedReceiver<RelayMessage>) {
        info!("Relay forwarding to {}", self.ingest_url);
        while let Some(message) = inbox.recv().await {
            self.forward(message);
        }
        debug!("Relay inbox closed");
    }

    /// Spawns [`Relay::serve`] and returns the observer side of its inbox.
    pub fn spawn(self) -> (RelayChannel, JoinHandle<()>) {
        let (channel, inbox) = relay_channel();
        (channel, tokio::spawn(self.serve(inbox)))
    }
}
