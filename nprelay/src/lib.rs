//! Best-effort forwarder between the observer and the store.
//!
//! The observer hands messages to a [`RelayChannel`]; a [`Relay`] task
//! drains it and issues one independent `POST` per snapshot. Failed
//! deliveries are dropped: the next snapshot supersedes them anyway.

mod channel;
mod error;
mod relay;

pub use channel::{RelayChannel, relay_channel};
pub use error::{RelayError, Result};
pub use relay::Relay;
