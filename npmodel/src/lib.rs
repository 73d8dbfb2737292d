//! Shared data model for the now-playing pipeline.
//!
//! Every component speaks in terms of these types:
//!
//! - [`PlaybackSnapshot`]: the unit of transmission and storage
//! - [`SnapshotPatch`]: the (possibly partial) payload accepted by the store
//! - [`DedupKey`]: the composite used by the observer to detect material changes
//! - [`RelayMessage`]: the envelope travelling from the observer to the relay

mod dedup;
mod message;
mod patch;
mod snapshot;

pub use dedup::DedupKey;
pub use message::RelayMessage;
pub use patch::SnapshotPatch;
pub use snapshot::{PlaybackSnapshot, sanitize_seconds};
