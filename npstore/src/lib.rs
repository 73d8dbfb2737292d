//! # npstore - Shared latest playback state
//!
//! This crate keeps the process-wide "now playing" record and exposes it
//! over HTTP:
//!
//! - `POST /update`: field-level merge of a [`SnapshotPatch`](npmodel::SnapshotPatch)
//! - `GET /state`: full record, including `updatedAt`
//! - `GET /nowplaying`: legacy alias of `/state`
//! - `GET /`: embedded display page
//!
//! Freshness is never stored: each reader derives it with a
//! [`StalenessPolicy`] at read time.
//!
//! ## Usage with npserver
//!
//! ```rust,no_run
//! use npserver::ServerBuilder;
//! use npstore::StoreApiExt;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut server = ServerBuilder::new_configured().build();
//! let store = server.init_store_api_configured().await?;
//! server.start().await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod display;
pub mod npserver_ext;
mod reader;
mod record;
mod staleness;
mod store;

pub use api::create_router;
pub use display::{DisplayState, NOTHING_PLAYING, NO_DATA, WAITING_BADGE, format_clock};
pub use npserver_ext::StoreApiExt;
pub use reader::StatePoller;
pub use record::SharedStateRecord;
pub use staleness::{DEFAULT_STALE_AFTER, Freshness, StalenessPolicy};
pub use store::StateStore;

use rust_embed::RustEmbed;

/// Default body limit of `POST /update`
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;

/// Display page embedded in the binary
#[derive(RustEmbed, Clone)]
#[folder = "webapp"]
pub struct DisplayPage;
