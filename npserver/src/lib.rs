//! # npserver - High-level web server built on Axum
//!
//! This crate provides a small abstraction to mount the now-playing store
//! and its display page on an Axum HTTP server.
//!
//! ## Features
//!
//! - **Simple JSON routes**: `add_route()`
//! - **Sub-routers**: domain crates mount their routes with `add_router()`
//! - **Embedded page**: `add_spa()` with `RustEmbed`
//! - **Logs**: ring buffer readable at `/log-dump`, level adjustable at runtime
//! - **Graceful shutdown**: on Ctrl+C
//!
//! ## Example
//!
//! ```rust,no_run
//! use npserver::{ServerBuilder, logs::LoggingOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new_configured().build();
//!     server.init_logging(LoggingOptions::from_config()).await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, LoggingOptions};
pub use server::{Server, ServerBuilder, ServerInfo};
