use npserver::{LoggingOptions, ServerBuilder};
use npstore::StoreApiExt;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1: Infrastructure ==========

    let mut server = ServerBuilder::new_configured().build();
    server.init_logging(LoggingOptions::from_config()).await;

    let config = npconfig::get_config();
    info!("📁 Configuration directory: {}", config.directory());

    server
        .add_route("/info", || async {
            serde_json::json!({
                "name": "NowPlaying",
                "version": env!("CARGO_PKG_VERSION"),
            })
        })
        .await;

    // ========== PHASE 2: Store and display page ==========

    info!("🎵 Registering now-playing store...");
    server.init_store_api_configured().await?;

    // ========== PHASE 3: Server startup ==========

    info!("🌐 Starting HTTP server...");
    let addr = server.start().await?;

    info!("✅ NowPlaying is ready at http://{}", addr);
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
