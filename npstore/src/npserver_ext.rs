//! Extension of `npserver::Server` with the store API
//!
//! `npserver` does not know about `npstore`: this trait adds the ingest and
//! read routes along with the display page.

use async_trait::async_trait;
use npconfig::get_config;
use npserver::Server;
use tracing::info;

use crate::{DEFAULT_MAX_BODY_BYTES, DisplayPage, StateStore, create_router};

#[async_trait]
pub trait StoreApiExt {
    /// Registers the store routes on the server
    ///
    /// # Registered routes
    ///
    /// - `POST /update`
    /// - `GET /state`
    /// - `GET /nowplaying`
    async fn init_store_api(&mut self, store: StateStore, max_body_bytes: usize) -> StateStore;

    /// Creates the store, registers its routes and the display page (`GET /`)
    ///
    /// Settings are read from `npconfig::Config`
    async fn init_store_api_configured(&mut self) -> anyhow::Result<StateStore>;
}

#[async_trait]
impl StoreApiExt for Server {
    async fn init_store_api(&mut self, store: StateStore, max_body_bytes: usize) -> StateStore {
        self.add_router("/", create_router(store.clone(), max_body_bytes))
            .await;
        info!("Store API ready (body limit {} bytes)", max_body_bytes);
        store
    }

    async fn init_store_api_configured(&mut self) -> anyhow::Result<StateStore> {
        let config = get_config();
        let max_body_bytes = config
            .get_max_body_bytes()
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);
        let store = StateStore::new(&config.get_observer_source()?);

        let store = self.init_store_api(store, max_body_bytes).await;
        self.add_spa::<DisplayPage>("/").await;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use npserver::ServerBuilder;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_routes_and_display_page_are_mounted() {
        let mut server = ServerBuilder::new("Test", "127.0.0.1", 0).build();
        let store = server.init_store_api(StateStore::default(), 1024).await;
        server.add_spa::<DisplayPage>("/").await;
        let router = server.router().await;

        let response = router
            .clone()
            .oneshot(
                Request::post("/update")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"title":"Song"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.read().await.snapshot.title, "Song");

        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("/state"));
    }
}
