//! # Server module - high-level API over Axum
//!
//! This module hides Axum setup and routing behind a `Server` that domain
//! crates extend before starting it.

use crate::logs::{LogState, LoggingOptions, create_logs_router, init_logging, log_dump};
use axum::handler::Handler;
use axum::routing::get;
use axum::{Json, Router};
use axum_embed::ServeEmbed;
use npconfig::get_config;
use rust_embed::RustEmbed;
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal, sync::RwLock, task::JoinHandle};
use tracing::{error, info};

/// Serializable server info
#[derive(Clone, Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub base_url: String,
    pub bind_address: String,
    pub http_port: u16,
}

/// Main server
pub struct Server {
    name: String,
    base_url: String,
    bind_address: String,
    http_port: u16,
    router: Arc<RwLock<Router>>,
    join_handle: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
    log_state: Option<LogState>,
}

impl Server {
    /// Creates a new server instance
    ///
    /// # Arguments
    ///
    /// * `name` - Server name (for logs)
    /// * `base_url` - Base URL (e.g. "http://127.0.0.1:27123")
    /// * `bind_address` - Listen address (e.g. "127.0.0.1")
    /// * `http_port` - HTTP port to listen on, 0 for an ephemeral port
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        bind_address: impl Into<String>,
        http_port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            bind_address: bind_address.into(),
            http_port,
            router: Arc::new(RwLock::new(Router::new())),
            join_handle: None,
            local_addr: None,
            log_state: None,
        }
    }

    pub fn new_configured() -> Self {
        ServerBuilder::new_configured().build()
    }

    /// Adds a dynamic JSON route
    ///
    /// The closure is called on every GET request to the path.
    ///
    /// ```rust,no_run
    /// # use npserver::Server;
    /// # #[tokio::main]
    /// # async fn main() {
    /// # let mut server = Server::new("Test", "http://127.0.0.1:3000", "127.0.0.1", 3000);
    /// server.add_route("/api/status", || async {
    ///     serde_json::json!({"status": "online"})
    /// }).await;
    /// # }
    /// ```
    pub async fn add_route<F, Fut, T>(&mut self, path: &str, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let f = Arc::new(f);
        let handler = move || {
            let f = f.clone();
            async move { Json(f().await) }
        };

        self.merge(Router::new().route(path, get(handler))).await;
    }

    /// Adds a stateful GET handler
    pub async fn add_handler_with_state<H, T, S>(&mut self, path: &str, handler: H, state: S)
    where
        H: Handler<T, S> + Clone + 'static,
        T: 'static,
        S: Clone + Send + Sync + 'static,
    {
        let route = Router::new().route(path, get(handler)).with_state(state);
        self.merge(route).await;
    }

    /// Adds an embedded page served as a Single Page Application
    ///
    /// Every unrouted path returns `index.html`.
    pub async fn add_spa<E>(&mut self, path: &str)
    where
        E: RustEmbed + Clone + Send + Sync + 'static,
    {
        let serve = ServeEmbed::<E>::with_parameters(
            Some("index.html".to_string()),
            axum_embed::FallbackBehavior::Ok,
            Some("index.html".to_string()),
        );

        let route = Router::new().fallback_service(serve);
        if path == "/" {
            self.merge(route).await;
        } else {
            self.add_router(path, route).await;
        }
    }

    /// Adds a sub-router to the server
    ///
    /// - If `path` is "/", merges into the main router
    /// - Otherwise nests the router under the given path
    pub async fn add_router(&mut self, path: &str, sub_router: Router) {
        if path == "/" {
            self.merge(sub_router).await;
            return;
        }

        let normalized = format!("/{}", path.trim_start_matches('/'));
        let mut r = self.router.write().await;
        *r = std::mem::take(&mut *r).nest(&normalized, sub_router);
    }

    async fn merge(&mut self, route: Router) {
        let mut r = self.router.write().await;
        *r = std::mem::take(&mut *r).merge(route);
    }

    /// Copy of the current router, for tests through `tower::ServiceExt`
    pub async fn router(&self) -> Router {
        self.router.read().await.clone()
    }

    /// Starts the HTTP server
    ///
    /// The socket is bound before returning, so bind errors surface here and
    /// the effective port is known. Ctrl+C triggers a graceful shutdown.
    pub async fn start(&mut self) -> anyhow::Result<SocketAddr> {
        let listener = TcpListener::bind((self.bind_address.as_str(), self.http_port)).await?;
        let local_addr = listener.local_addr()?;
        info!(
            "Server {} running at http://{} (base url {})",
            self.name, local_addr, self.base_url
        );

        let router = self.router.read().await.clone();
        let name = self.name.clone();
        self.join_handle = Some(tokio::spawn(async move {
            let shutdown = async {
                match signal::ctrl_c().await {
                    Ok(()) => info!("Ctrl+C received, shutting down gracefully"),
                    Err(e) => {
                        error!("Failed to listen for Ctrl+C: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            if let Err(e) = axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("Server {} stopped with error: {}", name, e);
            }
        }));

        self.local_addr = Some(local_addr);
        Ok(local_addr)
    }

    /// Waits for the server to finish
    pub async fn wait(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.await;
        }
    }

    /// Address actually listened on, once the server is started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Returns the server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            bind_address: self.bind_address.clone(),
            http_port: self.http_port,
        }
    }

    /// Initializes logging and registers the log routes
    ///
    /// Registered routes: `GET /log-dump` and `GET|POST /api/log_setup`.
    pub async fn init_logging(&mut self, options: LoggingOptions) {
        let log_state = init_logging(options);

        self.add_handler_with_state("/log-dump", log_dump, log_state.clone())
            .await;
        self.add_router("/api", create_logs_router(log_state.clone()))
            .await;

        self.log_state = Some(log_state);
    }

    pub fn log_state(&self) -> Option<&LogState> {
        self.log_state.as_ref()
    }
}

/// Builder pattern
pub struct ServerBuilder {
    name: String,
    base_url: String,
    bind_address: String,
    http_port: u16,
}

impl ServerBuilder {
    pub fn new(name: impl Into<String>, bind_address: impl Into<String>, http_port: u16) -> Self {
        let bind_address = bind_address.into();
        Self {
            name: name.into(),
            base_url: format!("http://{}:{}", bind_address, http_port),
            bind_address,
            http_port,
        }
    }

    pub fn new_configured() -> Self {
        let config = get_config();
        Self {
            name: "NowPlaying-Server".to_string(),
            base_url: config.get_base_url(),
            bind_address: config.get_bind_address(),
            http_port: config.get_http_port(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the server
    pub fn build(self) -> Server {
        Server::new(self.name, self.base_url, self.bind_address, self.http_port)
    }
}
