//! HTTP routes of the store: ingest and read of the shared state.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::{Method, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use npmodel::SnapshotPatch;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, warn};

use crate::StateStore;

/// Creates the store router
///
/// # Routes
///
/// - `POST /update`: merges the received patch, answers `{"ok": true}`
/// - `GET /state` and `GET /nowplaying`: full record
///
/// Bodies larger than `max_body_bytes` are refused (413) before any merge.
/// Every origin is allowed.
pub fn create_router(store: StateStore, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/update", post(update))
        .route("/state", get(state))
        .route("/nowplaying", get(state))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors_layer())
        .with_state(store)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn update(
    State(store): State<StateStore>,
    payload: Result<Json<SnapshotPatch>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(patch)) => {
            let record = store.ingest(&patch).await;
            debug!(
                "Update merged: {} at {}s",
                record.snapshot.title, record.snapshot.position_seconds
            );
            Json(json!({ "ok": true })).into_response()
        }
        Err(rejection) => {
            let status = rejection.status();
            let error = rejection.body_text();
            warn!("Rejected update ({}): {}", status, error);
            (status, Json(json!({ "ok": false, "error": error }))).into_response()
        }
    }
}

async fn state(State(store): State<StateStore>) -> impl IntoResponse {
    Json(store.read().await)
}
