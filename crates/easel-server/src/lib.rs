//! Easel Canvas Store
//!
//! A small HTTP service that keeps serialized designs in memory, keyed by
//! name. Designs are stored exactly as received and never interpreted.
//!
//! ## Protocol
//!
//! All routes live under `/api/canvas`:
//! ```text
//! POST   /save          { "name": "...", "data": { ... } }  -> { "message": "..." }
//! GET    /get/{name}                                       -> { "data": { ... } } | 404
//! GET    /list                                             -> { "names": [ ... ] }
//! DELETE /delete/{name}                                    -> { "message": "..." }
//! ```

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Prefix every canvas route hangs off.
pub const API_PREFIX: &str = "/api/canvas";

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub name: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadResponse {
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub names: Vec<String>,
}

/// Shared application state
#[derive(Clone, Default)]
pub struct AppState {
    designs: Arc<DashMap<String, serde_json::Value>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<serde_json::Value> {
        self.designs.get(name).map(|entry| entry.value().clone())
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.designs.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }
}

fn message(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(MessageResponse { message: text.into() })).into_response()
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/save", post(save))
        .route("/get/{name}", get(load))
        .route("/list", get(list))
        .route("/delete/{name}", delete(remove));

    Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already bound listener until the task is dropped.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Canvas store listening on {}", addr);
    }
    axum::serve(listener, router(state)).await
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

/// `POST /api/canvas/save`: store a design, replacing any previous one.
async fn save(State(state): State<AppState>, Json(req): Json<SaveRequest>) -> Response {
    if req.name.trim().is_empty() {
        warn!("Rejected save without a name");
        return message(StatusCode::BAD_REQUEST, "Name is required");
    }
    if req.name == "." || req.name == ".." {
        warn!("Rejected save under unaddressable name {:?}", req.name);
        return message(StatusCode::BAD_REQUEST, "Name cannot be a path segment like . or ..");
    }
    let replaced = state.designs.insert(req.name.clone(), req.data).is_some();
    info!("Saved design {:?} (replaced: {})", req.name, replaced);
    message(StatusCode::OK, format!("Saved design {:?}", req.name))
}

/// `GET /api/canvas/get/{name}`
async fn load(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.get(&name) {
        Some(data) => Json(LoadResponse { data }).into_response(),
        None => message(StatusCode::NOT_FOUND, format!("No design named {:?}", name)),
    }
}

/// `GET /api/canvas/list`
async fn list(State(state): State<AppState>) -> Json<ListResponse> {
    Json(ListResponse {
        names: state.names(),
    })
}

/// `DELETE /api/canvas/delete/{name}`. Deleting an unknown name succeeds.
async fn remove(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    if state.designs.remove(&name).is_some() {
        info!("Deleted design {:?}", name);
    }
    message(StatusCode::OK, "Canvas deleted")
}
