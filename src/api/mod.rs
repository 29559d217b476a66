//! HTTP API.
//!
//! Routes:
//! - `POST /api/upload?filename=ids.txt` raw file body, returns a session id
//! - `GET  /api/dashboard/:session_id` aggregated statistics
//! - `GET  /api/dashboard/:session_id/experts` paginated records
//! - `GET  /api/health`

pub mod handlers;
pub mod response;

use crate::service::DashboardService;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DashboardService>,
}

impl AppState {
    pub fn new(service: DashboardService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build the router with every route mounted.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/upload", post(handlers::upload))
        .route("/api/dashboard/:session_id", get(handlers::dashboard))
        .route("/api/dashboard/:session_id/experts", get(handlers::experts))
        .route("/api/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
