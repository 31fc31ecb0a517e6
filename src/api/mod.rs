//! HTTP interface
//!
//! Three routes over one shared [`AppState`]: `POST /complete` runs a
//! routed completion, `GET /analytics` reports usage aggregates and
//! `GET /health` reports readiness.

pub mod analytics;
pub mod complete;
pub mod health;

use crate::config::Settings;
use crate::router::SmartRouter;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// The routing engine
    pub router: Arc<SmartRouter>,
    /// Loaded settings, used by health reporting
    pub settings: Arc<Settings>,
}

/// Build the service router with tracing and permissive CORS
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/complete", post(complete::complete))
        .route("/analytics", get(analytics::analytics))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
