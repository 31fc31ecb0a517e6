//! `GET /analytics` handler

use super::AppState;
use crate::router::analytics::AnalyticsReport;
use axum::extract::State;
use axum::Json;
use tracing::debug;

/// Report usage aggregates since startup
pub async fn analytics(State(state): State<AppState>) -> Json<AnalyticsReport> {
    debug!("Analytics requested");
    Json(state.router.analytics())
}
