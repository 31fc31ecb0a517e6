//! `POST /complete` handler

use super::AppState;
use crate::router::types::{CompletionRequest, CompletionResult};
use crate::router::RouterError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Failure body returned when every model in the chain failed.
///
/// Exhaustion is reported as HTTP 200 with `success: false` so callers
/// can always parse one response shape for routed requests.
#[derive(Debug, Serialize)]
pub struct FailureBody {
    /// Always false
    pub success: bool,
    /// Original error from the primary attempt
    pub error: String,
    /// Primary model that was attempted first
    pub model_attempted: String,
    /// Wall-clock seconds spent before giving up
    pub execution_time: f64,
}

fn validation_error(message: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": message })),
    )
        .into_response()
}

fn validate(request: &CompletionRequest) -> Result<(), Response> {
    if request.messages.is_empty() {
        return Err(validation_error("messages must not be empty"));
    }
    if !(0.0..=1.0).contains(&request.complexity) {
        return Err(validation_error("complexity must be within [0, 1]"));
    }
    if !(0.0..=1.0).contains(&request.urgency) {
        return Err(validation_error("urgency must be within [0, 1]"));
    }
    Ok(())
}

/// Route one completion request through selection, cache and fallback
pub async fn complete(
    State(state): State<AppState>,
    Json(request): Json<CompletionRequest>,
) -> Response {
    if let Err(response) = validate(&request) {
        return response;
    }

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        task = ?request.task_type,
        complexity = request.complexity,
        urgency = request.urgency,
        "Completion request"
    );

    let started = Instant::now();
    match state.router.complete(request).await {
        Ok(result) => success_response(request_id, &result),
        Err(RouterError::NoSuitableModel { task }) => {
            warn!(%request_id, ?task, "No suitable model");
            validation_error(&format!("no suitable model for task {task:?}"))
        }
        Err(RouterError::AllModelsExhausted {
            error,
            model_attempted,
        }) => {
            warn!(%request_id, model = model_attempted, "All models exhausted");
            let body = FailureBody {
                success: false,
                error,
                model_attempted,
                execution_time: started.elapsed().as_secs_f64(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
    }
}

fn success_response(request_id: Uuid, result: &CompletionResult) -> Response {
    info!(
        %request_id,
        model = result.model_used,
        cache_hit = result.cache_hit,
        cost = result.cost_estimate,
        "Completion served"
    );
    (StatusCode::OK, Json(result)).into_response()
}
