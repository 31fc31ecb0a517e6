//! HTTP surface tests over the in-process axum router

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{fast_options, model, Script, ScriptedTransport};
use oxide_router::api::{self, AppState};
use oxide_router::config::Settings;
use oxide_router::router::catalog::ModelCatalog;
use oxide_router::router::types::ModelTier;
use oxide_router::router::SmartRouter;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_settings() -> Settings {
    serde_json::from_value(json!({})).expect("default settings")
}

fn app(scripts: &[(&str, Script)]) -> axum::Router {
    let transport = Arc::new(ScriptedTransport::new(scripts));
    let catalog = ModelCatalog::new(vec![
        model("f/fast", ModelTier::Flash, 0.2),
        model("b/solid", ModelTier::Balanced, 2.0),
    ]);
    let router = Arc::new(SmartRouter::with_transport(
        catalog,
        transport,
        fast_options(),
    ));
    api::router(AppState {
        router,
        settings: Arc::new(test_settings()),
    })
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("handler responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
        .await
        .expect("handler responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn complete_returns_the_routed_result() {
    let app = app(&[("b/solid", Script::Succeed("hello from the router"))]);
    let (status, body) = post_json(
        app,
        "/complete",
        json!({"messages": [{"role": "user", "content": "hi"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["content"], json!("hello from the router"));
    assert_eq!(body["model_used"], json!("b/solid"));
    assert_eq!(body["cache_hit"], json!(false));
    assert!(body["cost_estimate"].is_number());
}

#[tokio::test]
async fn out_of_range_complexity_is_rejected() {
    let app = app(&[]);
    let (status, body) = post_json(
        app,
        "/complete",
        json!({
            "messages": [{"role": "user", "content": "hi"}],
            "complexity": 1.5
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("complexity"));
}

#[tokio::test]
async fn empty_messages_are_rejected() {
    let app = app(&[]);
    let (status, _) = post_json(app, "/complete", json!({"messages": []})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn exhaustion_is_a_parseable_failure_body() {
    let app = app(&[
        ("f/fast", Script::Fail("flash down")),
        ("b/solid", Script::Fail("balanced down")),
    ]);
    let (status, body) = post_json(
        app,
        "/complete",
        json!({
            "messages": [{"role": "user", "content": "hi"}],
            "cost_preference": "cost",
            "complexity": 0.1
        }),
    )
    .await;

    // Exhaustion keeps the 200 path so clients parse one shape
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["model_attempted"], json!("f/fast"));
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("flash down"));
    assert!(body["execution_time"].is_number());
}

#[tokio::test]
async fn health_reports_degraded_without_api_keys() {
    let app = app(&[]);
    let (status, body) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("degraded"));
    assert_eq!(body["api_keys"]["openai"], json!(false));
    assert_eq!(body["cache"]["enabled"], json!(true));
    assert_eq!(body["models"]["total"], json!(2));
    assert_eq!(body["models"]["by_tier"]["flash"], json!(1));
}

#[tokio::test]
async fn analytics_reflects_served_requests() {
    let app = app(&[("b/solid", Script::Succeed("ok"))]);

    let (status, _) = post_json(
        app.clone(),
        "/complete",
        json!({"messages": [{"role": "user", "content": "hi"}]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_json(app, "/analytics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overview"]["total_requests"], json!(1));
    assert_eq!(body["overview"]["available_models"], json!(2));
    assert_eq!(body["model_performance"]["b/solid"]["count"], json!(1));
    assert_eq!(body["recent_activity"].as_array().expect("array").len(), 1);
}
