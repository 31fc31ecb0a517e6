//! Concurrency: identical requests racing for one cache slot

mod common;

use common::{fast_options, model, request, user_message, Script, ScriptedTransport};
use futures_util::future::join_all;
use oxide_router::router::catalog::ModelCatalog;
use oxide_router::router::types::ModelTier;
use oxide_router::router::SmartRouter;
use std::sync::Arc;

#[tokio::test]
async fn racing_identical_requests_leave_one_cache_entry() {
    let transport = Arc::new(ScriptedTransport::new(&[(
        "f/only",
        Script::Succeed("shared answer"),
    )]));
    let catalog = ModelCatalog::new(vec![model("f/only", ModelTier::Flash, 0.2)]);
    let router = Arc::new(SmartRouter::with_transport(
        catalog,
        transport.clone(),
        fast_options(),
    ));

    let tasks = (0..16).map(|_| {
        let router = router.clone();
        async move { router.complete(request(user_message("same prompt"))).await }
    });
    let results = join_all(tasks).await;

    for result in results {
        let result = result.expect("every request completes");
        assert_eq!(result.content, "shared answer");
        assert_eq!(result.model_used, "f/only");
    }

    // Concurrent misses may each hit the transport, but the cache
    // converges on a single entry for the shared key.
    router.cache().sync().await;
    assert_eq!(router.cache().entry_count(), 1);
    assert!(transport.call_count() >= 1);
    assert!(transport.call_count() <= 16);

    // A follow-up request is now a pure cache hit
    let after = router
        .complete(request(user_message("same prompt")))
        .await
        .expect("completes");
    assert!(after.cache_hit);
}

#[tokio::test]
async fn concurrent_distinct_prompts_each_get_entries() {
    let transport = Arc::new(ScriptedTransport::new(&[(
        "f/only",
        Script::Succeed("answer"),
    )]));
    let catalog = ModelCatalog::new(vec![model("f/only", ModelTier::Flash, 0.2)]);
    let router = Arc::new(SmartRouter::with_transport(
        catalog,
        transport.clone(),
        fast_options(),
    ));

    let tasks = (0..8).map(|i| {
        let router = router.clone();
        async move {
            router
                .complete(request(user_message(&format!("prompt {i}"))))
                .await
        }
    });
    for result in join_all(tasks).await {
        assert!(result.expect("completes").success);
    }

    router.cache().sync().await;
    assert_eq!(router.cache().entry_count(), 8);
    assert_eq!(transport.call_count(), 8);
}
