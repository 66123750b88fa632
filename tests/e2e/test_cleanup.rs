use crate::e2e::helpers;

use helpers::{fake_engine::FakeEngine, test_settings, TestContext};
use hyper::StatusCode;
use serde_json::json;
use std::time::Duration;
use test_context::test_context;
use tts_backend::domain::tts::{CleanupResponse, GenerateResponse, TtsSettings};

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_fresh_artifacts(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/generate", &json!({"text": "Keep me around."}))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let response = ctx.client.delete("/api/cleanup").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body: CleanupResponse = response.json().unwrap();
    assert_eq!(body.deleted, 0);
    assert_eq!(body.message, "Cleanup completed");
    assert_eq!(ctx.stored_object_count().await, 1);
}

#[tokio::test]
async fn it_should_delete_expired_artifacts_and_then_404() {
    let ctx = TestContext::start(
        TtsSettings {
            retention: Duration::ZERO,
            ..test_settings()
        },
        FakeEngine::default(),
    )
    .await;

    let mut file_ids = Vec::new();
    for text in ["First artifact.", "Second artifact."] {
        let response = ctx.client.post("/api/generate", &json!({"text": text})).await.unwrap();
        response.assert_status(StatusCode::OK);
        let body: GenerateResponse = response.json().unwrap();
        file_ids.push(body.file_id);
    }

    // Zero retention: anything written before the sweep starts is expired
    tokio::time::sleep(Duration::from_millis(20)).await;

    let response = ctx.client.delete("/api/cleanup").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body: CleanupResponse = response.json().unwrap();
    assert_eq!(body.deleted, 2);
    assert_eq!(ctx.stored_object_count().await, 0);

    for file_id in file_ids {
        let response = ctx.client.get(&format!("/api/download/{}", file_id)).await.unwrap();
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_zero_for_empty_bucket(ctx: &TestContext) {
    let response = ctx.client.delete("/api/cleanup").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body: CleanupResponse = response.json().unwrap();
    assert_eq!(body.deleted, 0);
}
