use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;
use tts_backend::domain::tts::{LanguageCode, VoicesResponse};

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_all_voices(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body: VoicesResponse = response.json().unwrap();
    let ids: Vec<_> = body.voices.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["Joanna", "Matthew", "Lucia", "Tatyana"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_filter_voices_by_language(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices?language=en").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body: VoicesResponse = response.json().unwrap();
    assert_eq!(body.voices.len(), 2);
    assert!(body
        .voices
        .iter()
        .all(|v| v.locale.as_deref().is_some_and(|l| l.starts_with("en"))));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_empty_list_for_unknown_language(ctx: &TestContext) {
    let response = ctx.client.get("/api/voices?language=ja").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body: VoicesResponse = response.json().unwrap();
    assert!(body.voices.is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_preview_a_voice_inline(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/api/preview?voice=Tatyana&language=ru")
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg")
        .assert_header("content-disposition", "inline; filename=preview.mp3");
    assert!(!response.body_bytes.is_empty());

    assert_eq!(ctx.engine.voices(), vec!["Tatyana".to_string()]);
    assert_eq!(
        ctx.engine.texts(),
        vec![LanguageCode::Russian.preview_phrase().to_string()]
    );
    assert_eq!(ctx.stored_object_count().await, 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_preview_for_rejected_voice(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("/api/preview?voice={}", helpers::fake_engine::REJECTED_VOICE))
        .await
        .unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    // Terminal provider errors are not retried
    assert_eq!(ctx.engine.texts().len(), 1);
}
