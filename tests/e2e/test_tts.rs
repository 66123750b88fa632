use crate::e2e::helpers;

use helpers::{
    fake_engine::{FakeEngine, FRAME_LEN, REJECTED_VOICE},
    test_settings, TestContext,
};
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;
use tts_backend::domain::tts::{GenerateResponse, TtsSettings};
use uuid::Uuid;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_and_download_audio(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/generate",
            &json!({
                "text": "Hello, this is a **test** message for text to speech.",
                "voice": "Joanna"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body: GenerateResponse = response.json().unwrap();
    assert!(Uuid::parse_str(&body.file_id).is_ok());
    assert_eq!(body.download_url, format!("/api/download/{}", body.file_id));
    assert!(body.expires_at > chrono::Utc::now());

    let download = ctx.client.get(&body.download_url).await.unwrap();

    download
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg")
        .assert_header(
            "content-disposition",
            &format!("attachment; filename=\"{}.mp3\"", body.file_id),
        );

    // One segment: the engine's bytes come back untouched
    let cleaned = "Hello, this is a test message for text to speech.";
    assert_eq!(download.body_bytes, FakeEngine::output_for(cleaned));
    assert_eq!(ctx.engine.texts(), vec![cleaned.to_string()]);
}

#[tokio::test]
async fn it_should_join_long_text_into_one_stream() {
    let ctx = TestContext::start(
        TtsSettings {
            max_segment_chars: Some(40),
            // Sequential calls so the recorded texts are in segment order
            synthesis_concurrency: 1,
            ..test_settings()
        },
        FakeEngine::default(),
    )
    .await;
    let text = "The first sentence is here. The second sentence follows it. \
                A third one closes the paragraph. And a fourth for good measure.";

    let response = ctx.client.post("/api/generate", &json!({"text": text})).await.unwrap();

    response.assert_status(StatusCode::OK);
    let body: GenerateResponse = response.json().unwrap();

    let segment_count = ctx.engine.texts().len();
    assert!(segment_count > 1);
    assert_eq!(ctx.engine.texts().concat(), text);

    // Per-segment Info frames are dropped when joining
    let download = ctx.client.get(&body.download_url).await.unwrap();
    download.assert_status(StatusCode::OK);
    assert_eq!(download.body_bytes.len(), segment_count * FRAME_LEN);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/generate", &json!({"text": ""}))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Text cannot be empty");
    assert!(ctx.engine.texts().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_markup_only_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/generate", &json!({"text": "<p></p>\n```\nlet x = 1;\n```"}))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.engine.texts().is_empty());
    assert_eq!(ctx.stored_object_count().await, 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_text_over_limit(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/generate", &json!({"text": "a".repeat(50_001)}))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE)
        .assert_error_message("50000 characters or less");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_text_at_limit(ctx: &TestContext) {
    let text = "word ".repeat(10_000);

    let response = ctx.client.post("/api/generate", &json!({"text": text})).await.unwrap();

    response.assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_pick_voice_from_language_hint(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/generate",
            &json!({"text": "Hola, ¿qué tal?", "language": "es"}),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(ctx.engine.voices(), vec!["Lucia".to_string()]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_detect_language_when_no_hint(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/generate",
            &json!({"text": "Привет! Это проверка синтеза речи на русском языке."}),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(ctx.engine.voices(), vec!["Tatyana".to_string()]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_store_nothing_when_synthesis_fails(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/generate",
            &json!({"text": "This will not work.", "voice": REJECTED_VOICE}),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_message("External service error");
    assert_eq!(ctx.stored_object_count().await, 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_file(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("/api/download/{}", Uuid::new_v4()))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("File not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_malformed_file_id(ctx: &TestContext) {
    let response = ctx.client.get("/api/download/not-a-uuid").await.unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_issue_distinct_ids_for_identical_requests(ctx: &TestContext) {
    let request = json!({"text": "Same text twice."});

    let first: GenerateResponse = ctx.client.post("/api/generate", &request).await.unwrap().json().unwrap();
    let second: GenerateResponse = ctx.client.post("/api/generate", &request).await.unwrap().json().unwrap();

    assert_ne!(first.file_id, second.file_id);
    assert_eq!(ctx.stored_object_count().await, 2);
}
