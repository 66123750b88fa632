use object_store::memory::InMemory;
use object_store::ObjectStore;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use tts_backend::domain::tts::{RetryPolicy, TextNormalizer, TtsService, TtsSettings};
use tts_backend::infrastructure::http::build_router;
use tts_backend::infrastructure::repositories::ObjectStoreAudioRepository;

pub mod api_client;
pub mod fake_engine;

use api_client::TestClient;
use fake_engine::FakeEngine;

pub const TEST_BUCKET: &str = "tts-audio";

pub struct TestContext {
    pub client: TestClient,
    pub engine: Arc<FakeEngine>,
    pub store: Arc<InMemory>,
}

/// Settings tuned for tests: fast retries, no voice cache
pub fn test_settings() -> TtsSettings {
    TtsSettings {
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(5),
        },
        voice_cache_enabled: false,
        ..TtsSettings::default()
    }
}

impl TestContext {
    /// Start a server with custom pipeline settings and engine
    pub async fn start(settings: TtsSettings, engine: FakeEngine) -> Self {
        let engine = Arc::new(engine);
        let store = Arc::new(InMemory::new());
        let storage = Arc::new(ObjectStoreAudioRepository::new(
            store.clone() as Arc<dyn ObjectStore>,
            TEST_BUCKET,
        ));

        let tts_service = Arc::new(TtsService::new(
            engine.clone(),
            storage,
            TextNormalizer::default(),
            settings,
        ));
        let app = build_router(tts_service);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: TestClient::new(&base_url),
            engine,
            store,
        }
    }

    /// Number of objects currently in the bucket
    #[allow(dead_code)]
    pub async fn stored_object_count(&self) -> usize {
        use futures::TryStreamExt;

        let objects: Vec<_> = self.store.list(None).try_collect().await.unwrap();
        objects.len()
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async { Self::start(test_settings(), FakeEngine::default()).await }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // In-memory storage is dropped with the context
        }
    }
}
