#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use api::{router, AppState, Claims, Config};
use database::{generated_image, ticket, Database, NewGeneratedImage};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use storage::{LocalObjectStore, ObjectStore, StorageError};
use studio_core::ImageGenerator;
use tempfile::TempDir;

pub const SECRET: &str = "integration-secret";
pub const ADMIN_TOKEN: &str = "admin-token";

pub struct TestApp {
    pub base: String,
    pub client: Client,
    pub db: Database,
    pub storage_dir: TempDir,
}

pub async fn spawn_app(generator: Arc<dyn ImageGenerator>) -> TestApp {
    spawn_app_with(generator, |_| {}).await
}

pub async fn spawn_app_with(
    generator: Arc<dyn ImageGenerator>,
    configure: impl FnOnce(&mut Config),
) -> TestApp {
    spawn_app_with_store(generator, configure, |local| {
        Arc::new(local) as Arc<dyn ObjectStore>
    })
    .await
}

/// Like [`spawn_app_with`], with the local store wrapped by `store`.
pub async fn spawn_app_with_store(
    generator: Arc<dyn ImageGenerator>,
    configure: impl FnOnce(&mut Config),
    store: impl FnOnce(LocalObjectStore) -> Arc<dyn ObjectStore>,
) -> TestApp {
    let storage_dir = tempfile::tempdir().unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base = format!("http://{addr}");

    let mut config = Config::new(SECRET);
    config.addr = addr;
    config.storage_dir = storage_dir.path().to_path_buf();
    config.public_base_url = base.clone();
    config.admin_token = Some(ADMIN_TOKEN.to_string());
    config.sse_poll_interval = Duration::from_millis(100);
    configure(&mut config);

    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();

    let store = store(LocalObjectStore::new(storage_dir.path(), base.clone()));
    let state = AppState::new(db.clone(), generator, store, config);
    let app = router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base,
        client: Client::new(),
        db,
        storage_dir,
    }
}

/// Object store whose `fail_on`-th upload (1-based) fails; the rest go to `inner`.
pub struct FailingStore {
    inner: LocalObjectStore,
    fail_on: usize,
    puts: AtomicUsize,
}

impl FailingStore {
    pub fn new(inner: LocalObjectStore, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            puts: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for FailingStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> storage::Result<String> {
        let attempt = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == self.fail_on {
            return Err(StorageError::Api {
                status: 503,
                message: "bucket unavailable".to_string(),
            });
        }
        self.inner.put(bucket, key, bytes, content_type).await
    }

    async fn delete(&self, bucket: &str, key: &str) -> storage::Result<()> {
        self.inner.delete(bucket, key).await
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.inner.public_url(bucket, key)
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// A signed access token for `user_id`.
pub fn token(user_id: &str) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 3600,
        aud: "authenticated".to_string(),
        email: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// A small PNG as a data URL.
pub fn photo() -> String {
    let image = image::RgbaImage::from_pixel(64, 48, image::Rgba([200, 120, 80, 255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    image_tools::to_data_url(&buf.into_inner(), "image/png")
}

pub fn portrait_body(user_id: &str) -> Value {
    serde_json::json!({
        "photo": photo(),
        "age": "30대",
        "gender": "female",
        "job": "pilot",
        "style": "watercolor",
        "layout": "upper body",
        "userId": user_id,
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    pub async fn tickets(&self, user_id: &str) -> Option<i64> {
        ticket::get_remaining(self.db.pool(), user_id).await.unwrap()
    }

    pub async fn refunds(&self, user_id: &str) -> usize {
        ticket::ledger(self.db.pool(), user_id)
            .await
            .unwrap()
            .iter()
            .filter(|entry| entry.reason == "refund")
            .count()
    }

    /// Insert a portrait row directly, as another process would.
    pub async fn insert_portrait(&self, id: &str, user_id: &str) {
        generated_image::create(
            self.db.pool(),
            &NewGeneratedImage {
                id: id.to_string(),
                user_id: user_id.to_string(),
                job: "chef".to_string(),
                age: "30".to_string(),
                gender: "male".to_string(),
                style: "anime".to_string(),
                layout: "closeup".to_string(),
                prompt: "prompt".to_string(),
            },
        )
        .await
        .unwrap();
    }

    /// Insert a completed portrait owned by `user_id`.
    pub async fn completed_portrait(&self, id: &str, user_id: &str) {
        self.insert_portrait(id, user_id).await;
        generated_image::mark_completed(self.db.pool(), id, "https://cdn.example/p.png")
            .await
            .unwrap();
    }
}

/// Status code and JSON body.
pub async fn json(response: Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap();
    (status, body)
}
