use coaching_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::factory::sqlite_repositories,
    domain::ports::{AiBackend, ObjectStorage},
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, header},
    response::Response,
    Router,
};
use std::str::FromStr;
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::{json, Value};

pub const TEST_SECRET: &str = "integration-test-secret";

#[derive(Default)]
pub struct MockAiBackend {
    pub fail: AtomicBool,
    pub last_payload: Mutex<Option<Value>>,
}

#[async_trait]
impl AiBackend for MockAiBackend {
    async fn chat(&self, payload: &Value) -> Result<Value, AppError> {
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::UpstreamUnavailable("AI backend unreachable".into()));
        }
        Ok(json!({ "reply": "Mock AI reply" }))
    }
}

#[derive(Default)]
pub struct MockObjectStorage {
    pub fail: AtomicBool,
    pub stored: Mutex<Vec<(String, String, usize)>>,
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn put_object(&self, key: &str, content_type: &str, data: Vec<u8>) -> Result<String, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::UpstreamUnavailable("File storage is unavailable".into()));
        }
        self.stored.lock().unwrap().push((key.to_string(), content_type.to_string(), data.len()));
        Ok(format!("https://cdn.test/{}", key))
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub ai: Arc<MockAiBackend>,
    pub storage: Arc<MockObjectStorage>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            session_secret: TEST_SECRET.to_string(),
            production: false,
            ai_backend_url: "http://localhost".to_string(),
            ai_backend_token: None,
            storage_upload_url: "http://localhost/upload".to_string(),
            storage_public_url: "https://cdn.test".to_string(),
            storage_token: "token".to_string(),
            db_acquire_timeout_secs: 5,
        };

        let ai = Arc::new(MockAiBackend::default());
        let storage = Arc::new(MockObjectStorage::default());

        let state = Arc::new(AppState::assemble(
            config,
            sqlite_repositories(pool.clone()),
            ai.clone(),
            storage.clone(),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            ai,
            storage,
        }
    }

    pub async fn send(&self, method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    /// Registers a user and returns the `auth_session=...` cookie pair plus the response body.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> (String, Value) {
        let response = self.send(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        ).await;

        if !response.status().is_success() {
            let status = response.status();
            panic!("Registration failed in test helper: status {}, body {:?}", status, parse_body(response).await);
        }

        let cookie = session_cookie(&response).expect("No auth_session cookie returned");
        (cookie, parse_body(response).await)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self.send("POST", "/auth/login", None, Some(json!({ "email": email, "password": password }))).await;
        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }
        session_cookie(&response).expect("No auth_session cookie returned")
    }

    /// POSTs `body` with `cookie` and returns the created resource, panicking on failure.
    pub async fn create(&self, uri: &str, cookie: &str, body: Value) -> Value {
        let response = self.send("POST", uri, Some(cookie), Some(body)).await;
        let status = response.status();
        let value = parse_body(response).await;
        if !status.is_success() {
            panic!("POST {} failed: status {}, body {:?}", uri, status, value);
        }
        value
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// Extracts `auth_session=<value>` from the Set-Cookie headers.
#[allow(dead_code)]
pub fn session_cookie(response: &Response) -> Option<String> {
    response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|c| c.starts_with("auth_session="))
        .map(|c| c.split(';').next().unwrap_or(c).to_string())
}

#[allow(dead_code)]
pub async fn parse_body(response: Response) -> Value {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        panic!("Response body is empty. Status: {}", status);
    }
    match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => panic!("Failed to parse JSON: {:?}. Status: {}. Body: {:?}", e, status, String::from_utf8_lossy(&bytes))
    }
}
