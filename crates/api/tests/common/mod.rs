#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::{self, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use saivd_api::auth::jwt::JwtConfig;
use saivd_api::config::ServerConfig;
use saivd_api::router::build_app_router;
use saivd_api::state::AppState;
use saivd_cloud::storage::InMemoryObjectStore;
use saivd_cloud::watermark::{WatermarkClient, WatermarkConfig};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "http://localhost:3000".to_string(),
        cookie_secure: false,
        watermark_callback_secret: None,
        jwt: JwtConfig {
            secret: "test-secret-key-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Full application router over an in-memory object store, with no
/// watermark service or mailer.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(InMemoryObjectStore::new()), None, None)
}

/// Full application router with explicit integrations.
pub fn build_test_app_with(
    pool: PgPool,
    storage: Arc<InMemoryObjectStore>,
    watermark: Option<WatermarkClient>,
    callback_secret: Option<&str>,
) -> Router {
    let mut config = test_config();
    config.watermark_callback_secret = callback_secret.map(str::to_string);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage,
        watermark,
        mailer: None,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, json_request("POST", uri, None, &body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request("POST", uri, Some(token), &body)).await
}

pub async fn post_with_headers(
    app: Router,
    uri: &str,
    body: Value,
    headers: &[(&str, &str)],
) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, json_request("PUT", uri, Some(token), &body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// A signed-up user as returned by `POST /api/auth/signup`.
pub struct TestUser {
    pub id: String,
    pub numeric_user_id: i64,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign up `email` with [`TEST_PASSWORD`] through the API.
pub async fn signup(app: Router, email: &str) -> TestUser {
    let body = json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    TestUser {
        id: data["user"]["id"].as_str().unwrap().to_string(),
        numeric_user_id: data["user"]["numeric_user_id"].as_i64().unwrap(),
        email: data["user"]["email"].as_str().unwrap().to_string(),
        access_token: data["access_token"].as_str().unwrap().to_string(),
        refresh_token: data["refresh_token"].as_str().unwrap().to_string(),
    }
}

/// Register a video for `user` and return its JSON representation.
pub async fn create_video(app: Router, user: &TestUser, title: &str) -> Value {
    let video_id = uuid::Uuid::new_v4().to_string();
    let body = json!({
        "video_id": video_id,
        "title": title,
        "content_type": "video/mp4",
        "file_size": 1024,
    });
    let response = post_json_auth(app, "/api/videos", body, &user.access_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Mock watermark service
// ---------------------------------------------------------------------------

/// Records every call made to the mock watermark service.
#[derive(Clone, Default)]
pub struct WatermarkMock {
    /// Return 500 from `POST /watermark` when set.
    pub fail_dispatch: bool,
    /// Accept dispatches without reporting a `jobId`.
    pub omit_job_id: bool,
    /// `jobID` / `videoId` served by `/queue_status/{id}`.
    pub queue: Arc<Mutex<(Vec<String>, Vec<String>)>>,
    pub dispatched: Arc<Mutex<Vec<Value>>>,
    pub cleared: Arc<Mutex<Vec<Value>>>,
}

impl WatermarkMock {
    pub fn dispatched(&self) -> Vec<Value> {
        self.dispatched.lock().unwrap().clone()
    }

    pub fn cleared(&self) -> Vec<Value> {
        self.cleared.lock().unwrap().clone()
    }

    pub fn queue_job(&self, job_id: &str, video_id: &str) {
        let mut queue = self.queue.lock().unwrap();
        queue.0.push(job_id.to_string());
        queue.1.push(video_id.to_string());
    }
}

async fn mock_dispatch(
    State(mock): State<WatermarkMock>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if mock.fail_dispatch {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
    }
    mock.dispatched.lock().unwrap().push(body);
    if mock.omit_job_id {
        return (StatusCode::OK, Json(json!({ "status": "queued" })));
    }
    (StatusCode::OK, Json(json!({ "jobId": "job-1" })))
}

async fn mock_queue_status(
    State(mock): State<WatermarkMock>,
    Path(_user_id): Path<i64>,
) -> Json<Value> {
    let queue = mock.queue.lock().unwrap().clone();
    Json(json!({ "jobID": queue.0, "videoId": queue.1 }))
}

async fn mock_clear_queue(State(mock): State<WatermarkMock>, Json(body): Json<Value>) -> StatusCode {
    mock.cleared.lock().unwrap().push(body);
    StatusCode::OK
}

/// Serve `mock` on an ephemeral port and return a client pointed at it.
pub async fn spawn_watermark_service(mock: WatermarkMock) -> WatermarkClient {
    let app = Router::new()
        .route("/watermark", post(mock_dispatch))
        .route("/queue_status/{user_id}", routing::get(mock_queue_status))
        .route("/clear_queue", post(mock_clear_queue))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = WatermarkConfig::new(format!("http://{addr}"), Duration::from_secs(2));
    WatermarkClient::new(&config).unwrap()
}

/// Poll `check` until it holds or two seconds pass. Background work
/// spawned by handlers finishes after the response is sent.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..40 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    check()
}
