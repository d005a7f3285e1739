//! Watermark client and queue cleanup against a throw-away HTTP server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use saivd_cloud::watermark::{DispatchRequest, WatermarkClient, WatermarkConfig};

// ---------------------------------------------------------------------------
// Mock service
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Mock {
    /// Status code and raw body returned by `/queue_status/{id}`.
    queue_response: (StatusCode, String),
    calls: Arc<Mutex<Vec<String>>>,
    cleared: Arc<Mutex<Vec<Value>>>,
}

impl Mock {
    fn new(status: StatusCode, body: &str) -> Self {
        Self {
            queue_response: (status, body.to_string()),
            calls: Arc::default(),
            cleared: Arc::default(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn cleared(&self) -> Vec<Value> {
        self.cleared.lock().unwrap().clone()
    }
}

async fn queue_status(State(mock): State<Mock>, Path(user_id): Path<i64>) -> (StatusCode, String) {
    mock.calls.lock().unwrap().push(format!("queue_status/{user_id}"));
    mock.queue_response.clone()
}

async fn clear_queue(State(mock): State<Mock>, Json(body): Json<Value>) -> StatusCode {
    mock.calls.lock().unwrap().push("clear_queue".into());
    mock.cleared.lock().unwrap().push(body);
    StatusCode::OK
}

async fn dispatch(State(mock): State<Mock>, Json(body): Json<Value>) -> Json<Value> {
    mock.calls
        .lock()
        .unwrap()
        .push(format!("watermark/{}", body["video_id"].as_str().unwrap_or_default()));
    Json(json!({ "jobId": "job-42" }))
}

async fn spawn(mock: Mock) -> WatermarkClient {
    let app = Router::new()
        .route("/queue_status/{user_id}", get(queue_status))
        .route("/clear_queue", post(clear_queue))
        .route("/watermark", post(dispatch))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = WatermarkConfig::new(format!("http://{addr}/"), Duration::from_secs(2));
    WatermarkClient::new(&config).unwrap()
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clears_only_jobs_for_target_video() {
    let mock = Mock::new(StatusCode::OK, r#"{"jobID":["a","b"],"videoId":["v1","v2"]}"#);
    let client = spawn(mock.clone()).await;

    client.clear_jobs_for_video(7, "v1").await;

    assert_eq!(mock.calls(), ["queue_status/7", "clear_queue"]);
    assert_eq!(mock.cleared(), [json!({ "user_id": 7, "job_ids": ["a"] })]);
}

#[tokio::test]
async fn no_match_never_calls_clear() {
    let mock = Mock::new(StatusCode::OK, r#"{"jobID":["a","b"],"videoId":["v1","v2"]}"#);
    let client = spawn(mock.clone()).await;

    client.clear_jobs_for_video(7, "v9").await;

    assert_eq!(mock.calls(), ["queue_status/7"]);
    assert!(mock.cleared().is_empty());
}

#[tokio::test]
async fn blank_video_id_makes_no_request() {
    let mock = Mock::new(StatusCode::OK, r#"{"jobID":["a"],"videoId":[""]}"#);
    let client = spawn(mock.clone()).await;

    client.clear_jobs_for_video(7, "   ").await;

    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn missing_video_ids_is_a_no_op() {
    let mock = Mock::new(StatusCode::OK, r#"{"jobID":["a","b"]}"#);
    let client = spawn(mock.clone()).await;

    client.clear_jobs_for_video(7, "v1").await;

    assert_eq!(mock.calls(), ["queue_status/7"]);
}

#[tokio::test]
async fn error_status_is_swallowed() {
    let mock = Mock::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let client = spawn(mock.clone()).await;

    client.clear_jobs_for_video(7, "v1").await;

    assert_eq!(mock.calls(), ["queue_status/7"]);
    assert!(client.queue_status(7).await.is_err());
}

#[tokio::test]
async fn malformed_json_is_swallowed() {
    let mock = Mock::new(StatusCode::OK, "{not json");
    let client = spawn(mock.clone()).await;

    client.clear_jobs_for_video(7, "v1").await;

    assert!(mock.cleared().is_empty());
}

#[tokio::test]
async fn unreachable_service_is_swallowed() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = WatermarkConfig::new(format!("http://{addr}"), Duration::from_millis(500));
    let client = WatermarkClient::new(&config).unwrap();

    client.clear_jobs_for_video(7, "v1").await;
    assert!(client.queue_status(7).await.is_err());
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dispatch_returns_job_id() {
    let mock = Mock::new(StatusCode::OK, "{}");
    let client = spawn(mock.clone()).await;

    let job_id = client
        .dispatch(&DispatchRequest {
            user_id: 7,
            video_id: "v1".into(),
            video_url: "http://objects.local/videos/v1.mp4".into(),
            callback_url: "http://localhost:3000/api/callbacks/watermark".into(),
        })
        .await
        .unwrap();

    assert_eq!(job_id.as_deref(), Some("job-42"));
    assert_eq!(mock.calls(), ["watermark/v1"]);
}
