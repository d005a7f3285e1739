//! Profile QR images and their object store cache.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_bytes, get, signup};
use sqlx::PgPool;
use saivd_cloud::storage::InMemoryObjectStore;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

#[sqlx::test(migrations = "../../db/migrations")]
async fn qr_is_rendered_once_then_served_from_cache(pool: PgPool) {
    let storage = Arc::new(InMemoryObjectStore::new());
    let app = || common::build_test_app_with(pool.clone(), storage.clone(), None, None);
    let user = signup(app(), "qr@example.com").await;
    let uri = format!("/profile/{}/qr", user.id);

    let response = get(app(), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(response.headers()["cache-control"], "public, max-age=86400");
    let first = body_bytes(response).await;
    assert!(first.starts_with(PNG_MAGIC));

    let key = format!("qr/{}.png", user.id);
    assert!(storage.contains(&key));
    assert_eq!(storage.content_type(&key).as_deref(), Some("image/png"));

    let second = body_bytes(get(app(), &uri).await).await;
    assert_eq!(first, second);
    assert_eq!(storage.put_count(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn qr_still_served_when_cache_write_fails(pool: PgPool) {
    let storage = Arc::new(InMemoryObjectStore::new());
    storage.set_fail_writes(true);
    let app = || common::build_test_app_with(pool.clone(), storage.clone(), None, None);
    let user = signup(app(), "qrfail@example.com").await;

    let response = get(app(), &format!("/profile/{}/qr", user.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.starts_with(PNG_MAGIC));
    assert_eq!(storage.put_count(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn qr_for_unknown_or_invalid_user(pool: PgPool) {
    let id = uuid::Uuid::new_v4();
    let response = get(common::build_test_app(pool.clone()), &format!("/profile/{id}/qr")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(common::build_test_app(pool), "/profile/nope/qr").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
