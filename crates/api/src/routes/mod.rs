pub mod account;
pub mod auth;
pub mod callbacks;
pub mod health;
pub mod profile;
pub mod qr;
pub mod users;
pub mod videos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/signup                         create account (public)
/// /auth/login                          login (public)
/// /auth/refresh                        rotate tokens (public)
/// /auth/logout                         revoke sessions (requires auth)
///
/// /profile/{userId}                    public profile (public)
///
/// /account/profile                     get, update own profile
/// /account/public-key                  set own RSA public key (PUT)
///
/// /users/{numericUserId}/public-key    public key lookup (public)
///
/// /videos                              list (paginated), register
/// /videos/upload-url                   presigned PUT
/// /videos/{videoId}                    get, delete
/// /videos/{videoId}/download-url       presigned GET
/// /videos/{videoId}/watermark          dispatch watermark job (POST)
///
/// /callbacks/watermark                 job result (shared secret)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/account", account::router())
        .nest("/users", users::router())
        .nest("/videos", videos::router())
        .nest("/callbacks", callbacks::router())
}
