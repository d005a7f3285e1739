//! Route definitions for the signed-in user's own records.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{profile, public_key};
use crate::state::AppState;

/// Routes mounted at `/account`. All require auth.
///
/// ```text
/// GET  /profile     -> get_account_profile
/// PUT  /profile     -> update_account_profile
/// PUT  /public-key  -> put_public_key
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(profile::get_account_profile).put(profile::update_account_profile),
        )
        .route("/public-key", put(public_key::put_public_key))
}
