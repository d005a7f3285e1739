use axum::routing::get;
use axum::Router;

use crate::handlers::public_key;
use crate::state::AppState;

/// Routes mounted at `/users`.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{numeric_user_id}/public-key",
        get(public_key::get_public_key),
    )
}
