use axum::routing::get;
use axum::Router;

use crate::handlers::qr;
use crate::state::AppState;

/// Root-level QR route (`/profile/{userId}/qr`), outside `/api` so the
/// image URL matches the profile page URL it encodes.
pub fn router() -> Router<AppState> {
    Router::new().route("/profile/{user_id}/qr", get(qr::get_profile_qr))
}
