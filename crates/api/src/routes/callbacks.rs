use axum::routing::post;
use axum::Router;

use crate::handlers::watermark;
use crate::state::AppState;

/// Routes mounted at `/callbacks`, called by external services.
pub fn router() -> Router<AppState> {
    Router::new().route("/watermark", post(watermark::watermark_callback))
}
