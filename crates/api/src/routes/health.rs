//! Liveness probe mounted at `/health`, outside the `/api` prefix.
//!
//! Reports the database round trip and which optional integrations this
//! instance was started with. An unreachable database turns the response
//! into a 503 so load balancers drain the instance.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub integrations: Integrations,
}

#[derive(Debug, Serialize)]
pub struct Integrations {
    pub watermark: bool,
    pub email: bool,
    pub callback_secret: bool,
}

async fn service_health(State(state): State<AppState>) -> (StatusCode, Json<ServiceHealth>) {
    let db_healthy = match saivd_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    let report = ServiceHealth {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        integrations: Integrations {
            watermark: state.watermark.is_some(),
            email: state.mailer.is_some(),
            callback_secret: state.config.watermark_callback_secret.is_some(),
        },
    };
    let code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(service_health))
}
