//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use saivd_core::types::EntityId;

use crate::auth::cookies::{read_cookie, ACCESS_COOKIE};
use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the access token.
///
/// The token is read from `Authorization: Bearer <token>` when that header
/// is present, otherwise from the `saivd_access_token` cookie.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's id (from `claims.sub`), shared with their profile.
    pub user_id: EntityId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match parts.headers.get(AUTHORIZATION) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim().to_string())
                .ok_or_else(|| {
                    AppError::unauthorized(
                        "Invalid Authorization format. Expected: Bearer <token>",
                    )
                })?,
            None => read_cookie(&CookieJar::from_headers(&parts.headers), ACCESS_COOKIE)
                .ok_or_else(|| AppError::unauthorized("Authentication required"))?,
        };

        let claims = validate_token(&token, &state.config.jwt)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}
