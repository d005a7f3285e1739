//! Handlers for the per-user RSA public key directory.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use saivd_core::error::CoreError;
use saivd_core::keys::validate_rsa_public_pem;
use saivd_core::types::{EntityId, NumericUserId};
use saivd_core::validation::parse_numeric_user_id;
use saivd_db::repositories::ProfileRepo;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PublicKeyRequest {
    /// SPKI or PKCS#1 PEM.
    pub rsa_public: String,
}

#[derive(Debug, Serialize)]
pub struct PublicKeyResponse {
    pub numeric_user_id: NumericUserId,
    pub user_id: EntityId,
    pub rsa_public: String,
}

/// GET /api/users/{numericUserId}/public-key
pub async fn get_public_key(
    State(state): State<AppState>,
    Path(numeric_user_id): Path<String>,
) -> AppResult<Json<DataResponse<PublicKeyResponse>>> {
    let numeric_user_id = parse_numeric_user_id(&numeric_user_id)?;
    let profile = ProfileRepo::find_by_numeric_id(&state.pool, numeric_user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User"))?;
    let rsa_public = profile
        .rsa_public
        .ok_or_else(|| CoreError::not_found("Public key"))?;

    Ok(Json(DataResponse::new(PublicKeyResponse {
        numeric_user_id: profile.numeric_user_id,
        user_id: profile.id,
        rsa_public,
    })))
}

/// PUT /api/account/public-key
///
/// Replace the caller's public key after checking it parses as RSA of at
/// least 2048 bits.
pub async fn put_public_key(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<PublicKeyRequest>,
) -> AppResult<Json<DataResponse<PublicKeyResponse>>> {
    let pem = validate_rsa_public_pem(&input.rsa_public)?;
    let profile = ProfileRepo::set_public_key(&state.pool, auth_user.user_id, &pem)
        .await?
        .ok_or_else(|| CoreError::not_found("User"))?;
    tracing::info!(user_id = %profile.id, "Public key updated");

    Ok(Json(DataResponse::new(PublicKeyResponse {
        numeric_user_id: profile.numeric_user_id,
        user_id: profile.id,
        rsa_public: pem,
    })))
}
