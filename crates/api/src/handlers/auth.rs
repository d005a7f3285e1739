//! Handlers for the `/auth` resource (signup, login, refresh, logout).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use saivd_core::error::CoreError;
use saivd_core::profile::{default_display_name, normalize_email};
use saivd_core::qr::profile_url;
use saivd_core::types::{EntityId, NumericUserId};
use saivd_db::models::session::CreateSession;
use saivd_db::models::user::{CreateUser, User};
use saivd_db::repositories::{ProfileRepo, SessionRepo, UserRepo};

use crate::auth::cookies::{clear_session, read_cookie, set_session, REFRESH_COOKIE};
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";
const USER_AGENT_MAX_CHARS: usize = 512;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`. May be omitted when the refresh
/// cookie is present.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: EntityId,
    pub email: String,
    pub numeric_user_id: NumericUserId,
    pub display_name: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/signup
///
/// Create an account and its profile, then sign in. Returns 201.
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<CredentialsRequest>,
) -> AppResult<impl IntoResponse> {
    let email = normalize_email(&input.email)?;
    validate_password_strength(&input.password).map_err(CoreError::Validation)?;

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(CoreError::Conflict("Email is already registered".into()).into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
        },
    )
    .await?;
    tracing::info!(user_id = %user.id, "User signed up");

    let session = start_session(&state, &user, &headers).await?;
    send_welcome_email(&state, &session.body.user);

    Ok((StatusCode::CREATED, session))
}

/// POST /api/auth/login
///
/// Authenticate with email + password. Creates the profile on first sign-in.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<CredentialsRequest>,
) -> AppResult<SessionResponse> {
    let email = input.email.trim().to_lowercase();
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = %user.id, "Rejected login with wrong password");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    start_session(&state, &user, &headers).await
}

/// POST /api/auth/refresh
///
/// Exchange a refresh token (JSON body or cookie) for a new token pair. The
/// presented token is revoked, so each refresh token works once.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Bytes,
) -> AppResult<SessionResponse> {
    let presented = if body.iter().all(u8::is_ascii_whitespace) {
        read_cookie(&jar, REFRESH_COOKIE)
    } else {
        let input: RefreshRequest = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid refresh request: {e}")))?;
        Some(input.refresh_token)
    };
    let token = presented.ok_or_else(|| AppError::unauthorized("Missing refresh token"))?;

    let session = SessionRepo::find_active_by_hash(&state.pool, &hash_refresh_token(&token))
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_REFRESH_TOKEN))?;

    // A concurrent refresh with the same token may have won the race.
    if !SessionRepo::revoke(&state.pool, session.id).await? {
        return Err(AppError::unauthorized(INVALID_REFRESH_TOKEN));
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

    start_session(&state, &user, &headers).await
}

/// POST /api/auth/logout
///
/// Revoke all sessions for the authenticated user and clear the session
/// cookies. Returns 204 No Content.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = %auth_user.user_id, revoked, "User logged out");

    Ok((
        StatusCode::NO_CONTENT,
        clear_session(jar, state.config.cookie_secure),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Token pair rendered as JSON plus matching session cookies.
pub struct SessionResponse {
    body: AuthResponse,
    cookie_secure: bool,
    refresh_max_age_secs: i64,
}

impl IntoResponse for SessionResponse {
    fn into_response(self) -> axum::response::Response {
        let jar = set_session(
            CookieJar::new(),
            &self.body.access_token,
            self.body.expires_in,
            &self.body.refresh_token,
            self.refresh_max_age_secs,
            self.cookie_secure,
        );
        (jar, Json(DataResponse::new(self.body))).into_response()
    }
}

/// Ensure the profile exists, issue tokens, and persist a session row.
async fn start_session(
    state: &AppState,
    user: &User,
    headers: &HeaderMap,
) -> AppResult<SessionResponse> {
    let profile =
        ProfileRepo::ensure(&state.pool, user.id, &default_display_name(&user.email)).await?;

    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
            user_agent: user_agent(headers),
        },
    )
    .await?;

    Ok(SessionResponse {
        body: AuthResponse {
            access_token,
            refresh_token: refresh_plaintext,
            expires_in: jwt.access_token_expiry_secs(),
            user: UserInfo {
                id: user.id,
                email: user.email.clone(),
                numeric_user_id: profile.numeric_user_id,
                display_name: profile.display_name,
            },
        },
        cookie_secure: state.config.cookie_secure,
        refresh_max_age_secs: jwt.refresh_token_expiry_secs(),
    })
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.chars().take(USER_AGENT_MAX_CHARS).collect())
}

/// Fire-and-forget welcome email; failures are only logged.
fn send_welcome_email(state: &AppState, user: &UserInfo) {
    let Some(mailer) = state.mailer.clone() else {
        return;
    };
    let to = user.email.clone();
    let display_name = user.display_name.clone();
    let url = profile_url(&state.config.public_base_url, user.id);

    tokio::spawn(async move {
        if let Err(e) = mailer.send_welcome(&to, &display_name, &url).await {
            tracing::warn!(to = %to, error = %e, "Failed to send welcome email");
        }
    });
}
