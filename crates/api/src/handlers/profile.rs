//! Handlers for public profiles and the signed-in user's own profile.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use saivd_core::error::CoreError;
use saivd_core::profile::{validate_bio, validate_display_name, validate_profile_url};
use saivd_core::validation::parse_user_id;
use saivd_db::models::profile::{AccountProfile, PublicProfile, UpdateProfile};
use saivd_db::repositories::{ProfileRepo, UserRepo};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /account/profile`.
///
/// Omitted or `null` fields keep their stored value; an empty string clears
/// an optional field.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub twitter_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    pub tiktok_url: Option<String>,
    pub website_url: Option<String>,
}

impl UpdateProfileRequest {
    /// Validate each present field and overlay it onto `current`.
    pub fn apply_to(&self, current: &mut UpdateProfile) -> Result<(), CoreError> {
        if let Some(name) = &self.display_name {
            current.display_name = validate_display_name(name)?;
        }
        if let Some(bio) = &self.bio {
            current.bio = validate_bio(bio)?;
        }
        let urls = [
            ("photo_url", &self.photo_url, &mut current.photo_url),
            ("twitter_url", &self.twitter_url, &mut current.twitter_url),
            ("instagram_url", &self.instagram_url, &mut current.instagram_url),
            ("youtube_url", &self.youtube_url, &mut current.youtube_url),
            ("tiktok_url", &self.tiktok_url, &mut current.tiktok_url),
            ("website_url", &self.website_url, &mut current.website_url),
        ];
        for (field, requested, stored) in urls {
            if let Some(raw) = requested {
                *stored = validate_profile_url(field, raw)?;
            }
        }
        Ok(())
    }
}

/// GET /api/profile/{userId}
///
/// Public field set only: `{id, display_name, bio, photo, created_at}`.
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<DataResponse<PublicProfile>>> {
    let user_id = parse_user_id(&user_id)?;
    let profile = ProfileRepo::find_public_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User"))?;
    Ok(Json(DataResponse::new(profile)))
}

/// GET /api/account/profile
pub async fn get_account_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<AccountProfile>>> {
    let account = load_account(&state, auth_user).await?;
    Ok(Json(DataResponse::new(account)))
}

/// PUT /api/account/profile
pub async fn update_account_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<AccountProfile>>> {
    let current = ProfileRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User"))?;

    let mut update = UpdateProfile::from_profile(&current);
    input.apply_to(&mut update)?;

    ProfileRepo::update(&state.pool, auth_user.user_id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("User"))?;
    tracing::info!(user_id = %auth_user.user_id, "Profile updated");

    let account = load_account(&state, auth_user).await?;
    Ok(Json(DataResponse::new(account)))
}

async fn load_account(state: &AppState, auth_user: AuthUser) -> AppResult<AccountProfile> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User"))?;
    let profile = ProfileRepo::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| CoreError::not_found("User"))?;
    Ok(AccountProfile {
        profile,
        email: user.email,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn stored() -> UpdateProfile {
        UpdateProfile {
            display_name: "ada".into(),
            bio: Some("old bio".into()),
            website_url: Some("https://old.example".into()),
            ..Default::default()
        }
    }

    #[test]
    fn absent_fields_are_kept() {
        let mut current = stored();
        UpdateProfileRequest::default().apply_to(&mut current).unwrap();
        assert_eq!(current.display_name, "ada");
        assert_eq!(current.bio.as_deref(), Some("old bio"));
    }

    #[test]
    fn empty_strings_clear_optional_fields() {
        let mut current = stored();
        let request = UpdateProfileRequest {
            bio: Some(String::new()),
            website_url: Some("  ".into()),
            twitter_url: Some("https://x.com/ada".into()),
            ..Default::default()
        };
        request.apply_to(&mut current).unwrap();
        assert_eq!(current.bio, None);
        assert_eq!(current.website_url, None);
        assert_eq!(current.twitter_url.as_deref(), Some("https://x.com/ada"));
    }

    #[test]
    fn invalid_fields_are_rejected() {
        let request = UpdateProfileRequest {
            display_name: Some(" ".into()),
            ..Default::default()
        };
        assert_matches!(request.apply_to(&mut stored()), Err(CoreError::Validation(_)));

        let request = UpdateProfileRequest {
            youtube_url: Some("not a url".into()),
            ..Default::default()
        };
        assert_matches!(
            request.apply_to(&mut stored()),
            Err(CoreError::Validation(ref msg)) if msg.contains("youtube_url")
        );
    }
}
