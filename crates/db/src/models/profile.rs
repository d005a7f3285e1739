//! Profile model, its public projection, and update DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use saivd_core::types::{EntityId, NumericUserId, Timestamp};

/// Full profile row from the `profiles` table, as shown to its owner.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: EntityId,
    pub numeric_user_id: NumericUserId,
    pub display_name: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub twitter_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    pub tiktok_url: Option<String>,
    pub website_url: Option<String>,
    /// Uploaded RSA public key (PEM), if any.
    pub rsa_public: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The anonymous view of a profile: `{id, display_name, bio, photo, created_at}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicProfile {
    pub id: EntityId,
    pub display_name: String,
    pub bio: Option<String>,
    pub photo: Option<String>,
    pub created_at: Timestamp,
}

/// Owner view returned by the account endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    #[serde(flatten)]
    pub profile: Profile,
    pub email: String,
}

/// Full replacement set of editable fields.
///
/// Handlers merge the request over the stored profile before calling
/// [`ProfileRepo::update`](crate::repositories::ProfileRepo::update), so
/// `None` means "clear", not "keep".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub display_name: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub twitter_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    pub tiktok_url: Option<String>,
    pub website_url: Option<String>,
}

impl UpdateProfile {
    /// Start from the currently stored values.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            bio: profile.bio.clone(),
            photo_url: profile.photo_url.clone(),
            twitter_url: profile.twitter_url.clone(),
            instagram_url: profile.instagram_url.clone(),
            youtube_url: profile.youtube_url.clone(),
            tiktok_url: profile.tiktok_url.clone(),
            website_url: profile.website_url.clone(),
        }
    }
}
