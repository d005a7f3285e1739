//! Repository for the `profiles` table.

use sqlx::PgPool;
use saivd_core::types::{EntityId, NumericUserId};

use crate::models::profile::{Profile, PublicProfile, UpdateProfile};

const COLUMNS: &str = "id, numeric_user_id, display_name, bio, photo_url, twitter_url, \
                       instagram_url, youtube_url, tiktok_url, website_url, rsa_public, \
                       created_at, updated_at";

/// Columns exposed to anonymous callers. `photo_url` is renamed to `photo`.
const PUBLIC_COLUMNS: &str = "id, display_name, bio, photo_url AS photo, created_at";

pub struct ProfileRepo;

impl ProfileRepo {
    /// Create the profile for `id` if it does not exist yet, then return it.
    ///
    /// Safe to call on every sign-in: an existing profile is left untouched.
    pub async fn ensure(
        pool: &PgPool,
        id: EntityId,
        display_name: &str,
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query(
            "INSERT INTO profiles (id, display_name) VALUES ($1, $2)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(display_name)
        .execute(pool)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch only the public field set.
    pub async fn find_public_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<PublicProfile>, sqlx::Error> {
        let query = format!("SELECT {PUBLIC_COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, PublicProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_numeric_id(
        pool: &PgPool,
        numeric_user_id: NumericUserId,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE numeric_user_id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(numeric_user_id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite every editable field with `input`.
    ///
    /// Returns `None` if no profile with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: EntityId,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET
                display_name = $2,
                bio = $3,
                photo_url = $4,
                twitter_url = $5,
                instagram_url = $6,
                youtube_url = $7,
                tiktok_url = $8,
                website_url = $9
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(&input.bio)
            .bind(&input.photo_url)
            .bind(&input.twitter_url)
            .bind(&input.instagram_url)
            .bind(&input.youtube_url)
            .bind(&input.tiktok_url)
            .bind(&input.website_url)
            .fetch_optional(pool)
            .await
    }

    /// Replace the stored RSA public key.
    pub async fn set_public_key(
        pool: &PgPool,
        id: EntityId,
        pem: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET rsa_public = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(pem)
            .fetch_optional(pool)
            .await
    }
}
