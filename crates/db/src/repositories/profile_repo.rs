//! Repository for the `user_profiles` table.

use healthvitals_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{ProfileBiometrics, ProfileImage, UpsertProfile, UserProfile};

const COLUMNS: &str = "id, user_id, first_name, last_name, date_of_birth, gender, phone_number, \
                        address, city, state, country, postal_code, bio, occupation, company, \
                        website, social_links, height, weight, blood_type, emergency_contact, \
                        emergency_phone, profile_picture, cover_image, created_at, updated_at";

/// Provides get/upsert operations for the one-per-user profile row.
pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_profiles WHERE user_id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Return the user's profile, creating an empty one on first access.
    pub async fn get_or_create(pool: &PgPool, user_id: DbId) -> Result<UserProfile, sqlx::Error> {
        sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(pool)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM user_profiles WHERE user_id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Replace every editable field of the user's profile.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpsertProfile,
    ) -> Result<UserProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_profiles
                (user_id, first_name, last_name, date_of_birth, gender, phone_number, address,
                 city, state, country, postal_code, bio, occupation, company, website,
                 social_links, height, weight, blood_type, emergency_contact, emergency_phone)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                     $16, $17, $18, $19, $20, $21)
             ON CONFLICT (user_id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                date_of_birth = EXCLUDED.date_of_birth,
                gender = EXCLUDED.gender,
                phone_number = EXCLUDED.phone_number,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                state = EXCLUDED.state,
                country = EXCLUDED.country,
                postal_code = EXCLUDED.postal_code,
                bio = EXCLUDED.bio,
                occupation = EXCLUDED.occupation,
                company = EXCLUDED.company,
                website = EXCLUDED.website,
                social_links = EXCLUDED.social_links,
                height = EXCLUDED.height,
                weight = EXCLUDED.weight,
                blood_type = EXCLUDED.blood_type,
                emergency_contact = EXCLUDED.emergency_contact,
                emergency_phone = EXCLUDED.emergency_phone
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(input.date_of_birth)
            .bind(&input.gender)
            .bind(&input.phone_number)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.country)
            .bind(&input.postal_code)
            .bind(&input.bio)
            .bind(&input.occupation)
            .bind(&input.company)
            .bind(&input.website)
            .bind(&input.social_links)
            .bind(input.height)
            .bind(input.weight)
            .bind(&input.blood_type)
            .bind(&input.emergency_contact)
            .bind(&input.emergency_phone)
            .fetch_one(pool)
            .await
    }

    /// Merge scan-reported biometrics into the profile, creating it if needed.
    pub async fn upsert_biometrics(
        pool: &PgPool,
        user_id: DbId,
        input: &ProfileBiometrics,
    ) -> Result<UserProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_profiles (user_id, height, weight, gender, date_of_birth)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id) DO UPDATE SET
                height = COALESCE(EXCLUDED.height, user_profiles.height),
                weight = COALESCE(EXCLUDED.weight, user_profiles.weight),
                gender = COALESCE(EXCLUDED.gender, user_profiles.gender),
                date_of_birth = COALESCE(EXCLUDED.date_of_birth, user_profiles.date_of_birth)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .bind(input.height)
            .bind(input.weight)
            .bind(&input.gender)
            .bind(input.date_of_birth)
            .fetch_one(pool)
            .await
    }

    /// Point one of the profile images at `path`, creating the profile if needed.
    pub async fn set_image(
        pool: &PgPool,
        user_id: DbId,
        image: ProfileImage,
        path: &str,
    ) -> Result<UserProfile, sqlx::Error> {
        let column = image.column();
        let query = format!(
            "INSERT INTO user_profiles (user_id, {column}) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET {column} = EXCLUDED.{column}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .bind(path)
            .fetch_one(pool)
            .await
    }
}
