//! User profile model and DTOs.

use chrono::NaiveDate;
use healthvitals_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_profiles` table (one per user).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub social_links: Option<serde_json::Value>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_type: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    /// Public `/uploads/...` path.
    pub profile_picture: Option<String>,
    pub cover_image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Full replacement of the editable profile fields. Absent fields are
/// stored as NULL. Images are only changed by upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub social_links: Option<serde_json::Value>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_type: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
}

/// Biometrics reported alongside a device scan. `None` leaves the stored
/// value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileBiometrics {
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Which profile image an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileImage {
    Picture,
    Cover,
}

impl ProfileImage {
    /// `profile` selects the picture; anything else is the cover image.
    pub fn from_kind(kind: &str) -> Self {
        if kind == "profile" {
            Self::Picture
        } else {
            Self::Cover
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Picture => "profile",
            Self::Cover => "cover",
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::Picture => "profile_picture",
            Self::Cover => "cover_image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_profile_kind_selects_picture() {
        assert_eq!(ProfileImage::from_kind("profile"), ProfileImage::Picture);
        assert_eq!(ProfileImage::from_kind("cover"), ProfileImage::Cover);
        assert_eq!(ProfileImage::from_kind(""), ProfileImage::Cover);
        assert_eq!(ProfileImage::Picture.column(), "profile_picture");
    }
}
