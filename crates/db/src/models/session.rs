//! Refresh-token sessions. One row per issued refresh token; the token
//! itself never reaches the database, only its digest.

use chrono::{Duration, Utc};
use healthvitals_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    /// Set once the refresh token has been used or the user logged out.
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}

impl CreateSession {
    /// A session for `refresh_token_hash` that expires `lifetime` from now.
    pub fn expiring_in(user_id: DbId, refresh_token_hash: String, lifetime: Duration) -> Self {
        Self {
            user_id,
            refresh_token_hash,
            expires_at: Utc::now() + lifetime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_lifetime_from_now() {
        let before = Utc::now();
        let session = CreateSession::expiring_in(7, "digest".into(), Duration::days(30));
        let after = Utc::now();
        assert_eq!(session.user_id, 7);
        assert!(session.expires_at >= before + Duration::days(30));
        assert!(session.expires_at <= after + Duration::days(30));
    }
}
