//! Repository for the `face_scans` table.

use healthvitals_core::types::DbId;
use sqlx::PgPool;

use crate::models::face_scan::{CreateFaceScan, FaceScan, FaceScanWithOwner};

const COLUMNS: &str =
    "id, user_id, confidence, image_url, scan_data, device_id, created_at, updated_at";

/// Same columns qualified with the `f` alias, for joins.
const ALIASED_COLUMNS: &str = "f.id, f.user_id, f.confidence, f.image_url, f.scan_data, \
                                f.device_id, f.created_at, f.updated_at";

pub struct FaceScanRepo;

impl FaceScanRepo {
    pub async fn create(pool: &PgPool, input: &CreateFaceScan) -> Result<FaceScan, sqlx::Error> {
        let query = format!(
            "INSERT INTO face_scans (user_id, confidence, image_url, scan_data, device_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FaceScan>(&query)
            .bind(input.user_id)
            .bind(input.confidence)
            .bind(&input.image_url)
            .bind(&input.scan_data)
            .bind(&input.device_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FaceScan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM face_scans WHERE id = $1");
        sqlx::query_as::<_, FaceScan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several scans at once. Unknown ids are skipped.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<FaceScan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM face_scans WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, FaceScan>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Most recent scans across all users, newest first, with owner details.
    pub async fn list_recent_with_owner(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<FaceScanWithOwner>, sqlx::Error> {
        let query = format!(
            "SELECT {ALIASED_COLUMNS}, u.email AS owner_email, u.name AS owner_name
             FROM face_scans f
             JOIN users u ON u.id = f.user_id
             ORDER BY f.created_at DESC, f.id DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, FaceScanWithOwner>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM face_scans")
            .fetch_one(pool)
            .await
    }

    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM face_scans WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
