//! Face scan metadata model and DTOs.

use healthvitals_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `face_scans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FaceScan {
    pub id: DbId,
    pub user_id: DbId,
    pub confidence: Option<f64>,
    pub image_url: Option<String>,
    pub scan_data: serde_json::Value,
    pub device_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A face scan joined with its owner, for the admin listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FaceScanWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub scan: FaceScan,
    pub owner_email: String,
    pub owner_name: Option<String>,
}

/// DTO for recording a face scan.
#[derive(Debug, Clone)]
pub struct CreateFaceScan {
    pub user_id: DbId,
    pub confidence: Option<f64>,
    pub image_url: Option<String>,
    pub scan_data: serde_json::Value,
    pub device_id: Option<String>,
}
