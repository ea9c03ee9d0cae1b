//! Aggregate counts for the admin dashboard.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub device_users: i64,
    pub total_vitals: i64,
    pub total_face_scans: i64,
}
