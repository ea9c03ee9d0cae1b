//! Read-only administrative views. Every handler requires the `admin` role.

use axum::extract::State;
use axum::Json;
use healthvitals_core::roles::ROLE_DEVICE;
use healthvitals_db::models::admin::AdminStats;
use healthvitals_db::models::face_scan::FaceScanWithOwner;
use healthvitals_db::models::user::UserResponse;
use healthvitals_db::models::vitals::VitalsWithOwner;
use healthvitals_db::repositories::vitals_repo::VitalsFilter;
use healthvitals_db::repositories::{FaceScanRepo, UserRepo, VitalsRepo};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Rows returned by the admin vitals listing.
const ADMIN_VITALS_LIMIT: i64 = 200;

/// Rows returned by the admin face-scan listing.
const ADMIN_FACE_SCANS_LIMIT: i64 = 50;

/// GET /api/admin/check
pub async fn check_admin(RequireAdmin(admin): RequireAdmin) -> Json<DataResponse<Value>> {
    Json(DataResponse {
        data: json!({ "is_admin": true, "user_id": admin.user_id }),
    })
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    let data = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/admin/vitals
///
/// Latest vitals across all users with owner and patient names.
pub async fn list_vitals(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<VitalsWithOwner>>>> {
    let vitals =
        VitalsRepo::list_with_owner(&state.pool, &VitalsFilter::default(), ADMIN_VITALS_LIMIT)
            .await?;
    Ok(Json(DataResponse { data: vitals }))
}

/// GET /api/admin/face-scans
pub async fn list_face_scans(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<FaceScanWithOwner>>>> {
    let scans = FaceScanRepo::list_recent_with_owner(&state.pool, ADMIN_FACE_SCANS_LIMIT).await?;
    Ok(Json(DataResponse { data: scans }))
}

/// GET /api/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<AdminStats>>> {
    let all_vitals = VitalsFilter::default();
    let (total_users, device_users, total_vitals, total_face_scans) = tokio::try_join!(
        UserRepo::count(&state.pool),
        UserRepo::count_by_role(&state.pool, ROLE_DEVICE),
        VitalsRepo::count(&state.pool, &all_vitals),
        FaceScanRepo::count(&state.pool),
    )?;

    Ok(Json(DataResponse {
        data: AdminStats {
            total_users,
            device_users,
            total_vitals,
            total_face_scans,
        },
    }))
}
