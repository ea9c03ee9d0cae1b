use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;
use healthvitals_db::models::profile::{ProfileImage, UpsertProfile, UserProfile};
use healthvitals_db::repositories::ProfileRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Extensions an uploaded profile image may carry.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Subdirectory of the upload root, and of the public `/uploads` path.
const PROFILE_IMAGE_DIR: &str = "profiles";

/// GET /api/profile
///
/// Returns the caller's profile, creating an empty one on first access.
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let profile = ProfileRepo::get_or_create(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: profile }))
}

/// PUT /api/profile
///
/// Replace the caller's profile fields. Omitted fields are cleared.
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpsertProfile>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let profile = ProfileRepo::upsert(&state.pool, auth_user.user_id, &input).await?;
    tracing::info!(user_id = auth_user.user_id, "Profile updated");
    Ok(Json(DataResponse { data: profile }))
}

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    /// Public path the image is served from.
    pub url: String,
    pub profile: UserProfile,
}

/// POST /api/profile/upload
///
/// Multipart form with a `file` part and a `type` part. `type=profile`
/// replaces the profile picture; any other value replaces the cover image.
pub async fn upload_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<UploadedImage>>> {
    let mut file: Option<(String, Bytes)> = None;
    let mut kind = ProfileImage::Cover;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let extension = field.file_name().and_then(image_extension).ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Only {} images are accepted",
                        IMAGE_EXTENSIONS.join(", ")
                    ))
                })?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((extension, data));
            }
            Some("type") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                kind = ProfileImage::from_kind(value.trim());
            }
            _ => {}
        }
    }

    let Some((extension, data)) = file else {
        return Err(AppError::BadRequest("No file provided".into()));
    };
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    let max_bytes = state.config.uploads.max_bytes;
    if data.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "File exceeds the {max_bytes} byte limit"
        )));
    }

    let file_name = format!(
        "{}_{}_{}.{extension}",
        auth_user.user_id,
        kind.as_str(),
        Utc::now().timestamp_millis()
    );
    let dir = state.config.uploads.dir.join(PROFILE_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;
    tokio::fs::write(dir.join(&file_name), &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    let url = format!("/uploads/{PROFILE_IMAGE_DIR}/{file_name}");
    let profile = ProfileRepo::set_image(&state.pool, auth_user.user_id, kind, &url).await?;
    tracing::info!(
        user_id = auth_user.user_id,
        kind = kind.as_str(),
        bytes = data.len(),
        "Profile image uploaded"
    );

    Ok(Json(DataResponse {
        data: UploadedImage { url, profile },
    }))
}

/// Lowercased extension of `file_name` if it is an accepted image type.
fn image_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}
