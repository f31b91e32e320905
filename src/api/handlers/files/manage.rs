use crate::api::error::AppError;
use crate::services::file_service::FileStats;
use crate::services::share_service::{ShareService, SharingUpdate};
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use super::types::*;

#[utoipa::path(
    put,
    path = "/files/{id}/share",
    request_body = ShareSettingsRequest,
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "Share settings updated", body = FileActionResponse),
        (status = 400, description = "Invalid settings"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn update_share_settings(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<ShareSettingsRequest>,
) -> Result<Json<FileActionResponse>, AppError> {
    let update = SharingUpdate {
        is_public: payload.is_public,
        password: payload.password,
        expires_at: payload.expires_at,
        max_downloads: payload.max_downloads,
        description: payload.description,
        tags: payload.tags,
    };

    let file =
        ShareService::update_sharing(&state.db, &state.config, &id, &claims.sub, update).await?;

    Ok(Json(FileActionResponse {
        message: "Share settings updated successfully".to_string(),
        file: FileResponse::from_model(file, &state.config),
    }))
}

#[utoipa::path(
    post,
    path = "/files/{id}/new-link",
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "Share link regenerated", body = FileActionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn regenerate_share_link(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<FileActionResponse>, AppError> {
    let file = ShareService::rotate_link(&state.db, &state.config, &id, &claims.sub).await?;

    Ok(Json(FileActionResponse {
        message: "New share link generated successfully".to_string(),
        file: FileResponse::from_model(file, &state.config),
    }))
}

#[utoipa::path(
    delete,
    path = "/files/{id}",
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn delete_file(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let storage_used = state.file_service.delete_file(&claims.sub, &id).await?;

    Ok(Json(DeleteResponse {
        message: "File deleted successfully".to_string(),
        storage_used,
    }))
}

#[utoipa::path(
    get,
    path = "/files/stats",
    responses(
        (status = 200, description = "Aggregate file statistics", body = FileStats),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<FileStats>, AppError> {
    Ok(Json(state.file_service.stats(&claims.sub).await?))
}
