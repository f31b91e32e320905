use crate::api::error::AppError;
use crate::api::middleware::auth::optional_identity;
use crate::entities::prelude::*;
use crate::services::share_policy::evaluate_access;
use crate::services::share_service::ShareService;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use sea_orm::EntityTrait;

use super::types::*;

/// Read-only metadata view of a shared file. Passes the same access policy
/// as a download but never touches the download counter.
#[utoipa::path(
    get,
    path = "/files/share/{share_link}",
    params(
        ("share_link" = String, Path, description = "Share link token"),
        ("password" = Option<String>, Query, description = "Share password, if one is set")
    ),
    responses(
        (status = 200, description = "Shared file metadata", body = SharedFileResponse),
        (status = 401, description = "Password required or invalid"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "File not found"),
        (status = 410, description = "Link expired or download limit reached")
    )
)]
pub async fn get_shared_file(
    State(state): State<crate::AppState>,
    Path(share_link): Path<String>,
    Query(query): Query<ShareAccessQuery>,
    headers: HeaderMap,
) -> Result<Json<SharedFileResponse>, AppError> {
    let file = ShareService::find_by_share_link(&state.db, &share_link).await?;

    let requester = optional_identity(&headers, &state.config.jwt_secret);
    evaluate_access(
        &file,
        Utc::now(),
        query.password.as_deref(),
        requester.as_deref(),
    )?
    .authorize()?;

    let owner = Users::find_by_id(&file.owner_id)
        .one(&state.db)
        .await?
        .map(|u| u.username)
        .unwrap_or_else(|| "unknown".to_string());

    let download_url = format!("/files/download/{}", file.share_link);

    Ok(Json(SharedFileResponse {
        file: SharedFileView {
            filename: file.original_name,
            mime_type: file.mime_type,
            size: file.size,
            description: file.description,
            tags: file
                .tags
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect()
                })
                .unwrap_or_default(),
            download_count: file.download_count,
            max_downloads: file.max_downloads,
            expires_at: file.expires_at,
            created_at: file.created_at,
            uploaded_by: owner,
        },
        download_url,
    }))
}

/// Redirect to a time-limited presigned URL. The download is counted before
/// the redirect is issued, so a file at its limit can never hand out one
/// more URL.
#[utoipa::path(
    get,
    path = "/files/download/{share_link}",
    params(
        ("share_link" = String, Path, description = "Share link token"),
        ("password" = Option<String>, Query, description = "Share password, if one is set")
    ),
    responses(
        (status = 302, description = "Redirect to the download URL"),
        (status = 401, description = "Password required or invalid"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "File not found"),
        (status = 410, description = "Link expired or download limit reached")
    )
)]
pub async fn download_shared_file(
    State(state): State<crate::AppState>,
    Path(share_link): Path<String>,
    Query(query): Query<ShareAccessQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let file = ShareService::find_by_share_link(&state.db, &share_link).await?;

    let requester = optional_identity(&headers, &state.config.jwt_secret);
    evaluate_access(
        &file,
        Utc::now(),
        query.password.as_deref(),
        requester.as_deref(),
    )?
    .authorize()?;

    state.file_service.record_download(&file.id).await?;

    let url = state
        .storage
        .download_url(
            &file.storage_key,
            &file.original_name,
            state.config.presign_expiry_secs,
        )
        .await
        .map_err(|e| AppError::Internal(format!("Failed to presign download: {}", e)))?;

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]))
}
