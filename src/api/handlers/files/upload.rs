use crate::api::error::AppError;
use crate::services::file_service::IncomingFile;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Multipart, State},
};

use super::types::*;

#[utoipa::path(
    post,
    path = "/files/upload",
    request_body(content = Object, description = "Files under multipart field 'files'", content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Files uploaded successfully", body = UploadResponse),
        (status = 400, description = "Validation or quota failure"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn upload_files(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<(axum::http::StatusCode, Json<UploadResponse>), AppError> {
    let mut incoming = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("length limit exceeded") {
            AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
        } else {
            AppError::BadRequest(err_msg)
        }
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name != "files" && name != "file" {
            continue;
        }

        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
            .to_vec();

        incoming.push(IncomingFile {
            original_name,
            mime_type,
            data,
        });
    }

    let outcome = state.file_service.upload_batch(&claims.sub, incoming).await?;

    let files = outcome
        .files
        .into_iter()
        .map(|f| FileResponse::from_model(f, &state.config))
        .collect::<Vec<_>>();

    Ok((
        axum::http::StatusCode::CREATED,
        Json(UploadResponse {
            message: format!("{} file(s) uploaded successfully", files.len()),
            files,
            storage_used: outcome.storage_used,
            storage_limit: outcome.storage_limit,
        }),
    ))
}
