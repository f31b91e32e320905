use crate::config::AppConfig;
use crate::entities::files;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Owner-facing view of a file record. The password hash never leaves the
/// server; clients only learn whether one is set.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub share_link: String,
    pub share_url: String,
    pub is_public: bool,
    pub has_password: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub download_count: i64,
    pub max_downloads: Option<i32>,
    pub qr_code: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileResponse {
    pub fn from_model(file: files::Model, config: &AppConfig) -> Self {
        let share_url = config.share_url(&file.share_link);
        let tags = file.tag_list();
        Self {
            id: file.id,
            filename: file.filename,
            original_name: file.original_name,
            mime_type: file.mime_type,
            size: file.size,
            share_link: file.share_link,
            share_url,
            is_public: file.is_public,
            has_password: file.password_hash.is_some(),
            expires_at: file.expires_at,
            download_count: file.download_count,
            max_downloads: file.max_downloads,
            qr_code: file.qr_code,
            tags,
            description: file.description,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<FileResponse>,
    pub storage_used: i64,
    pub storage_limit: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_files: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    pub files: Vec<FileResponse>,
    pub pagination: Pagination,
}

/// Absent field: leave unchanged. `null`: clear. Double options capture the
/// difference for the nullable settings.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareSettingsRequest {
    pub is_public: Option<bool>,
    /// Empty string removes the password
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub max_downloads: Option<Option<i32>>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileActionResponse {
    pub message: String,
    pub file: FileResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub storage_used: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShareAccessQuery {
    pub password: Option<String>,
}

/// What an anonymous visitor may learn about a shared file.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharedFileView {
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub download_count: i64,
    pub max_downloads: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub uploaded_by: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharedFileResponse {
    pub file: SharedFileView,
    pub download_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_settings_distinguish_absent_from_null() {
        let req: ShareSettingsRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.expires_at.is_none());
        assert!(req.max_downloads.is_none());

        let req: ShareSettingsRequest =
            serde_json::from_str(r#"{"expiresAt": null, "maxDownloads": null}"#).unwrap();
        assert_eq!(req.expires_at, Some(None));
        assert_eq!(req.max_downloads, Some(None));

        let req: ShareSettingsRequest =
            serde_json::from_str(r#"{"maxDownloads": 5}"#).unwrap();
        assert_eq!(req.max_downloads, Some(Some(5)));
    }
}
