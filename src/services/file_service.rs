use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::{files, prelude::*};
use crate::services::quota::QuotaLedger;
use crate::services::share_service::ShareService;
use crate::services::storage::StorageService;
use crate::utils::validation::{validate_file_size, validate_mime_type};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// One file from a multipart upload, fully buffered.
pub struct IncomingFile {
    pub original_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

pub struct UploadOutcome {
    pub files: Vec<files::Model>,
    pub storage_used: i64,
    pub storage_limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileTypeStat {
    pub mime_type: String,
    pub count: i64,
    pub total_size: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    pub total_files: i64,
    pub total_size: i64,
    pub total_downloads: i64,
    pub public_files: i64,
    pub private_files: i64,
    pub file_types: Vec<FileTypeStat>,
}

pub struct FileService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
    config: AppConfig,
}

impl FileService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        Self {
            db,
            storage,
            config,
        }
    }

    fn storage_key(user_id: &str, original_name: &str) -> String {
        let millis = Utc::now().timestamp_millis();
        let suffix = &Uuid::new_v4().simple().to_string()[..8];
        let ext = std::path::Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        format!("files/{}/{}_{}{}", user_id, millis, suffix, ext)
    }

    /// Upload a batch of files for one user. The batch is atomic: every file
    /// is validated and the quota admits the combined size before the first
    /// byte reaches object storage, and the database rows commit together.
    pub async fn upload_batch(
        &self,
        user_id: &str,
        incoming: Vec<IncomingFile>,
    ) -> Result<UploadOutcome, AppError> {
        if incoming.is_empty() {
            return Err(AppError::BadRequest("No files uploaded".to_string()));
        }
        if incoming.len() > self.config.max_files_per_upload {
            return Err(AppError::BadRequest(format!(
                "Too many files. Maximum is {} files per upload",
                self.config.max_files_per_upload
            )));
        }

        let mut validated = Vec::with_capacity(incoming.len());
        for file in incoming {
            let mime_type = validate_mime_type(&file.mime_type)
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            validate_file_size(file.data.len(), self.config.max_file_size).map_err(|e| {
                if file.data.len() > self.config.max_file_size {
                    AppError::PayloadTooLarge(e.to_string())
                } else {
                    AppError::BadRequest(e.to_string())
                }
            })?;
            validated.push(IncomingFile {
                mime_type,
                ..file
            });
        }

        let user = Users::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        let total_incoming: i64 = validated.iter().map(|f| f.data.len() as i64).sum();
        QuotaLedger::check(user.storage_used, user.storage_limit, total_incoming)?;

        // Object storage first; the database only ever records confirmed
        // objects.
        let mut stored = Vec::with_capacity(validated.len());
        for file in &validated {
            let key = Self::storage_key(user_id, &file.original_name);
            match self
                .storage
                .upload_file(&key, &file.mime_type, file.data.clone())
                .await
            {
                Ok(object) => stored.push(object),
                Err(e) => {
                    self.rollback_objects(&stored).await;
                    return Err(AppError::Internal(format!("Storage upload failed: {}", e)));
                }
            }
        }

        let now = Utc::now();
        let mut models = Vec::with_capacity(stored.len());
        for (file, object) in validated.iter().zip(&stored) {
            let share_link = ShareService::generate_token();
            let qr_code = ShareService::generate_qr(&self.config.share_url(&share_link))?;
            models.push(files::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                filename: Set(file.original_name.clone()),
                original_name: Set(file.original_name.clone()),
                mime_type: Set(file.mime_type.clone()),
                size: Set(object.size),
                storage_key: Set(object.key.clone()),
                storage_url: Set(object.url.clone()),
                owner_id: Set(user_id.to_string()),
                share_link: Set(share_link),
                is_public: Set(false),
                password_hash: Set(None),
                expires_at: Set(None),
                download_count: Set(0),
                max_downloads: Set(None),
                qr_code: Set(Some(qr_code)),
                tags: Set(serde_json::json!([])),
                description: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            });
        }

        let txn = match self.db.begin().await {
            Ok(txn) => txn,
            Err(e) => {
                self.rollback_objects(&stored).await;
                return Err(e.into());
            }
        };

        let mut inserted = Vec::with_capacity(models.len());
        for model in models {
            match model.insert(&txn).await {
                Ok(row) => inserted.push(row),
                Err(e) => {
                    drop(txn);
                    self.rollback_objects(&stored).await;
                    return Err(e.into());
                }
            }
        }

        let storage_used = match QuotaLedger::recompute(&txn, user_id).await {
            Ok(total) => total,
            Err(e) => {
                drop(txn);
                self.rollback_objects(&stored).await;
                return Err(e);
            }
        };

        if let Err(e) = txn.commit().await {
            self.rollback_objects(&stored).await;
            return Err(e.into());
        }

        Ok(UploadOutcome {
            files: inserted,
            storage_used,
            storage_limit: user.storage_limit,
        })
    }

    async fn rollback_objects(&self, stored: &[crate::services::storage::StoredObject]) {
        for object in stored {
            if let Err(e) = self.storage.delete_file(&object.key).await {
                tracing::warn!(key = %object.key, "failed to roll back stored object: {}", e);
            }
        }
    }

    /// Delete a file the user owns. The object delete is best effort; the
    /// database row and the quota are the authority.
    pub async fn delete_file(&self, user_id: &str, file_id: &str) -> Result<i64, AppError> {
        let file = Files::find_by_id(file_id)
            .filter(files::Column::OwnerId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("File not found".to_string()))?;

        if let Err(e) = self.storage.delete_file(&file.storage_key).await {
            tracing::warn!(key = %file.storage_key, "storage delete failed: {}", e);
        }

        let txn = self.db.begin().await?;
        Files::delete_by_id(file.id.clone()).exec(&txn).await?;
        let storage_used = QuotaLedger::recompute(&txn, user_id).await?;
        txn.commit().await?;

        Ok(storage_used)
    }

    /// Persist one successful download before the bytes are handed out, so
    /// the limit cannot be overshot by retrying a failed response.
    pub async fn record_download(&self, file_id: &str) -> Result<(), AppError> {
        Files::update_many()
            .col_expr(
                files::Column::DownloadCount,
                Expr::col(files::Column::DownloadCount).add(1),
            )
            .filter(files::Column::Id.eq(file_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Aggregate statistics over the user's files.
    pub async fn stats(&self, user_id: &str) -> Result<FileStats, AppError> {
        let owned = Files::find()
            .filter(files::Column::OwnerId.eq(user_id))
            .all(&self.db)
            .await?;

        let mut by_type: HashMap<String, (i64, i64)> = HashMap::new();
        let mut total_size = 0i64;
        let mut total_downloads = 0i64;
        let mut public_files = 0i64;

        for file in &owned {
            total_size += file.size;
            total_downloads += file.download_count;
            if file.is_public {
                public_files += 1;
            }
            let entry = by_type.entry(file.mime_type.clone()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += file.size;
        }

        let mut file_types: Vec<FileTypeStat> = by_type
            .into_iter()
            .map(|(mime_type, (count, size))| FileTypeStat {
                mime_type,
                count,
                total_size: size,
            })
            .collect();
        file_types.sort_by(|a, b| b.count.cmp(&a.count).then(a.mime_type.cmp(&b.mime_type)));

        let total_files = owned.len() as i64;
        Ok(FileStats {
            total_files,
            total_size,
            total_downloads,
            public_files,
            private_files: total_files - public_files,
            file_types,
        })
    }
}
