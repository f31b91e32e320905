#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use droply_backend::config::AppConfig;
use droply_backend::infrastructure::database;
use droply_backend::services::file_service::FileService;
use droply_backend::services::storage::{StorageService, StoredObject};
use droply_backend::{AppState, create_app};
use sea_orm::Database;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct MockStorageService {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn upload_file(
        &self,
        key: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> anyhow::Result<StoredObject> {
        let size = data.len() as i64;
        self.files.lock().unwrap().insert(key.to_string(), data);
        Ok(StoredObject {
            key: key.to_string(),
            url: format!("http://mock-storage/droply/{}", key),
            size,
        })
    }

    async fn delete_file(&self, key: &str) -> anyhow::Result<()> {
        self.files.lock().unwrap().remove(key);
        Ok(())
    }

    async fn file_exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(key))
    }

    async fn download_url(
        &self,
        key: &str,
        _filename: &str,
        _expires_in_secs: u64,
    ) -> anyhow::Result<String> {
        Ok(format!(
            "http://mock-storage/droply/{}?X-Amz-Mock=true",
            key
        ))
    }
}

pub struct TestContext {
    pub app: Router,
    pub db: sea_orm::DatabaseConnection,
    pub storage: Arc<MockStorageService>,
    pub config: AppConfig,
}

pub async fn setup_app() -> TestContext {
    setup_app_with_config(AppConfig::development()).await
}

pub async fn setup_app_with_config(config: AppConfig) -> TestContext {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let storage = Arc::new(MockStorageService::new());
    let storage_dyn: Arc<dyn StorageService> = storage.clone();

    let file_service = Arc::new(FileService::new(
        db.clone(),
        storage_dyn.clone(),
        config.clone(),
    ));

    let state = AppState {
        db: db.clone(),
        storage: storage_dyn,
        file_service,
        config: config.clone(),
    };

    TestContext {
        app: create_app(state),
        db,
        storage,
        config,
    }
}

/// Multipart body with one part per (filename, content_type, bytes) triple,
/// all under the `files` field.
pub fn multipart_body(boundary: &str, parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, content_type, data) in parts {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
