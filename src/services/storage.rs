use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use std::time::Duration;

/// Confirmed result of an object write; only this is used to build the
/// database record.
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size: i64,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn upload_file(&self, key: &str, content_type: &str, data: Vec<u8>)
    -> Result<StoredObject>;
    async fn delete_file(&self, key: &str) -> Result<()>;
    async fn file_exists(&self, key: &str) -> Result<bool>;
    /// Presigned, time-limited GET URL with a download disposition.
    async fn download_url(&self, key: &str, filename: &str, expires_in_secs: u64)
    -> Result<String>;
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String, endpoint: String) -> Self {
        Self {
            client,
            bucket,
            endpoint,
        }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn upload_file(
        &self,
        key: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredObject> {
        let size = data.len() as i64;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await?;

        Ok(StoredObject {
            key: key.to_string(),
            url: format!("{}/{}/{}", self.endpoint.trim_end_matches('/'), self.bucket, key),
            size,
        })
    }

    async fn delete_file(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    async fn file_exists(&self, key: &str) -> Result<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow::anyhow!(service_error))
                }
            }
        }
    }

    async fn download_url(
        &self,
        key: &str,
        filename: &str,
        expires_in_secs: u64,
    ) -> Result<String> {
        // Keep the disposition filename header-safe
        let ascii_filename: String = filename
            .chars()
            .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
            .take(64)
            .collect();
        let fallback = if ascii_filename.is_empty() {
            "file".to_string()
        } else {
            ascii_filename
        };

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .response_content_disposition(format!("attachment; filename=\"{}\"", fallback))
            .presigned(PresigningConfig::expires_in(Duration::from_secs(
                expires_in_secs,
            ))?)
            .await?;

        Ok(presigned.uri().to_string())
    }
}
