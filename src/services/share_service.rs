use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::{files, prelude::*};
use crate::utils::validation::validate_share_password;
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use chrono::{DateTime, Utc};
use image::{ImageEncoder, Luma, codecs::png::PngEncoder};
use qrcode::QrCode;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

/// Owner-initiated changes to sharing settings. The inner `Option` level
/// distinguishes "set to null" (clear) from "leave unchanged" (absent).
#[derive(Debug, Default)]
pub struct SharingUpdate {
    pub is_public: Option<bool>,
    /// `Some("")` clears the password, `Some(p)` sets it
    pub password: Option<String>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub max_downloads: Option<Option<i32>>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub struct ShareService;

impl ShareService {
    /// Generate a share-link token: 16 random bytes as hex, 128 bits of
    /// entropy. The token's unpredictability is the capability.
    pub fn generate_token() -> String {
        use rand::RngCore;
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Hash a share password using argon2
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Verify a password against the stored hash (constant-time comparison
    /// inside argon2)
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
        let argon2 = Argon2::default();
        let parsed_hash =
            argon2::PasswordHash::new(hash).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Encode the canonical share URL as a PNG QR code, returned as a
    /// base64 data URL suitable for an <img> tag.
    pub fn generate_qr(share_url: &str) -> Result<String, AppError> {
        let code =
            QrCode::new(share_url.as_bytes()).map_err(|e| AppError::Internal(e.to_string()))?;
        let img = code.render::<Luma<u8>>().min_dimensions(240, 240).build();

        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ColorType::L8,
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        ))
    }

    /// Fetch a file by share link token, or 404. Policy checks are the
    /// caller's job; a rotated-away token is simply not found.
    pub async fn find_by_share_link(
        db: &sea_orm::DatabaseConnection,
        share_link: &str,
    ) -> Result<files::Model, AppError> {
        Files::find()
            .filter(files::Column::ShareLink.eq(share_link))
            .one(db)
            .await?
            .ok_or(AppError::NotFound("File not found".to_string()))
    }

    async fn find_owned(
        db: &sea_orm::DatabaseConnection,
        file_id: &str,
        owner_id: &str,
    ) -> Result<files::Model, AppError> {
        Files::find_by_id(file_id)
            .filter(files::Column::OwnerId.eq(owner_id))
            .one(db)
            .await?
            .ok_or(AppError::NotFound("File not found".to_string()))
    }

    /// Apply sharing-settings changes and regenerate the cached QR code so
    /// it never points at a stale link.
    pub async fn update_sharing(
        db: &sea_orm::DatabaseConnection,
        config: &AppConfig,
        file_id: &str,
        owner_id: &str,
        update: SharingUpdate,
    ) -> Result<files::Model, AppError> {
        let file = Self::find_owned(db, file_id, owner_id).await?;
        let share_link = file.share_link.clone();
        let mut active: files::ActiveModel = file.into();

        if let Some(is_public) = update.is_public {
            active.is_public = Set(is_public);
        }

        if let Some(password) = update.password {
            if password.is_empty() {
                active.password_hash = Set(None);
            } else {
                validate_share_password(&password)
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                active.password_hash = Set(Some(Self::hash_password(&password)?));
            }
        }

        if let Some(expires_at) = update.expires_at {
            active.expires_at = Set(expires_at);
        }

        if let Some(max_downloads) = update.max_downloads {
            if let Some(max) = max_downloads {
                if !(1..=1000).contains(&max) {
                    return Err(AppError::BadRequest(
                        "Max downloads must be between 1 and 1000".to_string(),
                    ));
                }
            }
            active.max_downloads = Set(max_downloads);
        }

        if let Some(description) = update.description {
            if description.chars().count() > 500 {
                return Err(AppError::BadRequest(
                    "Description cannot exceed 500 characters".to_string(),
                ));
            }
            active.description = Set(if description.is_empty() {
                None
            } else {
                Some(description)
            });
        }

        if let Some(tags) = update.tags {
            active.tags = Set(serde_json::json!(tags));
        }

        let qr = Self::generate_qr(&config.share_url(&share_link))?;
        active.qr_code = Set(Some(qr));
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    /// Replace the share link with a fresh token. The old token becomes
    /// permanently unresolvable; the QR code is regenerated alongside.
    pub async fn rotate_link(
        db: &sea_orm::DatabaseConnection,
        config: &AppConfig,
        file_id: &str,
        owner_id: &str,
    ) -> Result<files::Model, AppError> {
        let file = Self::find_owned(db, file_id, owner_id).await?;
        let mut active: files::ActiveModel = file.into();

        let new_link = Self::generate_token();
        let qr = Self::generate_qr(&config.share_url(&new_link))?;

        active.share_link = Set(new_link);
        active.qr_code = Set(Some(qr));
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_32_hex_chars_and_unique() {
        let a = ShareService::generate_token();
        let b = ShareService::generate_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = ShareService::hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(ShareService::verify_password("hunter2", &hash).unwrap());
        assert!(!ShareService::verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn qr_is_png_data_url() {
        let qr = ShareService::generate_qr("http://localhost:5173/share/abc").unwrap();
        assert!(qr.starts_with("data:image/png;base64,"));
        // Two different URLs encode to different images
        let other = ShareService::generate_qr("http://localhost:5173/share/def").unwrap();
        assert_ne!(qr, other);
    }
}
