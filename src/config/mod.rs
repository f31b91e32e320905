use std::env;

/// Application configuration. Loaded once at startup and injected through
/// `AppState`; the single source of truth for every external dependency.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Maximum size per uploaded file in bytes (default: 50 MB)
    pub max_file_size: usize,

    /// Maximum number of files per upload request (default: 5)
    pub max_files_per_upload: usize,

    /// Storage quota assigned to new accounts in bytes (default: 1 GiB)
    pub default_storage_limit: i64,

    /// JWT secret key (required in production)
    pub jwt_secret: String,

    /// Base URL of the frontend, used to build canonical share URLs
    pub frontend_url: String,

    /// Presigned download URL lifetime in seconds (default: 12 hours)
    pub presign_expiry_secs: u64,

    /// Allowed CORS origins (comma separated)
    pub allowed_origins: Vec<String>,

    /// S3-compatible object storage
    pub s3_endpoint: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub s3_bucket: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50 MB
            max_files_per_upload: 5,
            default_storage_limit: 1024 * 1024 * 1024, // 1 GiB
            jwt_secret: "secret".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            presign_expiry_secs: 43200,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
                "http://127.0.0.1:3000".to_string(),
            ],
            s3_endpoint: "http://127.0.0.1:9000".to_string(),
            s3_access_key: "minioadmin".to_string(),
            s3_secret_key: "minioadmin".to_string(),
            s3_bucket: "droply".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            max_files_per_upload: env::var("MAX_FILES_PER_UPLOAD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_files_per_upload),

            default_storage_limit: env::var("DEFAULT_STORAGE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.default_storage_limit),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()), // Dev fallback, enforced in production()

            frontend_url: env::var("FRONTEND_URL").unwrap_or(default.frontend_url),

            presign_expiry_secs: env::var("PRESIGN_EXPIRY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.presign_expiry_secs),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),

            s3_endpoint: env::var("S3_ENDPOINT").unwrap_or(default.s3_endpoint),
            s3_access_key: env::var("S3_ACCESS_KEY").unwrap_or(default.s3_access_key),
            s3_secret_key: env::var("S3_SECRET_KEY").unwrap_or(default.s3_secret_key),
            s3_bucket: env::var("S3_BUCKET").unwrap_or(default.s3_bucket),
        }
    }

    /// Create config for development and tests (defaults, fixed secret)
    pub fn development() -> Self {
        Self::default()
    }

    /// Create config for production (strict: required secrets must be set)
    pub fn production() -> Self {
        Self {
            jwt_secret: env::var("JWT_SECRET").expect("CRITICAL: JWT_SECRET must be set"),
            frontend_url: env::var("FRONTEND_URL").expect("FRONTEND_URL must be set"),
            s3_endpoint: env::var("S3_ENDPOINT").expect("S3_ENDPOINT must be set"),
            s3_access_key: env::var("S3_ACCESS_KEY").expect("S3_ACCESS_KEY must be set"),
            s3_secret_key: env::var("S3_SECRET_KEY").expect("S3_SECRET_KEY must be set"),
            s3_bucket: env::var("S3_BUCKET").expect("S3_BUCKET must be set"),
            ..Self::from_env()
        }
    }

    /// Canonical share URL for a link token; the QR code always encodes this.
    pub fn share_url(&self, share_link: &str) -> String {
        format!(
            "{}/share/{}",
            self.frontend_url.trim_end_matches('/'),
            share_link
        )
    }
}
