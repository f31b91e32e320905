use anyhow::{Result, anyhow};

/// MIME types accepted for upload. Rejecting anything else is a client
/// error, not a server fault.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    // Images
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    // Documents
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
    // Archives
    "application/zip",
    "application/x-rar-compressed",
    "application/x-7z-compressed",
    // Videos
    "video/mp4",
    "video/avi",
    "video/mkv",
    "video/mov",
    "video/wmv",
    // Audio
    "audio/mp3",
    "audio/wav",
    "audio/ogg",
    "audio/m4a",
    // Code files
    "text/javascript",
    "application/json",
    "text/css",
    "text/html",
    "application/x-python-code",
    "text/x-python",
];

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates MIME type against the allowlist
pub fn validate_mime_type(content_type: &str) -> Result<String> {
    let normalized = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    if ALLOWED_MIME_TYPES.contains(&normalized.as_str()) {
        return Ok(normalized);
    }

    Err(anyhow!(ValidationError {
        code: "INVALID_MIME_TYPE",
        message: format!("File type {} is not allowed", content_type),
    }))
}

/// Validates file size against the per-file ceiling
pub fn validate_file_size(size: usize, max_size: usize) -> Result<()> {
    if size == 0 {
        return Err(anyhow!(ValidationError {
            code: "EMPTY_FILE",
            message: "File is empty".to_string(),
        }));
    }
    if size > max_size {
        return Err(anyhow!(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} MB",
                size,
                max_size / 1024 / 1024
            ),
        }));
    }
    Ok(())
}

/// Usernames: 3-30 characters, letters, numbers and underscores only
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(3..=30).contains(&len) {
        return Err(anyhow!(ValidationError {
            code: "INVALID_USERNAME",
            message: "Username must be between 3 and 30 characters".to_string(),
        }));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(anyhow!(ValidationError {
            code: "INVALID_USERNAME",
            message: "Username can only contain letters, numbers, and underscores".to_string(),
        }));
    }
    Ok(())
}

/// Account passwords: at least 6 characters with one lowercase, one
/// uppercase, and one digit
pub fn validate_account_password(password: &str) -> Result<()> {
    if password.chars().count() < 6 {
        return Err(anyhow!(ValidationError {
            code: "WEAK_PASSWORD",
            message: "Password must be at least 6 characters long".to_string(),
        }));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(anyhow!(ValidationError {
            code: "WEAK_PASSWORD",
            message:
                "Password must contain at least one lowercase letter, one uppercase letter, and one number"
                    .to_string(),
        }));
    }
    Ok(())
}

/// Share passwords are lighter-weight capabilities: 4 characters minimum
pub fn validate_share_password(password: &str) -> Result<()> {
    if password.chars().count() < 4 {
        return Err(anyhow!(ValidationError {
            code: "WEAK_SHARE_PASSWORD",
            message: "Password must be at least 4 characters long".to_string(),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mime_type() {
        assert!(validate_mime_type("image/png").is_ok());
        assert!(validate_mime_type("application/pdf").is_ok());
        assert!(validate_mime_type("video/mp4").is_ok());
        // Parameters are stripped before matching
        assert_eq!(
            validate_mime_type("text/plain; charset=utf-8").unwrap(),
            "text/plain"
        );

        assert!(validate_mime_type("application/x-msdownload").is_err());
        assert!(validate_mime_type("application/octet-stream").is_err());
    }

    #[test]
    fn test_validate_file_size() {
        let max = 50 * 1024 * 1024;
        assert!(validate_file_size(1024, max).is_ok());
        assert!(validate_file_size(max, max).is_ok());
        assert!(validate_file_size(max + 1, max).is_err());
        assert!(validate_file_size(0, max).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"x".repeat(31)).is_err());
        assert!(validate_username("bad name").is_err());
        assert!(validate_username("bad-name").is_err());
    }

    #[test]
    fn test_validate_account_password() {
        assert!(validate_account_password("Passw0rd").is_ok());
        assert!(validate_account_password("short").is_err());
        assert!(validate_account_password("alllowercase1").is_err());
        assert!(validate_account_password("ALLUPPERCASE1").is_err());
        assert!(validate_account_password("NoDigitsHere").is_err());
    }

    #[test]
    fn test_validate_share_password() {
        assert!(validate_share_password("abcd").is_ok());
        assert!(validate_share_password("abc").is_err());
    }
}
