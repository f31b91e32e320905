//! Share-link access policy.
//!
//! `evaluate_access` is the single decision point for every read through a
//! share link. It is pure and synchronous: the handlers fetch the record,
//! call the policy, then perform side effects (download counting, redirect)
//! only on `Allow`.

use crate::api::error::AppError;
use crate::entities::files;
use crate::services::share_service::ShareService;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// Non-terminal: the client should re-prompt for a password.
    Challenge(ChallengeReason),
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeReason {
    PasswordRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Expired,
    DownloadLimitExceeded,
    InvalidPassword,
    Forbidden,
}

/// Evaluation order matters: expiry and download limit are cheap, non-secret
/// checks and short-circuit before any credential material is touched. An
/// expired file never leaks its existence behind a password prompt.
pub fn evaluate_access(
    file: &files::Model,
    now: DateTime<Utc>,
    supplied_password: Option<&str>,
    requester_id: Option<&str>,
) -> Result<AccessDecision, AppError> {
    if file.is_expired(now) {
        return Ok(AccessDecision::Deny(DenyReason::Expired));
    }

    if file.is_download_limit_exceeded() {
        return Ok(AccessDecision::Deny(DenyReason::DownloadLimitExceeded));
    }

    if let Some(hash) = &file.password_hash {
        match supplied_password.filter(|p| !p.is_empty()) {
            None => {
                return Ok(AccessDecision::Challenge(ChallengeReason::PasswordRequired));
            }
            Some(password) => {
                if !ShareService::verify_password(password, hash)? {
                    return Ok(AccessDecision::Deny(DenyReason::InvalidPassword));
                }
            }
        }
    }

    if !file.is_public && requester_id != Some(file.owner_id.as_str()) {
        return Ok(AccessDecision::Deny(DenyReason::Forbidden));
    }

    Ok(AccessDecision::Allow)
}

impl AccessDecision {
    /// Map the decision onto the HTTP-level outcome. `Ok(())` means access
    /// is granted and the caller may proceed with side effects.
    pub fn authorize(self) -> Result<(), AppError> {
        match self {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Challenge(ChallengeReason::PasswordRequired) => {
                Err(AppError::PasswordRequired)
            }
            AccessDecision::Deny(DenyReason::Expired) => {
                Err(AppError::Gone("File link has expired".to_string()))
            }
            AccessDecision::Deny(DenyReason::DownloadLimitExceeded) => {
                Err(AppError::Gone("Download limit exceeded".to_string()))
            }
            AccessDecision::Deny(DenyReason::InvalidPassword) => {
                Err(AppError::Unauthorized("Invalid password".to_string()))
            }
            AccessDecision::Deny(DenyReason::Forbidden) => {
                Err(AppError::Forbidden("Access denied".to_string()))
            }
        }
    }
}
