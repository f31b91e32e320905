use crate::api::error::AppError;
use crate::utils::auth::validate_jwt;
use crate::{AppState, entities::prelude::Users};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use sea_orm::EntityTrait;

/// Requires a valid bearer token whose subject still exists in the database.
/// Inserts `Claims` into request extensions on success.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers());

    if let Some(token) = token {
        if let Ok(claims) = validate_jwt(&token, &state.config.jwt_secret) {
            // Check if user still exists in DB
            let user_exists = Users::find_by_id(claims.sub.clone())
                .one(&state.db)
                .await?
                .is_some();

            if user_exists {
                req.extensions_mut().insert(claims);
                return Ok(next.run(req).await);
            }
        }
    }

    Err(AppError::Unauthorized(
        "Authentication required".to_string(),
    ))
}

/// Best-effort identity for endpoints that allow anonymous access: a bad or
/// missing token is simply "no requester", never an error.
pub fn optional_identity(headers: &HeaderMap, secret: &str) -> Option<String> {
    let token = bearer_token(headers)?;
    validate_jwt(&token, secret).ok().map(|claims| claims.sub)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}
