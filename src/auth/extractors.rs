use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::{error, warn};

use super::{jwt::JwtKeys, repo_types::User};
use crate::{error::AppError, state::AppState};

/// Authenticated caller, resolved from the bearer token to a live user row.
pub struct AuthUser(pub User);

/// Pulls the token out of `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized("Missing authorization header"))?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(*token),
        _ => Err(AppError::Unauthorized("Invalid authorization header format")),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = JwtKeys::from_ref(state).verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized("Invalid token")
        })?;

        // Fail closed: a store fault is reported as 401, never let through.
        match state.users.find_by_id(claims.sub).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => {
                warn!(user_id = %claims.sub, "token subject no longer exists");
                Err(AppError::Unauthorized("Unauthorized access"))
            }
            Err(e) => {
                error!(error = %e, user_id = %claims.sub, "user lookup failed");
                Err(AppError::Unauthorized("Unauthorized access"))
            }
        }
    }
}
