//! Bearer authentication extractor.

use crate::error::ApiError;
use crate::server::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use follow_types::AuthError;
use std::sync::Arc;

/// The caller's identity, as vouched for by the authenticator.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Extract the credential from `Authorization: Bearer <token>`.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::BadScheme),
    }
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::Missing)?
            .to_str()
            .map_err(|_| AuthError::BadScheme)?;
        let token = bearer_token(header)?;
        let verdict = state.authenticator.validate(token).await?;
        if !verdict.is_valid || verdict.user_id.is_empty() {
            let reason = if verdict.error.is_empty() {
                "invalid token".to_string()
            } else {
                verdict.error
            };
            return Err(AuthError::Rejected(reason).into());
        }
        Ok(AuthUser(verdict.user_id))
    }
}
