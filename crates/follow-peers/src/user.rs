//! Client for the user service: token validation and profile lookup.

use crate::{build_client, parse_base_url, peer_url, transport_err};
use follow_types::{
    AuthError, Authenticator, PeerError, ProfileLookup, TokenValidation, UserProfile,
};
use std::time::Duration;

/// User service over HTTP (`POST /auth/validate`, `GET /users/{id}`).
pub struct HttpUserService {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpUserService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PeerError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: parse_base_url(&base_url.into())?,
        })
    }
}

#[async_trait::async_trait]
impl Authenticator for HttpUserService {
    async fn validate(&self, credential: &str) -> Result<TokenValidation, AuthError> {
        let url = peer_url(&self.base_url, &["auth", "validate"]);
        let body = serde_json::json!({ "token": credential });
        let res = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        if !status.is_success() {
            tracing::warn!(status = %status, "token validation returned an error status");
            return Err(AuthError::Unavailable(format!(
                "validate API error {}: {}",
                status, body
            )));
        }
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "undecodable token validation response");
            AuthError::Unavailable(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl ProfileLookup for HttpUserService {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, PeerError> {
        let url = peer_url(&self.base_url, &["users", user_id]);
        let res = self.client.get(url).send().await.map_err(transport_err)?;
        let status = res.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PeerError::NotFound(user_id.to_string()));
        }
        let body = res.text().await.map_err(transport_err)?;
        if !status.is_success() {
            tracing::warn!(
                user_id = %user_id,
                status = %status,
                "profile lookup returned an error status"
            );
            return Err(PeerError::Unavailable(format!(
                "profile API error {}: {}",
                status, body
            )));
        }
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "undecodable profile response");
            PeerError::Malformed(e.to_string())
        })
    }
}
