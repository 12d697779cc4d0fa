//! Client for the post service: a user's most recent content.

use crate::{build_client, parse_base_url, peer_url, transport_err};
use follow_types::{ContentItem, ContentLookup, PeerError};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    posts: Vec<ContentItem>,
}

/// Post service over HTTP (`GET /users/{id}/posts?limit=N&offset=0`).
pub struct HttpPostService {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpPostService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PeerError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: parse_base_url(&base_url.into())?,
        })
    }
}

#[async_trait::async_trait]
impl ContentLookup for HttpPostService {
    async fn get_recent_content(
        &self,
        user_id: &str,
        count: u32,
    ) -> Result<Vec<ContentItem>, PeerError> {
        let url = peer_url(&self.base_url, &["users", user_id, "posts"]);
        let res = self
            .client
            .get(url)
            .query(&[("limit", count), ("offset", 0)])
            .send()
            .await
            .map_err(transport_err)?;
        let status = res.status();
        let body = res.text().await.map_err(transport_err)?;
        if !status.is_success() {
            tracing::warn!(
                user_id = %user_id,
                status = %status,
                "posts lookup returned an error status"
            );
            return Err(PeerError::Unavailable(format!(
                "posts API error {}: {}",
                status, body
            )));
        }
        let parsed: PostsResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "undecodable posts response");
            PeerError::Malformed(e.to_string())
        })?;
        Ok(parsed.posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_posts_field_means_no_content() {
        let parsed: PostsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.posts.is_empty());
        let parsed: PostsResponse =
            serde_json::from_str(r#"{"posts":[{"content":"hi","id":"p1"}]}"#).unwrap();
        assert_eq!(parsed.posts[0].content, "hi");
    }
}
