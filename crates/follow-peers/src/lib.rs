//! Clients for the peer services the follow service depends on.

#[cfg(feature = "test-util")]
pub mod mock;
mod post;
mod user;

pub use follow_types::{AuthError, Authenticator, ContentLookup, PeerError, ProfileLookup};
pub use post::HttpPostService;
pub use user::HttpUserService;

#[cfg(feature = "test-util")]
pub use mock::{MockAuthenticator, MockContent, MockProfiles};

use std::time::Duration;

/// Shared client for one peer; every request is bounded by `timeout`.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, PeerError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PeerError::Unavailable(e.to_string()))
}

/// Parse a peer base URL once at construction.
pub(crate) fn parse_base_url(base_url: &str) -> Result<reqwest::Url, PeerError> {
    let url = reqwest::Url::parse(base_url)
        .map_err(|e| PeerError::Unavailable(format!("invalid peer URL {base_url:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(PeerError::Unavailable(format!(
            "peer URL {base_url:?} cannot carry a path"
        )));
    }
    Ok(url)
}

/// `base` with `segments` appended. Each segment is percent-encoded on its own, so `/`, `?`
/// and `#` inside a user id stay inside that segment.
pub(crate) fn peer_url(base: &reqwest::Url, segments: &[&str]) -> reqwest::Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

pub(crate) fn transport_err(e: reqwest::Error) -> PeerError {
    if e.is_timeout() {
        PeerError::Timeout
    } else {
        PeerError::Unavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_escaped() {
        let base = parse_base_url("http://users.internal:8001/api/").unwrap();
        let url = peer_url(&base, &["users", "../auth/validate?x=1#frag"]);
        assert_eq!(url.path(), "/api/users/..%2Fauth%2Fvalidate%3Fx=1%23frag");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());

        let bare = parse_base_url("http://127.0.0.1:8001").unwrap();
        assert_eq!(peer_url(&bare, &["auth", "validate"]).path(), "/auth/validate");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:users@example.com").is_err());
    }
}
