//! Scripted peers for tests: fixed data, injectable failures and delays, no network.

use follow_types::{
    AuthError, Authenticator, ContentItem, ContentLookup, PeerError, ProfileLookup,
    TokenValidation, UserProfile,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Profile lookup backed by a map. Unknown ids answer `NotFound`.
#[derive(Default)]
pub struct MockProfiles {
    profiles: HashMap<String, UserProfile>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: &str, username: &str) -> Self {
        self.profiles.insert(
            id.to_string(),
            UserProfile {
                id: id.to_string(),
                avatar: format!("https://avatars.example/{username}.png"),
                username: username.to_string(),
            },
        );
        self
    }

    /// Lookups for `id` fail with a transport error.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Lookups for `id` sleep before answering.
    pub fn delayed(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ProfileLookup for MockProfiles {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, PeerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(user_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(user_id) {
            return Err(PeerError::Unavailable(format!("profile lookup failed: {user_id}")));
        }
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| PeerError::NotFound(user_id.to_string()))
    }
}

/// Content lookup backed by a map of newest-first post bodies.
#[derive(Default)]
pub struct MockContent {
    posts: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(mut self, id: &str, posts: &[&str]) -> Self {
        self.posts
            .insert(id.to_string(), posts.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn delayed(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ContentLookup for MockContent {
    async fn get_recent_content(
        &self,
        user_id: &str,
        count: u32,
    ) -> Result<Vec<ContentItem>, PeerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(user_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(user_id) {
            return Err(PeerError::Unavailable(format!("content lookup failed: {user_id}")));
        }
        Ok(self
            .posts
            .get(user_id)
            .into_iter()
            .flatten()
            .take(count as usize)
            .map(|content| ContentItem {
                content: content.clone(),
            })
            .collect())
    }
}

/// Authenticator with a fixed token table.
#[derive(Default)]
pub struct MockAuthenticator {
    tokens: HashMap<String, String>,
    unavailable: bool,
}

impl MockAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, user_id: &str) -> Self {
        self.tokens.insert(token.to_string(), user_id.to_string());
        self
    }

    /// Every validation fails at the transport level.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

#[async_trait::async_trait]
impl Authenticator for MockAuthenticator {
    async fn validate(&self, credential: &str) -> Result<TokenValidation, AuthError> {
        if self.unavailable {
            return Err(AuthError::Unavailable("user service down".to_string()));
        }
        Ok(match self.tokens.get(credential) {
            Some(user_id) => TokenValidation {
                user_id: user_id.clone(),
                is_valid: true,
                error: String::new(),
            },
            None => TokenValidation {
                user_id: String::new(),
                is_valid: false,
                error: "invalid or expired token".to_string(),
            },
        })
    }
}
