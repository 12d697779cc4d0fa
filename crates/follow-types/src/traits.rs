//! Traits for the edge store, peer services, and the relationship facade.

use crate::{
    ContentItem, EdgeFilter, FollowCounts, FollowDetail, FollowEdge, MutualUser, Page, PageRequest,
    TokenValidation, UserProfile,
};
use async_trait::async_trait;
use std::collections::HashSet;

/// Durable set of directed follow edges.
///
/// Contract: at most one live edge per `(follower_id, following_id)` pair. `create` is the
/// authoritative guard and returns `Duplicate` when the pair exists, even if a preceding
/// `exists` said otherwise. Implementations never retry.
#[async_trait]
pub trait EdgeStore: Send + Sync {
    /// True iff a live edge with exactly this pair exists.
    async fn exists(&self, follower_id: &str, following_id: &str) -> Result<bool, EdgeStoreError>;

    /// Insert a new edge with a fresh id and timestamp; returns the stored edge.
    async fn create(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> Result<FollowEdge, EdgeStoreError>;

    /// Remove the edge for the pair; `Ok(false)` when nothing was removed.
    async fn delete(&self, follower_id: &str, following_id: &str) -> Result<bool, EdgeStoreError>;

    /// Number of users `user_id` follows.
    async fn count_by_follower(&self, user_id: &str) -> Result<i64, EdgeStoreError>;

    /// Number of users following `user_id`.
    async fn count_by_following(&self, user_id: &str) -> Result<i64, EdgeStoreError>;

    /// Newest-first window (`created_at` desc, then id desc) of edges matching the filter.
    async fn scan_ordered(
        &self,
        filter: EdgeFilter,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FollowEdge>, EdgeStoreError>;

    /// Every user `user_id` follows. Never truncated.
    async fn all_following_ids(&self, user_id: &str) -> Result<HashSet<String>, EdgeStoreError>;

    /// Every user following `user_id`. Never truncated.
    async fn all_follower_ids(&self, user_id: &str) -> Result<HashSet<String>, EdgeStoreError>;
}

/// Profile lookup peer.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, PeerError>;
}

/// Content lookup peer.
#[async_trait]
pub trait ContentLookup: Send + Sync {
    /// Most recent `count` items for the user, newest first.
    async fn get_recent_content(
        &self,
        user_id: &str,
        count: u32,
    ) -> Result<Vec<ContentItem>, PeerError>;
}

/// Maps a bearer credential to a user identity.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn validate(&self, credential: &str) -> Result<TokenValidation, AuthError>;
}

/// The relationship facade: every query shape the service answers.
#[async_trait]
pub trait Relationships: Send + Sync {
    /// Create `caller -> target`; returns the new edge.
    async fn follow(&self, caller: &str, target: &str) -> Result<FollowEdge, RelationshipError>;

    /// Remove `caller -> target`.
    async fn unfollow(&self, caller: &str, target: &str) -> Result<(), RelationshipError>;

    /// Users `caller` follows, newest edge first, enriched.
    async fn list_following(
        &self,
        caller: &str,
        page: PageRequest,
    ) -> Result<Page<FollowDetail>, RelationshipError>;

    /// Users following `caller`, newest edge first, enriched.
    async fn list_followers(
        &self,
        caller: &str,
        page: PageRequest,
    ) -> Result<Page<FollowDetail>, RelationshipError>;

    /// Users `caller` follows who also follow `caller`.
    async fn list_mutual(
        &self,
        caller: &str,
        page: PageRequest,
    ) -> Result<Page<MutualUser>, RelationshipError>;

    async fn counts(&self, user_id: &str) -> Result<FollowCounts, RelationshipError>;

    async fn following_ids(&self, user_id: &str) -> Result<Vec<String>, RelationshipError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EdgeStoreError {
    #[error("edge already exists")]
    Duplicate,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("peer unavailable: {0}")]
    Unavailable(String),
    #[error("peer call timed out")]
    Timeout,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed peer response: {0}")]
    Malformed(String),
}

impl PeerError {
    /// Transport-level failures are worth retrying; a definite answer is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PeerError::Unavailable(_) | PeerError::Timeout)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    Missing,
    #[error("authorization header must use the Bearer scheme")]
    BadScheme,
    #[error("{0}")]
    Rejected(String),
    #[error("authenticator unavailable: {0}")]
    Unavailable(String),
}

/// Coarse outcome class used by the transport layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    ClientError,
    Conflict,
    ServerError,
}

#[derive(Debug, thiserror::Error)]
pub enum RelationshipError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),
    #[error("cannot follow or unfollow yourself")]
    SelfFollow,
    #[error("already following this user")]
    AlreadyFollowing,
    #[error("not following this user")]
    NotFollowing,
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl RelationshipError {
    pub fn status_class(&self) -> StatusClass {
        match self {
            RelationshipError::InvalidUserId(_) | RelationshipError::SelfFollow => {
                StatusClass::ClientError
            }
            RelationshipError::AlreadyFollowing | RelationshipError::NotFollowing => {
                StatusClass::Conflict
            }
            RelationshipError::StorageUnavailable(_) => StatusClass::ServerError,
        }
    }
}

impl From<EdgeStoreError> for RelationshipError {
    fn from(e: EdgeStoreError) -> Self {
        match e {
            EdgeStoreError::Duplicate => RelationshipError::AlreadyFollowing,
            EdgeStoreError::Unavailable(msg) => RelationshipError::StorageUnavailable(msg),
        }
    }
}

#[async_trait]
impl<T: EdgeStore + ?Sized> EdgeStore for std::sync::Arc<T> {
    async fn exists(&self, follower_id: &str, following_id: &str) -> Result<bool, EdgeStoreError> {
        (**self).exists(follower_id, following_id).await
    }

    async fn create(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> Result<FollowEdge, EdgeStoreError> {
        (**self).create(follower_id, following_id).await
    }

    async fn delete(&self, follower_id: &str, following_id: &str) -> Result<bool, EdgeStoreError> {
        (**self).delete(follower_id, following_id).await
    }

    async fn count_by_follower(&self, user_id: &str) -> Result<i64, EdgeStoreError> {
        (**self).count_by_follower(user_id).await
    }

    async fn count_by_following(&self, user_id: &str) -> Result<i64, EdgeStoreError> {
        (**self).count_by_following(user_id).await
    }

    async fn scan_ordered(
        &self,
        filter: EdgeFilter,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FollowEdge>, EdgeStoreError> {
        (**self).scan_ordered(filter, user_id, offset, limit).await
    }

    async fn all_following_ids(&self, user_id: &str) -> Result<HashSet<String>, EdgeStoreError> {
        (**self).all_following_ids(user_id).await
    }

    async fn all_follower_ids(&self, user_id: &str) -> Result<HashSet<String>, EdgeStoreError> {
        (**self).all_follower_ids(user_id).await
    }
}

#[async_trait]
impl<T: ProfileLookup + ?Sized> ProfileLookup for std::sync::Arc<T> {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, PeerError> {
        (**self).get_profile(user_id).await
    }
}

#[async_trait]
impl<T: ContentLookup + ?Sized> ContentLookup for std::sync::Arc<T> {
    async fn get_recent_content(
        &self,
        user_id: &str,
        count: u32,
    ) -> Result<Vec<ContentItem>, PeerError> {
        (**self).get_recent_content(user_id, count).await
    }
}

#[async_trait]
impl<T: Authenticator + ?Sized> Authenticator for std::sync::Arc<T> {
    async fn validate(&self, credential: &str) -> Result<TokenValidation, AuthError> {
        (**self).validate(credential).await
    }
}
