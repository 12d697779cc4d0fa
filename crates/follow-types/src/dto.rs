//! Request and response DTOs for the public and service-to-service surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size used when the caller omits `limit` or sends a non-positive one.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Base response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    #[serde(default = "default_code")]
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

fn default_code() -> i32 {
    200
}

impl<T> BaseResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            code: 200,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Body of `POST /api/v1/follow/user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUserRequest {
    #[serde(rename = "targetUserId")]
    pub target_user_id: String,
}

/// Raw `(limit, offset)` as requested; clamping happens in the pagination engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Lenient parse of query values: absent or unparseable `limit` (or `limit < 1`) becomes
    /// the default, absent or unparseable `offset` (or `offset < 0`) becomes 0.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = offset
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|o| o.max(0))
            .unwrap_or(0);
        Self { limit, offset }
    }
}

/// Display identity returned by the profile lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub avatar: String,
    pub username: String,
}

/// One post as returned by the content lookup service (only `content` is consumed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub content: String,
}

/// An enriched edge: counterpart profile, their latest post, and when the edge was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowDetail {
    #[serde(rename = "targetUser")]
    pub target_user: UserProfile,
    #[serde(rename = "latestPostContent")]
    pub latest_post_content: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A mutual connection, enriched with profile only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualUser {
    #[serde(rename = "targetUser")]
    pub target_user: UserProfile,
}

/// A page of enriched results plus the (independently read) total.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowsData {
    pub follows: Vec<FollowDetail>,
    #[serde(rename = "totalCount")]
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FansData {
    pub fans: Vec<FollowDetail>,
    #[serde(rename = "totalCount")]
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualData {
    pub mutual: Vec<MutualUser>,
    #[serde(rename = "totalCount")]
    pub total_count: i64,
}

/// Follower / following totals for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowCounts {
    #[serde(rename = "followersCount")]
    pub followers_count: i64,
    #[serde(rename = "followingCount")]
    pub following_count: i64,
}

/// Bulk export of everyone a user follows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowingIds {
    #[serde(rename = "followingUserIds")]
    pub following_user_ids: Vec<String>,
}

/// Authenticator verdict for a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValidation {
    #[serde(default)]
    pub user_id: String,
    pub is_valid: bool,
    #[serde(default)]
    pub error: String,
}
