//! The follow edge and the selectors used to scan and enrich it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical length of a user identifier (hyphenated UUID text).
pub const USER_ID_LEN: usize = 36;

/// Directed follow relationship: `follower_id -> following_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEdge {
    pub id: String,
    pub follower_id: String,
    pub following_id: String,
    /// Assigned by the store at insert time.
    pub created_at: DateTime<Utc>,
}

impl FollowEdge {
    /// The user on the requested side of the edge.
    pub fn side(&self, side: Counterpart) -> &str {
        match side {
            Counterpart::Follower => &self.follower_id,
            Counterpart::Following => &self.following_id,
        }
    }
}

/// Which column an ordered scan matches the user id against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeFilter {
    /// Edges the user created (their following set).
    ByFollower,
    /// Edges pointing at the user (their follower set).
    ByFollowing,
}

impl EdgeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeFilter::ByFollower => "follower_id",
            EdgeFilter::ByFollowing => "following_id",
        }
    }

    /// The side of a matched edge that is *not* the scanned user.
    pub fn counterpart(self) -> Counterpart {
        match self {
            EdgeFilter::ByFollower => Counterpart::Following,
            EdgeFilter::ByFollowing => Counterpart::Follower,
        }
    }
}

impl std::fmt::Display for EdgeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of an edge selected for enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counterpart {
    Follower,
    Following,
}

/// True when `id` is a hyphenated UUID. Ids are spliced into peer URLs, so nothing
/// outside the hex-and-hyphen alphabet may pass.
pub fn is_valid_user_id(id: &str) -> bool {
    id.len() == USER_ID_LEN && uuid::Uuid::parse_str(id).is_ok()
}
