//! In-memory follow edge store.

use crate::clock::{micros_to_datetime, MonotonicClock};
use follow_types::{EdgeFilter, EdgeStore, EdgeStoreError, FollowEdge};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

type EdgeIndex = HashMap<String, HashSet<String>>;

/// Edge tables guarded by a single lock so pair uniqueness is checked and claimed atomically.
#[derive(Default)]
struct EdgeTables {
    /// edge_id -> edge.
    edges: HashMap<String, FollowEdge>,
    /// (follower_id, following_id) -> edge_id.
    pairs: HashMap<(String, String), String>,
    /// follower_id -> edge_ids.
    out_index: EdgeIndex,
    /// following_id -> edge_ids.
    in_index: EdgeIndex,
    clock: MonotonicClock,
}

impl EdgeTables {
    fn add_edge_to_index(index: &mut EdgeIndex, user_id: &str, edge_id: &str) {
        index
            .entry(user_id.to_string())
            .or_default()
            .insert(edge_id.to_string());
    }

    fn remove_edge_from_index(index: &mut EdgeIndex, user_id: &str, edge_id: &str) {
        if let Some(ids) = index.get_mut(user_id) {
            ids.remove(edge_id);
            if ids.is_empty() {
                index.remove(user_id);
            }
        }
    }

    fn insert(&mut self, edge: FollowEdge) {
        Self::add_edge_to_index(&mut self.out_index, &edge.follower_id, &edge.id);
        Self::add_edge_to_index(&mut self.in_index, &edge.following_id, &edge.id);
        self.pairs.insert(
            (edge.follower_id.clone(), edge.following_id.clone()),
            edge.id.clone(),
        );
        self.edges.insert(edge.id.clone(), edge);
    }

    fn remove(&mut self, follower_id: &str, following_id: &str) -> Option<FollowEdge> {
        let edge_id = self
            .pairs
            .remove(&(follower_id.to_string(), following_id.to_string()))?;
        let edge = self.edges.remove(&edge_id)?;
        Self::remove_edge_from_index(&mut self.out_index, &edge.follower_id, &edge.id);
        Self::remove_edge_from_index(&mut self.in_index, &edge.following_id, &edge.id);
        Some(edge)
    }

    fn index(&self, filter: EdgeFilter) -> &EdgeIndex {
        match filter {
            EdgeFilter::ByFollower => &self.out_index,
            EdgeFilter::ByFollowing => &self.in_index,
        }
    }

    fn matching(&self, filter: EdgeFilter, user_id: &str) -> impl Iterator<Item = &FollowEdge> {
        self.index(filter)
            .get(user_id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
    }
}

/// In-memory implementation of EdgeStore (process lifetime only).
pub struct InMemoryEdgeStore {
    tables: Arc<RwLock<EdgeTables>>,
}

impl InMemoryEdgeStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(EdgeTables::default())),
        }
    }
}

impl Default for InMemoryEdgeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EdgeStore for InMemoryEdgeStore {
    async fn exists(&self, follower_id: &str, following_id: &str) -> Result<bool, EdgeStoreError> {
        let guard = self.tables.read().await;
        Ok(guard
            .pairs
            .contains_key(&(follower_id.to_string(), following_id.to_string())))
    }

    async fn create(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> Result<FollowEdge, EdgeStoreError> {
        let mut guard = self.tables.write().await;
        if guard
            .pairs
            .contains_key(&(follower_id.to_string(), following_id.to_string()))
        {
            return Err(EdgeStoreError::Duplicate);
        }
        let created_at = micros_to_datetime(guard.clock.next_micros());
        let edge = FollowEdge {
            id: Uuid::new_v4().to_string(),
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
            created_at,
        };
        guard.insert(edge.clone());
        Ok(edge)
    }

    async fn delete(&self, follower_id: &str, following_id: &str) -> Result<bool, EdgeStoreError> {
        let mut guard = self.tables.write().await;
        Ok(guard.remove(follower_id, following_id).is_some())
    }

    async fn count_by_follower(&self, user_id: &str) -> Result<i64, EdgeStoreError> {
        let guard = self.tables.read().await;
        Ok(guard.out_index.get(user_id).map_or(0, |l| l.len() as i64))
    }

    async fn count_by_following(&self, user_id: &str) -> Result<i64, EdgeStoreError> {
        let guard = self.tables.read().await;
        Ok(guard.in_index.get(user_id).map_or(0, |l| l.len() as i64))
    }

    async fn scan_ordered(
        &self,
        filter: EdgeFilter,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FollowEdge>, EdgeStoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let guard = self.tables.read().await;
        let mut edges: Vec<&FollowEdge> = guard.matching(filter, user_id).collect();
        // Index sets are unordered; sort so windows are stable.
        edges.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(edges
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn all_following_ids(&self, user_id: &str) -> Result<HashSet<String>, EdgeStoreError> {
        let guard = self.tables.read().await;
        Ok(guard
            .matching(EdgeFilter::ByFollower, user_id)
            .map(|e| e.following_id.clone())
            .collect())
    }

    async fn all_follower_ids(&self, user_id: &str) -> Result<HashSet<String>, EdgeStoreError> {
        let guard = self.tables.read().await;
        Ok(guard
            .matching(EdgeFilter::ByFollowing, user_id)
            .map(|e| e.follower_id.clone())
            .collect())
    }
}
