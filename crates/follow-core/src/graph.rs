//! FollowGraph: the relationship facade over an edge store and the two peer services.

use crate::enrich::Enricher;
use crate::mutual::resolve_mutual;
use crate::pagination::{scan_page, Window};
use follow_types::*;
use std::future::Future;
use std::time::Duration;

/// Timeouts and limits for [`FollowGraph`].
#[derive(Debug, Clone)]
pub struct FollowGraphConfig {
    /// Bound on every edge store call; expiry fails the request as storage unavailable.
    pub store_timeout: Duration,
    /// Bound on every individual peer call.
    pub peer_timeout: Duration,
    /// Upper clamp on page size, which is also the fan-out width.
    pub max_page_size: usize,
}

impl Default for FollowGraphConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            peer_timeout: Duration::from_secs(2),
            max_page_size: 100,
        }
    }
}

/// Relationships implementation composing an edge store with profile/content enrichment.
pub struct FollowGraph<S, P, C> {
    store: S,
    enricher: Enricher<P, C>,
    config: FollowGraphConfig,
}

impl<S, P, C> FollowGraph<S, P, C>
where
    S: EdgeStore,
    P: ProfileLookup,
    C: ContentLookup,
{
    pub fn new(store: S, profiles: P, content: C) -> Self {
        Self::with_config(store, profiles, content, FollowGraphConfig::default())
    }

    pub fn with_config(store: S, profiles: P, content: C, config: FollowGraphConfig) -> Self {
        Self {
            store,
            enricher: Enricher::new(profiles, content, config.peer_timeout),
            config,
        }
    }

    fn check_user_id(id: &str) -> Result<(), RelationshipError> {
        if is_valid_user_id(id) {
            Ok(())
        } else {
            Err(RelationshipError::InvalidUserId(id.to_string()))
        }
    }

    /// Run one store operation under the store timeout.
    async fn store_call<T, F>(&self, op: &'static str, fut: F) -> Result<T, EdgeStoreError>
    where
        F: Future<Output = Result<T, EdgeStoreError>>,
    {
        let res = match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(EdgeStoreError::Unavailable(format!("{op} timed out"))),
        };
        if let Err(EdgeStoreError::Unavailable(ref msg)) = res {
            tracing::error!(op, error = %msg, "edge store call failed");
        }
        res
    }

    async fn list_edges(
        &self,
        filter: EdgeFilter,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Page<FollowDetail>, RelationshipError> {
        let window = Window::clamp(page, self.config.max_page_size);
        // The total is read separately from the page and may reflect a slightly different
        // snapshot under concurrent writes.
        let (edges, total_count) = tokio::try_join!(
            self.store_call("scan_ordered", scan_page(&self.store, filter, user_id, window)),
            self.store_call("count", async {
                match filter {
                    EdgeFilter::ByFollower => self.store.count_by_follower(user_id).await,
                    EdgeFilter::ByFollowing => self.store.count_by_following(user_id).await,
                }
            }),
        )?;
        let items = self
            .enricher
            .enrich_edges(&edges, filter.counterpart())
            .await;
        tracing::debug!(
            user_id = %user_id,
            filter = %filter,
            scanned = edges.len(),
            returned = items.len(),
            "listed edges"
        );
        Ok(Page { items, total_count })
    }
}

#[async_trait::async_trait]
impl<S, P, C> Relationships for FollowGraph<S, P, C>
where
    S: EdgeStore,
    P: ProfileLookup,
    C: ContentLookup,
{
    async fn follow(&self, caller: &str, target: &str) -> Result<FollowEdge, RelationshipError> {
        Self::check_user_id(target)?;
        if caller == target {
            return Err(RelationshipError::SelfFollow);
        }
        // Fast path for a friendly error; `create` is what actually enforces uniqueness.
        if self
            .store_call("exists", self.store.exists(caller, target))
            .await?
        {
            return Err(RelationshipError::AlreadyFollowing);
        }
        match self
            .store_call("create", self.store.create(caller, target))
            .await
        {
            Ok(edge) => {
                tracing::info!(
                    follower_id = %caller,
                    following_id = %target,
                    edge_id = %edge.id,
                    "followed"
                );
                Ok(edge)
            }
            Err(EdgeStoreError::Duplicate) => {
                tracing::debug!(follower_id = %caller, following_id = %target, "lost follow race");
                Err(RelationshipError::AlreadyFollowing)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn unfollow(&self, caller: &str, target: &str) -> Result<(), RelationshipError> {
        Self::check_user_id(target)?;
        if caller == target {
            return Err(RelationshipError::SelfFollow);
        }
        if !self
            .store_call("exists", self.store.exists(caller, target))
            .await?
        {
            return Err(RelationshipError::NotFollowing);
        }
        if !self
            .store_call("delete", self.store.delete(caller, target))
            .await?
        {
            tracing::debug!(follower_id = %caller, following_id = %target, "lost unfollow race");
            return Err(RelationshipError::NotFollowing);
        }
        tracing::info!(follower_id = %caller, following_id = %target, "unfollowed");
        Ok(())
    }

    async fn list_following(
        &self,
        caller: &str,
        page: PageRequest,
    ) -> Result<Page<FollowDetail>, RelationshipError> {
        self.list_edges(EdgeFilter::ByFollower, caller, page).await
    }

    async fn list_followers(
        &self,
        caller: &str,
        page: PageRequest,
    ) -> Result<Page<FollowDetail>, RelationshipError> {
        self.list_edges(EdgeFilter::ByFollowing, caller, page).await
    }

    async fn list_mutual(
        &self,
        caller: &str,
        page: PageRequest,
    ) -> Result<Page<MutualUser>, RelationshipError> {
        let mut ids = self
            .store_call("resolve_mutual", resolve_mutual(&self.store, caller))
            .await?;
        ids.sort_unstable();
        let window = Window::clamp(page, self.config.max_page_size);
        let items = self.enricher.enrich_profiles(window.slice(&ids)).await;
        Ok(Page {
            items,
            total_count: ids.len() as i64,
        })
    }

    async fn counts(&self, user_id: &str) -> Result<FollowCounts, RelationshipError> {
        Self::check_user_id(user_id)?;
        let (following_count, followers_count) = tokio::try_join!(
            self.store_call("count_by_follower", self.store.count_by_follower(user_id)),
            self.store_call("count_by_following", self.store.count_by_following(user_id)),
        )?;
        Ok(FollowCounts {
            followers_count,
            following_count,
        })
    }

    async fn following_ids(&self, user_id: &str) -> Result<Vec<String>, RelationshipError> {
        Self::check_user_id(user_id)?;
        let mut ids: Vec<String> = self
            .store_call("all_following_ids", self.store.all_following_ids(user_id))
            .await?
            .into_iter()
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
