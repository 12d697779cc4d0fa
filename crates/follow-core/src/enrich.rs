//! Fan-out enrichment: per-row profile and latest-content lookups, issued concurrently and
//! reassembled in input order.

use follow_types::{
    ContentLookup, Counterpart, FollowDetail, FollowEdge, MutualUser, PeerError, ProfileLookup,
    UserProfile,
};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::Duration;

/// Resolves display data for edge counterparts against the two peer services.
///
/// Row policy: a failed profile lookup drops the row; a failed or empty content lookup only
/// leaves `latest_post_content` empty. Every peer call carries its own timeout, so one slow
/// peer response never holds up or cancels its siblings beyond that bound.
pub struct Enricher<P, C> {
    profiles: P,
    content: C,
    timeout: Duration,
}

impl<P, C> Enricher<P, C>
where
    P: ProfileLookup,
    C: ContentLookup,
{
    pub fn new(profiles: P, content: C, timeout: Duration) -> Self {
        Self {
            profiles,
            content,
            timeout,
        }
    }

    /// Enrich the `side` user of each edge. Output order follows `edges`, minus dropped rows.
    pub async fn enrich_edges(&self, edges: &[FollowEdge], side: Counterpart) -> Vec<FollowDetail> {
        gather_ordered(edges.iter().map(|edge| self.enrich_edge(edge, side)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Profile-only enrichment for bare user ids (mutual listing).
    pub async fn enrich_profiles(&self, user_ids: &[String]) -> Vec<MutualUser> {
        gather_ordered(user_ids.iter().map(|id| async move {
            match self.profile(id).await {
                Ok(profile) => Some(MutualUser {
                    target_user: profile,
                }),
                Err(e) => {
                    tracing::warn!(
                        user_id = %id,
                        error = %e,
                        "profile lookup failed; dropping row"
                    );
                    None
                }
            }
        }))
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    async fn enrich_edge(&self, edge: &FollowEdge, side: Counterpart) -> Option<FollowDetail> {
        let user_id = edge.side(side);
        let (profile, latest) = tokio::join!(self.profile(user_id), self.latest_content(user_id));
        let profile = match profile {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(
                    edge_id = %edge.id,
                    user_id = %user_id,
                    error = %e,
                    retryable = e.is_retryable(),
                    "profile lookup failed; dropping row"
                );
                return None;
            }
        };
        Some(FollowDetail {
            target_user: profile,
            latest_post_content: latest,
            timestamp: edge.created_at,
        })
    }

    async fn profile(&self, user_id: &str) -> Result<UserProfile, PeerError> {
        tokio::time::timeout(self.timeout, self.profiles.get_profile(user_id))
            .await
            .unwrap_or(Err(PeerError::Timeout))
    }

    async fn latest_content(&self, user_id: &str) -> Option<String> {
        let res = tokio::time::timeout(self.timeout, self.content.get_recent_content(user_id, 1))
            .await
            .unwrap_or(Err(PeerError::Timeout));
        match res {
            Ok(items) => items.into_iter().next().map(|item| item.content),
            Err(e) => {
                tracing::debug!(user_id = %user_id, error = %e, "content lookup failed");
                None
            }
        }
    }
}

/// Drive every task concurrently and place each result in the slot of its input index,
/// regardless of completion order.
async fn gather_ordered<F, T>(tasks: impl IntoIterator<Item = F>) -> Vec<Option<T>>
where
    F: Future<Output = Option<T>>,
{
    let mut pending: FuturesUnordered<_> = tasks
        .into_iter()
        .enumerate()
        .map(|(idx, task)| async move { (idx, task.await) })
        .collect();
    let mut slots: Vec<Option<T>> = Vec::with_capacity(pending.len());
    slots.resize_with(pending.len(), || None);
    while let Some((idx, out)) = pending.next().await {
        slots[idx] = out;
    }
    slots
}
