//! Skip/limit windows over the newest-first edge ordering.

use follow_types::{EdgeFilter, EdgeStore, EdgeStoreError, FollowEdge, PageRequest};

/// A clamped `(offset, limit)` window. `limit` is at least 1 and at most the configured cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

impl Window {
    pub fn clamp(page: PageRequest, max_limit: usize) -> Self {
        let limit = usize::try_from(page.limit.max(1)).unwrap_or(usize::MAX);
        let offset = usize::try_from(page.offset.max(0)).unwrap_or(usize::MAX);
        Self {
            offset,
            limit: limit.min(max_limit.max(1)),
        }
    }

    /// The same window applied to an already materialised, already ordered slice.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = start.saturating_add(self.limit).min(items.len());
        &items[start..end]
    }
}

/// One page of edges for `user_id`. Stable for a stable store snapshot: the same window
/// over unchanged data returns the same edges in the same order.
pub async fn scan_page<S: EdgeStore + ?Sized>(
    store: &S,
    filter: EdgeFilter,
    user_id: &str,
    window: Window,
) -> Result<Vec<FollowEdge>, EdgeStoreError> {
    store
        .scan_ordered(filter, user_id, window.offset, window.limit)
        .await
}
