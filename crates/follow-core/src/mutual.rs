//! Mutual connections: users `A` follows who also follow `A`.

use follow_types::{EdgeStore, EdgeStoreError};
use std::collections::HashSet;

/// Intersection of `user_id`'s following set and follower set, in no particular order.
pub async fn resolve_mutual<S: EdgeStore + ?Sized>(
    store: &S,
    user_id: &str,
) -> Result<Vec<String>, EdgeStoreError> {
    let (following, followers) = tokio::try_join!(
        store.all_following_ids(user_id),
        store.all_follower_ids(user_id)
    )?;
    Ok(intersect(following, followers))
}

/// Hash intersection, probing the larger set with the smaller one.
fn intersect(a: HashSet<String>, b: HashSet<String>) -> Vec<String> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.into_iter().filter(|id| large.contains(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use follow_store::InMemoryEdgeStore;

    #[tokio::test]
    async fn only_reciprocal_edges_count() {
        let store = InMemoryEdgeStore::new();
        store.create("a", "b").await.unwrap();
        store.create("b", "a").await.unwrap();
        store.create("a", "c").await.unwrap();
        store.create("d", "a").await.unwrap();

        let mutual = resolve_mutual(&store, "a").await.unwrap();
        assert_eq!(mutual, vec!["b".to_string()]);

        let mutual_b = resolve_mutual(&store, "b").await.unwrap();
        assert_eq!(mutual_b, vec!["a".to_string()]);
        assert!(resolve_mutual(&store, "c").await.unwrap().is_empty());
    }

    #[test]
    fn intersect_is_symmetric() {
        let a: HashSet<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        let b: HashSet<String> = ["y"].iter().map(|s| s.to_string()).collect();
        assert_eq!(intersect(a.clone(), b.clone()), vec!["y".to_string()]);
        assert_eq!(intersect(b, a), vec!["y".to_string()]);
    }
}
