//! SQLite-backed follow edge store (persistence).

use crate::clock::{micros_to_datetime, MonotonicClock};
use async_trait::async_trait;
use follow_types::{EdgeFilter, EdgeStore, EdgeStoreError, FollowEdge};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

struct SqliteInner {
    conn: rusqlite::Connection,
    clock: MonotonicClock,
}

/// SQLite-backed edge store. Pair uniqueness is a table constraint; a violation surfaces as
/// `EdgeStoreError::Duplicate`.
pub struct SqliteEdgeStore {
    inner: Arc<Mutex<SqliteInner>>,
}

fn storage_err(e: rusqlite::Error) -> EdgeStoreError {
    EdgeStoreError::Unavailable(e.to_string())
}

const INSERT_EDGE: &str =
    "INSERT INTO follows (id, follower_id, following_id, created_at) VALUES (?1, ?2, ?3, ?4)";
const EDGE_EXISTS: &str =
    "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ?1 AND following_id = ?2)";

/// Only the `(follower_id, following_id)` UNIQUE constraint; NOT NULL and primary-key
/// failures stay storage errors.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn edge_from_row(row: &rusqlite::Row<'_>) -> Result<FollowEdge, rusqlite::Error> {
    Ok(FollowEdge {
        id: row.get(0)?,
        follower_id: row.get(1)?,
        following_id: row.get(2)?,
        created_at: micros_to_datetime(row.get(3)?),
    })
}

impl SqliteEdgeStore {
    /// Open (or create) the store at `path`. Use `":memory:"` for a throwaway database.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, EdgeStoreError> {
        let conn = rusqlite::Connection::open(path).map_err(storage_err)?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS follows (
                id TEXT PRIMARY KEY,
                follower_id TEXT NOT NULL,
                following_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                UNIQUE (follower_id, following_id)
            );

            CREATE INDEX IF NOT EXISTS idx_follows_follower ON follows(follower_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_follows_following ON follows(following_id, created_at);
            "#,
        )
        .map_err(storage_err)?;

        let mut clock = MonotonicClock::default();
        let latest: Option<i64> = conn
            .query_row("SELECT MAX(created_at) FROM follows", [], |row| row.get(0))
            .map_err(storage_err)?;
        if let Some(micros) = latest {
            clock.observe(micros);
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(SqliteInner { conn, clock })),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, EdgeStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteInner) -> Result<T, EdgeStoreError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = inner.lock().map_err(|e| {
                EdgeStoreError::Unavailable(format!("failed to acquire lock: {}", e))
            })?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| EdgeStoreError::Unavailable(e.to_string()))?
    }

    async fn ids_by(
        &self,
        filter: EdgeFilter,
        user_id: &str,
    ) -> Result<HashSet<String>, EdgeStoreError> {
        let user_id = user_id.to_string();
        let (select, matched) = match filter {
            EdgeFilter::ByFollower => ("following_id", "follower_id"),
            EdgeFilter::ByFollowing => ("follower_id", "following_id"),
        };
        let sql = format!("SELECT {select} FROM follows WHERE {matched} = ?1");
        self.with_conn(move |inner| {
            let mut stmt = inner.conn.prepare(&sql).map_err(storage_err)?;
            let rows = stmt
                .query_map([&user_id], |row| row.get::<_, String>(0))
                .map_err(storage_err)?;
            rows.collect::<Result<HashSet<_>, _>>().map_err(storage_err)
        })
        .await
    }

    async fn count_by(&self, filter: EdgeFilter, user_id: &str) -> Result<i64, EdgeStoreError> {
        let user_id = user_id.to_string();
        let sql = format!("SELECT COUNT(*) FROM follows WHERE {} = ?1", filter.as_str());
        self.with_conn(move |inner| {
            inner
                .conn
                .query_row(&sql, [&user_id], |row| row.get(0))
                .map_err(storage_err)
        })
        .await
    }
}

#[async_trait]
impl EdgeStore for SqliteEdgeStore {
    async fn exists(&self, follower_id: &str, following_id: &str) -> Result<bool, EdgeStoreError> {
        let follower_id = follower_id.to_string();
        let following_id = following_id.to_string();
        self.with_conn(move |inner| {
            inner
                .conn
                .query_row(
                    EDGE_EXISTS,
                    rusqlite::params![follower_id, following_id],
                    |row| row.get(0),
                )
                .map_err(storage_err)
        })
        .await
    }

    async fn create(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> Result<FollowEdge, EdgeStoreError> {
        let follower_id = follower_id.to_string();
        let following_id = following_id.to_string();
        self.with_conn(move |inner| {
            let micros = inner.clock.next_micros();
            let edge = FollowEdge {
                id: Uuid::new_v4().to_string(),
                follower_id,
                following_id,
                created_at: micros_to_datetime(micros),
            };
            inner
                .conn
                .execute(
                    INSERT_EDGE,
                    rusqlite::params![edge.id, edge.follower_id, edge.following_id, micros],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        EdgeStoreError::Duplicate
                    } else {
                        storage_err(e)
                    }
                })?;
            Ok(edge)
        })
        .await
    }

    async fn delete(&self, follower_id: &str, following_id: &str) -> Result<bool, EdgeStoreError> {
        let follower_id = follower_id.to_string();
        let following_id = following_id.to_string();
        self.with_conn(move |inner| {
            let removed = inner
                .conn
                .execute(
                    "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
                    rusqlite::params![follower_id, following_id],
                )
                .map_err(storage_err)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn count_by_follower(&self, user_id: &str) -> Result<i64, EdgeStoreError> {
        self.count_by(EdgeFilter::ByFollower, user_id).await
    }

    async fn count_by_following(&self, user_id: &str) -> Result<i64, EdgeStoreError> {
        self.count_by(EdgeFilter::ByFollowing, user_id).await
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
        let user_id = user_id.to_string();
        let sql = format!(
            "SELECT id, follower_id, following_id, created_at FROM follows WHERE {} = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
            filter.as_str()
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        self.with_conn(move |inner| {
            let mut stmt = inner.conn.prepare(&sql).map_err(storage_err)?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, limit, offset], edge_from_row)
                .map_err(storage_err)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(storage_err)
        })
        .await
    }

    async fn all_following_ids(&self, user_id: &str) -> Result<HashSet<String>, EdgeStoreError> {
        self.ids_by(EdgeFilter::ByFollower, user_id).await
    }

    async fn all_follower_ids(&self, user_id: &str) -> Result<HashSet<String>, EdgeStoreError> {
        self.ids_by(EdgeFilter::ByFollowing, user_id).await
    }
}
