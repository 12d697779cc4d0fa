//! Follow edge store implementations.

mod clock;
mod memory;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use follow_types::{EdgeFilter, EdgeStore, EdgeStoreError, FollowEdge};
pub use memory::InMemoryEdgeStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteEdgeStore;
