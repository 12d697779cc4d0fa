//! FollowGraph: edge store plus peer enrichment behind the `Relationships` facade.

mod enrich;
mod graph;
mod mutual;
mod pagination;

pub use enrich::Enricher;
pub use graph::{FollowGraph, FollowGraphConfig};
pub use mutual::resolve_mutual;
pub use pagination::{scan_page, Window};
