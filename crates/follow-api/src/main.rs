//! Follow service: public REST surface plus the internal counts / following-ids surface.

use follow_api::config::ServiceConfig;
use follow_api::server::{self, AppState};
use follow_core::FollowGraph;
use follow_peers::{HttpPostService, HttpUserService};
use follow_store::{EdgeStore, InMemoryEdgeStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn open_store(config: &ServiceConfig) -> Result<Arc<dyn EdgeStore>, BoxError> {
    match &config.sqlite_path {
        #[cfg(feature = "sqlite")]
        Some(path) => {
            tracing::info!(path = %path.display(), "using SQLite edge store");
            Ok(Arc::new(follow_store::SqliteEdgeStore::new(path)?))
        }
        #[cfg(not(feature = "sqlite"))]
        Some(_) => Err(
            "FOLLOW_SQLITE_PATH is set but this binary was built without the `sqlite` feature"
                .into(),
        ),
        None => {
            tracing::warn!("FOLLOW_SQLITE_PATH unset; edges are kept in memory only");
            Ok(Arc::new(InMemoryEdgeStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;

    // One long-lived client per peer, shared by every request.
    let users = Arc::new(HttpUserService::new(
        config.user_service_url.clone(),
        config.peer_timeout,
    )?);
    let posts = HttpPostService::new(config.post_service_url.clone(), config.peer_timeout)?;
    let store = open_store(&config)?;

    let graph = FollowGraph::with_config(store, Arc::clone(&users), posts, config.graph_config());
    let state = Arc::new(AppState {
        relationships: Arc::new(graph),
        authenticator: users,
    });

    let public = server::router(Arc::clone(&state));
    let internal = server::internal_router(state);

    let public_listener = tokio::net::TcpListener::bind(config.listen).await?;
    let internal_listener = tokio::net::TcpListener::bind(config.internal_listen).await?;
    tracing::info!("follow API listening on {}", config.listen);
    tracing::info!("internal follow API listening on {}", config.internal_listen);

    tokio::try_join!(
        async { axum::serve(public_listener, public.into_make_service()).await },
        async { axum::serve(internal_listener, internal.into_make_service()).await },
    )?;
    Ok(())
}
