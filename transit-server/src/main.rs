use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use transit_server::cache::{CacheConfig, JourneyCache};
use transit_server::domain::{Clock, SystemClock};
use transit_server::graph::{AssetDir, GraphStore};
use transit_server::planner::RoutePlanner;
use transit_server::web::{AppState, create_router};

/// How often the background task re-checks the time band and sweeps the
/// disk cache (5 minutes).
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let asset_dir =
        std::env::var("TRANSIT_ASSET_DIR").unwrap_or_else(|_| "assets".to_string());
    let cache_dir =
        std::env::var("TRANSIT_CACHE_DIR").unwrap_or_else(|_| "journey-cache".to_string());
    let listen_addr =
        std::env::var("TRANSIT_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(GraphStore::new(AssetDir::new(&asset_dir), clock.clone()));
    let planner = RoutePlanner::new(store.clone());

    // The service still starts when no snapshot is available; routing
    // answers "unavailable" until one loads.
    match store.load_current_graph() {
        Ok(snapshot) => info!(
            band = %snapshot.band(),
            nodes = snapshot.node_count(),
            edges = snapshot.edge_count(),
            "active graph snapshot"
        ),
        Err(error) => warn!(%error, "no graph snapshot available at startup"),
    }

    let cache = JourneyCache::new(CacheConfig::new(&cache_dir), clock);
    let preloaded = cache.preload().await;
    info!(preloaded, "journey cache ready");

    let state = AppState::new(planner, cache);

    // Periodic band refresh and cache sweep. First tick fires
    // immediately; skip it.
    let maintenance = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(MAINTENANCE_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            maintenance.planner.refresh_graph().await;
            maintenance.cache.cleanup_expired().await;
        }
    });

    let app = create_router(state);

    let addr: SocketAddr = listen_addr.parse().expect("invalid TRANSIT_LISTEN_ADDR");
    info!(%addr, "transit journey planner listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app).await.expect("server error");
}
