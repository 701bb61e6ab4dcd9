use axum::Router;
use std::sync::Arc;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::paste::handlers as paste;
use crate::session;
use crate::state::AppState;

/// Build the full axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Rate limiting on the paste API: 60 requests per minute per IP.
    // Uses PeerIpKeyExtractor which reads from ConnectInfo<SocketAddr>.
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(1)
            .burst_size(30)
            .finish()
            .expect("Failed to build governor config"),
    );
    let governor_limiter = governor_config.limiter().clone();

    // Spawn background task to clean up rate limiter state
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            governor_limiter.retain_recent();
        }
    });

    // Paste endpoints, transport-wrapped bodies, rate limited
    let paste_routes = Router::new()
        .route("/api/submit", axum::routing::post(paste::create_paste))
        .route("/api/read", axum::routing::post(paste::read_paste))
        .route("/api/status", axum::routing::post(paste::paste_status))
        .layer(GovernorLayer {
            config: governor_config,
        });

    // Session endpoints (token fetch must stay reachable for new clients)
    let session_routes = Router::new()
        .route("/api/token", axum::routing::get(session::get_token))
        .route(
            "/api/session",
            axum::routing::get(session::get_created_paste),
        );

    // Health check
    let health = Router::new().route("/health", axum::routing::get(health_check));

    Router::new()
        .merge(paste_routes)
        .merge(session_routes)
        .merge(health)
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
