mod config;
mod crypto;
mod error;
mod paste;
mod routes;
mod session;
mod state;
mod store;

use std::net::SocketAddr;
use tokio::net::TcpListener;

use config::{generate_config_template, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "pastebox_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "pastebox_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("Pastebox server v{} starting", env!("CARGO_PKG_VERSION"));

    // Initialize the SQLite-backed TTL store
    let db = store::init_db(&config.data_dir)?;

    // Background sweeps: expired pastes and stale transport sessions
    store::spawn_expiry_sweep(db.clone(), config.expiry_sweep_secs);
    let sessions = session::new_session_map();
    session::spawn_session_sweep(sessions.clone(), config.expiry_sweep_secs);

    let state = state::AppState {
        db,
        sessions,
        token_ttl_secs: config.token_ttl_secs,
        max_paste_bytes: config.max_paste_bytes,
    };

    let app = routes::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
