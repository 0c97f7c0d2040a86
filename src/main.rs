use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use realorai::{
    api,
    config::Config,
    reaper,
    state::AppState,
    store::{self, MemoryStore, SqliteStore},
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realorai=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Real or AI...");

    let config = Config::from_env();
    let in_memory = std::env::args().any(|arg| arg == "--memory");

    let state = if in_memory {
        tracing::warn!("Using in-memory store, nothing will be persisted");
        AppState::new(
            Arc::new(MemoryStore::new()),
            config.game.clone(),
            config.admin_usernames.clone(),
        )
    } else {
        match SqliteStore::connect(&config.database_url).await {
            Ok(store) => AppState::new(
                Arc::new(store),
                config.game.clone(),
                config.admin_usernames.clone(),
            ),
            Err(e) => {
                tracing::error!("Failed to open database {}: {}", config.database_url, e);
                std::process::exit(1);
            }
        }
    };

    if let Some(ref path) = config.image_manifest {
        match store::load_manifest(state.store.as_ref(), path).await {
            Ok(count) => tracing::info!("Loaded {} images from {}", count, path),
            Err(e) => tracing::warn!("Failed to load image manifest {}: {}", path, e),
        }
    }

    let state = Arc::new(state);
    reaper::spawn_session_reaper(state.clone(), config.session_ttl);

    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
