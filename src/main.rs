use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use foodbank::database::{self, schema};
use foodbank::services::password_service::Argon2Hasher;
use foodbank::services::session_service;
use foodbank::{build_router, AppState, Config};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!("server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    info!("foodbank build {}", env!("FOODBANK_BUILD_ID"));

    info!("connecting to database: {}", config.database_url);
    let pool = database::connect(&config.database_url).await?;
    schema::migrate(&pool).await?;
    tokio::fs::create_dir_all(&config.media_root).await?;

    // Expired sessions are swept in the background; resolve_session also
    // rejects them on sight.
    let purge_pool = pool.clone();
    let purge_interval = config.session_purge_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_interval);
        loop {
            ticker.tick().await;
            match session_service::purge_expired_sessions(&purge_pool).await {
                Ok(0) => {}
                Ok(n) => info!("purged {} expired sessions", n),
                Err(e) => warn!("session purge failed: {}", e),
            }
        }
    });

    let host = config.host.clone();
    let port = config.port;
    let state = AppState::new(pool, config, Argon2Hasher::new());
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback: SocketAddr = format!("{}:{}", host, port.saturating_add(1)).parse()?;
            warn!("could not bind {}: {}; trying {}", addr, e, fallback);
            tokio::net::TcpListener::bind(fallback).await?
        }
    };

    let bound_addr = listener.local_addr()?;
    info!("listening on http://{}", bound_addr);
    info!("log in at http://{}/login/", bound_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
