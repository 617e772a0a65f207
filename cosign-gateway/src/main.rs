//! Entry point for the `cosign-gateway` HTTP server.

use std::sync::Arc;

use cosign_core::Principal;
use cosign_engine::{EngineConfig, SharedEngine};
use cosign_gateway::{notify::spawn_event_logger, routes::create_router};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let addr = std::env::var("COSIGN_LISTEN_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3457".to_owned());

    let owner: Principal = match std::env::var("COSIGN_OWNER").map(|v| v.parse::<Principal>()) {
        Ok(Ok(owner)) => owner,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "COSIGN_OWNER is not a valid principal");
            std::process::exit(1);
        }
        Err(_) => {
            tracing::error!("COSIGN_OWNER must be set");
            std::process::exit(1);
        }
    };
    if owner.is_zero() {
        tracing::error!("COSIGN_OWNER cannot be the zero principal");
        std::process::exit(1);
    }

    let engine = Arc::new(SharedEngine::new(&EngineConfig::new(owner)));
    let _logger = spawn_event_logger(engine.subscribe());
    let app = create_router(engine);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, %owner, "cosign-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
