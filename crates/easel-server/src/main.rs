//! Easel canvas store entry point.

use easel_server::AppState;
use std::net::SocketAddr;
use tracing::{error, info};

const DEFAULT_ADDR: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easel_server=info,tower_http=info".into()),
        )
        .init();

    let addr = std::env::var("EASEL_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = match addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid EASEL_SERVER_ADDR {:?}: {}", addr, e);
            std::process::exit(2);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Canvas API: http://{}{}", addr, easel_server::API_PREFIX);

    if let Err(e) = easel_server::serve(listener, AppState::new()).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
