//! Startup orchestration.
//!
//! Fail fast: any error before the listener is bound aborts startup.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{config_warnings, AppConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Start every subsystem and serve until a termination signal arrives.
pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    for warning in config_warnings(&config) {
        tracing::warn!(%warning, "Configuration warning");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        geolocation_url = %config.geolocation.api_url,
        public_ip_url = %config.public_ip.url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
