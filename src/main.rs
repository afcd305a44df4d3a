//! Edge prefix proxy binary.
//!
//! Loads the configuration (path from `argv[1]`, defaults otherwise),
//! initializes logging and metrics, and serves the proxy pipeline until
//! Ctrl+C.

use std::path::Path;

use tokio::net::TcpListener;

use edge_proxy::config::{loader, ProxyConfig};
use edge_proxy::observability::{logging, metrics};
use edge_proxy::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => loader::load_config(Path::new(&path))?,
        None => ProxyConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        public_host = %config.route.public_host,
        reserved_prefix = %config.route.reserved_prefix,
        upstream = %config.route.upstream_authority,
        default_origin = %config.route.default_origin,
        strip_prefix = config.route.strip_prefix,
        cache_enabled = config.cache.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
