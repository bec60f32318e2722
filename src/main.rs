//! fracserv - A fractal tile server.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fracserv::{
    config::Config,
    fractal::FractalRegistry,
    server::create_router,
    tile::{DiskMirror, TileService},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("fracserv v{}", env!("CARGO_PKG_VERSION"));

    let registry = FractalRegistry::with_defaults();
    info!(
        "  Fractals: {}",
        registry.names().collect::<Vec<_>>().join(", ")
    );

    let tile_service = build_tile_service(&config, registry);
    let tile_service = Arc::new(tile_service);

    let router = create_router(Arc::clone(&tile_service), config.router_config());

    // Bind and serve
    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("  Server listening on: http://{}", addr);
    info!("  Try: curl 'http://{}/mandelbrot?w=256&h=256' -o tile.png", addr);

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Flush pending disk writes even if the server failed
    tile_service.shutdown().await;

    if let Err(e) = served {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Assemble the tile service from the cache and mirror settings.
fn build_tile_service(config: &Config, registry: FractalRegistry) -> TileService {
    if config.disable_cache {
        warn!("  Cache: DISABLED - every request renders");
        return TileService::without_cache(registry);
    }

    info!(
        "  Cache: {}MB / {} tiles",
        config.cache_bytes / (1024 * 1024),
        config.cache_entries
    );
    let service =
        TileService::with_cache_capacity(registry, config.cache_bytes, config.cache_entries);

    if !config.persist_enabled() {
        info!("  Disk mirror: off");
        return service;
    }

    info!(
        "  Disk mirror: {} ({} workers, read-through {})",
        config.cache_dir.display(),
        config.persist_workers,
        if config.read_through { "on" } else { "off" }
    );
    let mirror = DiskMirror::start(
        config.cache_dir.clone(),
        config.persist_workers,
        config.persist_queue,
    );

    service
        .with_mirror(mirror)
        .with_read_through(config.read_through)
}

/// Resolve once Ctrl-C is received.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining disk mirror"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            // Without a signal handler, keep serving until the process is killed
            std::future::pending::<()>().await;
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "fracserv=debug,tower_http=debug"
    } else {
        "fracserv=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
