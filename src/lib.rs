//! # fracserv
//!
//! A tile server that renders parametric fractal images on demand.
//!
//! Every request names a fractal type and a set of options in its query string.
//! The rendered PNG is cached in memory under a key derived from the request
//! URI and mirrored to disk in the background, so repeat requests are served
//! without rendering again.
//!
//! ## Features
//!
//! - **Pluggable generators**: Mandelbrot, Julia, solid and debug families behind one trait
//! - **In-memory caching**: LRU bounded by bytes and entry count
//! - **Disk mirror**: Write-once background persistence that keeps the render time as mtime
//! - **HTTP freshness**: `Last-Modified` and `Expires` derived from the render time
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`fractal`] - Rendering contract, navigator, colors, options and the registry
//! - [`tile`] - Tile service, cache, PNG encoding and disk mirror
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fracserv::{create_router, FractalRegistry, RouterConfig, TileService};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let service = Arc::new(TileService::new(FractalRegistry::with_defaults()));
//!     let router = create_router(Arc::clone(&service), RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, router).await?;
//!
//!     service.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fractal;
pub mod server;
pub mod tile;

// Re-export commonly used types
pub use config::Config;
pub use error::{FractalError, PersistError, TileError};
pub use fractal::{
    hsv_to_rgba, Fractal, FractalGenerator, FractalRegistry, Navigator, Options, Parameter, Point,
};
pub use server::{create_router, AppState, HealthResponse, RouterConfig};
pub use tile::{
    cache_key, CacheEntry, DiskMirror, PngTileEncoder, TileCache, TileRequest, TileResponse,
    TileService,
};
