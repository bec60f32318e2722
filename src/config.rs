//! Configuration management for fracserv.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `FRACSERV_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```
//! use clap::Parser;
//! use fracserv::config::Config;
//!
//! let config = Config::parse_from(["fracserv", "--port", "9000", "--no-persist"]);
//! assert_eq!(config.bind_address(), "0.0.0.0:9000");
//! assert!(!config.persist_enabled());
//! ```
//!
//! # Environment Variables
//!
//! - `FRACSERV_HOST` - Server bind address (default: 0.0.0.0)
//! - `FRACSERV_PORT` - Server port (default: 8000)
//! - `FRACSERV_CACHE_DIR` - Disk mirror root, must exist (default: /tmp/fractals)
//! - `FRACSERV_DISABLE_CACHE` - Render every request, no caching at all
//! - `FRACSERV_CACHE_BYTES` - In-memory cache bound in bytes (default: 100MB)
//! - `FRACSERV_CACHE_ENTRIES` - In-memory cache bound in tiles (default: 10000)
//! - `FRACSERV_NO_PERSIST` - Keep the memory cache but skip the disk mirror
//! - `FRACSERV_PERSIST_WORKERS` - Disk mirror writer tasks (default: 2)
//! - `FRACSERV_PERSIST_QUEUE` - Disk mirror queue capacity (default: 1024)
//! - `FRACSERV_READ_THROUGH` - Load mirrored tiles on a memory miss
//! - `FRACSERV_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;

use clap::Parser;

use crate::server::RouterConfig;
use crate::tile::{
    DEFAULT_MAX_ENTRIES, DEFAULT_PERSIST_QUEUE, DEFAULT_PERSIST_WORKERS,
    DEFAULT_TILE_CACHE_CAPACITY,
};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default disk mirror root.
pub const DEFAULT_CACHE_DIR: &str = "/tmp/fractals";

// =============================================================================
// CLI Arguments
// =============================================================================

/// fracserv - A fractal tile server.
///
/// Renders fractal tiles on demand, caches them in memory and mirrors them
/// to disk.
#[derive(Parser, Debug, Clone)]
#[command(name = "fracserv")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "FRACSERV_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "FRACSERV_PORT")]
    pub port: u16,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Root directory of the disk mirror. Must already exist.
    #[arg(long, default_value = DEFAULT_CACHE_DIR, env = "FRACSERV_CACHE_DIR")]
    pub cache_dir: PathBuf,

    /// Disable caching entirely: every request renders.
    #[arg(long, default_value_t = false, env = "FRACSERV_DISABLE_CACHE")]
    pub disable_cache: bool,

    /// Maximum bytes of encoded tiles held in memory.
    #[arg(long, default_value_t = DEFAULT_TILE_CACHE_CAPACITY, env = "FRACSERV_CACHE_BYTES")]
    pub cache_bytes: usize,

    /// Maximum number of tiles held in memory.
    #[arg(long, default_value_t = DEFAULT_MAX_ENTRIES, env = "FRACSERV_CACHE_ENTRIES")]
    pub cache_entries: usize,

    // =========================================================================
    // Disk Mirror Configuration
    // =========================================================================
    /// Do not mirror cached tiles to disk.
    #[arg(long, default_value_t = false, env = "FRACSERV_NO_PERSIST")]
    pub no_persist: bool,

    /// Number of background disk writers.
    #[arg(long, default_value_t = DEFAULT_PERSIST_WORKERS, env = "FRACSERV_PERSIST_WORKERS")]
    pub persist_workers: usize,

    /// Pending disk writes before new ones are dropped.
    #[arg(long, default_value_t = DEFAULT_PERSIST_QUEUE, env = "FRACSERV_PERSIST_QUEUE")]
    pub persist_queue: usize,

    /// On a memory miss, serve a mirrored file instead of re-rendering.
    #[arg(long, default_value_t = false, env = "FRACSERV_READ_THROUGH")]
    pub read_through: bool,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "FRACSERV_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.disable_cache {
            if self.cache_bytes == 0 {
                return Err("cache_bytes must be greater than 0".to_string());
            }
            if self.cache_entries == 0 {
                return Err("cache_entries must be greater than 0".to_string());
            }
        }

        if self.persist_enabled() {
            if self.persist_workers == 0 {
                return Err("persist_workers must be greater than 0".to_string());
            }
            if self.persist_queue == 0 {
                return Err("persist_queue must be greater than 0".to_string());
            }
            if !self.cache_dir.is_dir() {
                return Err(format!(
                    "Cache directory {} does not exist. Create it, set --cache-dir, \
                     or disable the disk mirror with --no-persist",
                    self.cache_dir.display()
                ));
            }
        } else if self.read_through {
            return Err(
                "--read-through needs the disk mirror; remove --no-persist/--disable-cache"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Whether tiles are mirrored to disk.
    pub fn persist_enabled(&self) -> bool {
        !self.disable_cache && !self.no_persist
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// HTTP-layer settings derived from this configuration.
    pub fn router_config(&self) -> RouterConfig {
        let config = RouterConfig::new().with_tracing(!self.no_tracing);
        match &self.cors_origins {
            Some(origins) => config.with_cors_origins(origins.clone()),
            None => config,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
