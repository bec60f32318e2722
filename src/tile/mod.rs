//! Tile service layer.
//!
//! This module turns fractal requests into PNG tiles, caches them in memory and
//! mirrors them to disk.
//!
//! # Architecture
//!
//! The tile service sits between the HTTP layer and the fractal abstraction:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              Tile Service               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  TileCache   │  │   PNG Encoder   │  │
//! │  │  (LRU, byte  │  │  (Fractal →     │  │
//! │  │   bounded)   │  │   PNG bytes)    │  │
//! │  └──────┬───────┘  └─────────────────┘  │
//! │         │ miss                          │
//! │         ▼                               │
//! │  ┌──────────────┐                       │
//! │  │  DiskMirror  │ (background workers)  │
//! │  └──────────────┘                       │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            FractalRegistry              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileService`]: Main entry point for tile requests, orchestrates the full pipeline
//! - [`TileCache`]: LRU cache for encoded tiles with size-based eviction
//! - [`cache_key`]: Request URI to cache key normalization (`?` → `/`, `&` → `,`)
//! - [`PngTileEncoder`]: Encodes any [`Fractal`](crate::fractal::Fractal) as PNG
//! - [`DiskMirror`]: Best-effort, write-once mirror of cache entries on disk
//! - [`TileRequest`]: Parameters for a tile request
//! - [`TileResponse`]: Response containing tile data and metadata
//!
//! # Example
//!
//! ```
//! use fracserv::tile::{cache_key, CacheEntry, TileCache};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Create a cache with 50MB capacity
//!     let cache = TileCache::with_capacity(50 * 1024 * 1024);
//!
//!     let key = cache_key("/solid?hue=120");
//!     assert_eq!(key, "/solid/hue=120");
//!
//!     if cache.get(&key).await.is_none() {
//!         cache.add(key.clone(), CacheEntry::new(vec![0u8; 16])).await;
//!     }
//!     assert_eq!(cache.get(&key).await.map(|e| e.size()), Some(16));
//! }
//! ```

mod cache;
mod encoder;
mod persist;
mod service;

pub use cache::{
    cache_key, CacheEntry, TileCache, DEFAULT_MAX_ENTRIES, DEFAULT_TILE_CACHE_CAPACITY,
    TILE_FRESHNESS,
};
pub use encoder::{is_png, PngTileEncoder, PNG_SIGNATURE};
pub use persist::{
    load_entry, mirror_path, persist_entry, DiskMirror, MirrorStats, PersistOutcome,
    DEFAULT_PERSIST_QUEUE, DEFAULT_PERSIST_WORKERS,
};
pub use service::{CacheStats, TileRequest, TileResponse, TileService};
