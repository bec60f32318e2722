//! Tile Service for orchestrating the render-cache-serve pipeline.
//!
//! The TileService is the main entry point for tile requests. It orchestrates:
//! - Type validation against the registry
//! - Cache key derivation and lookup
//! - Rendering and PNG encoding on the blocking pool
//! - Result caching and hand-off to the disk mirror
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         TileService                             │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                    get_tile()                           │    │
//! │  │  1. Validate type     4. Render + encode (blocking)     │    │
//! │  │  2. Derive cache key  5. Insert into cache              │    │
//! │  │  3. Check cache       6. Submit to disk mirror          │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │        │                  │                  │                  │
//! │        ▼                  ▼                  ▼                  │
//! │  ┌───────────┐   ┌─────────────────┐   ┌────────────┐           │
//! │  │ TileCache │   │ FractalRegistry │   │ DiskMirror │           │
//! │  └───────────┘   └─────────────────┘   └────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Concurrent misses for the same key are not de-duplicated: each renders, the
//! cache keeps whichever insert ran last, and the disk keeps whichever write
//! created the file first.

use std::sync::Arc;
use std::time::SystemTime;

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::error::{FractalError, TileError};
use crate::fractal::{FractalRegistry, Options};

use super::cache::{cache_key, CacheEntry, TileCache};
use super::encoder::PngTileEncoder;
use super::persist::{DiskMirror, MirrorStats};

// =============================================================================
// Tile Request
// =============================================================================

/// A request for a tile.
#[derive(Debug, Clone)]
pub struct TileRequest {
    /// Registered fractal type name
    pub fractal_type: String,

    /// Request path plus query, the source of the cache key
    pub uri: String,

    /// Options parsed from the query string
    pub options: Options,
}

impl TileRequest {
    /// Create a request, parsing options from the query part of `uri`.
    pub fn new(fractal_type: impl Into<String>, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let options = uri
            .split_once('?')
            .map(|(_, query)| Options::from_query(query))
            .unwrap_or_default();

        Self {
            fractal_type: fractal_type.into(),
            uri,
            options,
        }
    }
}

// =============================================================================
// Tile Response
// =============================================================================

/// Response from the tile service.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// PNG-encoded tile
    pub data: Bytes,

    /// When the tile was rendered
    pub timestamp: SystemTime,

    /// Whether the tile came from the cache instead of a fresh render
    pub cache_hit: bool,

    /// Whether caching is enabled. Freshness headers are only sent when it is.
    pub cached: bool,
}

impl TileResponse {
    fn from_entry(entry: CacheEntry, cache_hit: bool) -> Self {
        Self {
            data: entry.data().clone(),
            timestamp: entry.timestamp(),
            cache_hit,
            cached: true,
        }
    }
}

/// Snapshot of the in-memory cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cached tiles
    pub entries: usize,

    /// Total payload bytes held
    pub bytes: usize,

    /// Configured byte bound
    pub capacity: usize,
}

// =============================================================================
// Tile Service
// =============================================================================

/// Service for rendering and caching tiles.
///
/// # Example
///
/// ```
/// use fracserv::fractal::FractalRegistry;
/// use fracserv::tile::{TileRequest, TileService};
///
/// # #[tokio::main]
/// # async fn main() {
/// let service = TileService::new(FractalRegistry::with_defaults());
///
/// let request = TileRequest::new("solid", "/solid?w=16&h=16&hue=120");
/// let first = service.get_tile(request.clone()).await.unwrap();
/// let second = service.get_tile(request).await.unwrap();
///
/// assert!(!first.cache_hit);
/// assert!(second.cache_hit);
/// assert_eq!(first.data, second.data);
/// # }
/// ```
pub struct TileService {
    /// Generators, shared with the blocking render tasks
    registry: Arc<FractalRegistry>,

    /// In-memory cache; `None` when caching is disabled
    cache: Option<TileCache>,

    /// Optional disk mirror fed on every miss
    mirror: Option<DiskMirror>,

    /// PNG encoder
    encoder: PngTileEncoder,

    /// Consult the disk mirror on a memory miss
    read_through: bool,
}

impl TileService {
    /// Create a tile service with default cache settings.
    pub fn new(registry: FractalRegistry) -> Self {
        Self::with_shared_registry(Arc::new(registry))
    }

    /// Create a tile service over a shared registry.
    pub fn with_shared_registry(registry: Arc<FractalRegistry>) -> Self {
        Self {
            registry,
            cache: Some(TileCache::new()),
            mirror: None,
            encoder: PngTileEncoder::new(),
            read_through: false,
        }
    }

    /// Create a tile service with explicit cache bounds.
    ///
    /// # Arguments
    ///
    /// * `registry` - The fractal registry
    /// * `max_bytes` - Maximum cached payload in bytes
    /// * `max_entries` - Maximum number of cached tiles
    pub fn with_cache_capacity(
        registry: FractalRegistry,
        max_bytes: usize,
        max_entries: usize,
    ) -> Self {
        Self {
            cache: Some(TileCache::with_capacity_and_entries(max_bytes, max_entries)),
            ..Self::new(registry)
        }
    }

    /// Create a tile service that renders every request.
    pub fn without_cache(registry: FractalRegistry) -> Self {
        Self {
            cache: None,
            ..Self::new(registry)
        }
    }

    /// Attach a disk mirror.
    pub fn with_mirror(mut self, mirror: DiskMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Load mirrored tiles on a memory miss instead of re-rendering.
    pub fn with_read_through(mut self, enabled: bool) -> Self {
        self.read_through = enabled;
        self
    }

    /// Get a tile, using the cache when enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The fractal type is not registered
    /// - The generator rejects the options
    /// - The render task fails or PNG encoding fails
    pub async fn get_tile(&self, request: TileRequest) -> Result<TileResponse, TileError> {
        if !self.registry.contains(&request.fractal_type) {
            return Err(TileError::UnknownType {
                fractal_type: request.fractal_type,
            });
        }

        let Some(cache) = &self.cache else {
            let data = self.render(&request).await?;
            return Ok(TileResponse {
                data,
                timestamp: SystemTime::now(),
                cache_hit: false,
                cached: false,
            });
        };

        let key = cache_key(&request.uri);

        if let Some(entry) = cache.get(&key).await {
            debug!(key = %key, "Tile cache hit");
            return Ok(TileResponse::from_entry(entry, true));
        }

        if let Some(entry) = self.load_mirrored(&key).await {
            debug!(key = %key, "Tile loaded from disk mirror");
            cache.add(key, entry.clone()).await;
            return Ok(TileResponse::from_entry(entry, true));
        }

        debug!(key = %key, "Tile cache miss");
        let entry = CacheEntry::new(self.render(&request).await?);
        cache.add(key.clone(), entry.clone()).await;

        if let Some(mirror) = &self.mirror {
            mirror.submit(key, entry.clone()).await;
        }

        Ok(TileResponse::from_entry(entry, false))
    }

    async fn load_mirrored(&self, key: &str) -> Option<CacheEntry> {
        if !self.read_through {
            return None;
        }
        self.mirror.as_ref()?.load(key).await
    }

    /// Render and encode a tile without touching the cache.
    ///
    /// Runs on the blocking pool; the caller still waits for the result.
    pub async fn render(&self, request: &TileRequest) -> Result<Bytes, TileError> {
        let registry = Arc::clone(&self.registry);
        let encoder = self.encoder.clone();
        let fractal_type = request.fractal_type.clone();
        let options = request.options.clone();

        tokio::task::spawn_blocking(move || {
            let fractal = registry
                .generate(&fractal_type, &options)
                .map_err(|e| match e {
                    FractalError::UnknownType(fractal_type) => {
                        TileError::UnknownType { fractal_type }
                    }
                    other => TileError::Generator(other),
                })?;
            encoder.encode(fractal.as_ref())
        })
        .await
        .map_err(|e| TileError::RenderError {
            message: e.to_string(),
        })?
    }

    /// Whether responses are cached.
    pub fn is_cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Get tile cache statistics, or `None` when caching is disabled.
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        let cache = self.cache.as_ref()?;
        Some(CacheStats {
            entries: cache.len().await,
            bytes: cache.size().await,
            capacity: cache.capacity(),
        })
    }

    /// Disk mirror counters, or `None` without a mirror.
    pub fn mirror_stats(&self) -> Option<MirrorStats> {
        self.mirror.as_ref().map(DiskMirror::stats)
    }

    /// Get a reference to the underlying registry.
    pub fn registry(&self) -> &Arc<FractalRegistry> {
        &self.registry
    }

    /// Drain the disk mirror. Call once, after the server stops accepting requests.
    pub async fn shutdown(&self) {
        if let Some(mirror) = &self.mirror {
            mirror.shutdown().await;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
