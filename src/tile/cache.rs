//! In-memory cache for encoded PNG tiles.
//!
//! # Cache Key
//!
//! Tiles are keyed by the request path and query, normalized by
//! [`cache_key`] so the key can double as a relative filesystem path:
//! `?` becomes `/` and `&` becomes `,`.
//!
//! # Size-Based Eviction
//!
//! The cache tracks the total payload size of its entries. When an insert
//! pushes the total over the byte capacity, or the entry count over its
//! limit, least-recently-used entries are evicted. The entry being inserted is
//! never evicted by its own insertion, so a `get` right after an `add` always
//! finds it, even if it alone exceeds the byte capacity.

use std::num::NonZeroUsize;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;
use tracing::debug;

/// Default cache capacity: 100MB
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 100 * 1024 * 1024;

/// Default maximum number of entries (to bound LRU overhead)
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// How long a rendered tile stays fresh for HTTP clients.
pub const TILE_FRESHNESS: Duration = Duration::from_secs(60 * 60);

// =============================================================================
// Cache Key
// =============================================================================

/// Derive the cache key for a request URI (path plus query).
///
/// ```
/// use fracserv::tile::cache_key;
///
/// assert_eq!(cache_key("/mandelbrot?z=2&c=0,0"), "/mandelbrot/z=2,c=0,0");
/// ```
pub fn cache_key(request_uri: &str) -> String {
    request_uri
        .chars()
        .map(|c| match c {
            '?' => '/',
            '&' => ',',
            other => other,
        })
        .collect()
}

// =============================================================================
// Cache Entry
// =============================================================================

/// An encoded tile and the time it was rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    timestamp: SystemTime,
    data: Bytes,
}

impl CacheEntry {
    /// Wrap freshly rendered bytes, stamped with the current time.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_timestamp(data, SystemTime::now())
    }

    /// Wrap bytes rendered at a known time.
    pub fn with_timestamp(data: impl Into<Bytes>, timestamp: SystemTime) -> Self {
        Self {
            timestamp,
            data: data.into(),
        }
    }

    /// Encoded PNG payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Render time.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Time after which clients should refetch.
    pub fn expires(&self) -> SystemTime {
        self.timestamp + TILE_FRESHNESS
    }

    /// Payload length in bytes, used for cache accounting.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

// =============================================================================
// Tile Cache
// =============================================================================

struct Inner {
    entries: LruCache<String, CacheEntry>,
    current_size: usize,
}

/// LRU cache for encoded tiles with size-based capacity.
///
/// # Thread Safety
///
/// The cache is safe to share across tasks. Its lock is only held for map
/// operations, never while a tile renders.
///
/// # Example
///
/// ```
/// use fracserv::tile::{CacheEntry, TileCache};
///
/// #[tokio::main]
/// async fn main() {
///     let cache = TileCache::new();
///     let entry = CacheEntry::new(vec![0x89, b'P', b'N', b'G']);
///
///     cache.add("/solid/hue=0".to_string(), entry.clone()).await;
///     assert_eq!(cache.get("/solid/hue=0").await, Some(entry));
/// }
/// ```
pub struct TileCache {
    inner: RwLock<Inner>,

    /// Maximum total size in bytes
    max_size: usize,
}

impl TileCache {
    /// Create a new tile cache with default capacity (100MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TILE_CACHE_CAPACITY)
    }

    /// Create a new tile cache with the specified capacity in bytes.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a new tile cache with specified byte capacity and maximum entries.
    ///
    /// A `max_entries` of zero is treated as one.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let max_entries = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(Inner {
                entries: LruCache::new(max_entries),
                current_size: 0,
            }),
            max_size,
        }
    }

    /// Look up a tile.
    ///
    /// Marks the entry as recently used.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut inner = self.inner.write().await;
        inner.entries.get(key).cloned()
    }

    /// Check if a tile is cached without updating LRU order.
    pub async fn contains(&self, key: &str) -> bool {
        let inner = self.inner.read().await;
        inner.entries.contains(key)
    }

    /// Insert or replace a tile.
    ///
    /// Replacing a key swaps its size in the accounting, so a key never
    /// counts twice. Other entries may be evicted to get back under capacity.
    pub async fn add(&self, key: String, entry: CacheEntry) {
        let entry_size = entry.size();
        let mut inner = self.inner.write().await;

        // Returns the old value for this key, or the LRU entry pushed out by the
        // entry limit. Either way its bytes leave the cache.
        if let Some((displaced_key, displaced)) = inner.entries.push(key, entry) {
            inner.current_size = inner.current_size.saturating_sub(displaced.size());
            debug!(key = %displaced_key, size = displaced.size(), "Displaced cached tile");
        }
        inner.current_size += entry_size;

        while inner.current_size > self.max_size && inner.entries.len() > 1 {
            match inner.entries.pop_lru() {
                Some((evicted_key, evicted)) => {
                    inner.current_size = inner.current_size.saturating_sub(evicted.size());
                    debug!(key = %evicted_key, size = evicted.size(), "Evicted cached tile");
                }
                None => break,
            }
        }
    }

    /// Remove a tile, returning it if it was cached.
    pub async fn remove(&self, key: &str) -> Option<CacheEntry> {
        let mut inner = self.inner.write().await;
        let removed = inner.entries.pop(key)?;
        inner.current_size = inner.current_size.saturating_sub(removed.size());
        Some(removed)
    }

    /// Clear all entries from the cache.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.current_size = 0;
    }

    /// Get the current number of cached tiles.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    /// Get the current total size of cached tiles in bytes.
    pub async fn size(&self) -> usize {
        self.inner.read().await.current_size
    }

    /// Get the maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
