//! Best-effort disk mirror for cached tiles.
//!
//! Every cache miss hands its freshly rendered entry to the mirror, which writes
//! it to `{cache_root}{cache_key}` on a small pool of background workers. The
//! request that rendered the tile never waits for the write.
//!
//! # Semantics
//!
//! - A file is written at most once per path. If the file already exists the
//!   job is skipped, even when the new entry has different bytes.
//! - Files appear complete or not at all. Each write is staged in a
//!   temporary file in the target directory and then linked into place.
//! - The file's access and modification times are set to the entry's render
//!   time, so `Last-Modified` stays stable across restarts.
//! - Failures are logged and counted, never surfaced to clients.
//! - The queue is bounded. When it is full, new jobs are dropped with a warning
//!   rather than blocking the request path.
//!
//! ```text
//!   TileService ──submit──▶ [ bounded queue ] ──▶ worker 0 ─┐
//!                                               └─▶ worker 1 ─┴─▶ persist_entry()
//! ```

use std::fs::{self, FileTimes};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tempfile::NamedTempFile;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::cache::CacheEntry;
use super::encoder::is_png;
use crate::error::PersistError;

/// Default number of persistence workers.
pub const DEFAULT_PERSIST_WORKERS: usize = 2;

/// Default capacity of the persistence queue.
pub const DEFAULT_PERSIST_QUEUE: usize = 1024;

// =============================================================================
// Filesystem Operations
// =============================================================================

/// Result of a single persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The entry was written to this path
    Written(PathBuf),

    /// A file already existed at this path and was left untouched
    AlreadyExists(PathBuf),
}

/// Resolve the mirror path for a cache key.
///
/// The key (minus its leading `/`) is joined onto `root`. Keys with empty,
/// `.` or `..` segments are rejected so no request can address a file outside
/// the cache root.
pub fn mirror_path(root: &Path, key: &str) -> Result<PathBuf, PersistError> {
    let relative = key.trim_start_matches('/');
    let unsafe_key = || PersistError::UnsafeKey(key.to_string());

    if relative.is_empty() || relative.contains(['\\', '\0']) {
        return Err(unsafe_key());
    }
    if relative
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(unsafe_key());
    }

    let relative = Path::new(relative);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(unsafe_key());
    }

    Ok(root.join(relative))
}

/// Write one entry to its mirror path, synchronously.
///
/// Creates missing parent directories, refuses to overwrite an existing file,
/// and stamps the file with the entry's render time. The bytes are staged in a
/// temporary file beside the target and moved into place once complete, so the
/// mirror path never holds a partial tile.
pub fn persist_entry(
    root: &Path,
    key: &str,
    entry: &CacheEntry,
) -> Result<PersistOutcome, PersistError> {
    let path = mirror_path(root, key)?;

    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => return Err(PersistError::NotAFile(path)),
        Ok(_) => return Ok(PersistOutcome::AlreadyExists(path)),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(PersistError::io(path, e)),
    }

    // mirror_path always appends at least one normal segment
    let parent = path.parent().unwrap_or(root);
    if !parent.is_dir() {
        debug!(dir = %parent.display(), "Creating cache directory");
        fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
    }

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| PersistError::io(parent, e))?;
    let staged_path = staged.path().to_path_buf();

    staged
        .write_all(entry.data())
        .map_err(|e| PersistError::io(&staged_path, e))?;

    let times = FileTimes::new()
        .set_accessed(entry.timestamp())
        .set_modified(entry.timestamp());
    staged
        .as_file()
        .set_times(times)
        .map_err(|e| PersistError::io(&staged_path, e))?;

    // The staged file is removed when it is dropped on any failure below
    match staged.persist_noclobber(&path) {
        Ok(_) => Ok(PersistOutcome::Written(path)),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
            Ok(PersistOutcome::AlreadyExists(path))
        }
        Err(e) => Err(PersistError::io(path, e.error)),
    }
}

/// Read a mirrored entry back, using the file's mtime as its render time.
///
/// Returns `Ok(None)` when nothing is mirrored for `key`. A file that is not a
/// PNG is deleted and reported as [`PersistError::InvalidTile`], which lets the
/// next render of that tile take its place.
pub fn load_entry(root: &Path, key: &str) -> Result<Option<CacheEntry>, PersistError> {
    let path = mirror_path(root, key)?;

    let data = match fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PersistError::io(path, e)),
    };

    if !is_png(&data) {
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), "Failed to remove invalid mirror file: {}", e);
        }
        return Err(PersistError::InvalidTile(path));
    }

    let timestamp = fs::metadata(&path)
        .and_then(|m| m.modified())
        .map_err(|e| PersistError::io(&path, e))?;

    Ok(Some(CacheEntry::with_timestamp(data, timestamp)))
}

// =============================================================================
// Disk Mirror
// =============================================================================

struct PersistJob {
    key: String,
    entry: CacheEntry,
}

#[derive(Debug, Default)]
struct Counters {
    written: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Snapshot of disk mirror activity since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MirrorStats {
    /// Files written
    pub written: u64,

    /// Jobs skipped because the file already existed
    pub skipped: u64,

    /// Jobs that failed with an error
    pub failed: u64,

    /// Jobs dropped before reaching a worker (queue full or mirror stopped)
    pub dropped: u64,
}

/// Background writer pool that mirrors cache entries to disk.
///
/// Must be started from within a Tokio runtime.
pub struct DiskMirror {
    root: Arc<PathBuf>,
    sender: RwLock<Option<mpsc::Sender<PersistJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl DiskMirror {
    /// Start `workers` writers fed by a queue holding up to `queue_capacity` jobs.
    ///
    /// Zero values are raised to one.
    pub fn start(root: impl Into<PathBuf>, workers: usize, queue_capacity: usize) -> Self {
        let root = Arc::new(root.into());
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let counters = Arc::new(Counters::default());

        let handles = (0..workers.max(1))
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&root),
                    Arc::clone(&receiver),
                    Arc::clone(&counters),
                ))
            })
            .collect();

        info!(
            root = %root.display(),
            workers = workers.max(1),
            queue = queue_capacity.max(1),
            "Disk mirror started"
        );

        Self {
            root,
            sender: RwLock::new(Some(sender)),
            workers: Mutex::new(handles),
            counters,
        }
    }

    /// Root directory of the mirror.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Queue an entry for persistence. Never waits for the write.
    pub async fn submit(&self, key: String, entry: CacheEntry) {
        let sender = self.sender.read().await;
        let Some(sender) = sender.as_ref() else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Disk mirror stopped, not persisting tile");
            return;
        };

        match sender.try_send(PersistJob { key, entry }) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(key = %job.key, "Disk mirror queue full, not persisting tile");
            }
            Err(TrySendError::Closed(job)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(key = %job.key, "Disk mirror workers gone, not persisting tile");
            }
        }
    }

    /// Load a mirrored entry, if one exists and is readable.
    pub async fn load(&self, key: &str) -> Option<CacheEntry> {
        let root = Arc::clone(&self.root);
        let owned_key = key.to_string();
        let result =
            tokio::task::spawn_blocking(move || load_entry(&root, &owned_key)).await;

        match result {
            Ok(Ok(entry)) => entry,
            Ok(Err(e)) => {
                warn!(key, "Failed to load mirrored tile: {}", e);
                None
            }
            Err(e) => {
                warn!(key, "Mirror load task failed: {}", e);
                None
            }
        }
    }

    /// Current activity counters.
    pub fn stats(&self) -> MirrorStats {
        MirrorStats {
            written: self.counters.written.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting jobs, finish everything already queued, and join the workers.
    pub async fn shutdown(&self) {
        self.sender.write().await.take();

        let workers = std::mem::take(&mut *self.workers.lock().await);
        for worker in workers {
            if let Err(e) = worker.await {
                warn!("Disk mirror worker panicked: {}", e);
            }
        }

        let stats = self.stats();
        info!(
            written = stats.written,
            skipped = stats.skipped,
            failed = stats.failed,
            dropped = stats.dropped,
            "Disk mirror stopped"
        );
    }
}

async fn run_worker(
    id: usize,
    root: Arc<PathBuf>,
    receiver: Arc<Mutex<mpsc::Receiver<PersistJob>>>,
    counters: Arc<Counters>,
) {
    loop {
        let job = receiver.lock().await.recv().await;
        let Some(PersistJob { key, entry }) = job else {
            break;
        };

        let root = Arc::clone(&root);
        let task_key = key.clone();
        let result =
            tokio::task::spawn_blocking(move || persist_entry(&root, &task_key, &entry)).await;

        match result {
            Ok(Ok(PersistOutcome::Written(path))) => {
                counters.written.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, path = %path.display(), "Mirrored tile to disk");
            }
            Ok(Ok(PersistOutcome::AlreadyExists(path))) => {
                counters.skipped.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, path = %path.display(), "Mirror file already exists");
            }
            Ok(Err(e)) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, "Failed to mirror tile: {}", e);
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, "Mirror task failed: {}", e);
            }
        }
    }

    debug!(worker = id, "Disk mirror worker exiting");
}

// =============================================================================
// Tests
// =============================================================================
