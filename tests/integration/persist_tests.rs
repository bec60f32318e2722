//! Disk mirror integration tests.
//!
//! Tests verify:
//! - Cache misses are mirrored to `{cache_dir}{cache_key}`
//! - Mirrored files carry the render time as their mtime
//! - Mirror files are written once and never refreshed
//! - Read-through serves mirrored tiles after a restart without rendering
//! - Read-through never serves a mirror file that is not a PNG
//! - Keys that would escape the cache root are never written

use std::fs;
use std::sync::atomic::Ordering;

use axum::http::StatusCode;

use fracserv::server::http_date;
use fracserv::tile::{is_png, DiskMirror, TileService};

use super::test_utils::{body_bytes, get, header, router_for, test_registry};

#[tokio::test]
async fn test_miss_is_mirrored_with_render_time() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _) = test_registry();
    let (router, service) = router_for(
        TileService::new(registry).with_mirror(DiskMirror::start(dir.path(), 2, 16)),
    );

    let response = get(&router, "/counting?v=3&w=4").await;
    assert_eq!(response.status(), StatusCode::OK);
    let last_modified = header(&response, "last-modified").to_string();
    let body = body_bytes(response).await;

    service.shutdown().await;

    let path = dir.path().join("counting/v=3,w=4");
    assert_eq!(fs::read(&path).unwrap(), body.to_vec());

    let mtime = fs::metadata(&path).unwrap().modified().unwrap();
    assert_eq!(http_date(mtime), last_modified);
}

#[tokio::test]
async fn test_hit_does_not_rewrite_mirror() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _) = test_registry();
    let (router, service) = router_for(
        TileService::new(registry).with_mirror(DiskMirror::start(dir.path(), 1, 16)),
    );

    get(&router, "/counting?v=3").await;
    get(&router, "/counting?v=3").await;
    service.shutdown().await;

    let stats = service.mirror_stats().unwrap();
    assert_eq!(stats.written, 1);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_stale_mirror_file_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("counting")).unwrap();
    fs::write(dir.path().join("counting/v=8"), b"older render").unwrap();

    let (registry, calls) = test_registry();
    let (router, service) = router_for(
        TileService::new(registry).with_mirror(DiskMirror::start(dir.path(), 1, 16)),
    );

    let response = get(&router, "/counting?v=8").await;
    assert_eq!(response.status(), StatusCode::OK);
    service.shutdown().await;

    // Rendered fresh for the client, but the disk copy is not refreshed
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        fs::read(dir.path().join("counting/v=8")).unwrap(),
        b"older render"
    );
    assert_eq!(service.mirror_stats().unwrap().skipped, 1);
}

#[tokio::test]
async fn test_read_through_after_restart() {
    let dir = tempfile::tempdir().unwrap();

    // First process lifetime renders and mirrors
    let (registry, _) = test_registry();
    let (router, service) = router_for(
        TileService::new(registry).with_mirror(DiskMirror::start(dir.path(), 1, 16)),
    );
    let first = get(&router, "/counting?v=42").await;
    let first_modified = header(&first, "last-modified").to_string();
    let first_body = body_bytes(first).await;
    service.shutdown().await;

    // Second lifetime starts with an empty memory cache
    let (registry, calls) = test_registry();
    let (router, service) = router_for(
        TileService::new(registry)
            .with_mirror(DiskMirror::start(dir.path(), 1, 16))
            .with_read_through(true),
    );
    let second = get(&router, "/counting?v=42").await;

    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(header(&second, "x-tile-cache-hit"), "true");
    assert_eq!(header(&second, "last-modified"), first_modified);
    assert_eq!(body_bytes(second).await, first_body);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(service.cache_stats().await.unwrap().entries, 1);

    service.shutdown().await;
}

#[tokio::test]
async fn test_read_through_ignores_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("solid")).unwrap();
    fs::write(dir.path().join("solid/w=4"), [0x89, b'P']).unwrap();

    let (registry, _) = test_registry();
    let (router, service) = router_for(
        TileService::new(registry)
            .with_mirror(DiskMirror::start(dir.path(), 1, 16))
            .with_read_through(true),
    );

    let response = get(&router, "/solid?w=4").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-tile-cache-hit"), "false");
    let body = body_bytes(response).await;
    assert!(is_png(&body));
    assert!(body.len() > 2);

    service.shutdown().await;
    assert_eq!(fs::read(dir.path().join("solid/w=4")).unwrap(), body.to_vec());
}

#[tokio::test]
async fn test_traversal_key_not_persisted() {
    let root = tempfile::tempdir().unwrap();
    let cache_dir = root.path().join("cache");
    fs::create_dir(&cache_dir).unwrap();

    let (registry, _) = test_registry();
    let (router, service) = router_for(
        TileService::new(registry).with_mirror(DiskMirror::start(&cache_dir, 1, 16)),
    );

    // Still served from memory, just never mirrored
    let response = get(&router, "/counting?/../../escaped").await;
    assert_eq!(response.status(), StatusCode::OK);
    service.shutdown().await;

    assert_eq!(service.mirror_stats().unwrap().failed, 1);
    assert!(!root.path().join("escaped").exists());
    assert_eq!(fs::read_dir(&cache_dir).unwrap().count(), 0);
}
