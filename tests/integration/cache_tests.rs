//! Cache effectiveness integration tests.
//!
//! Tests verify:
//! - A repeated request is served without rendering again
//! - Disabling the cache renders every request
//! - Distinct query strings are distinct tiles
//! - Concurrent requests stay consistent
//! - Byte-bounded eviction

use std::sync::atomic::Ordering;

use axum::http::StatusCode;

use fracserv::tile::TileService;

use super::test_utils::{body_bytes, get, header, router_for, test_registry};

// =============================================================================
// Tile Cache Effectiveness
// =============================================================================

#[tokio::test]
async fn test_repeat_request_served_from_cache() {
    let (registry, calls) = test_registry();
    let (router, _) = router_for(TileService::new(registry));

    let first = get(&router, "/counting?v=10").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header(&first, "x-tile-cache-hit"), "false");
    let first_modified = header(&first, "last-modified").to_string();
    let first_body = body_bytes(first).await;

    let second = get(&router, "/counting?v=10").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(header(&second, "x-tile-cache-hit"), "true");
    assert_eq!(header(&second, "last-modified"), first_modified);
    assert_eq!(body_bytes(second).await, first_body);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cache_disabled_renders_every_request() {
    let (registry, calls) = test_registry();
    let (router, _) = router_for(TileService::without_cache(registry));

    for _ in 0..2 {
        let response = get(&router, "/counting?v=10").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "content-type"), "image/png");
        assert_eq!(header(&response, "x-tile-cache-hit"), "false");
        assert!(response.headers().get("last-modified").is_none());
        assert!(response.headers().get("expires").is_none());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_distinct_queries_render_separately() {
    let (registry, calls) = test_registry();
    let (router, service) = router_for(TileService::new(registry));

    get(&router, "/counting?v=1&w=4").await;
    get(&router, "/counting?v=2&w=4").await;
    // Same options in a different order are a different key
    get(&router, "/counting?w=4&v=1").await;
    // Repeat of the first
    get(&router, "/counting?v=1&w=4").await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(service.cache_stats().await.unwrap().entries, 3);
}

#[tokio::test]
async fn test_concurrent_requests_same_tile() {
    let (registry, calls) = test_registry();
    let (router, service) = router_for(TileService::new(registry));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let router = router.clone();
            tokio::spawn(async move {
                let response = get(&router, "/counting?v=99&w=32&h=32").await;
                assert_eq!(response.status(), StatusCode::OK);
                body_bytes(response).await
            })
        })
        .collect();

    let mut bodies = Vec::new();
    for handle in handles {
        bodies.push(handle.await.unwrap());
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(service.cache_stats().await.unwrap().entries, 1);

    // Without single-flight, concurrent misses may each render
    let renders = calls.load(Ordering::SeqCst);
    assert!((1..=8).contains(&renders));
}

#[tokio::test]
async fn test_byte_bound_evicts_oldest() {
    let (registry, _) = test_registry();

    // Measure one tile's encoded size, then allow room for two
    let (sizing_router, sizing) = router_for(TileService::new(test_registry().0));
    get(&sizing_router, "/counting?v=0").await;
    let tile_size = sizing.cache_stats().await.unwrap().bytes;

    let (router, service) = router_for(TileService::with_cache_capacity(
        registry,
        tile_size * 2,
        100,
    ));

    get(&router, "/counting?v=0").await;
    get(&router, "/counting?v=1").await;
    get(&router, "/counting?v=2").await;

    let stats = service.cache_stats().await.unwrap();
    assert!(stats.bytes <= stats.capacity);
    assert!(stats.entries <= 2);

    // The most recent tile survives
    let recent = get(&router, "/counting?v=2").await;
    assert_eq!(header(&recent, "x-tile-cache-hit"), "true");
}

#[tokio::test]
async fn test_entry_bound() {
    let (registry, calls) = test_registry();
    let (router, service) = router_for(TileService::with_cache_capacity(
        registry,
        1024 * 1024,
        2,
    ));

    for v in 0..5 {
        get(&router, &format!("/counting?v={}", v)).await;
    }
    assert_eq!(service.cache_stats().await.unwrap().entries, 2);

    // v=0 was evicted and renders again
    let response = get(&router, "/counting?v=0").await;
    assert_eq!(header(&response, "x-tile-cache-hit"), "false");
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}
