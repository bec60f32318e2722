//! API integration tests for pages, tiles and error handling.
//!
//! Tests verify:
//! - Index and configuration pages
//! - Tile rendering for the built-in families
//! - Freshness headers (`Last-Modified`, `Expires`)
//! - Error cases (unknown type, generator failure) and their plain-text bodies

use axum::http::StatusCode;
use chrono::DateTime;

use fracserv::fractal::FractalRegistry;
use fracserv::tile::{is_png, TileService};

use super::test_utils::{body_bytes, get, header, png_dimensions, router_for, test_registry};

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_index_lists_fractals() {
    let (router, _) = router_for(TileService::new(FractalRegistry::with_defaults()));

    let response = get(&router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "content-type").starts_with("text/html"));

    let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    for name in ["debug", "julia", "mandelbrot", "solid"] {
        assert!(body.contains(&format!("href=\"/{}\"", name)), "{}", name);
    }
}

#[tokio::test]
async fn test_config_page_without_query() {
    let (registry, calls) = test_registry();
    let (router, service) = router_for(TileService::new(registry));

    for uri in ["/mandelbrot", "/mandelbrot?"] {
        let response = get(&router, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert!(header(&response, "content-type").starts_with("text/html"));

        let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
        assert!(body.contains("action=\"/mandelbrot\""));
        assert!(body.contains("name=\"i\""));
    }

    // Pages never touch the cache or a generator
    assert_eq!(service.cache_stats().await.unwrap().entries, 0);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

// =============================================================================
// Tile Retrieval
// =============================================================================

#[tokio::test]
async fn test_tile_retrieval_success() {
    let (router, _) = router_for(TileService::new(FractalRegistry::with_defaults()));

    let response = get(&router, "/mandelbrot?w=64&h=32&i=50").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/png");
    assert_eq!(header(&response, "x-tile-cache-hit"), "false");

    let body = body_bytes(response).await;
    assert!(is_png(&body), "Response should be a valid PNG");
    assert_eq!(png_dimensions(&body), (64, 32));
}

#[tokio::test]
async fn test_every_builtin_renders() {
    let (router, _) = router_for(TileService::new(FractalRegistry::with_defaults()));

    for uri in [
        "/debug?w=16&h=16",
        "/solid?w=16&h=16&hue=30",
        "/mandelbrot?w=16&h=16",
        "/julia?w=16&h=16&cr=0.285&ci=0.01",
    ] {
        let response = get(&router, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(png_dimensions(&body_bytes(response).await), (16, 16));
    }
}

#[tokio::test]
async fn test_freshness_headers() {
    let (router, _) = router_for(TileService::new(FractalRegistry::with_defaults()));

    let response = get(&router, "/solid?w=8&h=8").await;
    assert_eq!(response.status(), StatusCode::OK);

    let last_modified = DateTime::parse_from_rfc2822(header(&response, "last-modified")).unwrap();
    let expires = DateTime::parse_from_rfc2822(header(&response, "expires")).unwrap();
    assert_eq!((expires - last_modified).num_seconds(), 3600);
    assert!(header(&response, "last-modified").ends_with(" GMT"));
}

#[tokio::test]
async fn test_malformed_option_uses_default() {
    let (router, _) = router_for(TileService::new(FractalRegistry::with_defaults()));

    let defaulted = get(&router, "/solid?w=8&h=8&hue=abc").await;
    assert_eq!(defaulted.status(), StatusCode::OK);

    let explicit = get(&router, "/solid?w=8&h=8&hue=210").await;
    assert_eq!(
        body_bytes(defaulted).await,
        body_bytes(explicit).await,
        "unparseable hue should fall back to the default of 210"
    );
}

#[tokio::test]
async fn test_extreme_offset_renders() {
    let (router, _) = router_for(TileService::new(FractalRegistry::with_defaults()));

    for uri in [
        "/mandelbrot?w=2&h=1&x=9223372036854775807",
        "/julia?w=2&h=2&x=-9223372036854775808&y=9223372036854775807",
        "/debug?w=2&h=2&x=9223372036854775807",
    ] {
        let response = get(&router, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert!(is_png(&body_bytes(response).await));
    }
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_unknown_type_not_found() {
    let (registry, calls) = test_registry();
    let (router, service) = router_for(TileService::new(registry));

    for uri in ["/sierpinski", "/sierpinski?w=8", "/..%2F..%2Fetc?x=1"] {
        let response = get(&router, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(
            header(&response, "content-type"),
            "text/plain; charset=utf-8"
        );
    }

    assert_eq!(service.cache_stats().await.unwrap().entries, 0);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generator_failure_internal_error() {
    let (registry, _) = test_registry();
    let (router, service) = router_for(TileService::new(registry));

    let response = get(&router, "/failing?seed=7").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        header(&response, "content-type"),
        "text/plain; charset=utf-8"
    );

    let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(body.contains("unsupported seed"), "body was {:?}", body);

    // Failures are never cached
    assert_eq!(service.cache_stats().await.unwrap().entries, 0);
}

#[tokio::test]
async fn test_invalid_tile_size_internal_error() {
    let (router, _) = router_for(TileService::new(FractalRegistry::with_defaults()));

    let response = get(&router, "/mandelbrot?w=0").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(body.contains("w"));
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (router, _) = router_for(TileService::new(FractalRegistry::with_defaults()));

    get(&router, "/solid?w=4&h=4").await;

    let response = get(&router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["cache"]["entries"], 1);
    assert!(json["cache"]["bytes"].as_u64().unwrap() > 0);
    assert!(json.get("mirror").is_none());
}

#[tokio::test]
async fn test_health_endpoint_cache_disabled() {
    let (router, _) = router_for(TileService::without_cache(FractalRegistry::with_defaults()));

    let response = get(&router, "/health").await;
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(json["cache"].is_null());
}
