//! Test utilities for integration tests.
//!
//! This module provides instrumented generators and helpers for driving the
//! router without a network listener.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{Rgba, RgbaImage};
use tower::ServiceExt;

use fracserv::error::FractalError;
use fracserv::fractal::{Fractal, FractalGenerator, FractalRegistry, Options};
use fracserv::tile::TileService;
use fracserv::{create_router, RouterConfig};

// =============================================================================
// Instrumented Generators
// =============================================================================

/// A generator that counts how often it is invoked.
///
/// Renders a `w` x `h` tile (default 8x8) filled with red channel `v`.
pub struct CountingGenerator {
    calls: Arc<AtomicUsize>,
}

impl CountingGenerator {
    pub fn tracked() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl FractalGenerator for CountingGenerator {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn description(&self) -> &'static str {
        "Solid tile that counts its renders"
    }

    fn generate(&self, options: &Options) -> Result<Box<dyn Fractal>, FractalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let width = options.integer("w", 8).clamp(1, 256) as u32;
        let height = options.integer("h", 8).clamp(1, 256) as u32;
        let red = options.integer("v", 0).clamp(0, 255) as u8;
        Ok(Box::new(RgbaImage::from_pixel(
            width,
            height,
            Rgba([red, 0, 0, 255]),
        )))
    }
}

/// A generator that always fails.
pub struct FailingGenerator;

impl FractalGenerator for FailingGenerator {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn description(&self) -> &'static str {
        "Rejects every option set"
    }

    fn generate(&self, _options: &Options) -> Result<Box<dyn Fractal>, FractalError> {
        Err(FractalError::invalid_option("seed", "unsupported seed"))
    }
}

/// The built-in families plus the instrumented test generators.
pub fn test_registry() -> (FractalRegistry, Arc<AtomicUsize>) {
    let (counting, calls) = CountingGenerator::tracked();
    let registry = FractalRegistry::with_defaults()
        .with(counting)
        .with(FailingGenerator);
    (registry, calls)
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Build a router around `service`, returning the shared service handle too.
pub fn router_for(service: TileService) -> (Router, Arc<TileService>) {
    let service = Arc::new(service);
    let router = create_router(Arc::clone(&service), RouterConfig::new());
    (router, service)
}

/// Issue a GET request against the router.
pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

/// Collect a response body.
pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Read a header as a string, panicking if it is missing.
pub fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {}", name))
        .to_str()
        .unwrap()
}

/// Decode a PNG body and return its dimensions.
pub fn png_dimensions(data: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory_with_format(data, image::ImageFormat::Png).unwrap();
    (image.width(), image.height())
}
