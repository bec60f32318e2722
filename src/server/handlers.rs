//! HTTP request handlers for the fractal tile API.
//!
//! This module contains the Axum handlers for serving tiles, pages and health checks.
//!
//! # Endpoints
//!
//! - `GET /` - Index page listing the registered fractal types
//! - `GET /health` - Health check endpoint with cache statistics
//! - `GET /{fractal_type}` - Configuration page for a type
//! - `GET /{fractal_type}?{options}` - Render (or fetch from cache) a tile

use std::sync::Arc;
use std::time::SystemTime;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderName, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{FractalError, TileError};
use crate::tile::{CacheStats, MirrorStats, TileRequest, TileService, TILE_FRESHNESS};

use super::pages::{generate_config_html, generate_index_html};

/// Response header reporting whether the tile came from the cache.
pub const CACHE_HIT_HEADER: &str = "x-tile-cache-hit";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the tile service.
///
/// This is passed to all handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// The tile service for processing tile requests
    pub tile_service: Arc<TileService>,
}

impl AppState {
    /// Create a new application state with the given tile service.
    pub fn new(tile_service: TileService) -> Self {
        Self::from_shared(Arc::new(tile_service))
    }

    /// Create application state around a service the caller keeps a handle to.
    pub fn from_shared(tile_service: Arc<TileService>) -> Self {
        Self { tile_service }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// In-memory cache statistics, `null` when caching is disabled
    pub cache: Option<CacheStats>,

    /// Disk mirror counters, omitted when persistence is off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror: Option<MirrorStats>,
}

/// Format a timestamp as an HTTP date (RFC 7231 IMF-fixdate).
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert TileError to a plain-text HTTP response.
///
/// This implementation logs errors appropriately based on their severity:
/// - 404s are logged at DEBUG level (unknown types are common and expected)
/// - 5xx errors are logged at ERROR level (render and encode failures)
impl IntoResponse for TileError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            TileError::UnknownType { .. } | TileError::Generator(FractalError::UnknownType(_)) => {
                (StatusCode::NOT_FOUND, "unknown_type")
            }
            TileError::Generator(_) => (StatusCode::INTERNAL_SERVER_ERROR, "generator_error"),
            TileError::EncodeError { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "encode_error"),
            TileError::RenderError { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "render_error"),
        };

        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle fractal requests: configuration page or tile.
///
/// # Endpoint
///
/// `GET /{fractal_type}` and `GET /{fractal_type}?{options}`
///
/// The type is checked against the registry before anything else. Without a
/// query (or with an empty one) the configuration page is returned; otherwise
/// the request goes through the tile pipeline.
///
/// # Response
///
/// - `200 OK`: HTML configuration page, or PNG tile with `Content-Type: image/png`
/// - `404 Not Found`: Unknown fractal type
/// - `500 Internal Server Error`: Generator or encode failure (plain text)
///
/// # Headers
///
/// - `Content-Type: image/png`
/// - `Last-Modified`: render time (cache enabled only)
/// - `Expires`: render time plus one hour (cache enabled only)
/// - `X-Tile-Cache-Hit: true|false`
pub async fn fractal_handler(
    State(state): State<AppState>,
    Path(fractal_type): Path<String>,
    uri: Uri,
) -> Result<Response, TileError> {
    let registry = state.tile_service.registry();
    let Some(generator) = registry.get(&fractal_type) else {
        return Err(TileError::UnknownType { fractal_type });
    };

    if uri.query().map_or(true, str::is_empty) {
        return Ok(Html(generate_config_html(generator)).into_response());
    }

    let request_uri = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());
    let request = TileRequest::new(fractal_type, request_uri);

    let response = state.tile_service.get_tile(request).await?;
    let cache_hit = response.cache_hit.to_string();

    if !response.cached {
        return Ok((
            [
                (header::CONTENT_TYPE, "image/png".to_string()),
                (HeaderName::from_static(CACHE_HIT_HEADER), cache_hit),
            ],
            Body::from(response.data),
        )
            .into_response());
    }

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::LAST_MODIFIED, http_date(response.timestamp)),
            (
                header::EXPIRES,
                http_date(response.timestamp + TILE_FRESHNESS),
            ),
            (HeaderName::from_static(CACHE_HIT_HEADER), cache_hit),
        ],
        Body::from(response.data),
    )
        .into_response())
}

/// Handle index requests.
///
/// # Endpoint
///
/// `GET /`
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(generate_index_html(state.tile_service.registry()))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "cache": { "entries": 12, "bytes": 48213, "capacity": 104857600 }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: state.tile_service.cache_stats().await,
        mirror: state.tile_service.mirror_stats(),
    })
}

// =============================================================================
// Tests
// =============================================================================
