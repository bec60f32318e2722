//! HTTP server layer for fracserv.
//!
//! This module provides the HTTP API for browsing fractal types and serving tiles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │              GET /{fractal_type}?{options}                      │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    pages    │  │        routes           │  │
//! │  │ (requests)  │  │   (HTML)    │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod pages;
pub mod routes;

pub use handlers::{
    fractal_handler, health_handler, http_date, index_handler, AppState, HealthResponse,
    CACHE_HIT_HEADER,
};
pub use pages::{generate_config_html, generate_index_html};
pub use routes::{create_router, RouterConfig};
