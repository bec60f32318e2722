//! Fractal rendering abstraction.
//!
//! The tile pipeline never knows how a particular fractal is computed. It only
//! sees the contract in this module:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            FractalRegistry              │
//! │      (name → FractalGenerator)          │
//! └────────────────────┬────────────────────┘
//!                      │ generate(&Options)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          Box<dyn Fractal>               │
//! │   (fixed-size grid of RGBA pixels)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`Options`]: typed, defaulting accessors over query parameters
//! - [`Navigator`]: pixel to fractal space transform (`(p + offset) / 2^z`)
//! - [`hsv_to_rgba`]: color mapping used by the built-in families
//! - [`FractalGenerator`]: constructor contract for one family
//! - [`FractalRegistry`]: name-keyed directory of generators, built at startup
//!
//! # Example
//!
//! ```
//! use fracserv::fractal::{FractalRegistry, Options};
//!
//! let registry = FractalRegistry::with_defaults();
//! let options = Options::from_query("w=64&h=64&i=50");
//! let image = registry.generate("mandelbrot", &options).unwrap();
//! assert_eq!(image.dimensions(), (64, 64));
//! ```

mod color;
mod generator;
pub mod generators;
mod navigator;
mod options;
mod registry;

pub use color::hsv_to_rgba;
pub use generator::{Fractal, FractalGenerator, Parameter};
pub use navigator::{Navigator, Point};
pub use options::Options;
pub use registry::FractalRegistry;
