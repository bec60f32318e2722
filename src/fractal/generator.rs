//! Rendering contract shared by all fractal families.

use image::{Rgba, RgbaImage};

use super::options::Options;
use crate::error::FractalError;

// =============================================================================
// Fractal Trait
// =============================================================================

/// A rendered image: a fixed-size grid where every pixel has a concrete color.
///
/// Implementations are immutable once constructed. The tile service only ever
/// reads pixels from them to encode a PNG.
pub trait Fractal: Send {
    /// Width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Color at `(x, y)`. Callers stay within [`dimensions`](Fractal::dimensions).
    fn pixel(&self, x: u32, y: u32) -> Rgba<u8>;

    /// Collect the pixels into an owned RGBA buffer.
    fn to_image(&self) -> RgbaImage {
        let (width, height) = self.dimensions();
        RgbaImage::from_fn(width, height, |x, y| self.pixel(x, y))
    }
}

impl Fractal for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbaImage::dimensions(self)
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.get_pixel(x, y)
    }

    fn to_image(&self) -> RgbaImage {
        self.clone()
    }
}

// =============================================================================
// Generator Trait
// =============================================================================

/// A documented option accepted by a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    /// Query key
    pub name: &'static str,

    /// Default used when the key is absent or malformed
    pub default: &'static str,

    /// Short human-readable description
    pub description: &'static str,
}

impl Parameter {
    pub const fn new(name: &'static str, default: &'static str, description: &'static str) -> Self {
        Self {
            name,
            default,
            description,
        }
    }
}

/// Constructor for one fractal family.
///
/// Generators are registered once at startup and shared by all request
/// handlers, so they must be stateless or internally synchronized.
pub trait FractalGenerator: Send + Sync {
    /// Registry name, used as the URL path segment.
    fn name(&self) -> &'static str;

    /// One-line description for the index and configuration pages.
    fn description(&self) -> &'static str;

    /// Options understood by [`generate`](FractalGenerator::generate).
    fn parameters(&self) -> &'static [Parameter] {
        &[]
    }

    /// Build an image from request options.
    ///
    /// Returns an error instead of a partial image when the options cannot be
    /// rendered.
    fn generate(&self, options: &Options) -> Result<Box<dyn Fractal>, FractalError>;
}

// =============================================================================
// Tests
// =============================================================================
