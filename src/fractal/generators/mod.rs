//! Built-in fractal families.
//!
//! Every family reads the same tile options (`w`, `h`, `x`, `y`, `z`) through
//! [`TileGeometry`], then fills an [`RgbaImage`](image::RgbaImage) pixel by
//! pixel using a [`Navigator`](super::Navigator).

mod debug;
mod escape;
mod solid;

pub use debug::DebugGenerator;
pub use escape::{JuliaGenerator, MandelbrotGenerator};
pub use solid::SolidGenerator;

use image::{Rgba, RgbaImage};

use super::navigator::{Navigator, Point};
use super::options::Options;
use crate::error::FractalError;

/// Default tile edge in pixels.
pub const DEFAULT_TILE_SIZE: i64 = 256;

/// Largest accepted tile edge in pixels.
pub const MAX_TILE_SIZE: i64 = 4096;

/// Tile size and view transform shared by all families.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGeometry {
    pub width: u32,
    pub height: u32,
    pub navigator: Navigator,
}

/// Default view for a family when the request leaves `x`, `y` or `z` out.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ViewDefaults {
    pub x: i64,
    pub y: i64,
    pub z: f64,
}

impl TileGeometry {
    pub(crate) fn from_options(options: &Options, view: ViewDefaults) -> Result<Self, FractalError> {
        let width = tile_edge(options, "w")?;
        let height = tile_edge(options, "h")?;
        let navigator = Navigator::new(
            options.float("z", view.z),
            options.integer("x", view.x),
            options.integer("y", view.y),
        );

        Ok(Self {
            width,
            height,
            navigator,
        })
    }

    /// Render by evaluating `shade` at the fractal coordinate of every pixel.
    pub(crate) fn render<F>(&self, shade: F) -> RgbaImage
    where
        F: Fn(f64, f64) -> Rgba<u8>,
    {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let (fx, fy) = self
                .navigator
                .transform(Point::new(i64::from(x), i64::from(y)));
            shade(fx, fy)
        })
    }
}

fn tile_edge(options: &Options, key: &str) -> Result<u32, FractalError> {
    let edge = options.integer(key, DEFAULT_TILE_SIZE);
    if !(1..=MAX_TILE_SIZE).contains(&edge) {
        return Err(FractalError::invalid_option(
            key,
            format!("tile size {} outside 1..={}", edge, MAX_TILE_SIZE),
        ));
    }
    Ok(edge as u32)
}
