use image::Rgba;

use super::{TileGeometry, ViewDefaults};
use crate::error::FractalError;
use crate::fractal::color::hsv_to_rgba;
use crate::fractal::generator::{Fractal, FractalGenerator, Parameter};
use crate::fractal::options::Options;

const PARAMETERS: &[Parameter] = &[
    Parameter::new("w", "256", "Tile width in pixels"),
    Parameter::new("h", "256", "Tile height in pixels"),
    Parameter::new("x", "0", "Horizontal pixel offset"),
    Parameter::new("y", "0", "Vertical pixel offset"),
    Parameter::new("z", "8", "Zoom exponent (scale = 2^z)"),
];

const BORDER: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Tile outline over a hue gradient, for checking tile placement in a viewer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugGenerator;

impl FractalGenerator for DebugGenerator {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn description(&self) -> &'static str {
        "Tile borders over a coordinate gradient"
    }

    fn parameters(&self) -> &'static [Parameter] {
        PARAMETERS
    }

    fn generate(&self, options: &Options) -> Result<Box<dyn Fractal>, FractalError> {
        let geometry = TileGeometry::from_options(options, ViewDefaults { x: 0, y: 0, z: 8.0 })?;
        let (w, h) = (geometry.width, geometry.height);

        let mut img = geometry.render(|fx, fy| hsv_to_rgba((fx + fy) * 360.0, 0.5, 0.9));
        for x in 0..w {
            img.put_pixel(x, 0, BORDER);
            img.put_pixel(x, h - 1, BORDER);
        }
        for y in 0..h {
            img.put_pixel(0, y, BORDER);
            img.put_pixel(w - 1, y, BORDER);
        }

        Ok(Box::new(img))
    }
}
