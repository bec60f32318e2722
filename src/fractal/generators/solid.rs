use image::RgbaImage;

use super::{TileGeometry, ViewDefaults};
use crate::error::FractalError;
use crate::fractal::color::hsv_to_rgba;
use crate::fractal::generator::{Fractal, FractalGenerator, Parameter};
use crate::fractal::options::Options;

const PARAMETERS: &[Parameter] = &[
    Parameter::new("w", "256", "Tile width in pixels"),
    Parameter::new("h", "256", "Tile height in pixels"),
    Parameter::new("hue", "210", "Hue in degrees"),
    Parameter::new("s", "0.6", "Saturation, 0 to 1"),
    Parameter::new("v", "0.8", "Value, 0 to 1"),
];

/// Single-color tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidGenerator;

impl FractalGenerator for SolidGenerator {
    fn name(&self) -> &'static str {
        "solid"
    }

    fn description(&self) -> &'static str {
        "Uniform fill from an HSV color"
    }

    fn parameters(&self) -> &'static [Parameter] {
        PARAMETERS
    }

    fn generate(&self, options: &Options) -> Result<Box<dyn Fractal>, FractalError> {
        let geometry = TileGeometry::from_options(options, ViewDefaults { x: 0, y: 0, z: 0.0 })?;
        let color = hsv_to_rgba(
            options.float("hue", 210.0),
            options.float("s", 0.6),
            options.float("v", 0.8),
        );

        Ok(Box::new(RgbaImage::from_pixel(
            geometry.width,
            geometry.height,
            color,
        )))
    }
}
