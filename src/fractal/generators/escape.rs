//! Escape-time families: Mandelbrot and Julia sets.
//!
//! Both iterate `z = z^2 + c` until `|z| > 2` or the iteration budget runs out.
//! Points that never escape are black; the rest are colored by escape speed.

use image::Rgba;

use super::{TileGeometry, ViewDefaults};
use crate::error::FractalError;
use crate::fractal::color::hsv_to_rgba;
use crate::fractal::generator::{Fractal, FractalGenerator, Parameter};
use crate::fractal::options::Options;

/// Default iteration budget.
pub const DEFAULT_ITERATIONS: i64 = 100;

/// Largest accepted iteration budget.
pub const MAX_ITERATIONS: i64 = 100_000;

const INSIDE: Rgba<u8> = Rgba([0, 0, 0, 255]);

// 256px default tile spans 4 units: (-2.5..1.5, -2..2) for Mandelbrot
const MANDELBROT_VIEW: ViewDefaults = ViewDefaults {
    x: -160,
    y: -128,
    z: 6.0,
};

const JULIA_VIEW: ViewDefaults = ViewDefaults {
    x: -128,
    y: -128,
    z: 6.0,
};

const MANDELBROT_PARAMETERS: &[Parameter] = &[
    Parameter::new("w", "256", "Tile width in pixels"),
    Parameter::new("h", "256", "Tile height in pixels"),
    Parameter::new("x", "-160", "Horizontal pixel offset"),
    Parameter::new("y", "-128", "Vertical pixel offset"),
    Parameter::new("z", "6", "Zoom exponent (scale = 2^z)"),
    Parameter::new("i", "100", "Maximum iterations"),
];

const JULIA_PARAMETERS: &[Parameter] = &[
    Parameter::new("w", "256", "Tile width in pixels"),
    Parameter::new("h", "256", "Tile height in pixels"),
    Parameter::new("x", "-128", "Horizontal pixel offset"),
    Parameter::new("y", "-128", "Vertical pixel offset"),
    Parameter::new("z", "6", "Zoom exponent (scale = 2^z)"),
    Parameter::new("i", "100", "Maximum iterations"),
    Parameter::new("cr", "-0.4", "Real part of the constant c"),
    Parameter::new("ci", "0.6", "Imaginary part of the constant c"),
];

/// Iterations before `z` escapes, or `None` if it stays bounded.
fn escape_time(mut zr: f64, mut zi: f64, cr: f64, ci: f64, max_iterations: u32) -> Option<u32> {
    for n in 0..max_iterations {
        let zr2 = zr * zr;
        let zi2 = zi * zi;
        if zr2 + zi2 > 4.0 {
            return Some(n);
        }
        zi = 2.0 * zr * zi + ci;
        zr = zr2 - zi2 + cr;
    }
    None
}

fn shade(escape: Option<u32>, max_iterations: u32) -> Rgba<u8> {
    match escape {
        Some(n) => hsv_to_rgba(360.0 * f64::from(n) / f64::from(max_iterations), 1.0, 1.0),
        None => INSIDE,
    }
}

fn iterations(options: &Options) -> Result<u32, FractalError> {
    let iterations = options.integer("i", DEFAULT_ITERATIONS);
    if !(1..=MAX_ITERATIONS).contains(&iterations) {
        return Err(FractalError::invalid_option(
            "i",
            format!("iterations {} outside 1..={}", iterations, MAX_ITERATIONS),
        ));
    }
    Ok(iterations as u32)
}

// =============================================================================
// Mandelbrot
// =============================================================================

/// The Mandelbrot set: `c` is the pixel, `z` starts at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct MandelbrotGenerator;

impl FractalGenerator for MandelbrotGenerator {
    fn name(&self) -> &'static str {
        "mandelbrot"
    }

    fn description(&self) -> &'static str {
        "Mandelbrot set, colored by escape time"
    }

    fn parameters(&self) -> &'static [Parameter] {
        MANDELBROT_PARAMETERS
    }

    fn generate(&self, options: &Options) -> Result<Box<dyn Fractal>, FractalError> {
        let geometry = TileGeometry::from_options(options, MANDELBROT_VIEW)?;
        let max = iterations(options)?;

        let img = geometry.render(|fx, fy| shade(escape_time(0.0, 0.0, fx, fy, max), max));
        Ok(Box::new(img))
    }
}

// =============================================================================
// Julia
// =============================================================================

/// A Julia set: `z` starts at the pixel, `c` is fixed by options.
#[derive(Debug, Clone, Copy, Default)]
pub struct JuliaGenerator;

impl FractalGenerator for JuliaGenerator {
    fn name(&self) -> &'static str {
        "julia"
    }

    fn description(&self) -> &'static str {
        "Julia set for a constant c, colored by escape time"
    }

    fn parameters(&self) -> &'static [Parameter] {
        JULIA_PARAMETERS
    }

    fn generate(&self, options: &Options) -> Result<Box<dyn Fractal>, FractalError> {
        let geometry = TileGeometry::from_options(options, JULIA_VIEW)?;
        let max = iterations(options)?;
        let cr = options.float("cr", -0.4);
        let ci = options.float("ci", 0.6);

        let img = geometry.render(|fx, fy| shade(escape_time(fx, fy, cr, ci, max), max));
        Ok(Box::new(img))
    }
}
