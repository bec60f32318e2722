//! Pixel space to fractal space transform.

/// Integer point in pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Maps pixel coordinates to fractal coordinates under a zoom and offset.
///
/// `transform(p) = ((p.x + offset.x) / 2^z, (p.y + offset.y) / 2^z)`.
///
/// The offset is applied in pixel space before scaling. There is no bounds
/// checking; any zoom or offset is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Navigator {
    zoom: f64,
    offset: Point,
}

impl Navigator {
    /// Create a navigator at zoom `z` with pixel offset `(x_off, y_off)`.
    pub fn new(zoom: f64, x_off: i64, y_off: i64) -> Self {
        Self {
            zoom,
            offset: Point::new(x_off, y_off),
        }
    }

    /// Convert a pixel to fractal space.
    ///
    /// The sum is taken in `f64` so any pair of `i64` inputs is accepted.
    pub fn transform(&self, p: Point) -> (f64, f64) {
        let x = p.x as f64 + self.offset.x as f64;
        let y = p.y as f64 + self.offset.y as f64;
        let scale = self.zoom.exp2();
        (x / scale, y / scale)
    }

    /// Set the pixel space offset.
    pub fn translate(&mut self, offset: Point) {
        self.offset = offset;
    }

    /// Set the zoom exponent.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }
}

// =============================================================================
// Tests
// =============================================================================
