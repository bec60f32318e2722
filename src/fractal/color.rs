//! HSV to RGBA conversion.

use image::Rgba;

/// Convert hue (degrees), saturation and value (both 0..=1) to an opaque pixel.
///
/// Hue is wrapped into `[0, 360)` so every input lands in one of the six
/// sectors. Channels are truncated to `0..=255`, and out-of-range saturation or
/// value saturate at the channel bounds.
pub fn hsv_to_rgba(h: f64, s: f64, v: f64) -> Rgba<u8> {
    let h = h.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    // rem_euclid can round up to exactly 360.0 for tiny negative hues
    let (r, g, b) = match (sector as u8) % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Rgba([channel(r), channel(g), channel(b), u8::MAX])
}

fn channel(c: f64) -> u8 {
    (c * 255.0) as u8
}

// =============================================================================
// Tests
// =============================================================================
