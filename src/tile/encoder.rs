//! PNG tile encoder.
//!
//! Tiles are always encoded losslessly as 8-bit RGBA PNG. The encoded bytes are
//! exactly what the cache stores, the disk mirror writes and clients receive.

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::TileError;
use crate::fractal::Fractal;

/// PNG signature, the first eight bytes of every encoded tile.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Encoder from rendered fractals to PNG bytes.
#[derive(Debug, Clone, Default)]
pub struct PngTileEncoder {}

impl PngTileEncoder {
    /// Create a new PNG tile encoder.
    pub fn new() -> Self {
        Self {}
    }

    /// Encode a rendered fractal.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::EncodeError`] if the PNG writer rejects the image.
    pub fn encode(&self, fractal: &dyn Fractal) -> Result<Bytes, TileError> {
        let image = fractal.to_image();
        let (width, height) = image.dimensions();

        let mut output = Vec::new();
        PngEncoder::new(&mut output)
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| TileError::EncodeError {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }
}

/// Check that `data` starts with the PNG signature.
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

// =============================================================================
// Tests
// =============================================================================
