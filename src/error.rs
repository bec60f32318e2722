use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while constructing a fractal from request options
#[derive(Debug, Clone, Error)]
pub enum FractalError {
    /// An option has a value the generator cannot render with
    #[error("Invalid option {key}: {message}")]
    InvalidOption { key: String, message: String },

    /// No generator is registered under this name
    #[error("Unknown fractal type: {0}")]
    UnknownType(String),
}

impl FractalError {
    /// Shorthand for an invalid option error.
    pub fn invalid_option(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while producing a tile
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Requested fractal type is not registered (should map to HTTP 404)
    #[error("Unknown fractal type: {fractal_type}")]
    UnknownType { fractal_type: String },

    /// The generator refused to build an image
    #[error("Generator error: {0}")]
    Generator(#[from] FractalError),

    /// PNG encoding failed
    #[error("Encode error: {message}")]
    EncodeError { message: String },

    /// The render task panicked or was cancelled before finishing
    #[error("Render error: {message}")]
    RenderError { message: String },
}

/// Errors from the disk mirror. These are logged, never returned to clients.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Cache key would resolve outside the cache root
    #[error("Cache key {0:?} does not map to a path under the cache root")]
    UnsafeKey(String),

    /// A directory occupies the mirror path
    #[error("Mirror path {} is a directory", .0.display())]
    NotAFile(PathBuf),

    /// Mirror file is not a PNG tile
    #[error("Mirror file {} is not a valid tile", .0.display())]
    InvalidTile(PathBuf),

    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
