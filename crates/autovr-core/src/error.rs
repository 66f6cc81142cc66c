//! Error types for autovr-core
//!
//! Provides a unified error type for the image and depth containers.
//! Domain crates wrap this type in their own error enums via `#[from]`.

use thiserror::Error;

/// autovr core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Unsupported channel count
    #[error("unsupported channel count: {0}")]
    InvalidChannels(u32),

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Two grids that must share a size do not
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Raw buffer length does not match the declared geometry
    #[error("data length {len} doesn't match {width}x{height}x{channels}")]
    DataLength {
        len: usize,
        width: u32,
        height: u32,
        channels: u32,
    },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
