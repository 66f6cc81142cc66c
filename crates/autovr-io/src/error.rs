//! I/O error types
//!
//! Each format module maps its underlying codec errors into `IoError`
//! variants so that callers only need to handle one error type.

use thiserror::Error;

/// Error type for image and depth-map I/O.
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The format is not recognized or not enabled via features
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The encoded data is structurally invalid
    #[error("invalid image data: {0}")]
    InvalidData(String),

    /// A codec returned a decoding error
    #[error("decode error: {0}")]
    DecodeError(String),

    /// A codec returned an encoding error
    #[error("encode error: {0}")]
    EncodeError(String),

    /// An error from the core containers
    #[error("core error: {0}")]
    Core(#[from] autovr_core::Error),
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
