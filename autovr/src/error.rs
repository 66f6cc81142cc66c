//! Error type for the autovr batch driver

use autovr_depth::DepthError;
use thiserror::Error;

/// Errors raised while processing images
#[derive(Debug, Error)]
pub enum Error {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] autovr_core::Error),

    /// Stereo synthesis or composition error
    #[error("stereo error: {0}")]
    Stereo(#[from] autovr_stereo::StereoError),

    /// Depth estimation error
    #[error("depth error: {0}")]
    Depth(#[from] DepthError),

    /// Image or depth I/O error
    #[error("I/O error: {0}")]
    Io(#[from] autovr_io::IoError),
}

impl Error {
    /// Whether this error must stop the whole batch regardless of policy.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Error::Depth(DepthError::ExhaustedRetryBudget { .. }))
    }
}

/// Result type for batch operations
pub type Result<T> = std::result::Result<T, Error>;
