//! Error types for autovr-stereo

use thiserror::Error;

/// Errors that can occur while synthesizing or composing stereo views
#[derive(Debug, Error)]
pub enum StereoError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] autovr_core::Error),

    /// Depth map has no range to normalize
    #[error("degenerate depth map: every value is {value}")]
    DegenerateDepthMap { value: f32 },

    /// Left and right views differ in shape
    #[error("shape mismatch: left {left:?}, right {right:?}")]
    ShapeMismatch {
        left: (u32, u32, usize),
        right: (u32, u32, usize),
    },

    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for stereo operations
pub type StereoResult<T> = Result<T, StereoError>;
