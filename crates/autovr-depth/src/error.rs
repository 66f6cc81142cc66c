//! Error types for autovr-depth

use crate::alloc::AllocationReport;
use thiserror::Error;

/// Errors that can occur while estimating depth
#[derive(Debug, Error)]
pub enum DepthError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] autovr_core::Error),

    /// The depth model ran out of memory; retrying smaller may succeed
    #[error("resource exhausted: {0}")]
    ResourceExhausted(AllocationReport),

    /// Every precision down to zero ran out of memory
    #[error("no precision fits in memory for {width}x{height} after {attempts} attempts")]
    ExhaustedRetryBudget {
        width: u32,
        height: u32,
        attempts: u32,
    },

    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other depth model failure
    #[error("depth model error: {0}")]
    Model(String),
}

impl DepthError {
    /// Whether a retry at lower precision may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DepthError::ResourceExhausted(_))
    }
}

/// Result type for depth operations
pub type DepthResult<T> = Result<T, DepthError>;
