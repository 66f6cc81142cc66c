//! autovr-depth - Depth estimation orchestration for autovr
//!
//! The depth model itself is an external collaborator reached through the
//! [`ModelLoader`] and [`DepthModel`] traits. This crate provides:
//!
//! - The adaptive-precision controller, which retries out-of-memory
//!   inference at lower resolution and remembers what worked
//! - Parsing of allocation failure messages into structured reports
//! - Bilinear resampling of depth maps to image size
//! - Depth-map visualization

pub mod alloc;
mod error;
pub mod estimator;
pub mod precision;
pub mod render;
pub mod resample;

pub use alloc::{AllocationReport, classify_failure, format_bytes, is_resource_exhaustion};
pub use error::{DepthError, DepthResult};
pub use estimator::{DEFAULT_DEVICE, DEFAULT_MODEL_NAME, DepthModel, KNOWN_MODELS, ModelLoader, ModelSpec};
pub use precision::{
    ControllerState, FACTOR_STEP, PrecisionController, PrecisionKey, PrecisionMode, PrecisionSpec,
    PrecisionState, RETRY_BACKOFF,
};
pub use render::{DepthRender, render_depth};
pub use resample::resample_depth;
