//! autovr - Stereoscopic images from a single picture and its depth
//!
//! Turns ordinary 2-D images into left/right stereo pairs for VR viewing by
//! shifting pixels horizontally in proportion to their estimated nearness.
//!
//! # Overview
//!
//! - Depth estimation through an external model, with automatic precision
//!   reduction when the device runs out of memory ([`depth`])
//! - Depth-image-based warping into left and right views ([`stereo`])
//! - Side-by-side, padded, and anaglyph composition ([`stereo`])
//! - PNG/JPEG image I/O and 16-bit raw depth files ([`io`])
//! - A batch driver tying these together ([`run_batch`])
//!
//! # Example
//!
//! ```
//! use autovr::stereo::{ComposeMode, StereoOptions, compose, synthesize_stereo};
//! use autovr::{Channels, DepthMap, Image, Rgb};
//!
//! let image = Image::new_filled(64, 32, Channels::Rgb, Rgb::new(90, 120, 200)).unwrap();
//! let depth = DepthMap::from_fn(64, 32, |x, _| x as f32).unwrap();
//!
//! let pair = synthesize_stereo(&image, &depth, &StereoOptions::default()).unwrap();
//! let sbs = compose(&pair, ComposeMode::SideBySide).unwrap();
//! assert_eq!(sbs.dimensions(), (128, 32));
//! ```

mod batch;
mod config;
mod error;

// Re-export core types (primary data structures used everywhere)
pub use autovr_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use autovr_depth as depth;
pub use autovr_io as io;
pub use autovr_stereo as stereo;

pub use batch::{
    BatchItem, BatchReport, StereoOutputs, process_image, run_batch, write_outputs,
};
pub use config::{BatchConfig, FailurePolicy, OutputSelection};
pub use error::{Error, Result};
