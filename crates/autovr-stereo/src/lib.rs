//! autovr-stereo - Stereo view synthesis for autovr
//!
//! This crate turns an image and its depth map into a stereoscopic pair:
//!
//! - Depth normalization to `[0, 1]`
//! - Divergence mapping from a stereo intensity percentage
//! - Scanline polyline warping with occlusion handling
//! - Side-by-side, padded, and anaglyph composition

pub mod compose;
pub mod divergence;
mod error;
pub mod normalize;
pub mod pair;
pub mod warp;

pub use compose::{ComposeMode, PaddingSpec, anaglyph, compose, padded, side_by_side};
pub use divergence::{DEFAULT_INTENSITY, compute_divergence};
pub use error::{StereoError, StereoResult};
pub use normalize::{NormalizedDepth, normalize};
pub use pair::{StereoOptions, StereoPair, synthesize_stereo};
pub use warp::{FillTechnique, Polyline, Segment, Vertex, build_polyline, warp_image, warp_row};
