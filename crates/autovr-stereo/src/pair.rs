//! Stereo pair synthesis

use crate::divergence::{DEFAULT_INTENSITY, compute_divergence};
use crate::error::{StereoError, StereoResult};
use crate::normalize::normalize;
use crate::warp::{FillTechnique, warp_image};
use autovr_core::{DepthMap, Image};

/// Options for [`synthesize_stereo`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoOptions {
    /// Stereo strength, in percent of image width
    pub intensity: f64,
    /// Vertex construction technique
    pub fill: FillTechnique,
}

impl Default for StereoOptions {
    fn default() -> Self {
        Self {
            intensity: DEFAULT_INTENSITY,
            fill: FillTechnique::default(),
        }
    }
}

impl StereoOptions {
    /// Check the options.
    ///
    /// # Errors
    ///
    /// Returns [`StereoError::InvalidParameter`] if the intensity is negative
    /// or not finite.
    pub fn validate(&self) -> StereoResult<()> {
        compute_divergence(self.intensity, 1).map(|_| ())
    }
}

/// Left and right eye views of equal shape
#[derive(Debug, Clone)]
pub struct StereoPair {
    left: Image,
    right: Image,
}

impl StereoPair {
    /// Pair two views.
    ///
    /// # Errors
    ///
    /// Returns [`StereoError::ShapeMismatch`] unless both views have the same
    /// width, height, and channel count.
    pub fn new(left: Image, right: Image) -> StereoResult<Self> {
        if !left.same_shape(&right) {
            return Err(StereoError::ShapeMismatch {
                left: (left.width(), left.height(), left.channels().count()),
                right: (right.width(), right.height(), right.channels().count()),
            });
        }
        Ok(Self { left, right })
    }

    /// Left-eye view
    pub fn left(&self) -> &Image {
        &self.left
    }

    /// Right-eye view
    pub fn right(&self) -> &Image {
        &self.right
    }
}

/// Synthesize left and right views of `image` from its raw depth map.
///
/// Normalizes `depth`, derives the per-eye divergence from
/// `options.intensity` and the image width, then warps once with positive
/// divergence (left eye) and once with negative divergence (right eye).
///
/// # Errors
///
/// - [`StereoError::DegenerateDepthMap`] if `depth` is flat
/// - [`StereoError::Core`] if `depth` and `image` differ in size
/// - [`StereoError::InvalidParameter`] for invalid options or non-finite
///   depth values
pub fn synthesize_stereo(
    image: &Image,
    depth: &DepthMap,
    options: &StereoOptions,
) -> StereoResult<StereoPair> {
    depth.check_matches(image)?;
    let normalized = normalize(depth)?;
    let divergence = compute_divergence(options.intensity, image.width())?;

    let left = warp_image(image, &normalized, divergence, options.fill)?;
    let right = warp_image(image, &normalized, -divergence, options.fill)?;
    StereoPair::new(left, right)
}
