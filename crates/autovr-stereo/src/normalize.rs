//! Depth normalization
//!
//! Depth estimators emit values in an arbitrary, model-dependent range. The
//! warper expects closeness in `[0, 1]`, so every depth map is rescaled with
//! its own minimum mapped to 0 and maximum to 1 before warping.

use crate::error::{StereoError, StereoResult};
use autovr_core::DepthMap;

/// A depth map whose values all lie in `[0, 1]`, with both ends attained.
///
/// Only [`normalize`] constructs this type.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDepth {
    depth: DepthMap,
}

impl NormalizedDepth {
    /// Get the width
    #[inline]
    pub fn width(&self) -> u32 {
        self.depth.width()
    }

    /// Get the height
    #[inline]
    pub fn height(&self) -> u32 {
        self.depth.height()
    }

    /// Get (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.depth.dimensions()
    }

    /// Get one row of normalized values.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[f32] {
        self.depth.row(y)
    }

    /// Borrow the underlying depth map.
    pub fn as_depth(&self) -> &DepthMap {
        &self.depth
    }
}

/// Rescale `depth` so its minimum becomes 0 and its maximum 1.
///
/// # Errors
///
/// - [`StereoError::InvalidParameter`] if any value is NaN or infinite
/// - [`StereoError::DegenerateDepthMap`] if every value is equal
pub fn normalize(depth: &DepthMap) -> StereoResult<NormalizedDepth> {
    let (min, max) = depth
        .min_max()
        .filter(|(min, max)| min.is_finite() && max.is_finite())
        .ok_or_else(|| {
            StereoError::InvalidParameter("depth map contains non-finite values".to_string())
        })?;

    if max <= min {
        return Err(StereoError::DegenerateDepthMap { value: min });
    }

    let range = max - min;
    Ok(NormalizedDepth {
        depth: depth.map(|v| (v - min) / range),
    })
}
