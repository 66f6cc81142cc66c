//! DepthMap - Floating-point depth matrix
//!
//! `DepthMap` is a 2D array of `f32` depth proxies produced by a depth
//! estimator. Its range is arbitrary and model-dependent; the stereo crate
//! normalizes it before warping.
//!
//! # Examples
//!
//! ```
//! use autovr_core::DepthMap;
//!
//! let depth = DepthMap::from_data(3, 1, vec![2.0, 8.0, 5.0]).unwrap();
//! assert_eq!(depth.min_max(), Some((2.0, 8.0)));
//! assert_eq!(depth.row(0), &[2.0, 8.0, 5.0]);
//! ```

use crate::error::{Error, Result};
use crate::image::Image;

/// Floating-point depth matrix
///
/// # Memory Layout
///
/// Data is stored in row-major order with no padding. The value at (x, y)
/// is at index `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthMap {
    /// Create a new depth map with every value set to `value`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new_with_value(width: u32, height: u32, value: f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(DepthMap {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        })
    }

    /// Create a depth map from row-major data.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or data length doesn't match.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        if data.len() != width as usize * height as usize {
            return Err(Error::DataLength {
                len: data.len(),
                width,
                height,
                channels: 1,
            });
        }
        Ok(DepthMap {
            width,
            height,
            data,
        })
    }

    /// Build a depth map by evaluating `f(x, y)` at every location.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(DepthMap {
            width,
            height,
            data,
        })
    }

    /// Get the width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the value at (x, y).
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Result<f32> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: (y as usize) * (self.width as usize) + (x as usize),
                len: self.data.len(),
            });
        }
        Ok(self.data[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Get all values
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get a row of values.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[f32] {
        let start = (y as usize) * (self.width as usize);
        &self.data[start..start + self.width as usize]
    }

    /// Smallest and largest value.
    ///
    /// Returns `None` if any value is NaN.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.data {
            if v.is_nan() {
                return None;
            }
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Apply `f` to every value, producing a new map of the same size.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> DepthMap {
        DepthMap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Check that this map matches `image` in width and height.
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` otherwise.
    pub fn check_matches(&self, image: &Image) -> Result<()> {
        if self.dimensions() != image.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: image.dimensions(),
                actual: self.dimensions(),
            });
        }
        Ok(())
    }
}
