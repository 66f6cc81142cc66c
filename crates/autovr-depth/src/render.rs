//! Depth visualization
//!
//! Renders a depth map as an 8-bit RGB image for inspection. Values are
//! windowed between two percentiles so a few extreme pixels do not wash out
//! the rest, then mapped linearly to 0..255.

use crate::error::{DepthError, DepthResult};
use autovr_core::{Channels, DepthMap, Image};

/// Rendering options for [`render_depth`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRender {
    /// Percentile mapped to the low end of the window
    pub low_percentile: f64,
    /// Percentile mapped to the high end of the window
    pub high_percentile: f64,
    /// Render near as bright and far as dark
    pub invert: bool,
}

impl Default for DepthRender {
    fn default() -> Self {
        Self {
            low_percentile: 2.0,
            high_percentile: 85.0,
            invert: true,
        }
    }
}

/// Value at percentile `p` of sorted data, interpolating between ranks.
fn percentile(sorted: &[f32], p: f64) -> f32 {
    let pos = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = (pos - lo as f64) as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Render `depth` as a grayscale RGB image.
///
/// # Errors
///
/// Returns [`DepthError::InvalidParameter`] if the percentiles are outside
/// `0..=100` or out of order, or if the map contains non-finite values.
pub fn render_depth(depth: &DepthMap, options: &DepthRender) -> DepthResult<Image> {
    let (lo_p, hi_p) = (options.low_percentile, options.high_percentile);
    if !(0.0..=100.0).contains(&lo_p) || !(0.0..=100.0).contains(&hi_p) || lo_p > hi_p {
        return Err(DepthError::InvalidParameter(format!(
            "invalid percentile window {}..{}",
            lo_p, hi_p
        )));
    }
    if depth.data().iter().any(|v| !v.is_finite()) {
        return Err(DepthError::InvalidParameter(
            "depth map contains non-finite values".to_string(),
        ));
    }

    let mut sorted = depth.data().to_vec();
    sorted.sort_by(f32::total_cmp);
    let vmin = percentile(&sorted, lo_p);
    let vmax = percentile(&sorted, hi_p);
    let range = vmax - vmin;

    let mut data = Vec::with_capacity(depth.data().len() * 3);
    for &v in depth.data() {
        let t = if range > 0.0 {
            ((v - vmin) / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let t = if options.invert { 1.0 - t } else { t };
        let gray = (t * 255.0).round() as u8;
        data.extend_from_slice(&[gray, gray, gray]);
    }

    Ok(Image::from_raw(
        depth.width(),
        depth.height(),
        Channels::Rgb,
        data,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile() {
        let sorted = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&sorted, 0.0), 0.0);
        assert_eq!(percentile(&sorted, 50.0), 20.0);
        assert_eq!(percentile(&sorted, 100.0), 40.0);
        assert_eq!(percentile(&sorted, 12.5), 5.0);
    }

    #[test]
    fn test_render_full_window() {
        let depth = DepthMap::from_data(3, 1, vec![0.0, 1.0, 2.0]).unwrap();
        let options = DepthRender {
            low_percentile: 0.0,
            high_percentile: 100.0,
            invert: false,
        };
        let image = render_depth(&depth, &options).unwrap();
        assert_eq!(image.channels(), Channels::Rgb);
        assert_eq!(image.get_rgb(0, 0), Some((0, 0, 0)));
        assert_eq!(image.get_rgb(1, 0), Some((128, 128, 128)));
        assert_eq!(image.get_rgb(2, 0), Some((255, 255, 255)));
    }

    #[test]
    fn test_render_inverted_default() {
        let depth = DepthMap::from_fn(10, 1, |x, _| x as f32).unwrap();
        let image = render_depth(&depth, &DepthRender::default()).unwrap();
        // Nearest is brightest; values beyond the 85th percentile clip to black.
        assert_eq!(image.get_rgb(0, 0), Some((255, 255, 255)));
        assert_eq!(image.get_rgb(9, 0), Some((0, 0, 0)));
    }

    #[test]
    fn test_render_flat() {
        let depth = DepthMap::new_with_value(2, 2, 5.0).unwrap();
        let image = render_depth(&depth, &DepthRender::default()).unwrap();
        assert_eq!(image.get_rgb(1, 1), Some((255, 255, 255)));
    }

    #[test]
    fn test_render_invalid() {
        let depth = DepthMap::new_with_value(2, 2, 5.0).unwrap();
        let bad = DepthRender {
            low_percentile: 90.0,
            high_percentile: 10.0,
            invert: true,
        };
        assert!(render_depth(&depth, &bad).is_err());
    }
}
