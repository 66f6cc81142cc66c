//! Bilinear depth-map resampling
//!
//! Depth models run at a reduced working resolution; their output is
//! brought back to the source image's size here. Pixel centres are aligned,
//! so sample `(dx, dy)` in the output reads source position
//! `((dx + 0.5) * sw / dw - 0.5, (dy + 0.5) * sh / dh - 0.5)`, clamped to the
//! source bounds.

use crate::error::{DepthError, DepthResult};
use autovr_core::DepthMap;

/// Resample `depth` to `width` x `height` with bilinear interpolation.
///
/// Returns a copy when the size already matches.
///
/// # Errors
///
/// Returns [`DepthError::InvalidParameter`] if either target dimension is 0.
pub fn resample_depth(depth: &DepthMap, width: u32, height: u32) -> DepthResult<DepthMap> {
    if width == 0 || height == 0 {
        return Err(DepthError::InvalidParameter(format!(
            "cannot resample depth to {}x{}",
            width, height
        )));
    }
    if depth.dimensions() == (width, height) {
        return Ok(depth.clone());
    }

    let (sw, sh) = depth.dimensions();
    let x_scale = sw as f32 / width as f32;
    let y_scale = sh as f32 / height as f32;

    // Source coordinate and the two neighbours with their weight.
    let axis = |d: u32, scale: f32, size: u32| -> (usize, usize, f32) {
        let s = ((d as f32 + 0.5) * scale - 0.5).clamp(0.0, (size - 1) as f32);
        let s0 = s.floor() as u32;
        let s1 = (s0 + 1).min(size - 1);
        (s0 as usize, s1 as usize, s - s0 as f32)
    };
    let columns: Vec<_> = (0..width).map(|dx| axis(dx, x_scale, sw)).collect();

    let src = depth.data();
    let stride = sw as usize;
    let mut data = Vec::with_capacity(width as usize * height as usize);
    for dy in 0..height {
        let (y0, y1, fy) = axis(dy, y_scale, sh);
        let (row0, row1) = (&src[y0 * stride..], &src[y1 * stride..]);
        for &(x0, x1, fx) in &columns {
            let top = row0[x0] * (1.0 - fx) + row0[x1] * fx;
            let bottom = row1[x0] * (1.0 - fx) + row1[x1] * fx;
            data.push(top * (1.0 - fy) + bottom * fy);
        }
    }

    Ok(DepthMap::from_data(width, height, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_size_is_copy() {
        let depth = DepthMap::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(resample_depth(&depth, 2, 2).unwrap(), depth);
    }

    #[test]
    fn test_upsample_row() {
        let depth = DepthMap::from_data(2, 1, vec![0.0, 4.0]).unwrap();
        let up = resample_depth(&depth, 4, 1).unwrap();
        // Source x = -0.25, 0.25, 0.75, 1.25 clamped to [0, 1].
        assert_eq!(up.row(0), &[0.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_downsample_constant() {
        let depth = DepthMap::new_with_value(7, 5, 2.5).unwrap();
        let down = resample_depth(&depth, 3, 2).unwrap();
        assert_eq!(down.dimensions(), (3, 2));
        assert!(down.data().iter().all(|&v| (v - 2.5).abs() < 1e-6));
    }

    #[test]
    fn test_zero_target() {
        let depth = DepthMap::new_with_value(2, 2, 1.0).unwrap();
        assert!(resample_depth(&depth, 0, 2).is_err());
    }
}
