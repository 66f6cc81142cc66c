//! Synthetic images and depth maps shared by the regression tests

use autovr_core::{Channels, DepthMap, Image};

/// RGB image whose red channel ramps left to right and green top to bottom.
///
/// Blue is fixed at 128. Every pixel is distinct along a row, which makes
/// shifted content easy to spot.
pub fn gradient_image(width: u32, height: u32) -> Image {
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            data.push(ramp(x, width));
            data.push(ramp(y, height));
            data.push(128);
        }
    }
    Image::from_raw(width, height, Channels::Rgb, data).expect("valid gradient dimensions")
}

/// RGB image of vertical stripes `stripe` pixels wide, alternating black
/// and white.
pub fn striped_image(width: u32, height: u32, stripe: u32) -> Image {
    let stripe = stripe.max(1);
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for _ in 0..height {
        for x in 0..width {
            let v = if (x / stripe) % 2 == 0 { 0 } else { 255 };
            data.extend_from_slice(&[v, v, v]);
        }
    }
    Image::from_raw(width, height, Channels::Rgb, data).expect("valid stripe dimensions")
}

/// Depth map that increases linearly from `near` at the left edge to `far`
/// at the right edge, constant down each column.
pub fn ramp_depth(width: u32, height: u32, near: f32, far: f32) -> DepthMap {
    let span = (width.max(2) - 1) as f32;
    DepthMap::from_fn(width, height, |x, _| near + (far - near) * x as f32 / span)
        .expect("valid ramp dimensions")
}

fn ramp(i: u32, n: u32) -> u8 {
    if n <= 1 {
        return 0;
    }
    ((i as u64 * 255) / (n as u64 - 1)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_corners() {
        let image = gradient_image(4, 3);
        assert_eq!(image.get_rgb(0, 0), Some((0, 0, 128)));
        assert_eq!(image.get_rgb(3, 2), Some((255, 255, 128)));
    }

    #[test]
    fn test_striped() {
        let image = striped_image(6, 1, 2);
        let reds: Vec<u8> = (0..6).map(|x| image.get_rgb(x, 0).unwrap().0).collect();
        assert_eq!(reds, vec![0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn test_ramp_depth() {
        let depth = ramp_depth(5, 2, 1.0, 3.0);
        assert_eq!(depth.row(1), &[1.0, 1.5, 2.0, 2.5, 3.0]);
    }
}
