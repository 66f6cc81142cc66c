//! Image I/O regression test
//!
//! Round-trips synthetic images through PNG and JPEG, in memory and on
//! disk, and raw depth maps through 16-bit PNG.
//!
//! Run with:
//! ```
//! cargo test -p autovr-io --test imageio_reg
//! ```

use autovr_core::{Channels, DepthMap, Image};
use autovr_io::{
    ImageFormat, detect_format_from_bytes, read_depth_raw, read_image, read_image_mem,
    write_depth_raw, write_image, write_image_mem,
};
use autovr_test::fixtures::{gradient_image, ramp_depth, striped_image};
use autovr_test::{RegParams, regout_dir};
use std::fs;

fn max_abs_diff(a: &Image, b: &Image) -> u8 {
    a.data()
        .iter()
        .zip(b.data())
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0)
}

#[test]
fn imageio_reg() {
    let mut rp = RegParams::new("imageio");

    let outdir = regout_dir();
    fs::create_dir_all(&outdir).expect("Failed to create output directory");

    // --- Test 1: PNG is lossless for RGB and gray ---
    let rgb = gradient_image(37, 21);
    let bytes = write_image_mem(&rgb, ImageFormat::Png).expect("encode png");
    rp.check(
        detect_format_from_bytes(&bytes).ok() == Some(ImageFormat::Png),
        "png magic",
    );
    let back = read_image_mem(&bytes).expect("decode png");
    rp.compare_images(&rgb, &back);

    let gray = Image::from_raw(5, 2, Channels::Gray, vec![0, 50, 100, 150, 200, 1, 2, 3, 4, 255])
        .expect("gray");
    let back = read_image_mem(&write_image_mem(&gray, ImageFormat::Png).expect("encode"))
        .expect("decode");
    rp.compare_images(&gray, &back);

    // --- Test 2: JPEG is close for smooth content ---
    let bytes = write_image_mem(&rgb, ImageFormat::Jpeg).expect("encode jpeg");
    rp.check(
        detect_format_from_bytes(&bytes).ok() == Some(ImageFormat::Jpeg),
        "jpeg magic",
    );
    let back = read_image_mem(&bytes).expect("decode jpeg");
    rp.check(back.same_shape(&rgb), "jpeg keeps shape");
    rp.check(max_abs_diff(&rgb, &back) <= 24, "jpeg error bounded");

    // --- Test 3: files on disk ---
    let stripes = striped_image(24, 8, 4);
    let path = format!("{}/imageio_stripes.png", outdir);
    write_image(&stripes, &path, ImageFormat::Png).expect("write png file");
    let back = read_image(&path).expect("read png file");
    rp.compare_images(&stripes, &back);
    rp.check(
        ImageFormat::from_path(&path).ok() == Some(ImageFormat::Png),
        "format from path",
    );
    fs::remove_file(&path).ok();

    // --- Test 4: raw depth keeps 1/256 resolution ---
    let depth = ramp_depth(16, 4, 0.5, 40.0);
    let path = format!("{}/imageio_depth.png", outdir);
    write_depth_raw(&depth, &path).expect("write depth");
    let back: DepthMap = read_depth_raw(&path).expect("read depth");
    rp.check(back.dimensions() == depth.dimensions(), "depth dimensions");
    let worst = depth
        .data()
        .iter()
        .zip(back.data())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f32, f32::max);
    rp.compare_values(0.0, worst as f64, 1.0 / 512.0 + 1e-6);
    fs::remove_file(&path).ok();

    // --- Test 5: unknown data is rejected ---
    rp.check(read_image_mem(b"not an image").is_err(), "garbage rejected");

    assert!(rp.cleanup(), "imageio regression test failed");
}
