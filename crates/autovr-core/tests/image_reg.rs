//! Image and depth container regression test

use autovr_core::{Channels, DepthMap, Error, Image, Rgb};
use autovr_test::RegParams;
use autovr_test::fixtures::{gradient_image, ramp_depth};

#[test]
fn image_reg() {
    let mut rp = RegParams::new("image");

    // --- Test 1: copy-on-write sharing ---
    let image = gradient_image(8, 4);
    let shared = image.clone();
    rp.compare_values(2.0, image.ref_count() as f64, 0.0);
    let mut copy = shared.to_mut();
    copy.set_rgb(0, 0, Rgb::WHITE).expect("set pixel");
    let copy: Image = copy.into();
    rp.check(image.get_rgb(0, 0) != Some((255, 255, 255)), "original untouched");
    rp.check(copy.get_rgb(0, 0) == Some((255, 255, 255)), "copy modified");

    let unique = Image::new(3, 3, Channels::Gray).expect("new");
    rp.check(unique.try_into_mut().is_ok(), "unique image is mutable");
    rp.check(shared.try_into_mut().is_err(), "shared image is not");

    // --- Test 2: paste bounds ---
    let canvas = Image::new_filled(10, 10, Channels::Rgb, Rgb::BLACK).expect("canvas");
    let mut canvas = canvas.try_into_mut().expect("unique");
    let patch = Image::new_filled(4, 4, Channels::Rgb, Rgb::new(1, 2, 3)).expect("patch");
    rp.check(canvas.paste(&patch, 6, 6).is_ok(), "paste at edge");
    rp.check(canvas.paste(&patch, 7, 6).is_err(), "paste past edge");
    let canvas: Image = canvas.into();
    rp.check(canvas.get_rgb(9, 9) == Some((1, 2, 3)), "pasted corner");
    rp.check(canvas.get_rgb(5, 5) == Some((0, 0, 0)), "outside patch");

    // --- Test 3: depth pairing ---
    let depth = ramp_depth(8, 4, 0.0, 7.0);
    rp.check(depth.check_matches(&image).is_ok(), "matching depth");
    let other = DepthMap::new_with_value(8, 5, 1.0).expect("depth");
    rp.check(
        matches!(
            other.check_matches(&image),
            Err(Error::DimensionMismatch { .. })
        ),
        "mismatched depth",
    );
    let (lo, hi) = depth.min_max().expect("finite");
    rp.compare_values(0.0, lo as f64, 0.0);
    rp.compare_values(7.0, hi as f64, 0.0);

    assert!(rp.cleanup(), "image regression test failed");
}
