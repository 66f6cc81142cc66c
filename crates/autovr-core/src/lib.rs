//! autovr-core - Basic data structures for stereo synthesis
//!
//! This crate provides the containers shared by every other autovr crate:
//!
//! - [`Image`] / [`ImageMut`] - 8-bit raster image (immutable / mutable)
//! - [`DepthMap`] - floating-point depth matrix paired with an image
//! - [`Rgb`] - a plain colour value used for fills and backgrounds
//!
//! Images are interleaved (`RGBRGB...` or `GGG...`) and row-major with no
//! padding, so a row is a contiguous slice of `width * channels` bytes.

pub mod color;
pub mod depth;
pub mod error;
pub mod image;

pub use color::Rgb;
pub use depth::DepthMap;
pub use error::{Error, Result};
pub use image::{Channels, Image, ImageMut};
