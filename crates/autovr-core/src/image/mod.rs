//! Image - The raster container
//!
//! `Image` holds 8-bit samples for one or three interleaved channels.
//!
//! # Pixel layout
//!
//! - Row-major, no padding between rows
//! - A pixel occupies `channels` consecutive bytes
//! - For RGB images the channel order is red, green, blue
//!
//! # Ownership model
//!
//! `Image` uses `Arc` for cheap cloning (shared ownership). To modify pixel
//! data, convert to `ImageMut` via [`Image::try_into_mut`] or
//! [`Image::to_mut`], then convert back with `Into<Image>`.

mod access;

use crate::color::Rgb;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Number of interleaved samples per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Channels {
    /// Single-channel gray
    Gray = 1,
    /// Red, green, blue
    Rgb = 3,
}

impl Channels {
    /// Create from a sample count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannels`] for anything other than 1 or 3.
    pub fn from_count(count: u32) -> Result<Self> {
        match count {
            1 => Ok(Channels::Gray),
            3 => Ok(Channels::Rgb),
            _ => Err(Error::InvalidChannels(count)),
        }
    }

    /// Samples per pixel.
    #[inline]
    pub fn count(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone)]
struct ImageData {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

/// Immutable, shareable image
///
/// # Examples
///
/// ```
/// use autovr_core::{Channels, Image};
///
/// let image = Image::new(640, 480, Channels::Rgb).unwrap();
/// assert_eq!(image.width(), 640);
/// assert_eq!(image.height(), 480);
/// assert_eq!(image.row(0).len(), 640 * 3);
/// ```
#[derive(Debug, Clone)]
pub struct Image {
    inner: Arc<ImageData>,
}

impl Image {
    /// Create a new image with all samples set to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32, channels: Channels) -> Result<Self> {
        check_dimensions(width, height)?;
        let len = sample_count(width, height, channels);
        Ok(Self::wrap(width, height, channels, vec![0u8; len]))
    }

    /// Create a new image filled with a colour.
    ///
    /// Gray images are filled with the colour's luma.
    pub fn new_filled(width: u32, height: u32, channels: Channels, fill: Rgb) -> Result<Self> {
        check_dimensions(width, height)?;
        let data = match channels {
            Channels::Gray => vec![fill.to_gray(); sample_count(width, height, channels)],
            Channels::Rgb => fill
                .to_array()
                .repeat(width as usize * height as usize),
        };
        Ok(Self::wrap(width, height, channels, data))
    }

    /// Create an image from interleaved raw samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are invalid or the data length
    /// does not equal `width * height * channels`.
    pub fn from_raw(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        if data.len() != sample_count(width, height, channels) {
            return Err(Error::DataLength {
                len: data.len(),
                width,
                height,
                channels: channels as u32,
            });
        }
        Ok(Self::wrap(width, height, channels, data))
    }

    fn wrap(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Self {
        Image {
            inner: Arc::new(ImageData {
                width,
                height,
                channels,
                data,
            }),
        }
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.inner.width, self.inner.height)
    }

    /// Get the channel layout.
    #[inline]
    pub fn channels(&self) -> Channels {
        self.inner.channels
    }

    /// Bytes per row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.inner.width as usize * self.inner.channels.count()
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// True when both images have the same width, height and channels.
    pub fn same_shape(&self, other: &Image) -> bool {
        self.dimensions() == other.dimensions() && self.channels() == other.channels()
    }

    /// Number of handles sharing this image's data.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Try to get mutable access to the image data.
    ///
    /// Succeeds only if there is exactly one reference to the data.
    pub fn try_into_mut(self) -> std::result::Result<ImageMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(ImageMut { inner: data }),
            Err(arc) => Err(Image { inner: arc }),
        }
    }

    /// Create a mutable copy of this image.
    pub fn to_mut(&self) -> ImageMut {
        ImageMut {
            inner: (*self.inner).clone(),
        }
    }
}

/// Mutable image
///
/// Allows modification of image data. Convert back to an immutable
/// [`Image`] using `Into<Image>`.
#[derive(Debug)]
pub struct ImageMut {
    inner: ImageData,
}

impl ImageMut {
    /// Get the image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the channel layout.
    #[inline]
    pub fn channels(&self) -> Channels {
        self.inner.channels
    }

    /// Bytes per row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.inner.width as usize * self.inner.channels.count()
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Mutable raw interleaved samples.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.inner.data
    }
}

impl From<ImageMut> for Image {
    fn from(image: ImageMut) -> Self {
        Image {
            inner: Arc::new(image.inner),
        }
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }
    Ok(())
}

#[inline]
fn sample_count(width: u32, height: u32, channels: Channels) -> usize {
    width as usize * height as usize * channels.count()
}
