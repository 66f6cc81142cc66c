//! Pixel and row access
//!
//! Row accessors return whole scanlines as slices; they are the hot path
//! for the warper and compositor. Per-pixel accessors are bounds-checked.

use super::{Channels, Image, ImageMut};
use crate::color::{BLUE, GREEN, RED, Rgb};
use crate::error::{Error, Result};

impl Image {
    /// Get row `y` as interleaved samples.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let len = self.row_len();
        let start = y as usize * len;
        &self.data()[start..start + len]
    }

    /// Get the samples of pixel (x, y), or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let ch = self.channels().count();
        let start = (y as usize * self.width() as usize + x as usize) * ch;
        Some(&self.data()[start..start + ch])
    }

    /// Get RGB values at (x, y). Gray pixels are replicated.
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        let px = self.pixel(x, y)?;
        Some(match self.channels() {
            Channels::Gray => (px[0], px[0], px[0]),
            Channels::Rgb => (px[RED], px[GREEN], px[BLUE]),
        })
    }
}

impl ImageMut {
    /// Get row `y` as interleaved samples.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let len = self.row_len();
        let start = y as usize * len;
        &self.data()[start..start + len]
    }

    /// Get row `y` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let len = self.row_len();
        let start = y as usize * len;
        &mut self.data_mut()[start..start + len]
    }

    /// Set the samples of pixel (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the coordinates are out of
    /// bounds, or [`Error::InvalidParameter`] if `samples` does not match the
    /// channel count.
    pub fn set_pixel(&mut self, x: u32, y: u32, samples: &[u8]) -> Result<()> {
        let ch = self.channels().count();
        if samples.len() != ch {
            return Err(Error::InvalidParameter(format!(
                "expected {} samples per pixel, got {}",
                ch,
                samples.len()
            )));
        }
        let start = self.offset(x, y)?;
        self.data_mut()[start..start + ch].copy_from_slice(samples);
        Ok(())
    }

    /// Set pixel (x, y) from an RGB colour. Gray images receive its luma.
    pub fn set_rgb(&mut self, x: u32, y: u32, color: Rgb) -> Result<()> {
        match self.channels() {
            Channels::Gray => self.set_pixel(x, y, &[color.to_gray()]),
            Channels::Rgb => self.set_pixel(x, y, &color.to_array()),
        }
    }

    /// Copy `src` into this image with its top-left corner at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when the channel layouts differ or
    /// `src` does not fit entirely inside this image.
    pub fn paste(&mut self, src: &Image, x: u32, y: u32) -> Result<()> {
        if src.channels() != self.channels() {
            return Err(Error::InvalidParameter(format!(
                "cannot paste {:?} image into {:?} image",
                src.channels(),
                self.channels()
            )));
        }
        let fits_x = x.checked_add(src.width()).is_some_and(|r| r <= self.width());
        let fits_y = y.checked_add(src.height()).is_some_and(|b| b <= self.height());
        if !fits_x || !fits_y {
            return Err(Error::InvalidParameter(format!(
                "{}x{} image at ({}, {}) does not fit in {}x{}",
                src.width(),
                src.height(),
                x,
                y,
                self.width(),
                self.height()
            )));
        }

        let ch = self.channels().count();
        let start = x as usize * ch;
        let len = src.row_len();
        for sy in 0..src.height() {
            self.row_mut(y + sy)[start..start + len].copy_from_slice(src.row(sy));
        }
        Ok(())
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize> {
        let (w, h) = (self.width(), self.height());
        if x >= w || y >= h {
            return Err(Error::IndexOutOfBounds {
                index: y as usize * w as usize + x as usize,
                len: w as usize * h as usize,
            });
        }
        Ok((y as usize * w as usize + x as usize) * self.channels().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_access() {
        let mut image = Image::new(3, 2, Channels::Rgb).unwrap().try_into_mut().unwrap();
        image.set_rgb(2, 1, Rgb::new(10, 20, 30)).unwrap();
        let image: Image = image.into();
        assert_eq!(image.get_rgb(2, 1), Some((10, 20, 30)));
        assert_eq!(image.pixel(2, 1), Some(&[10u8, 20, 30][..]));
        assert_eq!(image.pixel(3, 0), None);
        assert_eq!(&image.row(1)[6..9], &[10, 20, 30]);
    }

    #[test]
    fn test_set_pixel_errors() {
        let mut image = Image::new(2, 2, Channels::Gray).unwrap().to_mut();
        assert!(matches!(
            image.set_pixel(2, 0, &[1]),
            Err(Error::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            image.set_pixel(0, 0, &[1, 2, 3]),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_paste() {
        let src = Image::new_filled(2, 2, Channels::Gray, Rgb::WHITE).unwrap();
        let mut dst = Image::new(4, 3, Channels::Gray).unwrap().to_mut();
        dst.paste(&src, 1, 1).unwrap();
        let dst: Image = dst.into();
        assert_eq!(dst.row(0), &[0, 0, 0, 0]);
        assert_eq!(dst.row(1), &[0, 255, 255, 0]);
        assert_eq!(dst.row(2), &[0, 255, 255, 0]);
    }

    #[test]
    fn test_paste_out_of_bounds() {
        let src = Image::new(3, 3, Channels::Gray).unwrap();
        let mut dst = Image::new(4, 4, Channels::Gray).unwrap().to_mut();
        assert!(dst.paste(&src, 2, 0).is_err());
        assert!(dst.paste(&src, 0, u32::MAX).is_err());

        let rgb = Image::new(1, 1, Channels::Rgb).unwrap();
        assert!(dst.paste(&rgb, 0, 0).is_err());
    }
}
