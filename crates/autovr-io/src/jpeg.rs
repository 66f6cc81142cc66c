//! JPEG image format support
//!
//! Reads with the `jpeg-decoder` crate and writes with `jpeg-encoder`.
//! Grayscale and RGB round-trip directly; 16-bit luminance keeps its high
//! byte and CMYK is converted to RGB.

use crate::{IoError, IoResult};
use autovr_core::{Channels, Image};
use jpeg_decoder::PixelFormat;
use std::io::{Read, Write};

/// Quality used by [`crate::write_image`] for JPEG output.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Read a JPEG image from a reader.
///
/// # Returns
/// A gray or RGB `Image`.
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<Image> {
    let mut decoder = jpeg_decoder::Decoder::new(reader);
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG header missing".to_string()))?;

    let width = info.width as u32;
    let height = info.height as u32;

    let image = match info.pixel_format {
        PixelFormat::L8 => Image::from_raw(width, height, Channels::Gray, pixels)?,
        // Samples are big-endian; keep the high byte.
        PixelFormat::L16 => {
            let gray = pixels.chunks_exact(2).map(|s| s[0]).collect();
            Image::from_raw(width, height, Channels::Gray, gray)?
        }
        PixelFormat::RGB24 => Image::from_raw(width, height, Channels::Rgb, pixels)?,
        PixelFormat::CMYK32 => {
            let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
            for cmyk in pixels.chunks_exact(4) {
                let k = cmyk[3] as u32;
                for &c in &cmyk[..3] {
                    rgb.push((c as u32 * k / 255) as u8);
                }
            }
            Image::from_raw(width, height, Channels::Rgb, rgb)?
        }
    };

    Ok(image)
}

/// Write a JPEG image at the given quality (1-100).
///
/// # Errors
///
/// Returns [`IoError::InvalidData`] if either dimension exceeds 65535, the
/// JPEG limit.
pub fn write_jpeg<W: Write>(image: &Image, writer: W, quality: u8) -> IoResult<()> {
    let (width, height) = image.dimensions();
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(IoError::InvalidData(format!(
            "{}x{} exceeds the JPEG size limit",
            width, height
        )));
    };

    let color_type = match image.channels() {
        Channels::Gray => jpeg_encoder::ColorType::Luma,
        Channels::Rgb => jpeg_encoder::ColorType::Rgb,
    };

    let encoder = jpeg_encoder::Encoder::new(writer, quality.clamp(1, 100));
    encoder
        .encode(image.data(), w, h, color_type)
        .map_err(|e| IoError::EncodeError(format!("JPEG encode error: {}", e)))?;

    Ok(())
}
