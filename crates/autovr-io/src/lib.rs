//! autovr-io - Image and depth-map I/O
//!
//! Reads and writes [`Image`] values as PNG or JPEG, and depth maps as
//! 16-bit grayscale PNG ("raw depth"). Format selection is by magic number
//! when reading and by explicit [`ImageFormat`] (or path extension) when
//! writing.
//!
//! # Features
//!
//! - `png-format` (default): PNG images and raw depth maps
//! - `jpeg` (default): JPEG images

mod error;
pub mod format;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;

pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format_from_bytes};

use autovr_core::{DepthMap, Image};
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

/// Read an image from a file, detecting the format from its contents.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    let data = fs::read(path)?;
    read_image_mem(&data)
}

/// Decode an image from an in-memory buffer.
pub fn read_image_mem(data: &[u8]) -> IoResult<Image> {
    match detect_format_from_bytes(data)? {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(Cursor::new(data)),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(Cursor::new(data)),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support is not enabled",
            other
        ))),
    }
}

/// Encode an image into any writer.
pub fn write_image_to<W: Write>(image: &Image, writer: W, format: ImageFormat) -> IoResult<()> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(image, writer),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::write_jpeg(image, writer, jpeg::DEFAULT_JPEG_QUALITY),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support is not enabled",
            other
        ))),
    }
}

/// Encode an image into a new byte buffer.
pub fn write_image_mem(image: &Image, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_image_to(image, &mut buffer, format)?;
    Ok(buffer)
}

/// Write an image to a file in the given format.
pub fn write_image<P: AsRef<Path>>(image: &Image, path: P, format: ImageFormat) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_image_to(image, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Read a raw 16-bit depth map from a file.
#[cfg(feature = "png-format")]
pub fn read_depth_raw<P: AsRef<Path>>(path: P) -> IoResult<DepthMap> {
    let data = fs::read(path)?;
    png::read_depth_png(Cursor::new(data))
}

/// Write a depth map as raw 16-bit PNG.
#[cfg(feature = "png-format")]
pub fn write_depth_raw<P: AsRef<Path>>(depth: &DepthMap, path: P) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    png::write_depth_png(depth, &mut writer)?;
    writer.flush()?;
    Ok(())
}
