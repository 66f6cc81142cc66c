//! PNG image format support
//!
//! Images are decoded with palette and low-bit-depth expansion enabled, so
//! every input arrives as 8- or 16-bit gray/RGB with optional alpha. Alpha is
//! dropped and 16-bit samples keep their high byte.
//!
//! Depth maps use a separate 16-bit grayscale encoding, see
//! [`write_depth_png`].

use crate::{IoError, IoResult};
use autovr_core::{Channels, DepthMap, Image};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Scale between depth values and stored 16-bit samples.
pub const DEPTH_RAW_SCALE: f32 = 256.0;

struct Decoded {
    width: u32,
    height: u32,
    color_type: ColorType,
    bit_depth: BitDepth,
    line_size: usize,
    data: Vec<u8>,
}

fn decode<R: BufRead + Seek>(reader: R) -> IoResult<Decoded> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;
    buf.truncate(output_info.buffer_size());

    let (color_type, bit_depth) = reader.output_color_type();
    Ok(Decoded {
        width: output_info.width,
        height: output_info.height,
        color_type,
        bit_depth,
        line_size: output_info.line_size,
        data: buf,
    })
}

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Image> {
    let decoded = decode(reader)?;

    let (channels, samples) = match decoded.color_type {
        ColorType::Grayscale => (Channels::Gray, 1),
        ColorType::GrayscaleAlpha => (Channels::Gray, 2),
        ColorType::Rgb => (Channels::Rgb, 3),
        ColorType::Rgba => (Channels::Rgb, 4),
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "indexed PNG was not expanded".to_string(),
            ));
        }
    };
    let bytes_per_sample = match decoded.bit_depth {
        BitDepth::Eight => 1,
        BitDepth::Sixteen => 2,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG bit depth after expansion: {:?}",
                other
            )));
        }
    };

    let ch = channels.count();
    let (width, height) = (decoded.width, decoded.height);
    let mut out = Vec::with_capacity(width as usize * height as usize * ch);
    for y in 0..height as usize {
        let row = &decoded.data[y * decoded.line_size..(y + 1) * decoded.line_size];
        for px in row.chunks_exact(samples * bytes_per_sample).take(width as usize) {
            // High byte first for 16-bit samples; alpha is skipped.
            for c in 0..ch {
                out.push(px[c * bytes_per_sample]);
            }
        }
    }

    Ok(Image::from_raw(width, height, channels, out)?)
}

/// Write a PNG image (8-bit gray or RGB)
pub fn write_png<W: Write>(image: &Image, writer: W) -> IoResult<()> {
    let color_type = match image.channels() {
        Channels::Gray => ColorType::Grayscale,
        Channels::Rgb => ColorType::Rgb,
    };

    let mut encoder = Encoder::new(writer, image.width(), image.height());
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;
    writer
        .write_image_data(image.data())
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}

/// Write a depth map as 16-bit grayscale PNG.
///
/// Each value is stored as `depth * 256`, rounded and clamped to `u16`, so
/// metric depths up to 256 units survive with 1/256 resolution.
pub fn write_depth_png<W: Write>(depth: &DepthMap, writer: W) -> IoResult<()> {
    let mut encoder = Encoder::new(writer, depth.width(), depth.height());
    encoder.set_color(ColorType::Grayscale);
    encoder.set_depth(BitDepth::Sixteen);

    let mut data = Vec::with_capacity(depth.data().len() * 2);
    for &v in depth.data() {
        let raw = (v * DEPTH_RAW_SCALE).round().clamp(0.0, u16::MAX as f32) as u16;
        data.extend_from_slice(&raw.to_be_bytes());
    }

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;
    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}

/// Read a depth map written by [`write_depth_png`].
///
/// # Errors
///
/// Returns [`IoError::InvalidData`] if the PNG is not 16-bit grayscale.
pub fn read_depth_png<R: BufRead + Seek>(reader: R) -> IoResult<DepthMap> {
    let decoded = decode(reader)?;
    if decoded.color_type != ColorType::Grayscale || decoded.bit_depth != BitDepth::Sixteen {
        return Err(IoError::InvalidData(format!(
            "raw depth must be 16-bit grayscale, got {:?} {:?}",
            decoded.color_type, decoded.bit_depth
        )));
    }

    let (width, height) = (decoded.width, decoded.height);
    let mut values = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height as usize {
        let row = &decoded.data[y * decoded.line_size..(y + 1) * decoded.line_size];
        for sample in row.chunks_exact(2).take(width as usize) {
            let raw = u16::from_be_bytes([sample[0], sample[1]]);
            values.push(raw as f32 / DEPTH_RAW_SCALE);
        }
    }

    Ok(DepthMap::from_data(width, height, values)?)
}
