//! Stereo pair composition
//!
//! Combines left and right eye views into a single output image:
//!
//! - Side-by-side: the two views concatenated horizontally
//! - Padded: each view centred in its own half of a larger canvas
//! - Anaglyph: red from the left view, green and blue from the right

use crate::error::{StereoError, StereoResult};
use crate::pair::StereoPair;
use autovr_core::{Channels, Image, Rgb};

/// Default canvas scale for [`PaddingSpec::Factor`].
pub const DEFAULT_PADDING_FACTOR: f64 = 1.5;

/// Canvas size for padded output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaddingSpec {
    /// Fixed per-eye canvas size in pixels
    Pixels { width: u32, height: u32, color: Rgb },
    /// Per-eye canvas scaled from the eye size
    Factor { factor: f64, color: Rgb },
}

impl Default for PaddingSpec {
    fn default() -> Self {
        PaddingSpec::Factor {
            factor: DEFAULT_PADDING_FACTOR,
            color: Rgb::BLACK,
        }
    }
}

impl PaddingSpec {
    /// Background colour of the canvas.
    pub fn color(&self) -> Rgb {
        match *self {
            PaddingSpec::Pixels { color, .. } | PaddingSpec::Factor { color, .. } => color,
        }
    }

    /// Check the parameters without an image at hand.
    ///
    /// # Errors
    ///
    /// Returns [`StereoError::InvalidParameter`] for a zero-sized canvas or
    /// a factor that is not finite and positive.
    pub fn validate(&self) -> StereoResult<()> {
        match *self {
            PaddingSpec::Pixels { width, height, .. } if width == 0 || height == 0 => {
                Err(StereoError::InvalidParameter(format!(
                    "padded canvas must be non-empty, got {}x{}",
                    width, height
                )))
            }
            PaddingSpec::Factor { factor, .. } if !factor.is_finite() || factor <= 0.0 => {
                Err(StereoError::InvalidParameter(format!(
                    "padding factor must be positive, got {}",
                    factor
                )))
            }
            _ => Ok(()),
        }
    }

    /// Resolve the per-eye canvas size for an eye of `width` x `height`.
    pub fn canvas_size(&self, width: u32, height: u32) -> StereoResult<(u32, u32)> {
        self.validate()?;
        Ok(match *self {
            PaddingSpec::Pixels { width, height, .. } => (width, height),
            PaddingSpec::Factor { factor, .. } => (
                (width as f64 * factor).round() as u32,
                (height as f64 * factor).round() as u32,
            ),
        })
    }
}

/// Output layout for [`compose`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComposeMode {
    SideBySide,
    Padded(PaddingSpec),
    Anaglyph,
}

fn shape(image: &Image) -> (u32, u32, usize) {
    (image.width(), image.height(), image.channels().count())
}

fn mismatch(left: &Image, right: &Image) -> StereoError {
    StereoError::ShapeMismatch {
        left: shape(left),
        right: shape(right),
    }
}

/// Concatenate `left` and `right` horizontally.
///
/// # Errors
///
/// Returns [`StereoError::ShapeMismatch`] if heights or channel counts
/// differ.
pub fn side_by_side(left: &Image, right: &Image) -> StereoResult<Image> {
    if left.height() != right.height() || left.channels() != right.channels() {
        return Err(mismatch(left, right));
    }

    let out = Image::new(
        left.width() + right.width(),
        left.height(),
        left.channels(),
    )?;
    let mut out_mut = out.try_into_mut().unwrap();
    out_mut.paste(left, 0, 0)?;
    out_mut.paste(right, left.width(), 0)?;
    Ok(out_mut.into())
}

/// Centre each eye in its own half of a `2 * canvas_width` x
/// `canvas_height` canvas filled with `background`.
///
/// The left eye is placed at
/// `(canvas_width / 2 - lw / 2, canvas_height / 2 - lh / 2)` and the right
/// eye at the same offset within the right half (integer division).
///
/// # Errors
///
/// - [`StereoError::InvalidParameter`] if an eye is larger than its half
/// - [`StereoError::ShapeMismatch`] if channel counts differ
pub fn padded(
    left: &Image,
    right: &Image,
    canvas_width: u32,
    canvas_height: u32,
    background: Rgb,
) -> StereoResult<Image> {
    if left.channels() != right.channels() {
        return Err(mismatch(left, right));
    }
    for eye in [left, right] {
        if eye.width() > canvas_width || eye.height() > canvas_height {
            return Err(StereoError::InvalidParameter(format!(
                "{}x{} eye does not fit in {}x{} canvas",
                eye.width(),
                eye.height(),
                canvas_width,
                canvas_height
            )));
        }
    }
    let total_width = canvas_width.checked_mul(2).ok_or_else(|| {
        StereoError::InvalidParameter(format!("canvas width {} overflows", canvas_width))
    })?;

    let out = Image::new_filled(total_width, canvas_height, left.channels(), background)?;
    let mut out_mut = out.try_into_mut().unwrap();

    let (cw, ch) = (canvas_width / 2, canvas_height / 2);
    out_mut.paste(left, cw - left.width() / 2, ch - left.height() / 2)?;
    out_mut.paste(
        right,
        canvas_width + cw - right.width() / 2,
        ch - right.height() / 2,
    )?;
    Ok(out_mut.into())
}

/// Build a red/cyan anaglyph: red from `left`, green and blue from `right`.
///
/// # Errors
///
/// - [`StereoError::ShapeMismatch`] if the views differ in shape
/// - [`StereoError::InvalidParameter`] if the views are not RGB
pub fn anaglyph(left: &Image, right: &Image) -> StereoResult<Image> {
    if !left.same_shape(right) {
        return Err(mismatch(left, right));
    }
    if left.channels() != Channels::Rgb {
        return Err(StereoError::InvalidParameter(
            "anaglyph requires RGB images".to_string(),
        ));
    }

    let data = left
        .data()
        .chunks_exact(3)
        .zip(right.data().chunks_exact(3))
        .flat_map(|(l, r)| [l[0], r[1], r[2]])
        .collect();
    Ok(Image::from_raw(
        left.width(),
        left.height(),
        Channels::Rgb,
        data,
    )?)
}

/// Compose a stereo pair into a single image.
///
/// # Examples
///
/// ```
/// use autovr_core::{Channels, Image};
/// use autovr_stereo::{ComposeMode, StereoPair, compose};
///
/// let eye = Image::new(4, 2, Channels::Rgb).unwrap();
/// let pair = StereoPair::new(eye.clone(), eye).unwrap();
/// let sbs = compose(&pair, ComposeMode::SideBySide).unwrap();
/// assert_eq!(sbs.dimensions(), (8, 2));
/// ```
pub fn compose(pair: &StereoPair, mode: ComposeMode) -> StereoResult<Image> {
    let (left, right) = (pair.left(), pair.right());
    match mode {
        ComposeMode::SideBySide => side_by_side(left, right),
        ComposeMode::Anaglyph => anaglyph(left, right),
        ComposeMode::Padded(spec) => {
            let (cw, ch) = spec.canvas_size(left.width(), left.height())?;
            padded(left, right, cw, ch, spec.color())
        }
    }
}
