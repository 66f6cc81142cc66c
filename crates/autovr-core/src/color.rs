//! Colour values
//!
//! [`Rgb`] is used wherever a single colour is needed (canvas backgrounds,
//! fills). Hex strings in the `#rrggbb` form are accepted so that colours
//! can come straight from configuration.

use crate::error::{Error, Result};

/// Channel indices within an interleaved RGB pixel.
pub const RED: usize = 0;
pub const GREEN: usize = 1;
pub const BLUE: usize = 2;

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Create a colour from its components.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse a `#rrggbb` (or `rrggbb`) hex string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the string is not six hex digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use autovr_core::Rgb;
    ///
    /// assert_eq!(Rgb::from_hex("#ff8000").unwrap(), Rgb::new(255, 128, 0));
    /// ```
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::InvalidParameter(format!("invalid hex colour: {s:?}")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| Error::InvalidParameter(format!("invalid hex colour: {s:?}")))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Luma (ITU-R 601 weights), used when a colour fills a gray image.
    #[inline]
    pub fn to_gray(self) -> u8 {
        ((299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32 + 500) / 1000) as u8
    }

    /// Components as an array in channel order.
    #[inline]
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(v: [u8; 3]) -> Self {
        Rgb::new(v[RED], v[GREEN], v[BLUE])
    }
}
