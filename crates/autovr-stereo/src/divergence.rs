//! Divergence mapping
//!
//! Stereo strength is given as a percentage of image width. Half of it goes
//! to each eye, so the per-eye maximum displacement in pixels is
//! `intensity / 2 / 100 * width`.

use crate::error::{StereoError, StereoResult};

/// Default stereo intensity, in percent of image width.
pub const DEFAULT_INTENSITY: f64 = 2.5;

/// Convert a stereo intensity percentage into a per-eye pixel displacement.
///
/// # Arguments
///
/// * `intensity_percent` - Stereo strength in percent of image width
/// * `width` - Image width in pixels
///
/// # Errors
///
/// Returns [`StereoError::InvalidParameter`] if `intensity_percent` is
/// negative or not finite.
///
/// # Examples
///
/// ```
/// use autovr_stereo::compute_divergence;
///
/// assert_eq!(compute_divergence(2.5, 1000).unwrap(), 12.5);
/// ```
pub fn compute_divergence(intensity_percent: f64, width: u32) -> StereoResult<f64> {
    if !intensity_percent.is_finite() || intensity_percent < 0.0 {
        return Err(StereoError::InvalidParameter(format!(
            "stereo intensity must be a non-negative percentage, got {}",
            intensity_percent
        )));
    }
    // Single division keeps common cases such as 2.5% of 1000 exact.
    Ok(intensity_percent * width as f64 / 200.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_divergence() {
        assert_eq!(compute_divergence(2.5, 1000).unwrap(), 12.5);
        assert_eq!(compute_divergence(0.0, 640).unwrap(), 0.0);
        assert_eq!(compute_divergence(5.0, 400).unwrap(), 10.0);
    }

    #[test]
    fn test_compute_divergence_invalid() {
        assert!(compute_divergence(-1.0, 100).is_err());
        assert!(compute_divergence(f64::NAN, 100).is_err());
        assert!(compute_divergence(f64::INFINITY, 100).is_err());
    }
}
