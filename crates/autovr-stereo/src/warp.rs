//! Depth-image-based scanline warping
//!
//! Each image row is treated as a polyline. Every source pixel contributes
//! one or two vertices, displaced horizontally by an amount that grows as
//! the pixel gets closer to the viewer. The displaced polyline is then
//! rasterized back onto the pixel grid:
//!
//! ```text
//! d(c) = (1 - z(c)^2) * divergence_px
//! x(c) = c + 0.5 + d(c)
//! ```
//!
//! where `z` is normalized depth (0 = near, 1 = far). Where displaced
//! segments overlap, the one with the greatest closeness `|d|` wins, so near
//! content occludes far content. Gaps opened by the displacement are
//! covered by the stretched segments between neighbouring pixels, so the
//! output never has holes.
//!
//! # Why the polyline never self-intersects
//!
//! Plot vertices in the `(x, closeness)` plane. Every vertex moves from its
//! undisplaced position along a line of slope +1 (positive divergence) or -1
//! (negative divergence). Projected onto the axis perpendicular to that
//! direction, the vertices keep their original strictly increasing order,
//! so two non-adjacent segments can never cross. Sorting the vertices by
//! `x` once is therefore enough for a single left-to-right sweep.
//!
//! Rows are independent and are processed in parallel.

use crate::error::{StereoError, StereoResult};
use crate::normalize::NormalizedDepth;
use autovr_core::Image;
use rayon::prelude::*;

// ============================================================================
// Constants
// ============================================================================

/// Shrink applied to both ends of each rasterized sub-interval.
const EPSILON: f64 = 1e-7;

/// Half-width of a pixel's flat top with [`FillTechnique::PolylinesSharp`].
const SHARP_HALF_WIDTH: f64 = 0.45;

/// Sentinel vertices sit this many divergences beyond the row ends.
const SENTINEL_REACH: f64 = 3.0;

// ============================================================================
// Type Definitions
// ============================================================================

/// How each source pixel is turned into polyline vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillTechnique {
    /// Two vertices per pixel, 0.9 px apart, so pixels keep hard edges and
    /// only the 0.1 px joins between them are stretched
    #[default]
    PolylinesSharp,
    /// One vertex per pixel centre; neighbouring colours blend linearly
    Polylines,
}

impl FillTechnique {
    fn half_width(self) -> f64 {
        match self {
            FillTechnique::PolylinesSharp => SHARP_HALF_WIDTH,
            FillTechnique::Polylines => 0.0,
        }
    }
}

/// A displaced polyline vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Displaced horizontal position
    pub x: f64,
    /// Absolute displacement; larger means nearer the viewer
    pub closeness: f64,
    /// Source column supplying this vertex's colour
    pub column: usize,
}

/// An edge between two vertices that were consecutive before sorting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Vertex,
    pub to: Vertex,
}

impl Segment {
    /// Interpolation fraction of `x` along this segment.
    ///
    /// Zero-length segments report 0.
    #[inline]
    fn fraction(&self, x: f64) -> f64 {
        let span = self.to.x - self.from.x;
        if span == 0.0 {
            0.0
        } else {
            (x - self.from.x) / span
        }
    }
}

/// The displaced polyline of one row
///
/// `vertices` is sorted ascending by `x` (the trailing sentinel is already
/// maximal), and `segments[i]` is the segment that starts at `vertices[i]`.
#[derive(Debug, Clone)]
pub struct Polyline {
    pub vertices: Vec<Vertex>,
    pub segments: Vec<Segment>,
}

// ============================================================================
// Polyline construction
// ============================================================================

/// Build the displaced, sorted polyline for one row of normalized depth.
///
/// The result has `2 * width + 2` vertices for
/// [`FillTechnique::PolylinesSharp`], or `width + 2` for
/// [`FillTechnique::Polylines`], including one sentinel at each end, and one
/// segment fewer.
pub fn build_polyline(depth_row: &[f32], divergence_px: f64, fill: FillTechnique) -> Polyline {
    let width = depth_row.len();
    let reach = SENTINEL_REACH * divergence_px.abs();
    let half_width = fill.half_width();

    let per_pixel = if half_width < EPSILON { 1 } else { 2 };
    let mut vertices = Vec::with_capacity(width * per_pixel + 2);

    vertices.push(Vertex {
        x: -reach,
        closeness: 0.0,
        column: 0,
    });
    for (column, &z) in depth_row.iter().enumerate() {
        let z = z as f64;
        let d = (1.0 - z * z) * divergence_px;
        let x = column as f64 + 0.5 + d;
        let closeness = d.abs();
        if per_pixel == 1 {
            vertices.push(Vertex {
                x,
                closeness,
                column,
            });
        } else {
            vertices.push(Vertex {
                x: x - half_width,
                closeness,
                column,
            });
            vertices.push(Vertex {
                x: x + half_width,
                closeness,
                column,
            });
        }
    }
    vertices.push(Vertex {
        x: width as f64 + reach,
        closeness: 0.0,
        column: width.saturating_sub(1),
    });

    let mut segments: Vec<Segment> = vertices
        .windows(2)
        .map(|pair| Segment {
            from: pair[0],
            to: pair[1],
        })
        .collect();

    // Insertion sort: the input is nearly sorted, and segments must follow
    // their start vertices.
    for i in 1..segments.len() {
        let mut u = i;
        while u > 0 && vertices[u - 1].x > vertices[u].x {
            vertices.swap(u - 1, u);
            segments.swap(u - 1, u);
            u -= 1;
        }
    }

    Polyline { vertices, segments }
}

// ============================================================================
// Rasterization
// ============================================================================

/// Rasterize a sorted polyline into `out`, sampling colours from `source`.
///
/// `out` and `source` are interleaved rows with `channels` samples per pixel.
fn rasterize(polyline: &Polyline, source: &[u8], channels: usize, out: &mut [u8]) {
    let points = &polyline.vertices;
    let segments = &polyline.segments;
    let width = out.len() / channels;

    let mut active: Vec<Segment> = Vec::new();
    let mut next_segment = 0usize;
    let mut pt = 0usize;
    let mut color = vec![0.0f64; channels];

    for col in 0..width {
        let left = col as f64;
        let right = left + 1.0;
        // 0.5 so the final truncation rounds.
        color.fill(0.5);

        while pt + 1 < points.len() && points[pt].x < left {
            pt += 1;
        }
        pt = pt.saturating_sub(1);

        while pt + 1 < points.len() && points[pt].x < right {
            let from = left.max(points[pt].x) + EPSILON;
            let to = right.min(points[pt + 1].x) - EPSILON;
            let significance = to - from;
            let center = from + 0.5 * significance;

            while next_segment < segments.len() && segments[next_segment].from.x < center {
                active.push(segments[next_segment]);
                next_segment += 1;
            }
            let mut i = 0;
            while i < active.len() {
                if active[i].to.x < center {
                    active.swap_remove(i);
                } else {
                    i += 1;
                }
            }

            if let Some(segment) = closest_segment(&active, center) {
                let (cl, cr) = (segment.from.column, segment.to.column);
                let src_l = &source[cl * channels..(cl + 1) * channels];
                if cl == cr {
                    for (acc, &s) in color.iter_mut().zip(src_l) {
                        *acc += s as f64 * significance;
                    }
                } else {
                    let k = segment.fraction(center);
                    let src_r = &source[cr * channels..(cr + 1) * channels];
                    for ((acc, &l), &r) in color.iter_mut().zip(src_l).zip(src_r) {
                        *acc += (l as f64 * (1.0 - k) + r as f64 * k) * significance;
                    }
                }
            }

            pt += 1;
        }

        for (dst, &acc) in out[col * channels..(col + 1) * channels]
            .iter_mut()
            .zip(&color)
        {
            *dst = acc as u8;
        }
    }
}

/// Pick the segment visible at `center`.
///
/// A lone active segment is taken as is. Otherwise the segment strictly
/// spanning `center` with the greatest interpolated closeness wins, falling
/// back to the first one.
fn closest_segment(active: &[Segment], center: f64) -> Option<&Segment> {
    let first = active.first()?;
    if active.len() == 1 {
        return Some(first);
    }

    let mut best = first;
    let mut best_closeness = -EPSILON;
    for segment in active {
        let k = segment.fraction(center);
        let closeness = (1.0 - k) * segment.from.closeness + k * segment.to.closeness;
        if best_closeness < closeness && 0.0 < k && k < 1.0 {
            best_closeness = closeness;
            best = segment;
        }
    }
    Some(best)
}

fn warp_row_into(
    source: &[u8],
    channels: usize,
    depth_row: &[f32],
    divergence_px: f64,
    fill: FillTechnique,
    out: &mut [u8],
) {
    if divergence_px.abs() < EPSILON {
        out.copy_from_slice(source);
        return;
    }
    let polyline = build_polyline(depth_row, divergence_px, fill);
    rasterize(&polyline, source, channels, out);
}

// ============================================================================
// Public API
// ============================================================================

/// Warp a single interleaved row by its normalized depth.
///
/// # Arguments
///
/// * `source_row` - Source samples, `channels` per pixel
/// * `channels` - Samples per pixel
/// * `depth_row` - Normalized depth for each pixel of the row
/// * `divergence_px` - Maximum displacement; the sign selects the eye
/// * `fill` - Vertex construction technique
///
/// A divergence of zero returns the row unchanged.
///
/// # Errors
///
/// Returns [`StereoError::InvalidParameter`] if `channels` is zero, the row
/// is empty, `divergence_px` is not finite, or the row and depth lengths
/// disagree.
pub fn warp_row(
    source_row: &[u8],
    channels: usize,
    depth_row: &[f32],
    divergence_px: f64,
    fill: FillTechnique,
) -> StereoResult<Vec<u8>> {
    if channels == 0 || depth_row.is_empty() {
        return Err(StereoError::InvalidParameter(
            "row must have at least one pixel and one channel".to_string(),
        ));
    }
    if source_row.len() != depth_row.len() * channels {
        return Err(StereoError::InvalidParameter(format!(
            "row has {} samples but depth has {} values at {} channels",
            source_row.len(),
            depth_row.len(),
            channels
        )));
    }
    check_divergence(divergence_px)?;

    let mut out = vec![0u8; source_row.len()];
    warp_row_into(source_row, channels, depth_row, divergence_px, fill, &mut out);
    Ok(out)
}

/// Warp every row of `image` by `depth`, in parallel.
///
/// Positive divergence produces the left-eye view and negative the right.
///
/// # Errors
///
/// - [`StereoError::Core`] if `depth` and `image` differ in size
/// - [`StereoError::InvalidParameter`] if `divergence_px` is not finite
pub fn warp_image(
    image: &Image,
    depth: &NormalizedDepth,
    divergence_px: f64,
    fill: FillTechnique,
) -> StereoResult<Image> {
    depth.as_depth().check_matches(image)?;
    check_divergence(divergence_px)?;

    let channels = image.channels().count();
    let row_len = image.row_len();
    let mut data = vec![0u8; image.data().len()];

    log::debug!(
        "warping {}x{} image, divergence {:.3}px, {:?}",
        image.width(),
        image.height(),
        divergence_px,
        fill
    );

    data.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, out_row)| {
            let y = y as u32;
            warp_row_into(
                image.row(y),
                channels,
                depth.row(y),
                divergence_px,
                fill,
                out_row,
            );
        });

    Ok(Image::from_raw(
        image.width(),
        image.height(),
        image.channels(),
        data,
    )?)
}

fn check_divergence(divergence_px: f64) -> StereoResult<()> {
    if divergence_px.is_finite() {
        Ok(())
    } else {
        Err(StereoError::InvalidParameter(format!(
            "divergence must be finite, got {}",
            divergence_px
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use autovr_core::{Channels, DepthMap};

    #[test]
    fn test_polyline_sizes() {
        let depth = [0.0, 0.5, 1.0];
        let sharp = build_polyline(&depth, 2.0, FillTechnique::PolylinesSharp);
        assert_eq!(sharp.vertices.len(), 8);
        assert_eq!(sharp.segments.len(), 7);

        let plain = build_polyline(&depth, 2.0, FillTechnique::Polylines);
        assert_eq!(plain.vertices.len(), 5);
        assert_eq!(plain.segments.len(), 4);
    }

    #[test]
    fn test_polyline_sentinels() {
        let poly = build_polyline(&[0.0, 1.0], -4.0, FillTechnique::Polylines);
        let first = poly.vertices[0];
        let last = poly.vertices[poly.vertices.len() - 1];
        assert_eq!((first.x, first.closeness, first.column), (-12.0, 0.0, 0));
        assert_eq!((last.x, last.closeness, last.column), (14.0, 0.0, 1));
    }

    #[test]
    fn test_segments_follow_start_vertices() {
        // Near pixel in the middle folds over its right neighbours.
        let depth = [1.0, 1.0, 0.0, 1.0, 1.0, 1.0];
        let poly = build_polyline(&depth, 3.0, FillTechnique::PolylinesSharp);
        for (v, s) in poly.vertices.iter().zip(&poly.segments) {
            assert_eq!(*v, s.from);
        }
        assert!(poly.vertices.windows(2).all(|p| p[0].x <= p[1].x));
    }

    #[test]
    fn test_fraction_zero_span() {
        let v = Vertex {
            x: 1.0,
            closeness: 0.0,
            column: 0,
        };
        let s = Segment { from: v, to: v };
        assert_eq!(s.fraction(1.0), 0.0);
    }

    #[test]
    fn test_warp_row_zero_divergence_is_identity() {
        let row = [1, 2, 3, 4, 5, 6];
        let depth = [0.0, 0.3, 1.0];
        let out = warp_row(&row, 2, &depth, 0.0, FillTechnique::PolylinesSharp).unwrap();
        assert_eq!(out, row);
    }

    #[test]
    fn test_warp_row_values() {
        let row = [10, 20, 30, 40];
        let depth = [0.0, 0.25, 0.5, 1.0];
        let left = warp_row(&row, 1, &depth, 2.0, FillTechnique::PolylinesSharp).unwrap();
        assert_eq!(left, vec![10, 10, 10, 22]);
        let right = warp_row(&row, 1, &depth, -2.0, FillTechnique::PolylinesSharp).unwrap();
        assert_eq!(right, vec![27, 31, 37, 40]);
        let blended = warp_row(&row, 1, &depth, 2.0, FillTechnique::Polylines).unwrap();
        assert_eq!(blended, vec![10, 10, 11, 22]);
    }

    #[test]
    fn test_warp_row_occlusion() {
        // A near bright block in front of a dark background.
        let row = [0, 0, 0, 0, 255, 255, 255, 255];
        let depth = [0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        let left = warp_row(&row, 1, &depth, 2.0, FillTechnique::PolylinesSharp).unwrap();
        assert_eq!(left, vec![0, 0, 0, 0, 13, 255, 255, 255]);
        let right = warp_row(&row, 1, &depth, -2.0, FillTechnique::PolylinesSharp).unwrap();
        assert_eq!(right, vec![0, 0, 0, 242, 255, 255, 255, 255]);
    }

    #[test]
    fn test_warp_row_constant_color() {
        let row = [77u8; 6];
        let depth = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
        let out = warp_row(&row, 1, &depth, 3.0, FillTechnique::PolylinesSharp).unwrap();
        assert_eq!(out, row);
    }

    #[test]
    fn test_warp_row_invalid() {
        let fill = FillTechnique::default();
        assert!(warp_row(&[1, 2, 3], 1, &[0.0, 1.0], 1.0, fill).is_err());
        assert!(warp_row(&[1, 2], 0, &[0.0, 1.0], 1.0, fill).is_err());
        assert!(warp_row(&[], 1, &[], 1.0, fill).is_err());
        assert!(warp_row(&[1, 2], 1, &[0.0, 1.0], f64::NAN, fill).is_err());
    }

    #[test]
    fn test_warp_image_preserves_shape() {
        let image = Image::new(5, 3, Channels::Rgb).unwrap();
        let depth = DepthMap::from_fn(5, 3, |x, y| (x + y) as f32).unwrap();
        let depth = normalize(&depth).unwrap();
        let out = warp_image(&image, &depth, 1.5, FillTechnique::default()).unwrap();
        assert!(out.same_shape(&image));
    }

    #[test]
    fn test_warp_image_dimension_mismatch() {
        let image = Image::new(5, 3, Channels::Gray).unwrap();
        let depth = DepthMap::from_fn(4, 3, |x, _| x as f32).unwrap();
        let depth = normalize(&depth).unwrap();
        assert!(matches!(
            warp_image(&image, &depth, 1.0, FillTechnique::default()),
            Err(StereoError::Core(_))
        ));
    }
}
