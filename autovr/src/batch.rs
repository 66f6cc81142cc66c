//! Batch processing
//!
//! Runs the full pipeline (depth estimation, stereo synthesis, composition)
//! over a sequence of images with one shared [`PrecisionController`], so the
//! precision that worked for one image size is reused for the next image of
//! that size.
//!
//! Per-image failures follow [`FailurePolicy`]. Running out of precision
//! ([`DepthError::ExhaustedRetryBudget`]) always stops the batch, since
//! every later image would fail the same way.
//!
//! [`DepthError::ExhaustedRetryBudget`]: autovr_depth::DepthError::ExhaustedRetryBudget

use crate::config::{BatchConfig, FailurePolicy};
use crate::error::{Error, Result};
use autovr_core::{DepthMap, Image};
use autovr_depth::{ModelLoader, PrecisionController, render_depth};
use autovr_io::ImageFormat;
use autovr_stereo::{ComposeMode, StereoPair, compose, synthesize_stereo};
use std::fs;
use std::path::Path;

// ============================================================================
// Inputs and outputs
// ============================================================================

/// One image to process
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Name used in logs, reports, and output file names
    pub name: String,
    pub image: Image,
    /// Precomputed depth; when present, inference is skipped
    pub depth: Option<DepthMap>,
}

impl BatchItem {
    /// Create an item that needs depth estimation.
    pub fn new(name: impl Into<String>, image: Image) -> Self {
        Self {
            name: name.into(),
            image,
            depth: None,
        }
    }

    /// Create an item with a precomputed depth map.
    pub fn with_depth(name: impl Into<String>, image: Image, depth: DepthMap) -> Self {
        Self {
            name: name.into(),
            image,
            depth: Some(depth),
        }
    }

    /// Read an image file; the item is named after the file stem.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = autovr_io::read_image(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, image))
    }

    /// Attach a raw 16-bit depth file written by [`write_outputs`].
    pub fn load_depth_raw<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.depth = Some(autovr_io::read_depth_raw(path)?);
        Ok(self)
    }
}

/// Images produced for one [`BatchItem`]; unselected outputs are `None`
#[derive(Debug, Clone, Default)]
pub struct StereoOutputs {
    pub side_by_side: Option<Image>,
    pub padded: Option<Image>,
    pub anaglyph: Option<Image>,
    pub depth_gray: Option<Image>,
    pub depth_raw: Option<DepthMap>,
}

/// Outcome of [`run_batch`]
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Names of items processed successfully, in order
    pub succeeded: Vec<String>,
    /// Names and errors of skipped items, in order
    pub failed: Vec<(String, Error)>,
}

impl BatchReport {
    /// Number of items attempted
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================================
// Processing
// ============================================================================

/// Run the full pipeline for one item.
///
/// Uses the item's precomputed depth when present, otherwise asks
/// `controller` for depth at `config.precision`.
///
/// # Errors
///
/// Returns the first failure from depth estimation, synthesis, or
/// composition.
pub fn process_image<L: ModelLoader>(
    controller: &mut PrecisionController<L>,
    item: &BatchItem,
    config: &BatchConfig,
) -> Result<StereoOutputs> {
    let depth = match &item.depth {
        Some(depth) => depth.clone(),
        None => controller.run_adaptive_precision(&item.image, &config.precision)?,
    };

    let pair = synthesize_stereo(&item.image, &depth, &config.stereo)?;
    let selection = &config.outputs;

    let composed = |selected: bool, mode: ComposeMode, pair: &StereoPair| -> Result<Option<Image>> {
        Ok(if selected {
            Some(compose(pair, mode)?)
        } else {
            None
        })
    };

    Ok(StereoOutputs {
        side_by_side: composed(selection.side_by_side, ComposeMode::SideBySide, &pair)?,
        padded: match selection.padded {
            Some(spec) => Some(compose(&pair, ComposeMode::Padded(spec))?),
            None => None,
        },
        anaglyph: composed(selection.anaglyph, ComposeMode::Anaglyph, &pair)?,
        depth_gray: if selection.depth_gray {
            Some(render_depth(&depth, &config.depth_render)?)
        } else {
            None
        },
        depth_raw: selection.depth_raw.then_some(depth),
    })
}

/// Process `items` in order, handing each result to `sink`.
///
/// The configuration is validated before the first item. A failing item,
/// including a failing `sink` call, is recorded and skipped under
/// [`FailurePolicy::SkipImage`] and ends the batch under
/// [`FailurePolicy::Abort`].
///
/// # Errors
///
/// - An invalid configuration, before anything is processed
/// - The failing item's error under [`FailurePolicy::Abort`]
/// - Any batch-fatal error (see [`Error::is_batch_fatal`])
pub fn run_batch<L, I, F>(
    controller: &mut PrecisionController<L>,
    items: I,
    config: &BatchConfig,
    mut sink: F,
) -> Result<BatchReport>
where
    L: ModelLoader,
    I: IntoIterator<Item = BatchItem>,
    F: FnMut(&BatchItem, StereoOutputs) -> Result<()>,
{
    config.validate()?;

    let mut report = BatchReport::default();
    for item in items {
        log::info!("processing {}", item.name);
        let result = process_image(controller, &item, config).and_then(|out| sink(&item, out));

        match result {
            Ok(()) => report.succeeded.push(item.name),
            Err(e) if e.is_batch_fatal() => {
                log::error!("stopping batch at {}: {}", item.name, e);
                return Err(e);
            }
            Err(e) => match config.failure_policy {
                FailurePolicy::Abort => {
                    log::error!("aborting batch at {}: {}", item.name, e);
                    return Err(e);
                }
                FailurePolicy::SkipImage => {
                    log::warn!("skipping {}: {}", item.name, e);
                    report.failed.push((item.name, e));
                }
            },
        }
    }

    log::info!(
        "batch finished: {} succeeded, {} skipped",
        report.succeeded.len(),
        report.failed.len()
    );
    Ok(report)
}

// ============================================================================
// Output files
// ============================================================================

/// Write every present output under `root`, one subdirectory per kind:
/// `stereo/`, `padded/`, `anaglyph/`, `depthmap/`, and `depthraw/`.
///
/// Images use `format`; raw depth is always 16-bit PNG.
pub fn write_outputs<P: AsRef<Path>>(
    root: P,
    name: &str,
    outputs: &StereoOutputs,
    format: ImageFormat,
) -> Result<()> {
    let root = root.as_ref();
    let images = [
        ("stereo", &outputs.side_by_side),
        ("padded", &outputs.padded),
        ("anaglyph", &outputs.anaglyph),
        ("depthmap", &outputs.depth_gray),
    ];
    for (dir, image) in images {
        if let Some(image) = image {
            let dir = root.join(dir);
            fs::create_dir_all(&dir).map_err(autovr_io::IoError::from)?;
            let path = dir.join(format!("{}.{}", name, format.extension()));
            autovr_io::write_image(image, &path, format)?;
        }
    }
    if let Some(depth) = &outputs.depth_raw {
        let dir = root.join("depthraw");
        fs::create_dir_all(&dir).map_err(autovr_io::IoError::from)?;
        let path = dir.join(format!("{}.{}", name, ImageFormat::Png.extension()));
        autovr_io::write_depth_raw(depth, &path)?;
    }
    Ok(())
}
