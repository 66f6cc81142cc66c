//! Batch configuration
//!
//! All parameters are validated once, before the first image is touched.

use crate::error::Result;
use autovr_depth::{DepthError, DepthRender, PrecisionSpec};
use autovr_stereo::{PaddingSpec, StereoOptions};

/// Which outputs [`process_image`](crate::process_image) produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSelection {
    /// Left and right eyes side by side
    pub side_by_side: bool,
    /// Eyes centred on padded canvases; `None` disables this output
    pub padded: Option<PaddingSpec>,
    /// Red/cyan anaglyph
    pub anaglyph: bool,
    /// Rendered depth visualization
    pub depth_gray: bool,
    /// Depth values as used for warping
    pub depth_raw: bool,
}

impl Default for OutputSelection {
    fn default() -> Self {
        Self {
            side_by_side: true,
            padded: Some(PaddingSpec::default()),
            anaglyph: true,
            depth_gray: true,
            depth_raw: true,
        }
    }
}

impl OutputSelection {
    /// True when at least one output is selected.
    pub fn any(&self) -> bool {
        self.side_by_side || self.padded.is_some() || self.anaglyph || self.depth_gray || self.depth_raw
    }
}

/// What to do when one image fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and continue with the next image
    #[default]
    SkipImage,
    /// Stop the batch at the first failure
    Abort,
}

/// Configuration for [`run_batch`](crate::run_batch)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatchConfig {
    pub stereo: StereoOptions,
    pub precision: PrecisionSpec,
    pub outputs: OutputSelection,
    pub failure_policy: FailurePolicy,
    pub depth_render: DepthRender,
}

impl BatchConfig {
    /// Validate every parameter.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter found, or an error if no output
    /// is selected.
    pub fn validate(&self) -> Result<()> {
        self.stereo.validate()?;
        self.precision.validate()?;
        if let Some(padding) = &self.outputs.padded {
            padding.validate()?;
        }
        if !self.outputs.any() {
            return Err(DepthError::InvalidParameter("no outputs selected".to_string()).into());
        }
        Ok(())
    }
}
