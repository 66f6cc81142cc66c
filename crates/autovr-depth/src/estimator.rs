//! Depth model collaborator interface
//!
//! The neural depth model lives outside this crate. Adapters implement
//! [`ModelLoader`] and [`DepthModel`]; the precision controller owns the
//! loaded model and drives it through these traits.

use crate::error::{DepthError, DepthResult};
use autovr_core::{DepthMap, Image};

/// Model used when none is specified.
pub const DEFAULT_MODEL_NAME: &str = "zoedepth_nk";

/// Device used when none is specified.
pub const DEFAULT_DEVICE: &str = "cuda";

/// Model names accepted by [`ModelSpec::validate`].
pub const KNOWN_MODELS: [&str; 3] = ["zoedepth_nk", "zoedepth_n", "zoedepth_k"];

/// Which depth model to load and where
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelSpec {
    /// Model name, one of [`KNOWN_MODELS`] (case-insensitive)
    pub name: String,
    /// Device identifier passed through to the loader (e.g. "cuda", "cpu")
    pub device: String,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            device: DEFAULT_DEVICE.to_string(),
        }
    }
}

impl ModelSpec {
    /// Create a spec for `name` on `device`.
    pub fn new(name: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device: device.into(),
        }
    }

    /// Check that the model name is known and the device is set.
    ///
    /// # Errors
    ///
    /// Returns [`DepthError::InvalidParameter`] otherwise.
    pub fn validate(&self) -> DepthResult<()> {
        if !KNOWN_MODELS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(&self.name))
        {
            return Err(DepthError::InvalidParameter(format!(
                "unknown model {:?}, expected one of {:?}",
                self.name, KNOWN_MODELS
            )));
        }
        if self.device.trim().is_empty() {
            return Err(DepthError::InvalidParameter(
                "device name is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A loaded depth model
pub trait DepthModel {
    /// Set the resolution the model resizes its input to before inference.
    fn configure(&mut self, width: u32, height: u32) -> DepthResult<()>;

    /// Estimate depth for `image` at the configured resolution.
    ///
    /// The returned map may have the configured size rather than the
    /// image's. Memory exhaustion must be reported as
    /// [`DepthError::ResourceExhausted`]; see
    /// [`classify_failure`](crate::classify_failure).
    fn infer(&mut self, image: &Image) -> DepthResult<DepthMap>;
}

/// Loads and releases depth models
pub trait ModelLoader {
    type Model: DepthModel;

    /// Load `spec` for inference at `width` x `height`.
    fn load(&mut self, spec: &ModelSpec, width: u32, height: u32) -> DepthResult<Self::Model>;

    /// Release a model and the device memory it holds.
    fn unload(&mut self, model: Self::Model);
}
