//! Adaptive-precision depth inference
//!
//! Depth models need device memory that grows with working resolution. The
//! [`PrecisionController`] owns the loaded model and, when inference runs
//! out of memory, releases the model, lowers the resolution factor by 0.1,
//! waits briefly, and tries again. The last factor that worked is
//! remembered per requested size, so later images of the same size start
//! there directly.
//!
//! # State machine
//!
//! ```text
//! Unloaded --ensure_loaded--> Loaded(w, h)
//! Loaded --out of memory--> Retrying(factor) --ensure_loaded--> Loaded(w', h')
//! Loaded --release--> Unloaded
//! ```

use crate::error::{DepthError, DepthResult};
use crate::estimator::{DepthModel, ModelLoader, ModelSpec};
use crate::resample::resample_depth;
use autovr_core::{DepthMap, Image};
use std::collections::HashMap;
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Amount the resolution factor drops after each out-of-memory failure.
pub const FACTOR_STEP: f64 = 0.1;

/// Pause between releasing a model and retrying.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Lower `factor` by one step, rounded to 1e-6 so repeated steps stay on
/// the tenths grid.
fn step_down(factor: f64) -> f64 {
    ((factor - FACTOR_STEP) * 1e6).round() / 1e6
}

fn scaled(base: u32, factor: f64) -> u32 {
    (base as f64 * factor).round().max(0.0) as u32
}

// ============================================================================
// Configuration
// ============================================================================

/// Working resolution requested for depth inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrecisionSpec {
    /// Run at this size (factor 1.0)
    Pixels { width: u32, height: u32 },
    /// Run at the image size scaled by `factor`
    Factor { factor: f64 },
}

impl Default for PrecisionSpec {
    fn default() -> Self {
        PrecisionSpec::Factor { factor: 1.0 }
    }
}

impl PrecisionSpec {
    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DepthError::InvalidParameter`] for a zero size or a factor
    /// that is not finite and positive.
    pub fn validate(&self) -> DepthResult<()> {
        match *self {
            PrecisionSpec::Pixels { width, height } if width == 0 || height == 0 => {
                Err(DepthError::InvalidParameter(format!(
                    "precision size must be non-empty, got {}x{}",
                    width, height
                )))
            }
            PrecisionSpec::Factor { factor } if !factor.is_finite() || factor <= 0.0 => Err(
                DepthError::InvalidParameter(format!("precision factor must be positive, got {}", factor)),
            ),
            _ => Ok(()),
        }
    }

    /// Resolve to `(base_width, base_height, start_factor)` for an image of
    /// `width` x `height`.
    pub fn resolve(&self, width: u32, height: u32) -> (u32, u32, f64) {
        match *self {
            PrecisionSpec::Pixels { width, height } => (width, height, 1.0),
            PrecisionSpec::Factor { factor } => (width, height, factor),
        }
    }
}

/// Whether out-of-memory failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrecisionMode {
    /// Retry at decreasing factors until inference fits
    #[default]
    Adaptive,
    /// Run once at the requested precision
    Manual,
}

// ============================================================================
// State
// ============================================================================

/// Cache key for remembered precision
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrecisionKey {
    pub model_name: String,
    pub device: String,
    /// Requested working width, before any retry lowers it
    pub width: u32,
    /// Requested working height, before any retry lowers it
    pub height: u32,
}

/// Precision progress for one [`PrecisionKey`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecisionState {
    /// Factor of the most recent attempt
    pub current_factor: f64,
    /// Factor of the most recent successful inference
    pub last_successful: Option<f64>,
}

/// Lifecycle state of the controller's model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerState {
    Unloaded,
    Loaded { width: u32, height: u32 },
    Retrying { factor: f64 },
}

struct LoadedModel<M> {
    model: M,
    width: u32,
    height: u32,
}

// ============================================================================
// Controller
// ============================================================================

/// Owns a depth model and runs inference with out-of-memory recovery
///
/// One controller serves a whole batch. It is strictly sequential: loads,
/// unloads, and inference calls block, and a retry always unloads fully
/// before loading again. The model is released when the controller is
/// dropped.
pub struct PrecisionController<L: ModelLoader> {
    loader: L,
    spec: ModelSpec,
    mode: PrecisionMode,
    loaded: Option<LoadedModel<L::Model>>,
    state: ControllerState,
    cache: HashMap<PrecisionKey, PrecisionState>,
}

impl<L: ModelLoader> PrecisionController<L> {
    /// Create a controller for `spec`; no model is loaded yet.
    ///
    /// # Errors
    ///
    /// Returns [`DepthError::InvalidParameter`] if `spec` is invalid.
    pub fn new(loader: L, spec: ModelSpec, mode: PrecisionMode) -> DepthResult<Self> {
        spec.validate()?;
        Ok(Self {
            loader,
            spec,
            mode,
            loaded: None,
            state: ControllerState::Unloaded,
            cache: HashMap::new(),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn mode(&self) -> PrecisionMode {
        self.mode
    }

    /// Remembered precision for a requested working size, if any.
    pub fn precision_state(&self, width: u32, height: u32) -> Option<&PrecisionState> {
        self.cache.get(&self.key(width, height))
    }

    fn key(&self, width: u32, height: u32) -> PrecisionKey {
        PrecisionKey {
            model_name: self.spec.name.clone(),
            device: self.spec.device.clone(),
            width,
            height,
        }
    }

    /// Make sure a model configured for `width` x `height` is loaded.
    ///
    /// Reuses the loaded model when it already matches; otherwise unloads
    /// it, loads a fresh one, and configures it.
    pub fn ensure_loaded(&mut self, width: u32, height: u32) -> DepthResult<&mut L::Model> {
        let hit = self
            .loaded
            .as_ref()
            .is_some_and(|m| m.width == width && m.height == height);

        if hit {
            log::debug!(
                "reusing {} on {} at {}x{}",
                self.spec.name,
                self.spec.device,
                width,
                height
            );
        } else {
            self.release();
            log::info!(
                "loading {} on {} at {}x{}",
                self.spec.name,
                self.spec.device,
                width,
                height
            );
            let mut model = self.loader.load(&self.spec, width, height)?;
            if let Err(e) = model.configure(width, height) {
                self.loader.unload(model);
                return Err(e);
            }
            self.loaded = Some(LoadedModel {
                model,
                width,
                height,
            });
        }

        self.state = ControllerState::Loaded { width, height };
        match self.loaded.as_mut() {
            Some(loaded) => Ok(&mut loaded.model),
            None => Err(DepthError::Model("model missing after load".to_string())),
        }
    }

    /// Unload the current model, if any.
    pub fn release(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            log::debug!(
                "unloading {} ({}x{})",
                self.spec.name,
                loaded.width,
                loaded.height
            );
            self.loader.unload(loaded.model);
        }
        self.state = ControllerState::Unloaded;
    }

    fn attempt(&mut self, image: &Image, width: u32, height: u32) -> DepthResult<DepthMap> {
        let depth = self.ensure_loaded(width, height)?.infer(image)?;
        if depth.dimensions() == image.dimensions() {
            Ok(depth)
        } else {
            resample_depth(&depth, image.width(), image.height())
        }
    }

    /// Infer depth for `image`, lowering precision on out-of-memory failures.
    ///
    /// Starts at the factor `precision` resolves to, or at the remembered
    /// factor for the same requested working size when that is lower. The
    /// returned map always has the image's dimensions.
    ///
    /// # Errors
    ///
    /// - [`DepthError::ExhaustedRetryBudget`] once the factor reaches zero
    /// - Any non-memory failure, immediately
    pub fn infer_with_retry(
        &mut self,
        image: &Image,
        precision: &PrecisionSpec,
    ) -> DepthResult<DepthMap> {
        precision.validate()?;
        let (base_w, base_h, start) = precision.resolve(image.width(), image.height());
        let (target_w, target_h) = (scaled(base_w, start), scaled(base_h, start));
        let key = self.key(target_w, target_h);

        let mut factor = match self.cache.get(&key).and_then(|s| s.last_successful) {
            Some(remembered) => {
                let factor = remembered.min(start);
                log::debug!(
                    "starting {}x{} at remembered factor {}",
                    target_w,
                    target_h,
                    factor
                );
                factor
            }
            None => start,
        };
        let mut attempts = 0u32;

        loop {
            let (w, h) = (scaled(base_w, factor), scaled(base_h, factor));
            if factor <= 0.0 || w == 0 || h == 0 {
                log::warn!(
                    "giving up on {}x{} after {} attempts",
                    base_w,
                    base_h,
                    attempts
                );
                self.release();
                return Err(DepthError::ExhaustedRetryBudget {
                    width: base_w,
                    height: base_h,
                    attempts,
                });
            }

            self.cache
                .entry(key.clone())
                .or_insert(PrecisionState {
                    current_factor: factor,
                    last_successful: None,
                })
                .current_factor = factor;
            attempts += 1;

            match self.attempt(image, w, h) {
                Ok(depth) => {
                    if let Some(state) = self.cache.get_mut(&key) {
                        state.last_successful = Some(factor);
                    }
                    return Ok(depth);
                }
                Err(DepthError::ResourceExhausted(report)) => {
                    let next = step_down(factor);
                    log::warn!(
                        "out of memory at {}x{} (factor {}): {}; retrying at factor {}",
                        w,
                        h,
                        factor,
                        report,
                        next
                    );
                    self.release();
                    factor = next;
                    self.state = ControllerState::Retrying { factor };
                    std::thread::sleep(RETRY_BACKOFF);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Infer depth once at exactly the requested precision.
    ///
    /// Remembered factors are neither used nor updated.
    pub fn infer_once(&mut self, image: &Image, precision: &PrecisionSpec) -> DepthResult<DepthMap> {
        precision.validate()?;
        let (base_w, base_h, factor) = precision.resolve(image.width(), image.height());
        let (w, h) = (scaled(base_w, factor), scaled(base_h, factor));
        if w == 0 || h == 0 {
            return Err(DepthError::InvalidParameter(format!(
                "precision {:?} collapses {}x{} to nothing",
                precision, base_w, base_h
            )));
        }
        self.attempt(image, w, h)
    }

    /// Infer depth for `image` according to the controller's mode.
    pub fn run_adaptive_precision(
        &mut self,
        image: &Image,
        precision: &PrecisionSpec,
    ) -> DepthResult<DepthMap> {
        match self.mode {
            PrecisionMode::Adaptive => self.infer_with_retry(image, precision),
            PrecisionMode::Manual => self.infer_once(image, precision),
        }
    }
}

impl<L: ModelLoader> Drop for PrecisionController<L> {
    fn drop(&mut self) {
        self.release();
    }
}
