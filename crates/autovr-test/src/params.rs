//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::regout_dir;
use autovr_core::Image;
use autovr_io::ImageFormat;
use std::fs;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare values only (default)
    #[default]
    Compare,
    /// Also write intermediate images for visual inspection
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, current check index, mode, and every recorded
/// failure so that one run reports all mismatches instead of stopping at
/// the first.
pub struct RegParams {
    /// Name of the test (e.g., "warp")
    pub test_name: String,
    /// Current check index (incremented before each check)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current check index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        // NaN never compares within delta.
        if diff.is_nan() || diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Record a boolean condition as a check.
    pub fn check(&mut self, condition: bool, what: &str) -> bool {
        self.index += 1;
        if !condition {
            let msg = format!(
                "Failure in {}_reg: check for index {} - {}",
                self.test_name, self.index, what
            );
            self.fail(msg);
        }
        condition
    }

    /// Compare two images for exact equality
    ///
    /// # Returns
    ///
    /// `true` if shape and every sample are identical.
    pub fn compare_images(&mut self, image1: &Image, image2: &Image) -> bool {
        self.index += 1;

        if !image1.same_shape(image2) {
            let msg = format!(
                "Failure in {}_reg: image comparison for index {} - shape mismatch \
                 ({}x{} {:?} vs {}x{} {:?})",
                self.test_name,
                self.index,
                image1.width(),
                image1.height(),
                image1.channels(),
                image2.width(),
                image2.height(),
                image2.channels()
            );
            self.fail(msg);
            return false;
        }

        let ch = image1.channels().count();
        if let Some(pos) = image1
            .data()
            .iter()
            .zip(image2.data())
            .position(|(a, b)| a != b)
        {
            let pixel = pos / ch;
            let w = image1.width() as usize;
            let msg = format!(
                "Failure in {}_reg: image comparison for index {} - sample mismatch at ({}, {})",
                self.test_name,
                self.index,
                pixel % w,
                pixel / w
            );
            self.fail(msg);
            return false;
        }

        true
    }

    /// In display mode, write `image` under the regout directory as PNG.
    ///
    /// Does nothing in compare mode.
    pub fn write_image_for_display(&mut self, image: &Image, label: &str) -> TestResult<()> {
        if !self.display() {
            return Ok(());
        }

        fs::create_dir_all(regout_dir())?;
        let path = format!(
            "{}/{}.{}.{}",
            regout_dir(),
            self.test_name,
            label,
            ImageFormat::Png.extension()
        );
        autovr_io::write_image(image, &path, ImageFormat::Png).map_err(|e| {
            TestError::ImageWrite {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        eprintln!("Wrote: {}", path);
        Ok(())
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all checks passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all checks have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
