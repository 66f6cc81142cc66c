//! autovr-test - Regression test framework for autovr
//!
//! Collects value and image comparisons for one named test and reports
//! every mismatch at the end. Two modes:
//!
//! - **Compare** (default): run checks and collect failures
//! - **Display**: additionally write images under `tests/regout` for
//!   visual inspection
//!
//! # Usage
//!
//! ```ignore
//! use autovr_test::RegParams;
//!
//! let mut rp = RegParams::new("warp");
//! rp.compare_values(12.5, divergence, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod error;
pub mod fixtures;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // autovr-test is at crates/autovr-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
