//! Allocation failure reports
//!
//! Depth models backed by GPU runtimes report memory exhaustion as free-form
//! text such as:
//!
//! ```text
//! CUDA out of memory. Tried to allocate 20.00 MiB (GPU 0; 4.00 GiB total
//! capacity; 3.41 GiB already allocated; 0 bytes free; 3.46 GiB reserved in
//! total by PyTorch)
//! ```
//!
//! [`classify_failure`] lets model adapters turn such text into a structured
//! [`DepthError`] so the precision controller never inspects strings.

use crate::error::DepthError;
use std::fmt;

/// Byte counts extracted from an out-of-memory message
///
/// Fields the message does not mention are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocationReport {
    /// Size of the allocation that failed
    pub attempted: Option<u64>,
    /// Total device capacity
    pub total: Option<u64>,
    /// Memory already allocated
    pub allocated: Option<u64>,
    /// Memory still free
    pub free: Option<u64>,
    /// Memory reserved by the runtime's allocator
    pub reserved: Option<u64>,
}

impl AllocationReport {
    /// Extract whatever byte counts `message` mentions.
    ///
    /// A count is a number followed by a unit (`bytes`, `B`, `KiB`, `MiB`,
    /// `GiB`, `TiB`, `KB`, `MB`, `GB`, `TB`). It is attributed by the word
    /// before it (`allocate`) or the word after it (`total`, `already`,
    /// `allocated`, `free`, `reserved`).
    pub fn parse(message: &str) -> Self {
        let words: Vec<&str> = message
            .split(|c: char| c.is_whitespace() || matches!(c, ';' | ',' | '(' | ')'))
            .filter(|w| !w.is_empty())
            .collect();

        let mut report = AllocationReport::default();
        for i in 0..words.len().saturating_sub(1) {
            let Ok(value) = words[i].parse::<f64>() else {
                continue;
            };
            let Some(scale) = unit_scale(words[i + 1].trim_end_matches('.')) else {
                continue;
            };
            let bytes = (value * scale as f64).round() as u64;

            let before = i.checked_sub(1).map(|j| words[j].to_ascii_lowercase());
            let after = words.get(i + 2).map(|w| w.to_ascii_lowercase());
            let slot = match (before.as_deref(), after.as_deref()) {
                (Some("allocate"), _) => &mut report.attempted,
                (_, Some("total")) => &mut report.total,
                (_, Some("already" | "allocated")) => &mut report.allocated,
                (_, Some("free")) => &mut report.free,
                (_, Some("reserved")) => &mut report.reserved,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(bytes);
            }
        }
        report
    }

    /// True when no count was found.
    pub fn is_empty(&self) -> bool {
        *self == AllocationReport::default()
    }
}

fn unit_scale(unit: &str) -> Option<u64> {
    const KIB: u64 = 1 << 10;
    Some(match unit {
        "bytes" | "byte" | "B" => 1,
        "KiB" => KIB,
        "MiB" => KIB.pow(2),
        "GiB" => KIB.pow(3),
        "TiB" => KIB.pow(4),
        "KB" | "kB" => 1_000,
        "MB" => 1_000_000,
        "GB" => 1_000_000_000,
        "TB" => 1_000_000_000_000,
        _ => return None,
    })
}

/// Format a byte count with a binary unit, e.g. `20.00 MiB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = UNITS[0];
    for u in UNITS {
        value /= 1024.0;
        unit = u;
        if value < 1024.0 {
            break;
        }
    }
    format!("{:.2} {}", value, unit)
}

impl fmt::Display for AllocationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("attempted", self.attempted),
            ("total", self.total),
            ("allocated", self.allocated),
            ("free", self.free),
            ("reserved", self.reserved),
        ];
        let mut first = true;
        for (name, value) in fields {
            if let Some(bytes) = value {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{} {}", name, format_bytes(bytes))?;
                first = false;
            }
        }
        if first {
            f.write_str("no allocation details")?;
        }
        Ok(())
    }
}

/// Whether `message` describes memory exhaustion.
pub fn is_resource_exhaustion(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("out of memory")
        || lower.contains("outofmemory")
        || lower.contains("resource exhausted")
        || lower.contains("failed to allocate")
}

/// Turn a model failure message into a [`DepthError`].
///
/// Memory exhaustion becomes [`DepthError::ResourceExhausted`] carrying the
/// parsed [`AllocationReport`]; anything else becomes
/// [`DepthError::Model`].
///
/// # Examples
///
/// ```
/// use autovr_depth::{DepthError, classify_failure};
///
/// let err = classify_failure("CUDA out of memory. Tried to allocate 2.00 GiB");
/// assert!(err.is_retryable());
/// assert!(matches!(classify_failure("bad input"), DepthError::Model(_)));
/// ```
pub fn classify_failure(message: &str) -> DepthError {
    if is_resource_exhaustion(message) {
        DepthError::ResourceExhausted(AllocationReport::parse(message))
    } else {
        DepthError::Model(message.to_string())
    }
}
