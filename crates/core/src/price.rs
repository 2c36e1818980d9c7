//! Fixed-point price representation.

use serde::{Deserialize, Serialize};

/// Fixed-point price with 8 decimal places.
/// Keeps level comparisons (stop/entry/targets) exact instead of relying on
/// floating-point ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(pub u64);

impl Price {
    /// Number of decimal places.
    pub const DECIMALS: u32 = 8;
    /// Scale factor: 10^8 (fits comfortably in u64 for crypto prices).
    pub const SCALE: u64 = 100_000_000;

    /// Create from f64. Returns `None` for non-finite, non-positive, or
    /// out-of-range values; a `Price` is always strictly positive.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value <= 0.0 {
            return None;
        }
        let scaled = value * Self::SCALE as f64;
        if scaled >= u64::MAX as f64 {
            return None;
        }
        let raw = scaled.round() as u64;
        if raw == 0 {
            return None;
        }
        Some(Self(raw))
    }

    /// Convert to f64 (for display).
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / Self::SCALE;
        let frac = self.0 % Self::SCALE;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let digits = format!("{:08}", frac);
            write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
        }
    }
}
