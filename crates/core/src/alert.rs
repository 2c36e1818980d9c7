//! Alert payload and normalized alert types.

use crate::{Price, Timeframe, TradingPair};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Parse from string. Accepts the buy/sell spelling some upstream
    /// monitors emit.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Some(Direction::Long),
            "short" | "sell" => Some(Direction::Short),
            _ => None,
        }
    }

    /// Get display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bounded momentum label attached to an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Momentum {
    Low,
    Medium,
    High,
}

impl Momentum {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Momentum::Low),
            "medium" => Some(Momentum::Medium),
            "high" => Some(Momentum::High),
            _ => None,
        }
    }

    /// Get display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Momentum::Low => "low",
            Momentum::Medium => "medium",
            Momentum::High => "high",
        }
    }
}

impl std::fmt::Display for Momentum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw webhook payload, one per request.
///
/// Enum-like fields stay as strings here; the validator parses them so that
/// an unknown value surfaces as `UnsupportedValue` rather than a bare
/// deserialization error. Unknown JSON fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertPayload {
    #[serde(default)]
    pub pair: String,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub timeframe: String,
    pub entry: Option<f64>,
    pub stop: Option<f64>,
    #[serde(default)]
    pub targets: Vec<f64>,
    pub confidence: Option<f64>,
    pub momentum: Option<String>,
    #[serde(default)]
    pub early_exit: bool,
    #[serde(default)]
    pub strategy_invalidated: bool,
    pub momentum_change: Option<String>,
    pub exit_reason: Option<String>,
}

impl AlertPayload {
    /// Whether this payload carries any update flag.
    pub fn is_update(&self) -> bool {
        self.early_exit || self.strategy_invalidated || self.momentum_change.is_some()
    }
}

/// Identity tuple used for duplicate and update matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint {
    pub pair: TradingPair,
    pub direction: Direction,
    pub strategy: CompactString,
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.pair, self.direction, self.strategy)
    }
}

/// Price levels of a directional call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Levels {
    pub entry: Price,
    pub stop: Price,
    /// Ordered away from entry in the trade direction; never empty.
    pub targets: Vec<Price>,
}

/// Validated, normalized alert produced by the validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAlert {
    pub pair: TradingPair,
    pub direction: Direction,
    pub strategy: CompactString,
    pub timeframe: Timeframe,
    /// Present on new alerts; updates may omit levels entirely.
    pub levels: Option<Levels>,
    /// Confidence in [0, 100].
    pub confidence: Option<f64>,
    pub momentum: Option<Momentum>,
    pub early_exit: bool,
    pub strategy_invalidated: bool,
    pub momentum_change: Option<Momentum>,
    pub exit_reason: Option<CompactString>,
}

impl NormalizedAlert {
    /// Whether this is an update referring to a previously emitted position.
    pub fn is_update(&self) -> bool {
        self.early_exit || self.strategy_invalidated || self.momentum_change.is_some()
    }

    /// Identity tuple for duplicate/update matching.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            pair: self.pair.clone(),
            direction: self.direction,
            strategy: self.strategy.clone(),
        }
    }
}
