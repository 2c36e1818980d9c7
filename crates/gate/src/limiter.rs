//! Per-pair rate-limit and dedup gate.
//!
//! Decides whether a validated alert may be forwarded now. Decisions run
//! under the pair's map entry guard and never block or await; delivery to
//! the outbound channel happens elsewhere, after the guard is dropped.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use relay_core::{Fingerprint, Momentum, NormalizedAlert, TradingPair};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Why an alert was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    /// A new alert arrived within the admission window for its pair.
    RateLimited,
    /// Fingerprint matches the pair's open call (or the preceding update).
    Duplicate,
    /// An update arrived for a pair with no previously admitted alert.
    NoMatchingPosition,
}

impl SuppressReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SuppressReason::RateLimited => "rate_limited",
            SuppressReason::Duplicate => "duplicate",
            SuppressReason::NoMatchingPosition => "no_matching_position",
        }
    }
}

/// Gate decision for a validated alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Admitted,
    Suppressed(SuppressReason),
}

/// Gate configuration.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Minimum elapsed time between two new alerts for the same pair.
    pub min_interval: Duration,
    /// Rolling window for the per-pair emission count.
    pub window: Duration,
    /// Maximum admitted new alerts per pair within the rolling window.
    /// `None` disables the cap; the interval rule remains the primary policy.
    pub max_per_window: Option<u32>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::minutes(15),
            window: Duration::hours(1),
            max_per_window: None,
        }
    }
}

/// Marker of the most recently admitted update, for back-to-back dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UpdateMarker {
    fingerprint: Fingerprint,
    early_exit: bool,
    strategy_invalidated: bool,
    momentum_change: Option<Momentum>,
}

impl UpdateMarker {
    fn of(alert: &NormalizedAlert) -> Self {
        Self {
            fingerprint: alert.fingerprint(),
            early_exit: alert.early_exit,
            strategy_invalidated: alert.strategy_invalidated,
            momentum_change: alert.momentum_change,
        }
    }
}

/// Per-pair emission history. Created on the first alert for a pair and
/// kept for the process lifetime.
#[derive(Debug, Default)]
struct PairState {
    last_emitted: Option<DateTime<Utc>>,
    last_fingerprint: Option<Fingerprint>,
    /// Admission timestamps within the rolling window, pruned on access.
    emissions: Vec<DateTime<Utc>>,
    last_update: Option<UpdateMarker>,
}

/// Counters for the stats endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GateStats {
    pub admitted: u64,
    pub rate_limited: u64,
    pub duplicates: u64,
    pub no_position: u64,
}

/// Rate limiter / dedup gate keyed by trading pair.
///
/// Per-pair state is independent; access to a given pair's state is
/// serialized by the map's entry guard.
pub struct SignalGate {
    config: GateConfig,
    states: DashMap<TradingPair, PairState>,
    admitted: AtomicU64,
    rate_limited: AtomicU64,
    duplicates: AtomicU64,
    no_position: AtomicU64,
}

impl SignalGate {
    /// Create a new gate with the given configuration.
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            states: DashMap::new(),
            admitted: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            no_position: AtomicU64::new(0),
        }
    }

    /// Decide whether a validated alert may be forwarded now.
    ///
    /// On admission the pair's state is updated before returning; the caller
    /// must not roll it back if downstream delivery fails.
    pub fn admit(&self, alert: &NormalizedAlert) -> Verdict {
        self.admit_at(alert, Utc::now())
    }

    /// Decision at an explicit instant. Exposed for deterministic tests.
    pub fn admit_at(&self, alert: &NormalizedAlert, now: DateTime<Utc>) -> Verdict {
        let verdict = {
            let mut state = self.states.entry(alert.pair.clone()).or_default();
            decide(&self.config, &mut state, alert, now)
        };
        self.record(alert, verdict);
        verdict
    }

    /// Number of pairs with tracked state.
    pub fn tracked_pairs(&self) -> usize {
        self.states.len()
    }

    /// Snapshot of the gate counters.
    pub fn stats(&self) -> GateStats {
        GateStats {
            admitted: self.admitted.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            no_position: self.no_position.load(Ordering::Relaxed),
        }
    }

    fn record(&self, alert: &NormalizedAlert, verdict: Verdict) {
        let counter = match verdict {
            Verdict::Admitted => &self.admitted,
            Verdict::Suppressed(SuppressReason::RateLimited) => &self.rate_limited,
            Verdict::Suppressed(SuppressReason::Duplicate) => &self.duplicates,
            Verdict::Suppressed(SuppressReason::NoMatchingPosition) => &self.no_position,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        if let Verdict::Suppressed(reason) = verdict {
            debug!(
                pair = %alert.pair,
                strategy = %alert.strategy,
                reason = reason.as_str(),
                "Alert suppressed"
            );
        }
    }
}

fn decide(
    config: &GateConfig,
    state: &mut PairState,
    alert: &NormalizedAlert,
    now: DateTime<Utc>,
) -> Verdict {
    if alert.is_update() {
        // An update with nothing to update is meaningless.
        if state.last_fingerprint.is_none() {
            return Verdict::Suppressed(SuppressReason::NoMatchingPosition);
        }
        let marker = UpdateMarker::of(alert);
        if state.last_update.as_ref() == Some(&marker) {
            return Verdict::Suppressed(SuppressReason::Duplicate);
        }
        // Updates refresh the clock but keep the fingerprint of the position
        // they close or modify.
        state.last_emitted = Some(now);
        state.last_update = Some(marker);
        state.emissions.push(now);
        return Verdict::Admitted;
    }

    if let Some(last) = state.last_emitted {
        if now - last < config.min_interval {
            return Verdict::Suppressed(SuppressReason::RateLimited);
        }
    }

    let fingerprint = alert.fingerprint();
    if state.last_fingerprint.as_ref() == Some(&fingerprint) {
        // One open call per pair at a time, regardless of interval.
        return Verdict::Suppressed(SuppressReason::Duplicate);
    }

    state.emissions.retain(|&t| now - t < config.window);
    if let Some(max) = config.max_per_window {
        if state.emissions.len() as u32 >= max {
            return Verdict::Suppressed(SuppressReason::RateLimited);
        }
    }

    state.last_emitted = Some(now);
    state.last_fingerprint = Some(fingerprint);
    state.last_update = None;
    state.emissions.push(now);
    Verdict::Admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;
    use pretty_assertions::assert_eq;
    use relay_core::{Direction, Levels, Price, Timeframe, TradingPair};

    fn base_time() -> DateTime<Utc> {
        "2025-01-15T12:00:00Z".parse().unwrap()
    }

    fn new_alert(pair: &str, direction: Direction, strategy: &str) -> NormalizedAlert {
        let pair = TradingPair::parse(pair).unwrap();
        let (entry, stop, targets) = match direction {
            Direction::Long => (60000.0, 59000.0, vec![61000.0, 62000.0]),
            Direction::Short => (60000.0, 61000.0, vec![59000.0, 58000.0]),
        };
        NormalizedAlert {
            pair,
            direction,
            strategy: CompactString::new(strategy),
            timeframe: Timeframe::M15,
            levels: Some(Levels {
                entry: Price::from_f64(entry).unwrap(),
                stop: Price::from_f64(stop).unwrap(),
                targets: targets.iter().map(|&t| Price::from_f64(t).unwrap()).collect(),
            }),
            confidence: Some(80.0),
            momentum: None,
            early_exit: false,
            strategy_invalidated: false,
            momentum_change: None,
            exit_reason: None,
        }
    }

    fn early_exit(pair: &str, direction: Direction, strategy: &str) -> NormalizedAlert {
        let mut alert = new_alert(pair, direction, strategy);
        alert.levels = None;
        alert.confidence = None;
        alert.early_exit = true;
        alert
    }

    #[test]
    fn test_first_alert_admitted_resend_rate_limited() {
        let gate = SignalGate::new(GateConfig::default());
        let alert = new_alert("BTC/USDT", Direction::Long, "breakout");
        let t0 = base_time();

        assert_eq!(gate.admit_at(&alert, t0), Verdict::Admitted);
        // Same payload one minute later: within the window, so RateLimited.
        assert_eq!(
            gate.admit_at(&alert, t0 + Duration::minutes(1)),
            Verdict::Suppressed(SuppressReason::RateLimited)
        );
    }

    #[test]
    fn test_different_fingerprint_still_rate_limited_within_window() {
        let gate = SignalGate::new(GateConfig::default());
        let t0 = base_time();
        assert_eq!(
            gate.admit_at(&new_alert("BTC/USDT", Direction::Long, "breakout"), t0),
            Verdict::Admitted
        );
        assert_eq!(
            gate.admit_at(
                &new_alert("BTC/USDT", Direction::Short, "fade"),
                t0 + Duration::minutes(5)
            ),
            Verdict::Suppressed(SuppressReason::RateLimited)
        );
    }

    #[test]
    fn test_same_fingerprint_after_interval_is_duplicate() {
        let gate = SignalGate::new(GateConfig::default());
        let alert = new_alert("BTC/USDT", Direction::Long, "breakout");
        let t0 = base_time();
        assert_eq!(gate.admit_at(&alert, t0), Verdict::Admitted);
        assert_eq!(
            gate.admit_at(&alert, t0 + Duration::minutes(16)),
            Verdict::Suppressed(SuppressReason::Duplicate)
        );
    }

    #[test]
    fn test_new_fingerprint_after_interval_admitted() {
        let gate = SignalGate::new(GateConfig::default());
        let t0 = base_time();
        assert_eq!(
            gate.admit_at(&new_alert("BTC/USDT", Direction::Long, "breakout"), t0),
            Verdict::Admitted
        );
        assert_eq!(
            gate.admit_at(
                &new_alert("BTC/USDT", Direction::Short, "fade"),
                t0 + Duration::minutes(16)
            ),
            Verdict::Admitted
        );
    }

    #[test]
    fn test_pairs_independent() {
        let gate = SignalGate::new(GateConfig::default());
        let t0 = base_time();
        assert_eq!(
            gate.admit_at(&new_alert("BTC/USDT", Direction::Long, "breakout"), t0),
            Verdict::Admitted
        );
        assert_eq!(
            gate.admit_at(
                &new_alert("ETH/USDT", Direction::Long, "breakout"),
                t0 + Duration::minutes(1)
            ),
            Verdict::Admitted
        );
        assert_eq!(gate.tracked_pairs(), 2);
    }

    #[test]
    fn test_update_without_position_suppressed() {
        let gate = SignalGate::new(GateConfig::default());
        assert_eq!(
            gate.admit_at(
                &early_exit("BTC/USDT", Direction::Long, "breakout"),
                base_time()
            ),
            Verdict::Suppressed(SuppressReason::NoMatchingPosition)
        );
    }

    #[test]
    fn test_update_bypasses_interval() {
        let gate = SignalGate::new(GateConfig::default());
        let t0 = base_time();
        assert_eq!(
            gate.admit_at(&new_alert("BTC/USDT", Direction::Long, "breakout"), t0),
            Verdict::Admitted
        );
        assert_eq!(
            gate.admit_at(
                &early_exit("BTC/USDT", Direction::Long, "breakout"),
                t0 + Duration::minutes(2)
            ),
            Verdict::Admitted
        );
    }

    #[test]
    fn test_identical_consecutive_update_is_duplicate() {
        let gate = SignalGate::new(GateConfig::default());
        let t0 = base_time();
        gate.admit_at(&new_alert("BTC/USDT", Direction::Long, "breakout"), t0);

        let exit = early_exit("BTC/USDT", Direction::Long, "breakout");
        assert_eq!(
            gate.admit_at(&exit, t0 + Duration::minutes(2)),
            Verdict::Admitted
        );
        assert_eq!(
            gate.admit_at(&exit, t0 + Duration::minutes(3)),
            Verdict::Suppressed(SuppressReason::Duplicate)
        );

        // A different kind of update for the same position is admitted.
        let mut invalidated = early_exit("BTC/USDT", Direction::Long, "breakout");
        invalidated.early_exit = false;
        invalidated.strategy_invalidated = true;
        assert_eq!(
            gate.admit_at(&invalidated, t0 + Duration::minutes(4)),
            Verdict::Admitted
        );
    }

    #[test]
    fn test_update_preserves_fingerprint() {
        let gate = SignalGate::new(GateConfig::default());
        let alert = new_alert("BTC/USDT", Direction::Long, "breakout");
        let t0 = base_time();
        gate.admit_at(&alert, t0);
        gate.admit_at(
            &early_exit("BTC/USDT", Direction::Long, "breakout"),
            t0 + Duration::minutes(2),
        );

        // The stored fingerprint still matches, so a fresh identical call is
        // a duplicate even once the interval has elapsed.
        assert_eq!(
            gate.admit_at(&alert, t0 + Duration::minutes(30)),
            Verdict::Suppressed(SuppressReason::Duplicate)
        );
    }

    #[test]
    fn test_update_refreshes_timestamp() {
        let gate = SignalGate::new(GateConfig::default());
        let t0 = base_time();
        gate.admit_at(&new_alert("BTC/USDT", Direction::Long, "breakout"), t0);
        gate.admit_at(
            &early_exit("BTC/USDT", Direction::Long, "breakout"),
            t0 + Duration::minutes(14),
        );

        // 16 minutes after the first alert but only 2 after the update: the
        // refreshed clock still rate-limits a new call.
        assert_eq!(
            gate.admit_at(
                &new_alert("BTC/USDT", Direction::Short, "fade"),
                t0 + Duration::minutes(16)
            ),
            Verdict::Suppressed(SuppressReason::RateLimited)
        );
    }

    #[test]
    fn test_window_cap() {
        let config = GateConfig {
            min_interval: Duration::zero(),
            window: Duration::hours(1),
            max_per_window: Some(2),
        };
        let gate = SignalGate::new(config);
        let t0 = base_time();

        assert_eq!(
            gate.admit_at(&new_alert("BTC/USDT", Direction::Long, "a"), t0),
            Verdict::Admitted
        );
        assert_eq!(
            gate.admit_at(
                &new_alert("BTC/USDT", Direction::Long, "b"),
                t0 + Duration::minutes(1)
            ),
            Verdict::Admitted
        );
        assert_eq!(
            gate.admit_at(
                &new_alert("BTC/USDT", Direction::Long, "c"),
                t0 + Duration::minutes(2)
            ),
            Verdict::Suppressed(SuppressReason::RateLimited)
        );
        // The cap releases once the window rolls past the earliest emission.
        assert_eq!(
            gate.admit_at(
                &new_alert("BTC/USDT", Direction::Long, "c"),
                t0 + Duration::minutes(61)
            ),
            Verdict::Admitted
        );
    }

    #[test]
    fn test_stats_counters() {
        let gate = SignalGate::new(GateConfig::default());
        let alert = new_alert("BTC/USDT", Direction::Long, "breakout");
        let t0 = base_time();
        gate.admit_at(&alert, t0);
        gate.admit_at(&alert, t0 + Duration::minutes(1));
        gate.admit_at(
            &early_exit("ETH/USDT", Direction::Long, "breakout"),
            t0,
        );

        let stats = gate.stats();
        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.rate_limited, 1);
        assert_eq!(stats.no_position, 1);
        assert_eq!(stats.duplicates, 0);
    }
}
