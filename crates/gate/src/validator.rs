//! Signal validation and normalization.
//!
//! Pure functions over the raw payload; no state, no I/O. Updates
//! (`early_exit`, `strategy_invalidated`, `momentum_change`) may omit price
//! fields — whether a matching position exists is the gate's call.

use compact_str::CompactString;
use relay_core::{
    AlertPayload, Direction, Levels, Momentum, NormalizedAlert, Price, Timeframe, TradingPair,
    ValidationError,
};

/// Validate a raw payload into a normalized alert.
pub fn validate(payload: &AlertPayload) -> Result<NormalizedAlert, ValidationError> {
    let pair = TradingPair::parse(&payload.pair)?;
    let direction = require_enum("direction", &payload.direction, Direction::from_str)?;
    let timeframe = require_enum("timeframe", &payload.timeframe, Timeframe::from_str)?;

    let strategy = payload.strategy.trim();
    if strategy.is_empty() {
        return Err(ValidationError::MissingField("strategy"));
    }

    let momentum = optional_enum("momentum", payload.momentum.as_deref(), Momentum::from_str)?;
    let momentum_change = optional_enum(
        "momentum_change",
        payload.momentum_change.as_deref(),
        Momentum::from_str,
    )?;

    let is_update =
        payload.early_exit || payload.strategy_invalidated || momentum_change.is_some();

    let confidence = match payload.confidence {
        Some(value) => {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ValidationError::OutOfRange {
                    field: "confidence",
                    value,
                });
            }
            Some(value)
        }
        None if is_update => None,
        None => return Err(ValidationError::MissingField("confidence")),
    };

    let levels = build_levels(payload, direction, is_update)?;

    Ok(NormalizedAlert {
        pair,
        direction,
        strategy: CompactString::new(strategy),
        timeframe,
        levels,
        confidence,
        momentum,
        early_exit: payload.early_exit,
        strategy_invalidated: payload.strategy_invalidated,
        momentum_change,
        exit_reason: payload
            .exit_reason
            .as_deref()
            .map(|r| CompactString::new(r.trim())),
    })
}

fn require_enum<T>(
    field: &'static str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    parse(value).ok_or_else(|| ValidationError::UnsupportedValue {
        field,
        value: value.to_string(),
    })
}

fn optional_enum<T>(
    field: &'static str,
    value: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ValidationError> {
    match value {
        None => Ok(None),
        Some(raw) => parse(raw)
            .ok_or_else(|| ValidationError::UnsupportedValue {
                field,
                value: raw.to_string(),
            })
            .map(Some),
    }
}

fn price(field: &'static str, value: f64) -> Result<Price, ValidationError> {
    Price::from_f64(value).ok_or(ValidationError::OutOfRange { field, value })
}

/// Assemble and check price levels.
///
/// New alerts must carry a complete, consistent level set. Updates may omit
/// levels; supplied values are still range-checked, and the consistency
/// check runs whenever the set is complete.
fn build_levels(
    payload: &AlertPayload,
    direction: Direction,
    is_update: bool,
) -> Result<Option<Levels>, ValidationError> {
    let entry = payload.entry.map(|v| price("entry", v)).transpose()?;
    let stop = payload.stop.map(|v| price("stop", v)).transpose()?;
    let targets = if payload.targets.is_empty() {
        None
    } else {
        Some(
            payload
                .targets
                .iter()
                .map(|&t| price("targets", t))
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    if !is_update {
        let entry = entry.ok_or(ValidationError::MissingField("entry"))?;
        let stop = stop.ok_or(ValidationError::MissingField("stop"))?;
        let targets = targets.ok_or(ValidationError::EmptyTargets)?;
        check_levels(direction, entry, stop, &targets)?;
        return Ok(Some(Levels {
            entry,
            stop,
            targets,
        }));
    }

    match (entry, stop, targets) {
        (Some(entry), Some(stop), Some(targets)) => {
            check_levels(direction, entry, stop, &targets)?;
            Ok(Some(Levels {
                entry,
                stop,
                targets,
            }))
        }
        // A partial level set on an update cannot be consistency-checked;
        // the message is formatted without levels.
        _ => Ok(None),
    }
}

/// Enforce `stop < entry < min(targets)` for long (mirror for short) and
/// strict monotonicity of targets away from entry.
fn check_levels(
    direction: Direction,
    entry: Price,
    stop: Price,
    targets: &[Price],
) -> Result<(), ValidationError> {
    match direction {
        Direction::Long => {
            if stop >= entry {
                return Err(ValidationError::InconsistentLevels(format!(
                    "stop {} must be below entry {} for a long",
                    stop, entry
                )));
            }
            let mut prev = entry;
            for &target in targets {
                if target <= prev {
                    return Err(ValidationError::InconsistentLevels(format!(
                        "target {} does not increase away from entry {} for a long",
                        target, entry
                    )));
                }
                prev = target;
            }
        }
        Direction::Short => {
            if stop <= entry {
                return Err(ValidationError::InconsistentLevels(format!(
                    "stop {} must be above entry {} for a short",
                    stop, entry
                )));
            }
            let mut prev = entry;
            for &target in targets {
                if target >= prev {
                    return Err(ValidationError::InconsistentLevels(format!(
                        "target {} does not decrease away from entry {} for a short",
                        target, entry
                    )));
                }
                prev = target;
            }
        }
    }
    Ok(())
}
