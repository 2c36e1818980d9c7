//! Validation and rate-limit gate for inbound trading alerts.
//!
//! This crate provides:
//! - A pure signal validator producing normalized alerts
//! - A per-pair rate-limit / dedup gate deciding admission

pub mod limiter;
pub mod validator;

pub use limiter::{GateConfig, GateStats, SignalGate, SuppressReason, Verdict};
pub use validator::validate;
