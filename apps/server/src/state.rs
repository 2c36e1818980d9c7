//! Shared application state.

use relay_alerts::NotifierHandle;
use relay_gate::SignalGate;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// Request counters exposed on /stats.
#[derive(Debug, Default)]
pub struct Counters {
    pub received: AtomicU64,
    pub admitted: AtomicU64,
    pub suppressed: AtomicU64,
    pub rejected: AtomicU64,
}

/// State shared across request handlers.
pub struct AppState {
    pub gate: SignalGate,
    /// `None` in dry-run mode: admitted alerts are logged, not delivered.
    pub notifier: Option<NotifierHandle>,
    pub webhook_secret: String,
    pub counters: Counters,
}

pub type SharedState = Arc<AppState>;

/// Create the shared application state.
pub fn create_state(
    gate: SignalGate,
    notifier: Option<NotifierHandle>,
    webhook_secret: String,
) -> SharedState {
    Arc::new(AppState {
        gate,
        notifier,
        webhook_secret,
        counters: Counters::default(),
    })
}
