//! Background alert delivery.
//!
//! Mirrors the gate's contract: once an alert is admitted, delivery is
//! fire-and-forget. Send failures are logged and never propagate back into
//! rate-limiter state.

use crate::format::format_alert_message;
use crate::telegram::{TelegramError, TelegramSender};
use relay_core::NormalizedAlert;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Delivers admitted alerts to Telegram.
pub struct Notifier {
    sender: TelegramSender,
}

impl Notifier {
    pub fn new(sender: TelegramSender) -> Self {
        Self { sender }
    }

    /// Format and deliver one alert.
    pub async fn deliver(&self, alert: &NormalizedAlert) -> Result<(), TelegramError> {
        let message = format_alert_message(alert);
        self.sender.send(&message).await
    }
}

/// Cloneable handle for enqueueing alerts from request handlers.
#[derive(Clone)]
pub struct NotifierHandle {
    tx: mpsc::Sender<NormalizedAlert>,
}

impl NotifierHandle {
    /// Enqueue without blocking. Drops the alert with a warning if the
    /// delivery queue is full; the gate has already recorded the admission.
    pub fn try_send(&self, alert: NormalizedAlert) {
        if let Err(e) = self.tx.try_send(alert) {
            warn!("Failed to enqueue alert for delivery: {}", e);
        }
    }
}

/// Start the delivery background task. Returns a handle for enqueueing.
pub fn start_notifier(notifier: Notifier) -> NotifierHandle {
    let (tx, mut rx) = mpsc::channel::<NormalizedAlert>(100);

    let notifier = Arc::new(notifier);
    tokio::spawn(async move {
        info!("Alert notifier started");

        while let Some(alert) = rx.recv().await {
            if let Err(e) = notifier.deliver(&alert).await {
                error!(pair = %alert.pair, error = %e, "Failed to deliver alert");
            } else {
                info!(
                    pair = %alert.pair,
                    strategy = %alert.strategy,
                    "Alert delivered"
                );
            }
        }

        info!("Alert notifier stopped");
    });

    NotifierHandle { tx }
}
