//! Alert message formatting.

use relay_core::{NormalizedAlert, Price};

/// Format price with appropriate precision based on magnitude.
fn format_price(price: Price) -> String {
    let value = price.to_f64();
    if value >= 1000.0 {
        format!("{:.2}", value)
    } else if value >= 1.0 {
        format!("{:.4}", value)
    } else if value >= 0.01 {
        format!("{:.6}", value)
    } else {
        format!("{:.8}", value)
    }
}

/// Format an admitted alert as a Telegram HTML message.
pub fn format_alert_message(alert: &NormalizedAlert) -> String {
    let mut msg = format!(
        "<b>[{}] [{}] [{}]</b>\n🕒 Timeframe: {}",
        alert.pair,
        alert.direction.as_str().to_uppercase(),
        alert.strategy,
        alert.timeframe
    );

    if let Some(levels) = &alert.levels {
        let targets = levels
            .targets
            .iter()
            .map(|&t| format_price(t))
            .collect::<Vec<_>>()
            .join(" → ");
        msg.push_str(&format!(
            "\n🎯 Entry: {}\n🛑 Stop: {}\n📈 Targets: {}",
            format_price(levels.entry),
            format_price(levels.stop),
            targets
        ));
    }
    if let Some(confidence) = alert.confidence {
        msg.push_str(&format!("\n🧠 Confidence: {:.0}%", confidence));
    }
    if let Some(momentum) = alert.momentum {
        msg.push_str(&format!("\n⚡ Momentum: {}", momentum));
    }

    let mut updates = Vec::new();
    if alert.early_exit {
        updates.push("⚠️ Early Exit Alert".to_string());
    }
    if let Some(change) = alert.momentum_change {
        updates.push(format!("⚡ Momentum Change: {}", change));
    }
    if alert.strategy_invalidated {
        updates.push("❌ Strategy Invalidation Notice".to_string());
    }
    if let Some(reason) = &alert.exit_reason {
        updates.push(format!("Exit reason: {}", reason));
    }
    if !updates.is_empty() {
        msg.push('\n');
        msg.push_str(&updates.join("\n"));
    }

    let now = chrono::Utc::now();
    msg.push_str(&format!("\n\n⏰ {}", now.format("%Y-%m-%d %H:%M:%S UTC")));

    msg
}
