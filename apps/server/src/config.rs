//! Application configuration.

use clap::Parser;
use relay_gate::GateConfig;
use thiserror::Error;

/// Signal Relay CLI.
#[derive(Parser, Debug)]
#[command(name = "signal-relay")]
#[command(about = "Trading alert webhook relay", long_about = None)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Minimum seconds between new alerts for the same pair
    #[arg(long, default_value_t = 900)]
    pub min_interval_secs: u64,

    /// Rolling window in seconds for the per-pair emission count
    #[arg(long, default_value_t = 3600)]
    pub window_secs: u64,

    /// Maximum admitted alerts per pair per window (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_per_window: u32,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Log admitted alerts without sending them to Telegram
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl Args {
    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            min_interval: chrono::Duration::seconds(self.min_interval_secs as i64),
            window: chrono::Duration::seconds(self.window_secs as i64),
            max_per_window: (self.max_per_window > 0).then_some(self.max_per_window),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
}

/// Telegram credentials.
#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

/// Secrets read from the environment (.env supported).
#[derive(Debug, Clone)]
pub struct Secrets {
    /// Shared secret checked on every webhook request.
    pub webhook_secret: String,
    /// Absent in dry-run mode.
    pub telegram: Option<TelegramSettings>,
}

impl Secrets {
    pub fn from_env(dry_run: bool) -> Result<Self, ConfigError> {
        let webhook_secret = require_env("WEBHOOK_SECRET")?;
        let telegram = if dry_run {
            None
        } else {
            Some(TelegramSettings {
                bot_token: require_env("TELEGRAM_BOT_TOKEN")?,
                chat_id: require_env("TELEGRAM_CHAT_ID")?,
            })
        };
        Ok(Self {
            webhook_secret,
            telegram,
        })
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["signal-relay"]);
        assert_eq!(args.port, 8000);
        assert_eq!(args.min_interval_secs, 900);
        assert_eq!(args.max_per_window, 0);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_gate_config_conversion() {
        let args = Args::parse_from([
            "signal-relay",
            "--min-interval-secs",
            "120",
            "--max-per-window",
            "4",
        ]);
        let config = args.gate_config();
        assert_eq!(config.min_interval, chrono::Duration::seconds(120));
        assert_eq!(config.max_per_window, Some(4));
    }

    #[test]
    fn test_zero_cap_disables_window_limit() {
        let args = Args::parse_from(["signal-relay"]);
        assert_eq!(args.gate_config().max_per_window, None);
    }
}
