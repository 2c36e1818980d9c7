//! Signal Relay - trading alert webhook server.
//!
//! Accepts trading-alert payloads over a webhook, validates and rate-limits
//! them, and forwards formatted messages to a Telegram chat.

mod config;
mod routes;
mod state;

use clap::Parser;
use config::{Args, Secrets};
use relay_alerts::{start_notifier, Notifier, TelegramSender};
use relay_gate::SignalGate;
use state::create_state;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    init_logging(&args.log_level);

    info!("🚀 Signal Relay starting...");
    info!("  Port: {}", args.port);
    info!("  Min Interval: {}s", args.min_interval_secs);
    info!(
        "  Window Cap: {}",
        if args.max_per_window > 0 {
            format!("{} per {}s", args.max_per_window, args.window_secs)
        } else {
            "disabled".to_string()
        }
    );
    info!("  Dry Run: {}", args.dry_run);

    let secrets = match Secrets::from_env(args.dry_run) {
        Ok(secrets) => secrets,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let notifier = match &secrets.telegram {
        Some(telegram) => {
            let sender = match TelegramSender::new(&telegram.bot_token, &telegram.chat_id) {
                Ok(sender) => sender,
                Err(e) => {
                    error!("Telegram configuration error: {}", e);
                    std::process::exit(1);
                }
            };
            Some(start_notifier(Notifier::new(sender)))
        }
        None => {
            info!("Dry run: Telegram delivery disabled");
            None
        }
    };

    let gate = SignalGate::new(args.gate_config());
    let state = create_state(gate, notifier, secrets.webhook_secret.clone());
    let app = routes::create_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Webhook server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
