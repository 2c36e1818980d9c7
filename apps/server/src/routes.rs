//! Webhook routes and verdict-to-status translation.

use crate::state::SharedState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use relay_core::{AlertPayload, ValidationError};
use relay_gate::{GateStats, SuppressReason, Verdict};
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const SECRET_HEADER: &str = "x-webhook-secret";

/// Create the application router.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler.
async fn health_handler() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct StatsResponse {
    received: u64,
    admitted: u64,
    suppressed: u64,
    rejected: u64,
    tracked_pairs: usize,
    gate: GateStats,
}

async fn stats_handler(State(state): State<SharedState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        received: state.counters.received.load(Ordering::Relaxed),
        admitted: state.counters.admitted.load(Ordering::Relaxed),
        suppressed: state.counters.suppressed.load(Ordering::Relaxed),
        rejected: state.counters.rejected.load(Ordering::Relaxed),
        tracked_pairs: state.gate.tracked_pairs(),
        gate: state.gate.stats(),
    })
}

/// Webhook handler: secret check, parse, validate, gate, enqueue.
///
/// The secret is checked before the body is touched; the body is taken as
/// raw bytes so a bad secret can never leak a parse error instead of a 401.
async fn webhook_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.counters.received.fetch_add(1, Ordering::Relaxed);

    let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if provided != Some(state.webhook_secret.as_str()) {
        warn!("Webhook request with missing or invalid secret");
        state.counters.rejected.fetch_add(1, Ordering::Relaxed);
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid webhook secret"})),
        )
            .into_response();
    }

    let payload: AlertPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            state.counters.rejected.fetch_add(1, Ordering::Relaxed);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("invalid JSON payload: {e}")})),
            )
                .into_response();
        }
    };

    let alert = match relay_gate::validate(&payload) {
        Ok(alert) => alert,
        Err(e) => {
            state.counters.rejected.fetch_add(1, Ordering::Relaxed);
            info!(field = e.field(), reason = %e, "Alert rejected");
            return validation_response(&e);
        }
    };

    match state.gate.admit(&alert) {
        Verdict::Admitted => {
            state.counters.admitted.fetch_add(1, Ordering::Relaxed);
            info!(
                pair = %alert.pair,
                direction = alert.direction.as_str(),
                strategy = %alert.strategy,
                update = alert.is_update(),
                "Alert admitted"
            );
            match &state.notifier {
                Some(notifier) => notifier.try_send(alert),
                None => info!(pair = %alert.pair, "Dry run: delivery skipped"),
            }
            (StatusCode::OK, Json(json!({"status": "admitted"}))).into_response()
        }
        Verdict::Suppressed(reason) => {
            state.counters.suppressed.fetch_add(1, Ordering::Relaxed);
            info!(pair = %alert.pair, reason = reason.as_str(), "Alert suppressed");
            (
                suppress_status(reason),
                Json(json!({"status": "suppressed", "reason": reason.as_str()})),
            )
                .into_response()
        }
    }
}

fn validation_response(error: &ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": {
                "field": error.field(),
                "reason": error.to_string(),
            }
        })),
    )
        .into_response()
}

fn suppress_status(reason: SuppressReason) -> StatusCode {
    match reason {
        SuppressReason::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        SuppressReason::Duplicate => StatusCode::CONFLICT,
        SuppressReason::NoMatchingPosition => StatusCode::NOT_FOUND,
    }
}
