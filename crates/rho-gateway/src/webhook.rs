use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use rho_events::{
    classify, ClassifierDecision, DispatchEnvelope, DispatchQueue, RepositoryEvent, TriggerConfig,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::net::TcpListener;

use crate::signature::verify_webhook_signature;

pub const WEBHOOK_ENDPOINT: &str = "/api/github/webhooks";
const HEALTH_ENDPOINT: &str = "/healthz";
const EVENT_HEADER: &str = "x-github-event";
const SIGNATURE_HEADER: &str = "x-hub-signature-256";

#[derive(Clone)]
/// Public struct `GatewayConfig` used across Rho components.
pub struct GatewayConfig {
    pub triggers: TriggerConfig,
    /// Unset disables signature verification (e.g. behind a trusted proxy).
    pub webhook_secret: Option<String>,
}

/// Shared router state: static trigger configuration plus the injected
/// queue client, constructed once at startup and passed by reference.
pub struct GatewayState {
    pub config: GatewayConfig,
    pub queue: Arc<dyn DispatchQueue>,
}

pub fn build_gateway_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route(WEBHOOK_ENDPOINT, post(handle_webhook))
        .route(HEALTH_ENDPOINT, get(handle_health))
        .with_state(state)
}

/// Binds `addr` and serves the gateway until the server terminates.
pub async fn serve_gateway(addr: SocketAddr, state: Arc<GatewayState>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind webhook listener on {addr}"))?;
    axum::serve(listener, build_gateway_router(state))
        .await
        .context("webhook server terminated")?;
    Ok(())
}

async fn handle_health() -> &'static str {
    "ok"
}

/// Single POST surface for all webhook deliveries. Always answers
/// promptly; downstream processing happens behind the dispatch queue.
async fn handle_webhook(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = state.config.webhook_secret.as_deref() {
        let Some(signature) = header_value(&headers, SIGNATURE_HEADER) else {
            tracing::warn!("webhook rejected: missing signature header");
            return StatusCode::UNAUTHORIZED;
        };
        if let Err(error) = verify_webhook_signature(&body, &signature, secret) {
            tracing::warn!(%error, "webhook rejected: signature verification failed");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let Some(event_name) = header_value(&headers, EVENT_HEADER) else {
        tracing::warn!("webhook ignored: missing event header");
        return StatusCode::BAD_REQUEST;
    };

    let event = match parse_repository_event(&event_name, &body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            tracing::debug!(event = %event_name, "webhook ignored: unsupported event");
            return StatusCode::OK;
        }
        Err(error) => {
            tracing::warn!(event = %event_name, %error, "webhook ignored: malformed payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    match classify(&event, &state.config.triggers) {
        ClassifierDecision::Accept => {
            let envelope = DispatchEnvelope::for_event(&event);
            tracing::info!(
                event_id = %envelope.event_id,
                kind = %envelope.kind,
                "event accepted, publishing to dispatch queue"
            );
            state.queue.publish(envelope);
        }
        ClassifierDecision::Reject { reason } => {
            tracing::info!(kind = event.kind(), reason, "event rejected");
        }
    }
    StatusCode::OK
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Maps a transport event name plus the payload `action` field onto the
/// normalized event model. Unsupported combinations yield `None`.
fn parse_repository_event(event_name: &str, body: &[u8]) -> Result<Option<RepositoryEvent>> {
    let payload: Value =
        serde_json::from_slice(body).context("webhook payload is not valid JSON")?;
    let action = payload
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let event = match (event_name, action) {
        ("issues", "opened") => Some(RepositoryEvent::IssueOpened {
            issue: field(&payload, "issue")?,
        }),
        ("pull_request_review", _) => Some(RepositoryEvent::PullRequestReviewSubmitted {
            action: action.to_string(),
            review: field(&payload, "review")?,
            pull_request: field(&payload, "pull_request")?,
        }),
        ("issue_comment", "created") => Some(RepositoryEvent::IssueCommentCreated {
            issue: field(&payload, "issue")?,
            comment: field(&payload, "comment")?,
        }),
        ("pull_request", "opened") => Some(RepositoryEvent::PullRequestOpened {
            pull_request: field(&payload, "pull_request")?,
        }),
        _ => None,
    };
    Ok(event)
}

fn field<T: DeserializeOwned>(payload: &Value, name: &str) -> Result<T> {
    let value = payload
        .get(name)
        .cloned()
        .ok_or_else(|| anyhow!("webhook payload missing '{name}' field"))?;
    serde_json::from_value(value)
        .with_context(|| format!("webhook payload has malformed '{name}' field"))
}
