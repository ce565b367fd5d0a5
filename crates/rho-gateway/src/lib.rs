//! Webhook HTTP surface: verify, normalize, classify, and dispatch
//! inbound repository events.

mod signature;
mod webhook;

pub use signature::verify_webhook_signature;
pub use webhook::{
    build_gateway_router, serve_gateway, GatewayConfig, GatewayState, WEBHOOK_ENDPOINT,
};
