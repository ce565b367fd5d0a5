//! Completion-service boundary: chat types, client trait, and the
//! OpenAI-compatible HTTP client with retry/backoff handling.

mod openai;
mod retry;
mod types;

pub use openai::{OpenAiClient, OpenAiConfig};
pub use retry::{
    is_retryable_http_error, next_backoff_ms, next_backoff_ms_with_jitter, parse_retry_after_ms,
    provider_retry_delay_ms, should_retry_status,
};
pub use types::{
    ChatRequest, ChatResponse, ChatUsage, LlmClient, Message, MessageRole, RhoAiError,
};
