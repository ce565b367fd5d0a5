use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::sleep;

use crate::{
    retry::{
        is_retryable_http_error, next_backoff_ms_with_jitter, parse_retry_after_ms,
        provider_retry_delay_ms, should_retry_status,
    },
    ChatRequest, ChatResponse, ChatUsage, LlmClient, Message, RhoAiError,
};

#[derive(Debug, Clone)]
/// Public struct `OpenAiConfig` used across Rho components.
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub request_timeout_ms: u64,
    pub max_retries: usize,
    pub retry_jitter: bool,
}

#[derive(Debug, Clone)]
/// Public struct `OpenAiClient` used across Rho components.
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, RhoAiError> {
        if config.api_key.trim().is_empty() {
            return Err(RhoAiError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|e| RhoAiError::InvalidResponse(format!("invalid API key header: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_millis(
                config.request_timeout_ms.max(1),
            ))
            .build()?;

        Ok(Self { client, config })
    }

    fn chat_completions_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            return base.to_string();
        }

        format!("{base}/chat/completions")
    }
}

fn build_chat_completions_payload(request: &ChatRequest) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role.as_str(),
                "content": message.content,
            })
        })
        .collect();

    let mut payload = json!({
        "model": request.model,
        "messages": messages,
    });
    if let Some(max_tokens) = request.max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    if let Some(temperature) = request.temperature {
        payload["temperature"] = json!(temperature);
    }
    payload
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsChoice {
    message: ChatCompletionsMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ChatCompletionsUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatCompletionsChoice>,
    #[serde(default)]
    usage: Option<ChatCompletionsUsage>,
}

fn parse_chat_completions_response(
    body: ChatCompletionsResponse,
) -> Result<ChatResponse, RhoAiError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| RhoAiError::InvalidResponse("response has no choices".to_string()))?;
    let usage = body.usage.unwrap_or_default();
    Ok(ChatResponse {
        message: Message::assistant(choice.message.content.unwrap_or_default()),
        finish_reason: choice.finish_reason,
        usage: ChatUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        },
    })
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, RhoAiError> {
        let payload = build_chat_completions_payload(&request);
        let url = self.chat_completions_url();
        let mut attempt = 0;
        loop {
            match self.client.post(&url).json(&payload).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if response.status().is_success() {
                        let body: ChatCompletionsResponse = response.json().await?;
                        return parse_chat_completions_response(body);
                    }

                    let retry_after_ms = parse_retry_after_ms(response.headers());
                    let body = response.text().await.unwrap_or_default();
                    if attempt >= self.config.max_retries || !should_retry_status(status) {
                        return Err(RhoAiError::HttpStatus { status, body });
                    }
                    let delay_ms =
                        provider_retry_delay_ms(attempt, self.config.retry_jitter, retry_after_ms);
                    sleep(std::time::Duration::from_millis(delay_ms)).await;
                }
                Err(error) => {
                    if attempt >= self.config.max_retries || !is_retryable_http_error(&error) {
                        return Err(RhoAiError::Http(error));
                    }
                    let delay_ms = next_backoff_ms_with_jitter(attempt, self.config.retry_jitter);
                    sleep(std::time::Duration::from_millis(delay_ms)).await;
                }
            }
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::{OpenAiClient, OpenAiConfig};
    use crate::{ChatRequest, LlmClient, Message, RhoAiError};

    fn test_config(api_base: String) -> OpenAiConfig {
        OpenAiConfig {
            api_base,
            api_key: "test-key".to_string(),
            request_timeout_ms: 5_000,
            max_retries: 1,
            retry_jitter: false,
        }
    }

    fn sample_request() -> ChatRequest {
        ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message::system("sys"), Message::user("hello")],
            max_tokens: None,
            temperature: Some(0.2),
        }
    }

    #[test]
    fn unit_new_rejects_blank_api_key() {
        let error = OpenAiClient::new(OpenAiConfig {
            api_base: "http://localhost".to_string(),
            api_key: "  ".to_string(),
            request_timeout_ms: 1_000,
            max_retries: 0,
            retry_jitter: false,
        })
        .expect_err("blank key");
        assert!(matches!(error, RhoAiError::MissingApiKey));
    }

    #[tokio::test]
    async fn functional_complete_parses_choice_and_usage() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer test-key");
                then.status(200).json_body(serde_json::json!({
                    "choices": [{
                        "message": { "content": "generated reply" },
                        "finish_reason": "stop",
                    }],
                    "usage": {
                        "prompt_tokens": 12,
                        "completion_tokens": 5,
                        "total_tokens": 17,
                    },
                }));
            })
            .await;

        let client =
            OpenAiClient::new(test_config(format!("{}/v1", server.base_url()))).expect("client");
        let response = client.complete(sample_request()).await.expect("complete");
        mock.assert_async().await;
        assert_eq!(response.message.content, "generated reply");
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.total_tokens, 17);
    }

    #[tokio::test]
    async fn integration_complete_retries_retryable_status_then_succeeds() {
        let server = MockServer::start_async().await;
        let failure = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(503).body("overloaded");
            })
            .await;

        let client =
            OpenAiClient::new(test_config(format!("{}/v1", server.base_url()))).expect("client");
        let error = client.complete(sample_request()).await.expect_err("fails");
        // One initial attempt plus one retry before surfacing the status.
        failure.assert_hits_async(2).await;
        match error {
            RhoAiError::HttpStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn regression_complete_does_not_retry_client_errors() {
        let server = MockServer::start_async().await;
        let failure = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(400).body("bad request");
            })
            .await;

        let client =
            OpenAiClient::new(test_config(format!("{}/v1", server.base_url()))).expect("client");
        let error = client.complete(sample_request()).await.expect_err("fails");
        failure.assert_hits_async(1).await;
        assert!(matches!(error, RhoAiError::HttpStatus { status: 400, .. }));
    }
}
