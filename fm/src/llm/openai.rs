//! OpenAI API client implementation
//!
//! Implements the LlmClient trait for OpenAI's Chat Completions API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    CompletionRequest, CompletionResponse, ContentBlock, LlmClient, LlmError, Message, MessageContent, Role,
    StopReason, TokenUsage, ToolCall, ToolChoice,
};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Longest wait honoured from a `retry-after` header
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(30);

/// Delay before retrying after `error` on the given zero-based attempt,
/// or `None` when the error is final or the retries are used up
fn retry_delay(error: &LlmError, attempt: u32) -> Option<Duration> {
    if attempt >= MAX_RETRIES || !error.is_retryable() {
        return None;
    }
    let backoff = Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt));
    Some(error.retry_after().map_or(backoff, |wait| wait.min(MAX_RATE_LIMIT_WAIT)))
}

/// OpenAI API client
pub struct OpenAIClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl OpenAIClient {
    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "OpenAIClient::from_config: called");
        let api_key = config.api_key().map_err(|e| LlmError::Configuration(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for the OpenAI API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "OpenAIClient::build_request_body: called");

        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": request.system_prompt,
        })];

        messages.extend(convert_messages(&request.messages));

        let max_tokens = request.max_tokens.min(self.max_tokens);

        // GPT-5.x and o-series models use max_completion_tokens instead of max_tokens
        let uses_completion_tokens =
            self.model.starts_with("gpt-5") || self.model.starts_with("o1") || self.model.starts_with("o3");

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if uses_completion_tokens {
            body["max_completion_tokens"] = serde_json::json!(max_tokens);
        } else {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(request.tools.iter().map(|t| t.to_openai_schema()).collect::<Vec<_>>());
            body["tool_choice"] = serde_json::json!(request.tool_choice.as_str());
        } else if request.tool_choice == ToolChoice::Required {
            warn!("OpenAIClient::build_request_body: tool call required but no tools offered");
        }

        body
    }

    /// Parse the OpenAI API response
    fn parse_response(api_response: OpenAIResponse) -> Result<CompletionResponse, LlmError> {
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                let input = if tc.function.arguments.trim().is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(&tc.function.arguments)?
                };
                Ok(ToolCall {
                    id: tc.id,
                    name: tc.function.name,
                    input,
                })
            })
            .collect::<Result<Vec<_>, LlmError>>()?;

        let usage = api_response.usage.unwrap_or_default();
        Ok(CompletionResponse {
            content: choice.message.content,
            tool_calls,
            stop_reason: StopReason::from_openai(choice.finish_reason.as_deref()),
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

/// Convert internal Message types to OpenAI API format
///
/// OpenAI requires one message per tool result, so a single internal message
/// with multiple tool results becomes multiple OpenAI messages.
fn convert_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    let mut result = Vec::new();

    for msg in messages {
        let role = match msg.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };

        let blocks = match &msg.content {
            MessageContent::Text(text) => {
                result.push(serde_json::json!({ "role": role, "content": text }));
                continue;
            }
            MessageContent::Blocks(blocks) => blocks,
        };

        let mut tool_calls = Vec::new();
        let mut tool_results = Vec::new();
        let mut text_content = String::new();

        for block in blocks {
            match block {
                ContentBlock::Text { text } => text_content.push_str(text),
                ContentBlock::ToolUse { id, name, input } => {
                    tool_calls.push(serde_json::json!({
                        "id": id,
                        "type": "function",
                        "function": {
                            "name": name,
                            "arguments": input.to_string(),
                        }
                    }));
                }
                ContentBlock::ToolResult {
                    tool_use_id, content, ..
                } => tool_results.push((tool_use_id, content)),
            }
        }

        if !tool_results.is_empty() {
            for (tool_call_id, content) in tool_results {
                result.push(serde_json::json!({
                    "role": "tool",
                    "tool_call_id": tool_call_id,
                    "content": content,
                }));
            }
            continue;
        }

        if !tool_calls.is_empty() {
            let mut msg = serde_json::json!({
                "role": "assistant",
                "tool_calls": tool_calls,
            });
            if !text_content.is_empty() {
                msg["content"] = serde_json::json!(text_content);
            }
            result.push(msg);
            continue;
        }

        result.push(serde_json::json!({ "role": role, "content": text_content }));
    }

    result
}

impl OpenAIClient {
    /// One request without retries
    async fn send(&self, url: &str, body: &serde_json::Value) -> Result<CompletionResponse, LlmError> {
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        let text = response.text().await?;
        let api_response: OpenAIResponse = serde_json::from_str(&text)?;
        Self::parse_response(api_response)
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, tool_choice = request.tool_choice.as_str(), "OpenAIClient::complete: called");
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let mut attempt = 0;
        loop {
            let error = match self.send(&url, &body).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            let Some(delay) = retry_delay(&error, attempt) else {
                debug!(attempt, error = %error, "OpenAIClient::complete: giving up");
                return Err(error);
            };

            if error.is_rate_limit() {
                warn!(attempt, wait_ms = delay.as_millis() as u64, "OpenAIClient::complete: rate limited, waiting");
            } else {
                warn!(
                    attempt,
                    backoff_ms = delay.as_millis() as u64,
                    error = %error,
                    "OpenAIClient::complete: retrying after transient error"
                );
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ToolDefinition;

    fn client(model: &str, max_tokens: u32) -> OpenAIClient {
        OpenAIClient {
            model: model.to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.openai.com".to_string(),
            http: Client::new(),
            max_tokens,
        }
    }

    fn request(tools: Vec<ToolDefinition>, tool_choice: ToolChoice) -> CompletionRequest {
        CompletionRequest {
            system_prompt: "You are helpful".to_string(),
            messages: vec![Message::user("Hello")],
            tools,
            tool_choice,
            max_tokens: 1000,
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let body = client("gpt-4o", 8192).build_request_body(&request(vec![], ToolChoice::Auto));

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are helpful");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn test_gpt5_uses_completion_tokens_and_is_capped() {
        let body = client("gpt-5", 500).build_request_body(&request(vec![], ToolChoice::Auto));
        assert_eq!(body["max_completion_tokens"], 500);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_tool_choice_is_forwarded() {
        let tool = ToolDefinition::new("read_file", "Read a file", serde_json::json!({"type": "object"}));
        let body = client("gpt-4o", 8192).build_request_body(&request(vec![tool], ToolChoice::Required));
        assert_eq!(body["tool_choice"], "required");
        assert_eq!(body["tools"][0]["function"]["name"], "read_file");
    }

    #[test]
    fn test_convert_tool_round_trip_messages() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "read_file".to_string(),
            input: serde_json::json!({"filename": "a.txt"}),
        };
        let messages = vec![
            Message::assistant_blocks(vec![ContentBlock::tool_use(&call)]),
            Message::user_blocks(vec![ContentBlock::tool_result("call_1", "{\"content\":\"x\"}", false)]),
        ];
        let converted = convert_messages(&messages);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0]["tool_calls"][0]["function"]["name"], "read_file");
        assert_eq!(converted[1]["role"], "tool");
        assert_eq!(converted[1]["tool_call_id"], "call_1");
    }

    #[test]
    fn test_parse_response_with_tool_call() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": { "name": "list_files", "arguments": "{\"path\": \".\"}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3 }
        });
        let parsed: OpenAIResponse = serde_json::from_value(raw).unwrap();
        let response = OpenAIClient::parse_response(parsed).unwrap();
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.tool_calls[0].name, "list_files");
        assert_eq!(response.tool_calls[0].input["path"], ".");
        assert_eq!(response.usage.input_tokens, 12);
    }

    #[test]
    fn test_parse_response_without_choices_fails() {
        let parsed: OpenAIResponse = serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();
        assert!(OpenAIClient::parse_response(parsed).is_err());
    }

    #[test]
    fn test_retry_delay_honours_rate_limit_with_cap() {
        let limited = |secs| LlmError::RateLimited {
            retry_after: Duration::from_secs(secs),
        };
        assert_eq!(retry_delay(&limited(5), 0), Some(Duration::from_secs(5)));
        assert_eq!(retry_delay(&limited(120), 1), Some(MAX_RATE_LIMIT_WAIT));
        assert_eq!(retry_delay(&limited(5), MAX_RETRIES), None);
    }

    #[test]
    fn test_retry_delay_backs_off_on_server_errors() {
        let unavailable = LlmError::ApiError {
            status: 503,
            message: "Unavailable".to_string(),
        };
        assert_eq!(retry_delay(&unavailable, 0), Some(Duration::from_millis(1000)));
        assert_eq!(retry_delay(&unavailable, 2), Some(Duration::from_millis(4000)));
        assert_eq!(retry_delay(&unavailable, MAX_RETRIES), None);
    }

    #[test]
    fn test_retry_delay_stops_on_final_errors() {
        let unauthorized = LlmError::ApiError {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert_eq!(retry_delay(&unauthorized, 0), None);
        assert_eq!(retry_delay(&LlmError::InvalidResponse("no choices".to_string()), 0), None);
    }
}
