//! An OpenAI-compatible streaming chat client.
//!
//! Grounded in the teacher's `stream_openai_compatible` (reqwest
//! `bytes_stream` + `"data: "` SSE-line parsing), extended to flatten the
//! `delta.tool_calls[]` shape into [`LLMChunk::ToolCallDelta`] and to map
//! HTTP status onto the stable [`crate::error::LLMError`] categories instead
//! of logging and dropping the connection. Many providers (OpenAI, Together,
//! Grok, Perplexity, Ollama, OpenRouter) speak this same wire format.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use tokio::sync::mpsc;

use super::{FinishReason, LLMChunk, LLMClient, LLMStream, ToolSchema};
use crate::config::RunConfig;
use crate::error::LLMError;
use crate::message::Message;

pub struct OpenAiCompatibleClient {
    endpoint: String,
    api_key: String,
    default_model: String,
    client: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, default_model: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .tcp_nodelay(true)
            .build()
            .expect("reqwest client builds with default TLS backend");
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            default_model: default_model.into(),
            client,
        }
    }
}

fn message_to_wire(message: &Message) -> JsonValue {
    match message {
        Message::System { content } => json!({"role": "system", "content": content}),
        Message::User { content } => json!({"role": "user", "content": content}),
        Message::Assistant { content, tool_calls } => {
            let mut obj = json!({"role": "assistant", "content": content});
            if !tool_calls.is_empty() {
                obj["tool_calls"] = json!(tool_calls
                    .iter()
                    .map(|tc| json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            "arguments": serde_json::to_string(&tc.arguments).unwrap_or_default(),
                        }
                    }))
                    .collect::<Vec<_>>());
            }
            obj
        }
        Message::ToolResult { tool_call_id, content } => json!({
            "role": "tool",
            "tool_call_id": tool_call_id,
            "content": content,
        }),
    }
}

fn tool_to_wire(tool: &ToolSchema) -> JsonValue {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

/// Map an HTTP status code from the provider onto a stable error category.
fn category_for_status(status: reqwest::StatusCode) -> crate::events::ErrorCategory {
    use crate::events::ErrorCategory;
    if status.as_u16() == 429 {
        ErrorCategory::RateLimit
    } else if status.as_u16() == 401 || status.as_u16() == 403 {
        ErrorCategory::Auth
    } else if status.is_server_error() {
        ErrorCategory::Transport
    } else {
        ErrorCategory::Malformed
    }
}

#[async_trait::async_trait]
impl LLMClient for OpenAiCompatibleClient {
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        run_config: &RunConfig,
    ) -> Result<LLMStream, LLMError> {
        let body = json!({
            "model": run_config.model.clone().unwrap_or_else(|| self.default_model.clone()),
            "messages": messages.iter().map(message_to_wire).collect::<Vec<_>>(),
            "tools": tools.iter().map(tool_to_wire).collect::<Vec<_>>(),
            "max_tokens": run_config.max_output_tokens,
            "temperature": run_config.temperature,
            "stream": true,
        });

        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);

        let response = tokio::select! {
            biased;
            _ = run_config.cancellation.cancelled() => {
                return Err(LLMError::new(crate::events::ErrorCategory::Cancelled, "cancelled before response"));
            }
            result = request.send() => result.map_err(|e| LLMError::transport(e.to_string()))?,
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::new(
                category_for_status(status),
                format!("HTTP {status}: {body}"),
            ));
        }

        let (tx, rx) = mpsc::channel(256);
        let cancellation = run_config.cancellation.clone();

        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut assembler = super::ToolCallAssembler::new();
            let mut saw_tool_calls = false;
            let mut carry = String::new();

            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => break,
                    next = byte_stream.next() => next,
                };
                let Some(chunk_result) = next else { break };
                let chunk = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(Err(LLMError::transport(e.to_string()))).await;
                        return;
                    }
                };
                carry.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(newline) = carry.find('\n') {
                    let line = carry[..newline].trim_end_matches('\r').to_string();
                    carry.drain(..=newline);
                    let Some(data) = line.strip_prefix("data: ") else { continue };
                    if data == "[DONE]" {
                        let reason = if saw_tool_calls { FinishReason::ToolCalls } else { FinishReason::Stop };
                        let _ = tx.send(Ok(LLMChunk::End(reason))).await;
                        return;
                    }
                    let Ok(parsed) = serde_json::from_str::<JsonValue>(data) else {
                        let _ = tx.send(Err(LLMError::malformed(format!("non-JSON SSE payload: {data}")))).await;
                        return;
                    };
                    let Some(choice) = parsed["choices"].get(0) else { continue };
                    if let Some(delta_calls) = choice["delta"]["tool_calls"].as_array() {
                        saw_tool_calls = true;
                        for call in delta_calls {
                            let index = call["index"].as_u64().unwrap_or(0);
                            let id = call["id"].as_str().map(str::to_string)
                                .unwrap_or_else(|| format!("call_{index}"));
                            let name = call["function"]["name"].as_str().map(str::to_string);
                            let args = call["function"]["arguments"].as_str().unwrap_or("").to_string();
                            assembler.push(id, name, args);
                        }
                    }
                    if let Some(text) = choice["delta"]["content"].as_str() {
                        if !text.is_empty()
                            && tx.send(Ok(LLMChunk::TextDelta(text.to_string()))).await.is_err()
                        {
                            return;
                        }
                    }
                    if let Some(reason) = choice["finish_reason"].as_str() {
                        let reason = match reason {
                            "stop" => FinishReason::Stop,
                            "tool_calls" | "function_call" => FinishReason::ToolCalls,
                            "length" => FinishReason::Length,
                            "content_filter" => FinishReason::ContentFilter,
                            _ => FinishReason::Error,
                        };
                        if reason == FinishReason::ToolCalls {
                            for call in assembler.finish() {
                                let _ = tx.send(Ok(LLMChunk::ToolCallDelta {
                                    id: call.id,
                                    name: Some(call.name),
                                    arguments_fragment: serde_json::to_string(&call.arguments)
                                        .unwrap_or_default(),
                                })).await;
                            }
                        }
                        let _ = tx.send(Ok(LLMChunk::End(reason))).await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}
