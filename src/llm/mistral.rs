//! Mistral chat-completions provider implementation

use super::types::{ChatRequest, ChatResponse, Usage};
use super::{LlmError, LlmService};
use crate::store::{Message, ToolCall};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1/chat/completions";

/// Mistral service implementation
pub struct MistralService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl MistralService {
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Point the service at a non-default endpoint (gateway, test server)
    pub fn with_base_url(
        api_key: String,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    fn translate_request(&self, request: &ChatRequest) -> MistralRequest {
        let mut messages = Vec::new();

        if let Some(system) = &request.system {
            messages.push(MistralMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        for msg in &request.messages {
            messages.push(Self::translate_message(msg));
        }

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|t| MistralTool {
                        r#type: "function".to_string(),
                        function: MistralFunction {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: t.input_schema.clone(),
                        },
                    })
                    .collect(),
            )
        };

        let response_format = request.json_output.then(|| ResponseFormat {
            r#type: "json_object".to_string(),
        });

        MistralRequest {
            model: self.model.clone(),
            temperature: 0.0,
            messages,
            tools,
            response_format,
        }
    }

    fn translate_message(msg: &Message) -> MistralMessage {
        match msg {
            Message::Human { content } => MistralMessage {
                role: "user".to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Assistant {
                content,
                tool_calls,
            } => {
                let wire_calls = if tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        tool_calls
                            .iter()
                            .map(|call| MistralToolCall {
                                id: call.id.clone(),
                                r#type: "function".to_string(),
                                function: MistralFunctionCall {
                                    name: call.name.clone(),
                                    arguments: serde_json::Value::String(
                                        serde_json::to_string(&call.arguments)
                                            .unwrap_or_else(|_| "{}".to_string()),
                                    ),
                                },
                            })
                            .collect(),
                    )
                };
                MistralMessage {
                    role: "assistant".to_string(),
                    content: Some(content.clone()),
                    tool_calls: wire_calls,
                    tool_call_id: None,
                }
            }
            Message::Tool { call_id, content } => MistralMessage {
                role: "tool".to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(call_id.clone()),
            },
        }
    }

    fn normalize_response(resp: MistralResponse) -> Result<ChatResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::unknown("Response contained no choices"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                // Mistral serializes function arguments as a JSON string;
                // tolerate an inline object as well.
                let arguments = match call.function.arguments {
                    serde_json::Value::String(raw) => serde_json::from_str(&raw)
                        .unwrap_or(serde_json::Value::String(raw)),
                    other => other,
                };
                ToolCall::new(call.id, call.function.name, arguments)
            })
            .collect();

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage: Usage {
                input_tokens: resp.usage.prompt_tokens,
                output_tokens: resp.usage.completion_tokens,
            },
        })
    }

    fn classify_error(status: reqwest::StatusCode, body: &str) -> LlmError {
        match status.as_u16() {
            401 | 403 => LlmError::auth(format!("Authentication failed: {body}")),
            429 => LlmError::rate_limit(format!("Rate limited: {body}")),
            400 | 422 => LlmError::invalid_request(format!("Invalid request: {body}")),
            500..=599 => LlmError::server_error(format!("Server error: {body}")),
            _ => LlmError::unknown(format!("HTTP {status}: {body}")),
        }
    }
}

#[async_trait]
impl LlmService for MistralService {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let mistral_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&mistral_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_error(status, &body));
        }

        let mistral_response: MistralResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(mistral_response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// Mistral API types

#[derive(Debug, Serialize)]
struct MistralRequest {
    model: String,
    temperature: f32,
    messages: Vec<MistralMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<MistralTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Serialize)]
struct MistralMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<MistralToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MistralToolCall {
    id: String,
    #[serde(default = "function_type")]
    r#type: String,
    function: MistralFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct MistralFunctionCall {
    name: String,
    /// String-encoded JSON on the wire; kept as a Value to tolerate both
    arguments: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct MistralTool {
    r#type: String,
    function: MistralFunction,
}

#[derive(Debug, Serialize)]
struct MistralFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MistralResponse {
    choices: Vec<MistralChoice>,
    usage: MistralUsage,
}

#[derive(Debug, Deserialize)]
struct MistralChoice {
    message: MistralResponseMessage,
}

#[derive(Debug, Deserialize)]
struct MistralResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<MistralToolCall>>,
}

#[derive(Debug, Deserialize)]
struct MistralUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
