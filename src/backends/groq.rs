//! Groq API client implementation for chat functionality.
//!
//! Speaks the OpenAI-compatible chat completions wire format against Groq's
//! hosted models.

use crate::{
    chat::{create_sse_stream, ChatMessage, ChatProvider, ChatResponse, ChatRole, Usage},
    error::ChatbotError,
};
use async_trait::async_trait;
use futures::stream::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;

const CHAT_COMPLETIONS_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Client for interacting with Groq's chat completions API.
pub struct Groq {
    pub api_key: String,
    pub model: String,
    /// System prompt prepended to every request
    pub system: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
    client: Client,
}

impl Groq {
    /// Creates a new Groq client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Groq API key
    /// * `model` - Model identifier, defaults to `llama3-8b-8192`
    /// * `system` - System prompt
    /// * `max_tokens` - Maximum tokens per completion
    /// * `temperature` - Sampling temperature
    /// * `timeout_seconds` - Request timeout in seconds
    pub fn new(
        api_key: impl Into<String>,
        model: Option<String>,
        system: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }

        Self {
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            system,
            max_tokens,
            temperature,
            timeout_seconds,
            client: builder.build().expect("Failed to build reqwest client"),
        }
    }

    fn request_body<'a>(&'a self, messages: &'a [ChatMessage], stream: bool) -> GroqChatRequest<'a> {
        let mut groq_msgs: Vec<GroqChatMessage<'a>> = Vec::with_capacity(messages.len() + 1);

        if let Some(system) = &self.system {
            groq_msgs.push(GroqChatMessage {
                role: "system",
                content: system,
            });
        }

        for msg in messages {
            groq_msgs.push(GroqChatMessage {
                role: match msg.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                },
                content: &msg.content,
            });
        }

        GroqChatRequest {
            model: &self.model,
            messages: groq_msgs,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream,
        }
    }

    async fn send(&self, body: &GroqChatRequest<'_>) -> Result<reqwest::Response, ChatbotError> {
        if self.api_key.is_empty() {
            return Err(ChatbotError::AuthError("Missing Groq API key".to_string()));
        }

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(body) {
                log::trace!("Groq request payload: {json}");
            }
        }

        let response = self
            .client
            .post(CHAT_COMPLETIONS_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        log::debug!("Groq HTTP status: {}", response.status());

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let raw_response = response.text().await?;
            return Err(ChatbotError::TooManyRequests(raw_response));
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(ChatbotError::ResponseFormatError {
                message: format!("Groq API returned error status: {status}"),
                raw_response: error_text,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatProvider for Groq {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, ChatbotError> {
        let body = self.request_body(messages, false);
        let response = self.send(&body).await?;

        let raw = response.text().await?;
        let parsed: GroqChatResponse = serde_json::from_str(&raw).map_err(|e| {
            ChatbotError::ResponseFormatError {
                message: format!("Failed to decode Groq API response: {e}"),
                raw_response: raw,
            }
        })?;

        Ok(Box::new(parsed))
    }

    async fn chat_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<std::pin::Pin<Box<dyn Stream<Item = Result<String, ChatbotError>> + Send>>, ChatbotError>
    {
        let body = self.request_body(messages, true);
        let response = self.send(&body).await?;

        Ok(create_sse_stream(response, parse_sse_chunk))
    }
}

/// Individual message in a Groq chat request.
#[derive(Serialize, Debug)]
struct GroqChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Request payload for Groq's chat completions endpoint.
#[derive(Serialize, Debug)]
struct GroqChatRequest<'a> {
    model: &'a str,
    messages: Vec<GroqChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Response from Groq's chat completions endpoint.
#[derive(Deserialize, Debug)]
struct GroqChatResponse {
    choices: Vec<GroqChatChoice>,
    #[serde(default)]
    usage: Usage,
}

/// Individual choice within a Groq chat response.
#[derive(Deserialize, Debug)]
struct GroqChatChoice {
    message: GroqChatMsg,
}

/// Message content within a Groq chat response.
#[derive(Deserialize, Debug)]
struct GroqChatMsg {
    content: Option<String>,
}

impl ChatResponse for GroqChatResponse {
    fn text(&self) -> Option<String> {
        self.choices.first().and_then(|c| c.message.content.clone())
    }

    fn usage(&self) -> Option<Usage> {
        Some(self.usage.clone())
    }
}

impl fmt::Display for GroqChatResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text().unwrap_or_default())
    }
}

/// Response chunk from Groq's streaming endpoint.
#[derive(Deserialize, Debug)]
struct GroqChatStreamResponse {
    choices: Vec<GroqChatStreamChoice>,
}

#[derive(Deserialize, Debug)]
struct GroqChatStreamChoice {
    delta: GroqChatStreamDelta,
}

#[derive(Deserialize, Debug)]
struct GroqChatStreamDelta {
    content: Option<String>,
}

/// Parses a Server-Sent Events (SSE) chunk from Groq's streaming API.
///
/// Returns the content tokens collected from the chunk, `None` if the chunk
/// carried nothing displayable, or an error if parsing fails.
fn parse_sse_chunk(chunk: &str) -> Result<Option<String>, ChatbotError> {
    let mut collected_content = String::new();

    for line in chunk.lines() {
        let line = line.trim();

        if let Some(data) = line.strip_prefix("data: ") {
            if data == "[DONE]" {
                if collected_content.is_empty() {
                    return Ok(None);
                } else {
                    return Ok(Some(collected_content));
                }
            }

            match serde_json::from_str::<GroqChatStreamResponse>(data) {
                Ok(response) => {
                    if let Some(choice) = response.choices.first() {
                        if let Some(content) = &choice.delta.content {
                            collected_content.push_str(content);
                        }
                    }
                }
                Err(_) => continue,
            }
        }
    }

    if collected_content.is_empty() {
        Ok(None)
    } else {
        Ok(Some(collected_content))
    }
}
