use std::fmt;

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::ChatbotError;

/// Role of a participant in a chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    /// The user/human participant in the conversation
    User,
    /// The AI assistant participant in the conversation
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of who sent this message (user or assistant)
    pub role: ChatRole,
    /// The text content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new builder for a user message
    pub fn user() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::User)
    }

    /// Create a new builder for an assistant message
    pub fn assistant() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::Assistant)
    }
}

/// Builder for ChatMessage
#[derive(Debug)]
pub struct ChatMessageBuilder {
    role: ChatRole,
    content: String,
}

impl ChatMessageBuilder {
    /// Create a new ChatMessageBuilder with specified role
    pub fn new(role: ChatRole) -> Self {
        Self {
            role,
            content: String::new(),
        }
    }

    /// Set the message content
    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = content.into();
        self
    }

    /// Build the ChatMessage
    pub fn build(self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Usage {
    pub total_tokens: u32,
}

pub trait ChatResponse: fmt::Debug + fmt::Display + Send + Sync {
    fn text(&self) -> Option<String>;
    fn usage(&self) -> Option<Usage> {
        None
    }
}

/// Trait for providers that support chat-style interactions.
///
/// The system persona, model choice and sampling parameters are provider
/// configuration; callers only hand over the conversation so far.
#[async_trait]
pub trait ChatProvider: Sync + Send {
    /// Sends a chat request to the provider with a sequence of messages.
    ///
    /// # Arguments
    ///
    /// * `messages` - The conversation history as a slice of chat messages,
    ///   oldest first, ending with the new user message
    ///
    /// # Returns
    ///
    /// The provider's response or an error
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, ChatbotError>;

    /// Sends a streaming chat request to the provider with a sequence of messages.
    ///
    /// # Returns
    ///
    /// A stream of text tokens or an error
    async fn chat_stream(
        &self,
        _messages: &[ChatMessage],
    ) -> Result<std::pin::Pin<Box<dyn Stream<Item = Result<String, ChatbotError>> + Send>>, ChatbotError>
    {
        Err(ChatbotError::Generic(
            "Streaming not supported for this provider".to_string(),
        ))
    }
}

/// Creates a Server-Sent Events (SSE) stream from an HTTP response.
///
/// # Arguments
///
/// * `response` - The HTTP response from the streaming API
/// * `parser` - Function to parse each SSE chunk into optional text content
///
/// # Returns
///
/// A pinned stream of text tokens or an error
pub(crate) fn create_sse_stream<F>(
    response: reqwest::Response,
    parser: F,
) -> std::pin::Pin<Box<dyn Stream<Item = Result<String, ChatbotError>> + Send>>
where
    F: Fn(&str) -> Result<Option<String>, ChatbotError> + Send + 'static,
{
    let stream = response
        .bytes_stream()
        .map(move |chunk| match chunk {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                parser(&text)
            }
            Err(e) => Err(ChatbotError::HttpError(e.to_string())),
        })
        .filter_map(|result| async move {
            match result {
                Ok(Some(content)) => Some(Ok(content)),
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            }
        });

    Box::pin(stream)
}

/// Serializes a slice of ChatMessages to a JSON string.
///
/// Used by the CLI `/save` command to export the visible transcript.
///
/// # Example
/// ```
/// # use balmitra::chat::{serialize_messages, ChatMessage};
/// let messages = vec![ChatMessage::user().content("Hello, world!").build()];
/// let json_string = serialize_messages(&messages).unwrap();
/// assert!(json_string.contains("Hello, world!"));
/// ```
pub fn serialize_messages(messages: &[ChatMessage]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(messages)
}

/// Deserializes a JSON string into a vector of ChatMessages.
///
/// Expects the format produced by `serialize_messages`.
pub fn deserialize_messages(json_str: &str) -> Result<Vec<ChatMessage>, serde_json::Error> {
    serde_json::from_str(json_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder() {
        let msg = ChatMessage::assistant().content("hello there").build();
        assert_eq!(msg.role, ChatRole::Assistant);
        assert_eq!(msg.content, "hello there");
    }

    #[test]
    fn test_chat_message_serialization_and_deserialization() {
        let messages = vec![
            ChatMessage::user().content("Hello!").build(),
            ChatMessage::assistant()
                .content("Hi, how can I help?")
                .build(),
            ChatMessage::user().content("मुझे मदद चाहिए").build(),
        ];

        let json_string = serialize_messages(&messages).unwrap();
        let deserialized_messages = deserialize_messages(&json_string).unwrap();

        assert_eq!(messages, deserialized_messages);
    }
}
