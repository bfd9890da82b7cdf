//! Error types shared across the chatbot.

use std::fmt;

/// Error type covering configuration, transport and provider failures.
#[derive(Debug)]
pub enum ChatbotError {
    /// HTTP-level or transport error
    HttpError(String),
    /// Authentication or missing-credential error
    AuthError(String),
    /// Error reported by a remote provider
    ProviderError(String),
    /// Provider rate limit hit
    TooManyRequests(String),
    /// Provider returned a body we could not make sense of
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// JSON serialization/deserialization error
    JsonError(String),
    /// Anything else
    Generic(String),
}

impl fmt::Display for ChatbotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatbotError::HttpError(msg) => write!(f, "HTTP error: {msg}"),
            ChatbotError::AuthError(msg) => write!(f, "Auth error: {msg}"),
            ChatbotError::ProviderError(msg) => write!(f, "Provider error: {msg}"),
            ChatbotError::TooManyRequests(msg) => write!(f, "Rate limited: {msg}"),
            ChatbotError::ResponseFormatError {
                message,
                raw_response,
            } => {
                write!(f, "Response format error: {message} (raw: {raw_response})")
            }
            ChatbotError::JsonError(msg) => write!(f, "JSON error: {msg}"),
            ChatbotError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ChatbotError {}

impl From<reqwest::Error> for ChatbotError {
    fn from(err: reqwest::Error) -> Self {
        ChatbotError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for ChatbotError {
    fn from(err: serde_json::Error) -> Self {
        ChatbotError::JsonError(err.to_string())
    }
}
