//! Google Translate client for translation and language detection.
//!
//! Uses the unauthenticated `translate_a/single` endpoint. The response is a
//! positional JSON array rather than an object: index 0 holds the translated
//! segments, index 2 the detected source language code.

use crate::error::ChatbotError;
use crate::translate::TranslationProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

const TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Client for the free Google Translate endpoint.
pub struct GoogleTranslate {
    client: Client,
}

impl GoogleTranslate {
    /// Creates a new client, with an optional per-request timeout.
    pub fn new(timeout_seconds: Option<u64>) -> Self {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }

        Self {
            client: builder.build().expect("Failed to build reqwest client"),
        }
    }

    async fn call(&self, text: &str, source: &str, target: &str) -> Result<Value, ChatbotError> {
        let response = self
            .client
            .get(TRANSLATE_ENDPOINT)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        log::debug!("Google Translate HTTP status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(ChatbotError::ResponseFormatError {
                message: format!("Translate endpoint returned error status: {status}"),
                raw_response: error_text,
            });
        }

        let raw = response.text().await?;
        serde_json::from_str(&raw).map_err(|e| ChatbotError::ResponseFormatError {
            message: format!("Failed to decode translate response: {e}"),
            raw_response: raw,
        })
    }
}

impl Default for GoogleTranslate {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslate {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ChatbotError> {
        let value = self.call(text, source, target).await?;
        extract_translation(&value)
    }

    async fn detect(&self, text: &str) -> Result<String, ChatbotError> {
        let value = self.call(text, "auto", "en").await?;
        extract_detected_language(&value)
    }
}

/// Joins the translated segments from a `translate_a/single` response.
fn extract_translation(value: &Value) -> Result<String, ChatbotError> {
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ChatbotError::ResponseFormatError {
            message: "No translation segments in response".to_string(),
            raw_response: value.to_string(),
        })?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(ChatbotError::ResponseFormatError {
            message: "Empty translation in response".to_string(),
            raw_response: value.to_string(),
        });
    }

    Ok(translated)
}

/// Reads the detected source language code from a `sl=auto` response.
fn extract_detected_language(value: &Value) -> Result<String, ChatbotError> {
    value
        .get(2)
        .and_then(Value::as_str)
        .map(|code| code.to_string())
        .ok_or_else(|| ChatbotError::ResponseFormatError {
            message: "No detected language in response".to_string(),
            raw_response: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_translation_joins_segments() {
        let value = json!([
            [
                ["I am sad. ", "मैं उदास हूँ।", null, null],
                ["Help me.", "मेरी मदद करो।", null, null]
            ],
            null,
            "hi"
        ]);

        assert_eq!(extract_translation(&value).unwrap(), "I am sad. Help me.");
    }

    #[test]
    fn test_extract_detected_language() {
        let value = json!([[["hello", "नमस्ते", null, null]], null, "hi"]);
        assert_eq!(extract_detected_language(&value).unwrap(), "hi");
    }

    #[test]
    fn test_malformed_response_is_an_error() {
        let value = json!({"unexpected": "object"});
        assert!(extract_translation(&value).is_err());
        assert!(extract_detected_language(&value).is_err());
    }
}
