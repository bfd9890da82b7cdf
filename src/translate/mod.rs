//! Translation between the supported languages and English.
//!
//! The external service does the actual translating; this module owns the
//! fallback policy. Translation is a non-critical enhancement: when the
//! service fails, the original text is passed through unchanged and the turn
//! proceeds. Callers cannot tell a translated result from a fallback one.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChatbotError;
use crate::language::SupportedLanguage;

/// Trait for external translation/detection capabilities.
///
/// Implementations return errors freely; the graceful degradation lives in
/// [`Translator`], not here.
#[async_trait]
pub trait TranslationProvider: Sync + Send {
    /// Translates `text` between two ISO 639-1 language codes.
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ChatbotError>;

    /// Classifies `text` and returns its ISO 639-1 language code.
    async fn detect(&self, text: &str) -> Result<String, ChatbotError>;
}

/// Best-effort wrapper around a [`TranslationProvider`].
///
/// Both directions are total functions: English short-circuits to the
/// identity with no network call, and any provider error degrades to the
/// original text.
#[derive(Clone)]
pub struct Translator {
    provider: Arc<dyn TranslationProvider>,
}

impl Translator {
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self { provider }
    }

    /// Handle to the underlying provider, for language detection.
    pub fn provider(&self) -> &dyn TranslationProvider {
        self.provider.as_ref()
    }

    /// Translates user text into English for the model.
    pub async fn to_english(&self, text: &str, source: SupportedLanguage) -> String {
        if source == SupportedLanguage::English {
            return text.to_string();
        }

        match self.provider.translate(text, source.code(), "en").await {
            Ok(translated) => translated,
            Err(e) => {
                log::warn!("translation {} -> en failed, using original text: {e}", source.code());
                text.to_string()
            }
        }
    }

    /// Translates the model's English reply back into the user's language.
    pub async fn from_english(&self, text: &str, target: SupportedLanguage) -> String {
        if target == SupportedLanguage::English {
            return text.to_string();
        }

        match self.provider.translate(text, "en", target.code()).await {
            Ok(translated) => translated,
            Err(e) => {
                log::warn!("translation en -> {} failed, using English text: {e}", target.code());
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Tags translations so tests can tell which direction ran, and counts
    /// provider calls to prove the English identity short-circuit.
    struct TaggingProvider {
        calls: AtomicUsize,
    }

    impl TaggingProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TranslationProvider for TaggingProvider {
        async fn translate(
            &self,
            text: &str,
            source: &str,
            target: &str,
        ) -> Result<String, ChatbotError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{source}->{target}] {text}"))
        }

        async fn detect(&self, _text: &str) -> Result<String, ChatbotError> {
            Ok("en".to_string())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl TranslationProvider for FailingProvider {
        async fn translate(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<String, ChatbotError> {
            Err(ChatbotError::ProviderError("unsupported pair".into()))
        }

        async fn detect(&self, _text: &str) -> Result<String, ChatbotError> {
            Err(ChatbotError::ProviderError("unsupported".into()))
        }
    }

    #[tokio::test]
    async fn test_english_is_identity_without_provider_call() {
        let provider = TaggingProvider::new();
        let translator = Translator::new(provider.clone());

        let out = translator
            .to_english("hello", SupportedLanguage::English)
            .await;
        assert_eq!(out, "hello");
        let out = translator
            .from_english("hello", SupportedLanguage::English)
            .await;
        assert_eq!(out, "hello");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_english_delegates_with_code_mapping() {
        let translator = Translator::new(TaggingProvider::new());

        let out = translator
            .to_english("मुझे मदद चाहिए", SupportedLanguage::Hindi)
            .await;
        assert_eq!(out, "[hi->en] मुझे मदद चाहिए");

        let out = translator.from_english("hello", SupportedLanguage::Urdu).await;
        assert_eq!(out, "[en->ur] hello");
    }

    #[tokio::test]
    async fn test_failure_returns_original_text() {
        let translator = Translator::new(Arc::new(FailingProvider));

        let out = translator
            .to_english("मुझे मदद चाहिए", SupportedLanguage::Hindi)
            .await;
        assert_eq!(out, "मुझे मदद चाहिए");

        let out = translator
            .from_english("hello", SupportedLanguage::Marathi)
            .await;
        assert_eq!(out, "hello");
    }
}
