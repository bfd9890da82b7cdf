//! Supported languages and language resolution.
//!
//! The chatbot understands English, Hindi, Marathi and Urdu. Anything the
//! detector cannot place in that set resolves to English.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::translate::TranslationProvider;

/// One of the four languages the chatbot speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    #[default]
    English,
    Hindi,
    Marathi,
    Urdu,
}

impl SupportedLanguage {
    /// All supported languages, in display order.
    pub const ALL: [SupportedLanguage; 4] = [
        SupportedLanguage::English,
        SupportedLanguage::Hindi,
        SupportedLanguage::Marathi,
        SupportedLanguage::Urdu,
    ];

    /// ISO 639-1 code used on the wire with the translation service.
    pub fn code(&self) -> &'static str {
        match self {
            SupportedLanguage::English => "en",
            SupportedLanguage::Hindi => "hi",
            SupportedLanguage::Marathi => "mr",
            SupportedLanguage::Urdu => "ur",
        }
    }

    /// Maps an ISO 639-1 code to a supported language, if it is one of ours.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(SupportedLanguage::English),
            "hi" => Some(SupportedLanguage::Hindi),
            "mr" => Some(SupportedLanguage::Marathi),
            "ur" => Some(SupportedLanguage::Urdu),
            _ => None,
        }
    }

    /// Parses a user-facing name ("hindi", "Urdu", ...) or an ISO code.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "english" => Some(SupportedLanguage::English),
            "hindi" => Some(SupportedLanguage::Hindi),
            "marathi" => Some(SupportedLanguage::Marathi),
            "urdu" => Some(SupportedLanguage::Urdu),
            _ => Self::from_code(&lower),
        }
    }

    /// English display name.
    pub fn name(&self) -> &'static str {
        match self {
            SupportedLanguage::English => "English",
            SupportedLanguage::Hindi => "Hindi",
            SupportedLanguage::Marathi => "Marathi",
            SupportedLanguage::Urdu => "Urdu",
        }
    }

    /// Name as shown in a language selector, including the native script.
    pub fn selector_label(&self) -> &'static str {
        match self {
            SupportedLanguage::English => "English",
            SupportedLanguage::Hindi => "Hindi / हिंदी",
            SupportedLanguage::Marathi => "Marathi / मराठी",
            SupportedLanguage::Urdu => "Urdu / اردو",
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resolves the language for one turn.
///
/// An explicit choice (the UI selector) always wins and skips detection.
/// Otherwise the sample text is classified by the external detector; an
/// unmapped code, an empty sample or a detector failure all resolve to
/// English. This function is total: it never fails.
pub async fn resolve(
    explicit: Option<SupportedLanguage>,
    sample: Option<&str>,
    detector: &dyn TranslationProvider,
) -> SupportedLanguage {
    if let Some(language) = explicit {
        return language;
    }

    let sample = match sample {
        Some(text) if !text.trim().is_empty() => text,
        _ => return SupportedLanguage::English,
    };

    match detector.detect(sample).await {
        Ok(code) => SupportedLanguage::from_code(&code).unwrap_or_else(|| {
            log::debug!("unsupported language code {code:?}, defaulting to English");
            SupportedLanguage::English
        }),
        Err(e) => {
            log::warn!("language detection failed, defaulting to English: {e}");
            SupportedLanguage::English
        }
    }
}

/// Localized greeting shown when a session starts.
pub fn greeting(language: SupportedLanguage) -> &'static str {
    match language {
        SupportedLanguage::English => {
            "Hello! I'm your friendly chatbot. I can help children with questions about social issues and provide support."
        }
        SupportedLanguage::Hindi => {
            "नमस्ते! मैं आपका दोस्ताना चैटबॉट हूँ। मैं बच्चों को सामाजिक मुद्दों के बारे में सवालों के साथ मदद कर सकता हूँ और समर्थन प्रदान कर सकता हूँ।"
        }
        SupportedLanguage::Marathi => {
            "नमस्कार! मी आपला मैत्रीपूर्ण चॅटबॉट आहे. मी मुलांना सामाजिक समस्यांविषयी प्रश्नांना मदत करू शकतो आणि समर्थन देऊ शकतो."
        }
        SupportedLanguage::Urdu => {
            "السلام علیکم! میں آپ کا دوستانہ چیٹ بوٹ ہوں۔ میں بچوں کو سماجی مسائل کے بارے میں سوالات میں مدد کر سکتا ہوں اور حمایت فراہم کر سکتا ہوں۔"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatbotError;
    use async_trait::async_trait;

    struct FixedDetector(&'static str);

    #[async_trait]
    impl TranslationProvider for FixedDetector {
        async fn translate(
            &self,
            text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<String, ChatbotError> {
            Ok(text.to_string())
        }

        async fn detect(&self, _text: &str) -> Result<String, ChatbotError> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenDetector;

    #[async_trait]
    impl TranslationProvider for BrokenDetector {
        async fn translate(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<String, ChatbotError> {
            Err(ChatbotError::HttpError("connection refused".into()))
        }

        async fn detect(&self, _text: &str) -> Result<String, ChatbotError> {
            Err(ChatbotError::HttpError("connection refused".into()))
        }
    }

    #[test]
    fn test_code_round_trip() {
        for language in SupportedLanguage::ALL {
            assert_eq!(SupportedLanguage::from_code(language.code()), Some(language));
        }
        assert_eq!(SupportedLanguage::from_code("fr"), None);
    }

    #[test]
    fn test_parse_names_and_codes() {
        assert_eq!(
            SupportedLanguage::parse("Hindi"),
            Some(SupportedLanguage::Hindi)
        );
        assert_eq!(SupportedLanguage::parse("ur"), Some(SupportedLanguage::Urdu));
        assert_eq!(SupportedLanguage::parse("klingon"), None);
    }

    #[tokio::test]
    async fn test_explicit_choice_skips_detection() {
        // BrokenDetector would error if consulted
        let language = resolve(
            Some(SupportedLanguage::Marathi),
            Some("whatever"),
            &BrokenDetector,
        )
        .await;
        assert_eq!(language, SupportedLanguage::Marathi);
    }

    #[tokio::test]
    async fn test_detection_maps_supported_code() {
        let language = resolve(None, Some("मुझे मदद चाहिए"), &FixedDetector("hi")).await;
        assert_eq!(language, SupportedLanguage::Hindi);
    }

    #[tokio::test]
    async fn test_unmapped_code_defaults_to_english() {
        let language = resolve(None, Some("bonjour"), &FixedDetector("fr")).await;
        assert_eq!(language, SupportedLanguage::English);
    }

    #[tokio::test]
    async fn test_detector_failure_defaults_to_english() {
        let language = resolve(None, Some("anything"), &BrokenDetector).await;
        assert_eq!(language, SupportedLanguage::English);
    }

    #[tokio::test]
    async fn test_empty_sample_defaults_to_english() {
        let language = resolve(None, Some("   "), &BrokenDetector).await;
        assert_eq!(language, SupportedLanguage::English);

        let language = resolve(None, None, &BrokenDetector).await;
        assert_eq!(language, SupportedLanguage::English);
    }
}
