//! One chat session and its turn pipeline.
//!
//! A session owns one [`ConversationWindow`] and shared handles to the
//! generation and translation capabilities. Each turn runs a fixed sequence:
//! resolve the language, translate the input to English, generate against the
//! persona plus the remembered history, translate the reply back, record the
//! exchange. Nothing is retried; translation degrades silently, generation
//! failures are the caller's to show.

use std::sync::Arc;

use crate::chat::{ChatMessage, ChatProvider};
use crate::error::ChatbotError;
use crate::language::{self, SupportedLanguage};
use crate::memory::{ConversationWindow, Exchange};
use crate::translate::Translator;

/// Instruction text prepended to every generation request.
pub const SYSTEM_PERSONA: &str = "You are a friendly conversational chatbot specifically designed to help children from underprivileged backgrounds. \
You provide supportive, age-appropriate responses about social issues including but not limited to:
- Education access and resources
- Health and nutrition
- Community support
- Bullying and interpersonal problems
- Family challenges
- Basic rights awareness

Keep your answers simple, supportive, and encouraging. Provide practical guidance when possible.
Always maintain a positive, hopeful tone. If the child appears to be in danger or needs immediate help,
suggest they talk to a trusted adult, teacher, or community worker.";

/// One user utterance, as handed over by a presentation shell.
///
/// `language` is set when the shell has an explicit selector; without it the
/// session detects the language from the text itself.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub text: String,
    pub language: Option<SupportedLanguage>,
}

impl TurnRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: SupportedLanguage) -> Self {
        self.language = Some(language);
        self
    }
}

/// The assistant's reply for one turn, in the user's language.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub display_text: String,
    /// The language the turn actually ran in
    pub language: SupportedLanguage,
}

/// A single user's conversation with the assistant.
pub struct ChatSession {
    provider: Arc<dyn ChatProvider>,
    translator: Translator,
    memory: ConversationWindow,
    language: SupportedLanguage,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn ChatProvider>, translator: Translator) -> Self {
        Self {
            provider,
            translator,
            memory: ConversationWindow::default(),
            language: SupportedLanguage::English,
        }
    }

    pub fn with_window(mut self, capacity: usize) -> Self {
        self.memory = ConversationWindow::new(capacity);
        self
    }

    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    pub fn memory(&self) -> &ConversationWindow {
        &self.memory
    }

    /// Switches the active language. Changing it clears the window so
    /// artifacts from the previous language never leak into the new context.
    pub fn set_language(&mut self, language: SupportedLanguage) {
        if self.language != language {
            self.language = language;
            self.memory.clear();
        }
    }

    /// Forgets the conversation so far.
    pub fn reset(&mut self) {
        self.memory.clear();
    }

    /// Runs one turn of the pipeline.
    ///
    /// Generation failure is returned as an error and leaves the window
    /// untouched; no partial exchange is ever recorded.
    pub async fn process_turn(&mut self, request: TurnRequest) -> Result<TurnResult, ChatbotError> {
        let language = language::resolve(
            request.language,
            Some(&request.text),
            self.translator.provider(),
        )
        .await;
        self.language = language;

        let english_input = self.translator.to_english(&request.text, language).await;

        let messages = self.prompt_messages(&english_input);
        let response = self.provider.chat(&messages).await?;
        let english_response = response
            .text()
            .ok_or_else(|| ChatbotError::ProviderError("empty response from model".to_string()))?;

        let display_text = self
            .translator
            .from_english(&english_response, language)
            .await;

        self.memory.append(Exchange {
            user_text: request.text,
            assistant_text: display_text.clone(),
            prompt_user_text: english_input,
            prompt_assistant_text: english_response,
        });

        Ok(TurnResult {
            display_text,
            language,
        })
    }

    /// Records an English exchange produced outside [`process_turn`], for
    /// shells that render the reply token by token as it streams. The same
    /// texts serve as both display and prompt form.
    ///
    /// [`process_turn`]: ChatSession::process_turn
    pub fn record_english_exchange(&mut self, user_text: String, assistant_text: String) {
        self.language = SupportedLanguage::English;
        self.memory.append(Exchange {
            prompt_user_text: user_text.clone(),
            prompt_assistant_text: assistant_text.clone(),
            user_text,
            assistant_text,
        });
    }

    /// The remembered English history followed by the new user message.
    fn prompt_messages(&self, english_input: &str) -> Vec<ChatMessage> {
        let mut messages = self.memory.as_prompt_messages();
        messages.push(ChatMessage::user().content(english_input).build());
        messages
    }
}
