//! BalMitra is a multilingual support chatbot for children.
//!
//! User text in English, Hindi, Marathi or Urdu is translated to English,
//! answered by a Groq-hosted model under a fixed persona with a sliding
//! window of recent exchanges, and the reply is translated back. The "hard"
//! work lives in external services; this crate wires them together and keeps
//! the per-session state.
//!
//! ```no_run
//! use std::sync::Arc;
//! use balmitra::backends::{google_translate::GoogleTranslate, groq::Groq};
//! use balmitra::session::{ChatSession, TurnRequest, SYSTEM_PERSONA};
//! use balmitra::translate::Translator;
//!
//! # async fn run() -> Result<(), balmitra::error::ChatbotError> {
//! let groq = Arc::new(Groq::new(
//!     "gsk_...",
//!     None,
//!     Some(SYSTEM_PERSONA.to_string()),
//!     None,
//!     None,
//!     None,
//! ));
//! let translator = Translator::new(Arc::new(GoogleTranslate::default()));
//!
//! let mut session = ChatSession::new(groq, translator);
//! let result = session.process_turn(TurnRequest::new("मुझे मदद चाहिए")).await?;
//! println!("{}", result.display_text);
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "api")]
pub mod api;
pub mod backends;
pub mod chat;
pub mod error;
pub mod language;
pub mod memory;
pub mod secret_store;
pub mod session;
pub mod translate;

pub use chat::{ChatMessage, ChatProvider, ChatResponse, ChatRole};
pub use error::ChatbotError;
pub use language::SupportedLanguage;
pub use memory::ConversationWindow;
pub use session::{ChatSession, TurnRequest, TurnResult, SYSTEM_PERSONA};
pub use translate::{TranslationProvider, Translator};

/// Commonly used types, for glob imports.
pub mod prelude {
    pub use crate::backends::google_translate::GoogleTranslate;
    pub use crate::backends::groq::Groq;
    pub use crate::chat::{ChatMessage, ChatProvider, ChatResponse, ChatRole};
    pub use crate::error::ChatbotError;
    pub use crate::language::SupportedLanguage;
    pub use crate::memory::ConversationWindow;
    pub use crate::secret_store::SecretStore;
    pub use crate::session::{ChatSession, TurnRequest, TurnResult, SYSTEM_PERSONA};
    pub use crate::translate::{TranslationProvider, Translator};
}
