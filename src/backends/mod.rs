//! Clients for the external capabilities the chatbot delegates to.

pub mod google_translate;
pub mod groq;
