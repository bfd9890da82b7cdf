//! Bounded conversation memory.
//!
//! Keeps the most recent K exchange pairs of one session. Each exchange
//! carries two parallel texts: the original-language pair shown to the user
//! and the English pair fed back to the model as chat history. Keeping both
//! in one structure keeps the display transcript and the model context in
//! sync, which the original design left to two separate stores.

use std::collections::VecDeque;

use crate::chat::ChatMessage;

/// Default number of exchange pairs remembered per session.
pub const DEFAULT_WINDOW: usize = 5;

/// One completed turn: a user utterance and the assistant's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// What the user typed, in their language
    pub user_text: String,
    /// What was shown back, in their language
    pub assistant_text: String,
    /// English form of the user text, as sent to the model
    pub prompt_user_text: String,
    /// English form of the reply, as received from the model
    pub prompt_assistant_text: String,
}

/// Sliding window over the most recent exchanges of a single session.
///
/// Strict FIFO: appending pair K+1 evicts the oldest pair. Iteration order is
/// chronological (oldest retained first); that ordering is what the model
/// sees as conversational flow, so it is never reordered.
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    capacity: usize,
    exchanges: VecDeque<Exchange>,
}

impl ConversationWindow {
    /// Creates an empty window holding at most `capacity` exchange pairs.
    /// A zero capacity is bumped to one so a turn can always be recorded.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            exchanges: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Appends one completed exchange, evicting the oldest if full.
    pub fn append(&mut self, exchange: Exchange) {
        if self.exchanges.len() == self.capacity {
            self.exchanges.pop_front();
        }
        self.exchanges.push_back(exchange);
    }

    /// Drops all retained exchanges. Called when the active language changes
    /// so translated artifacts from different languages never share a
    /// context window.
    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// Retained exchanges, oldest first.
    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    /// The English chat history for the next generation request, oldest
    /// retained pair first.
    pub fn as_prompt_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.exchanges.len() * 2);
        for exchange in &self.exchanges {
            messages.push(ChatMessage::user().content(&exchange.prompt_user_text).build());
            messages.push(
                ChatMessage::assistant()
                    .content(&exchange.prompt_assistant_text)
                    .build(),
            );
        }
        messages
    }

    /// The visible transcript in the user's language, oldest first.
    pub fn as_display_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.exchanges.len() * 2);
        for exchange in &self.exchanges {
            messages.push(ChatMessage::user().content(&exchange.user_text).build());
            messages.push(ChatMessage::assistant().content(&exchange.assistant_text).build());
        }
        messages
    }
}

impl Default for ConversationWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatRole;

    fn exchange(n: usize) -> Exchange {
        Exchange {
            user_text: format!("user {n}"),
            assistant_text: format!("assistant {n}"),
            prompt_user_text: format!("user {n}"),
            prompt_assistant_text: format!("assistant {n}"),
        }
    }

    #[test]
    fn test_append_below_capacity_keeps_everything() {
        let mut window = ConversationWindow::new(5);
        window.append(exchange(1));
        window.append(exchange(2));
        assert_eq!(window.len(), 2);
        assert_eq!(window.exchanges().next().unwrap().user_text, "user 1");
    }

    #[test]
    fn test_overflow_evicts_oldest_fifo() {
        let mut window = ConversationWindow::new(3);
        for n in 1..=7 {
            window.append(exchange(n));
        }
        assert_eq!(window.len(), 3);
        let kept: Vec<_> = window.exchanges().map(|e| e.user_text.clone()).collect();
        assert_eq!(kept, vec!["user 5", "user 6", "user 7"]);
    }

    #[test]
    fn test_seven_turns_with_default_window_keeps_three_through_seven() {
        let mut window = ConversationWindow::default();
        for n in 1..=7 {
            window.append(exchange(n));
        }
        assert_eq!(window.len(), 5);
        let kept: Vec<_> = window.exchanges().map(|e| e.user_text.clone()).collect();
        assert_eq!(kept, vec!["user 3", "user 4", "user 5", "user 6", "user 7"]);
    }

    #[test]
    fn test_prompt_messages_alternate_roles_in_order() {
        let mut window = ConversationWindow::new(5);
        window.append(exchange(1));
        window.append(exchange(2));

        let messages = window.as_prompt_messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[0].content, "user 1");
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_eq!(messages[3].content, "assistant 2");
    }

    #[test]
    fn test_prompt_messages_use_english_texts() {
        let mut window = ConversationWindow::new(5);
        window.append(Exchange {
            user_text: "मैं उदास हूँ".to_string(),
            assistant_text: "यह सुनकर दुख हुआ".to_string(),
            prompt_user_text: "I am sad".to_string(),
            prompt_assistant_text: "I'm sorry to hear that".to_string(),
        });

        let prompt = window.as_prompt_messages();
        assert_eq!(prompt[0].content, "I am sad");
        let display = window.as_display_messages();
        assert_eq!(display[0].content, "मैं उदास हूँ");
    }

    #[test]
    fn test_clear_empties_window() {
        let mut window = ConversationWindow::new(2);
        window.append(exchange(1));
        window.clear();
        assert!(window.is_empty());
        assert!(window.as_prompt_messages().is_empty());
    }

    #[test]
    fn test_zero_capacity_still_holds_one() {
        let mut window = ConversationWindow::new(0);
        window.append(exchange(1));
        window.append(exchange(2));
        assert_eq!(window.len(), 1);
        assert_eq!(window.exchanges().next().unwrap().user_text, "user 2");
    }
}
