use std::sync::atomic::{AtomicU64, Ordering};

use super::types::ChatMessage;

static NEXT_CONVERSATION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque reference to an ongoing dialogue with the model.
///
/// The chat-completions endpoint is stateless, so the handle carries the
/// history that gets replayed on every call. Its identity is allocated once
/// and survives every exchange appended to it; only [`ConversationHandle::new`]
/// hands out a new one.
#[derive(Debug, Clone)]
pub struct ConversationHandle {
    id: u64,
    messages: Vec<ChatMessage>,
}

impl ConversationHandle {
    /// Start a fresh, empty conversation
    pub fn new() -> Self {
        Self {
            id: NEXT_CONVERSATION_ID.fetch_add(1, Ordering::Relaxed),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether both handles refer to the same dialogue
    pub fn same_conversation(&self, other: &ConversationHandle) -> bool {
        self.id == other.id
    }

    /// Copy of this conversation with one user/assistant exchange appended.
    ///
    /// With a `limit`, the oldest exchanges are dropped so at most `limit`
    /// messages remain. Only whole exchanges are dropped, so an odd limit
    /// keeps one message fewer and the history always opens with a user turn.
    pub fn with_exchange(&self, user: &str, assistant: &str, limit: Option<usize>) -> Self {
        let mut next = self.clone();
        next.messages.push(ChatMessage::user(user));
        next.messages.push(ChatMessage::assistant(assistant));

        if let Some(limit) = limit {
            let limit = limit - limit % 2;
            if next.messages.len() > limit {
                let excess = next.messages.len() - limit;
                next.messages.drain(0..excess);
            }
        }

        next
    }
}

impl Default for ConversationHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    #[test]
    fn test_new_handles_are_distinct() {
        let a = ConversationHandle::new();
        let b = ConversationHandle::new();
        assert!(!a.same_conversation(&b));
        assert!(a.is_empty());
    }

    #[test]
    fn test_exchange_keeps_identity() {
        let handle = ConversationHandle::new();
        let next = handle.with_exchange("hi", "hello", None);

        assert!(next.same_conversation(&handle));
        assert_eq!(next.len(), 2);
        assert_eq!(next.messages()[0].role, MessageRole::User);
        assert_eq!(next.messages()[1].content, "hello");
        // The original is untouched
        assert!(handle.is_empty());
    }

    #[test]
    fn test_history_limit_drops_oldest() {
        let mut handle = ConversationHandle::new();
        for i in 0..5 {
            handle = handle.with_exchange(&format!("q{i}"), &format!("a{i}"), Some(4));
        }

        assert_eq!(handle.len(), 4);
        assert_eq!(handle.messages()[0].content, "q3");
        assert_eq!(handle.messages()[3].content, "a4");
    }

    #[test]
    fn test_odd_history_limit_drops_whole_exchanges() {
        let mut handle = ConversationHandle::new();
        for i in 0..5 {
            handle = handle.with_exchange(&format!("q{i}"), &format!("a{i}"), Some(5));
        }

        assert_eq!(handle.len(), 4);
        assert_eq!(handle.messages()[0].role, MessageRole::User);
        assert_eq!(handle.messages()[0].content, "q3");

        let tiny = ConversationHandle::new().with_exchange("q", "a", Some(1));
        assert!(tiny.is_empty());
    }
}
